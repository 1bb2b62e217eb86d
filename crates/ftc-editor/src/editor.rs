//! Generated-code editor state.

use ftc_core::project::CodeGenerationKind;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct EditorState {
    pub generation_kind: CodeGenerationKind,
    pub is_generating: bool,
    pub open: bool,
    pub generated_files: Option<BTreeMap<String, String>>,
    pub active_file: Option<String>,
}

impl EditorState {
    /// Install a freshly generated file set and open the editor on the
    /// first file.
    pub fn set_generated_files(&mut self, files: BTreeMap<String, String>) {
        self.active_file = files.keys().next().cloned();
        self.generated_files = Some(files);
        self.open = true;
    }

    pub fn set_active_file(&mut self, path: Option<String>) {
        self.active_file = path;
    }

    /// In-editor edit of one generated file. A no-op until a file set
    /// exists.
    pub fn update_file_content(&mut self, path: &str, content: String) {
        if let Some(files) = &mut self.generated_files {
            files.insert(path.to_string(), content);
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.active_file = None;
    }
}
