pub mod autosave;
pub mod canvas;
pub mod editor;
pub mod suggestions;
pub mod ui;
pub mod workbench;

pub use autosave::{AUTOSAVE_DEBOUNCE, AutosaveController, Debouncer};
pub use canvas::{
    CanvasState, Connection, EdgeChange, EdgePatch, NodeChange, NodeDataPatch,
};
pub use editor::EditorState;
pub use suggestions::SuggestionState;
pub use ui::{ContextMenu, UiState};
pub use workbench::Workbench;
