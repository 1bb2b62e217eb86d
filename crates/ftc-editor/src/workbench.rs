//! The workbench: one owned state container for the whole editor.
//!
//! Slices (projects, canvas, ui, editor, suggestions) are cohesive
//! sub-structs; every state change goes through an explicit mutator here.
//! Graph mutators route through the canvas engine and then queue a
//! debounced autosave of the working state. Z-order tweaks are the one
//! deliberate exception: they restyle without persisting, matching the
//! interactive feel of the canvas.

use crate::autosave::AutosaveController;
use crate::canvas::{CanvasState, Connection, EdgeChange, EdgePatch, NodeChange, NodeDataPatch};
use crate::editor::EditorState;
use crate::suggestions::SuggestionState;
use crate::ui::UiState;
use ftc_ai::{ProjectPayload, RequestGuard, project_payload};
use ftc_core::catalog;
use ftc_core::id::Uid;
use ftc_core::model::{Node, NodeStyle, Position};
use ftc_core::project::{Project, ProjectKind, ProjectSettings, SuggestionAction};
use ftc_store::{ProjectStore, StoreError};
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct Workbench {
    store: Arc<ProjectStore>,
    autosave: AutosaveController,
    /// Guards generate/suggest responses against staleness.
    pub requests: RequestGuard,
    pub projects: Vec<Project>,
    pub active_project: Option<Project>,
    pub canvas: CanvasState,
    pub ui: UiState,
    pub editor: EditorState,
    pub suggestions: SuggestionState,
}

impl Workbench {
    /// Open the store at `path` and load the project list.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_store(Arc::new(ProjectStore::open(path)?))
    }

    pub fn with_store(store: Arc<ProjectStore>) -> Result<Self, StoreError> {
        let autosave = AutosaveController::new(Arc::clone(&store));
        Self::assemble(store, autosave)
    }

    /// Same as [`Workbench::with_store`] with a custom debounce window.
    /// Tests use a short window to exercise the write path quickly.
    pub fn with_store_and_window(
        store: Arc<ProjectStore>,
        window: Duration,
    ) -> Result<Self, StoreError> {
        let autosave = AutosaveController::with_window(Arc::clone(&store), window);
        Self::assemble(store, autosave)
    }

    fn assemble(store: Arc<ProjectStore>, autosave: AutosaveController) -> Result<Self, StoreError> {
        let projects = store.list()?;
        Ok(Self {
            store,
            autosave,
            requests: RequestGuard::new(),
            projects,
            active_project: None,
            canvas: CanvasState::default(),
            ui: UiState::default(),
            editor: EditorState::default(),
            suggestions: SuggestionState::default(),
        })
    }

    // ─── Project management ──────────────────────────────────────────

    pub fn create_project(
        &mut self,
        name: impl Into<String>,
        kind: ProjectKind,
    ) -> Result<Uid, StoreError> {
        let project = Project::new(name, kind);
        self.store.put(&project)?;
        let id = project.id.clone();
        self.projects.insert(0, project);
        self.open_project(&id)?;
        Ok(id)
    }

    /// Hydrate the workbench from a stored project's last snapshot.
    pub fn open_project(&mut self, id: &Uid) -> Result<bool, StoreError> {
        let Some(project) = self.store.get(id.as_str())? else {
            warn!("project {id} not found");
            return Ok(false);
        };
        // A project switch invalidates any in-flight AI response.
        self.requests.invalidate();

        let snapshot = project.latest_snapshot();
        self.canvas.hydrate(snapshot);
        self.suggestions = SuggestionState {
            suggestions: snapshot.suggestions.clone(),
            ..SuggestionState::default()
        };
        self.editor = EditorState {
            generated_files: project.generated_files.clone(),
            ..EditorState::default()
        };
        info!("opened project {} ({})", project.name, project.id);
        self.active_project = Some(project);
        Ok(true)
    }

    pub fn rename_project(&mut self, id: &Uid, name: impl Into<String>) -> Result<(), StoreError> {
        let name = name.into();
        let updated = self.store.update_with(id.as_str(), |p| p.name = name)?;
        if let Some(entry) = self.projects.iter_mut().find(|p| &p.id == id) {
            entry.name = updated.name.clone();
        }
        if let Some(active) = &mut self.active_project
            && &active.id == id
        {
            active.name = updated.name;
        }
        Ok(())
    }

    pub fn delete_project(&mut self, id: &Uid) -> Result<bool, StoreError> {
        let existed = self.store.delete(id.as_str())?;
        self.projects.retain(|p| &p.id != id);
        if self.active_project.as_ref().is_some_and(|p| &p.id == id) {
            self.active_project = None;
            self.canvas = CanvasState::default();
            self.suggestions = SuggestionState::default();
            self.editor = EditorState::default();
        }
        Ok(existed)
    }

    /// Change the active project's architecture type. Project-level field:
    /// not scope-routed. The store write comes first so a failed write
    /// leaves memory untouched.
    pub fn update_project_kind(&mut self, kind: ProjectKind) -> Result<(), StoreError> {
        let Some(id) = self.active_project.as_ref().map(|p| p.id.clone()) else {
            return Ok(());
        };
        self.store.update_with(id.as_str(), |p| p.kind = kind)?;
        if let Some(active) = &mut self.active_project {
            active.kind = kind;
        }
        if let Some(entry) = self.projects.iter_mut().find(|p| p.id == id) {
            entry.kind = kind;
        }
        Ok(())
    }

    pub fn update_settings(&mut self, settings: ProjectSettings) -> Result<(), StoreError> {
        let Some(id) = self.active_project.as_ref().map(|p| p.id.clone()) else {
            return Ok(());
        };
        self.store.update_with(id.as_str(), {
            let settings = settings.clone();
            move |p| p.settings = Some(settings)
        })?;
        if let Some(active) = &mut self.active_project {
            active.settings = Some(settings);
        }
        Ok(())
    }

    /// Stored settings merged over defaults.
    pub fn settings(&self) -> ProjectSettings {
        self.active_project
            .as_ref()
            .map(Project::effective_settings)
            .unwrap_or_default()
    }

    // ─── File exchange ───────────────────────────────────────────────

    /// Export the working state as a `.ftc` file. Bypasses the debounce
    /// and the snapshot history: the file carries one fresh snapshot.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let Some(active) = &self.active_project else {
            return Ok(());
        };
        let snapshot = self.canvas.snapshot(self.suggestions.suggestions.clone());
        ftc_store::write_file(path, active, snapshot)
    }

    /// Import a `.ftc` file as a new stored project and open it.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<Uid, StoreError> {
        let project = ftc_store::read_file(path)?;
        self.store.put(&project)?;
        let id = project.id.clone();
        self.projects.insert(0, project);
        self.open_project(&id)?;
        Ok(id)
    }

    // ─── Graph mutations (scope-routed, autosaved) ───────────────────

    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.canvas.set_nodes(nodes);
        self.queue_autosave();
    }

    pub fn set_edges(&mut self, edges: Vec<ftc_core::model::Edge>) {
        self.canvas.set_edges(edges);
        self.queue_autosave();
    }

    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        self.canvas.apply_node_changes(changes);
        self.queue_autosave();
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        self.canvas.apply_edge_changes(changes);
        self.queue_autosave();
    }

    /// Drop a catalog template onto the canvas at `position`.
    pub fn add_node_from_catalog(&mut self, type_key: &str, position: Position) -> Option<Uid> {
        let template = catalog::find_by_type(type_key)?;
        let node = template.instantiate(position);
        let id = node.id.clone();
        self.canvas.add_node(node);
        self.queue_autosave();
        Some(id)
    }

    pub fn connect(&mut self, connection: Connection) -> Option<Uid> {
        let id = self.canvas.connect(connection)?;
        self.queue_autosave();
        Some(id)
    }

    pub fn update_node_data(&mut self, id: &Uid, patch: &NodeDataPatch) {
        self.canvas.update_node_data(id, patch);
        self.queue_autosave();
    }

    pub fn update_node_dimensions(&mut self, id: &Uid, width: f32, height: f32) {
        self.canvas.update_node_dimensions(id, width, height);
        self.queue_autosave();
    }

    pub fn update_node_style(&mut self, id: &Uid, patch: &NodeStyle) {
        self.canvas.update_node_style(id, patch);
        self.queue_autosave();
    }

    pub fn update_edge_data(&mut self, id: &Uid, patch: &EdgePatch) {
        self.canvas.update_edge_data(id, patch);
        self.queue_autosave();
    }

    pub fn swap_edge_direction(&mut self, id: &Uid) {
        self.canvas.swap_edge_direction(id);
        self.queue_autosave();
    }

    pub fn delete_element(&mut self, id: &Uid, is_node: bool) {
        self.canvas.delete_element(id, is_node);
        self.queue_autosave();
    }

    pub fn enter_subflow(&mut self, id: &Uid) -> bool {
        let entered = self.canvas.enter_subflow(id);
        if entered {
            // First entry materializes the subflow on the parent node.
            self.queue_autosave();
        }
        entered
    }

    pub fn exit_subflow(&mut self) {
        self.canvas.exit_subflow();
    }

    fn queue_autosave(&self) {
        let Some(active) = &self.active_project else {
            return;
        };
        let snapshot = self.canvas.snapshot(self.suggestions.suggestions.clone());
        self.autosave.queue(active.id.clone(), snapshot);
    }

    /// Force any pending autosave to land now.
    pub fn flush_autosave(&self) {
        self.autosave.flush();
    }

    // ─── AI boundary ─────────────────────────────────────────────────

    /// The flattened projection of the active project for the AI service.
    pub fn ai_payload(&self) -> Option<ProjectPayload> {
        let active = self.active_project.as_ref()?;
        Some(project_payload(
            &active.name,
            active.kind,
            active.effective_settings(),
            &self.canvas.nodes,
            &self.canvas.edges,
        ))
    }

    /// Install a validated generated file set and persist it on the record.
    pub fn set_generated_files(
        &mut self,
        files: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        self.editor.set_generated_files(files.clone());
        if let Some(active) = &mut self.active_project {
            active.generated_files = Some(files.clone());
            self.store
                .update_with(active.id.as_str(), move |p| {
                    p.generated_files = Some(files);
                })?;
        }
        Ok(())
    }

    /// Replace the working suggestion set (fresh AI response).
    pub fn set_suggestions(&mut self, suggestions: Vec<ftc_core::project::Suggestion>) {
        self.suggestions.set_suggestions(suggestions);
        self.queue_autosave();
    }

    pub fn dismiss_suggestion(&mut self, id: &Uid) {
        self.suggestions.dismiss(id);
        self.queue_autosave();
    }

    // ─── Suggestion application ──────────────────────────────────────

    /// Apply one action of a suggestion through the mutation engine.
    /// Returns whether anything was applied. An already-applied suggestion
    /// is rejected: `applied` is one-way and there is no undo path.
    pub fn apply_suggestion_action(&mut self, suggestion_id: &Uid, action_index: usize) -> bool {
        let Some(suggestion) = self.suggestions.find(suggestion_id) else {
            warn!("suggestion {suggestion_id} not found");
            return false;
        };
        if suggestion.applied {
            info!("suggestion {suggestion_id} already applied; ignoring");
            return false;
        }
        let Some(action) = suggestion.actions.get(action_index).cloned() else {
            warn!("suggestion {suggestion_id} has no action #{action_index}");
            return false;
        };

        if !self.execute_action(&action) {
            return false;
        }
        self.suggestions.mark_applied(suggestion_id);
        self.queue_autosave();
        true
    }

    fn execute_action(&mut self, action: &SuggestionAction) -> bool {
        use ftc_core::project::ActionKind;

        let payload = &action.payload;
        match action.action {
            ActionKind::Add => {
                let Some(type_key) = payload.get("type").and_then(|v| v.as_str()) else {
                    warn!("add action without a node type");
                    return false;
                };
                let Some(template) = catalog::find_by_type(type_key) else {
                    warn!("add action references unknown node type {type_key:?}");
                    return false;
                };
                let position = payload
                    .get("position")
                    .and_then(|v| serde_json::from_value::<Position>(v.clone()).ok())
                    .unwrap_or(Position::new(100.0, 100.0));
                let mut node = template.instantiate(position);
                if let Some(name) = payload.get("name").and_then(|v| v.as_str()) {
                    node.data.name = name.to_string();
                }
                if let Some(requirements) = payload.get("requirements").and_then(|v| v.as_str()) {
                    node.data.requirements = Some(requirements.to_string());
                }
                self.canvas.add_node(node);
                true
            }
            ActionKind::Remove => {
                if let Some(node_id) = payload.get("nodeId").and_then(|v| v.as_str()) {
                    self.canvas.delete_element(&Uid::from(node_id), true);
                    true
                } else if let Some(edge_id) = payload.get("edgeId").and_then(|v| v.as_str()) {
                    self.canvas.delete_element(&Uid::from(edge_id), false);
                    true
                } else {
                    warn!("remove action without a target id");
                    false
                }
            }
            ActionKind::Update => {
                if let Some(node_id) = payload.get("nodeId").and_then(|v| v.as_str()) {
                    let data = payload
                        .get("data")
                        .cloned()
                        .unwrap_or_else(|| serde_json::json!({}));
                    match serde_json::from_value::<NodeDataPatch>(data) {
                        Ok(patch) => {
                            self.canvas.update_node_data(&Uid::from(node_id), &patch);
                            true
                        }
                        Err(e) => {
                            warn!("unusable node update payload: {e}");
                            false
                        }
                    }
                } else if let Some(edge_id) = payload.get("edgeId").and_then(|v| v.as_str()) {
                    let data = payload
                        .get("data")
                        .cloned()
                        .unwrap_or_else(|| serde_json::json!({}));
                    match serde_json::from_value::<EdgePatch>(data) {
                        Ok(patch) => {
                            self.canvas.update_edge_data(&Uid::from(edge_id), &patch);
                            true
                        }
                        Err(e) => {
                            warn!("unusable edge update payload: {e}");
                            false
                        }
                    }
                } else if let Some(architecture) = payload.get("architecture").cloned() {
                    match serde_json::from_value::<ProjectKind>(architecture) {
                        Ok(kind) => self.update_project_kind(kind).is_ok(),
                        Err(e) => {
                            warn!("unusable architecture payload: {e}");
                            false
                        }
                    }
                } else {
                    warn!("update action without a target");
                    false
                }
            }
            ActionKind::Unknown => {
                warn!("unknown suggestion action {:?}; skipping", action.label);
                false
            }
        }
    }
}
