//! Transient UI state: theme, panels, modals and the context menu.
//!
//! Nothing here is persisted. The context menu is purely positional and
//! keyed to one element id; opening it does not change selection (the
//! originating click handler sets selection first).

use ftc_core::id::Uid;

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub id: Uid,
    pub top: f32,
    pub left: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub dark_mode: bool,
    pub sidebar_open: bool,
    pub properties_panel_open: bool,
    pub settings_modal_open: bool,
    pub project_modal_open: bool,
    pub context_menu: Option<ContextMenu>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            dark_mode: true,
            sidebar_open: true,
            properties_panel_open: false,
            settings_modal_open: false,
            project_modal_open: false,
            context_menu: None,
        }
    }
}

impl UiState {
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn open_context_menu(&mut self, id: Uid, top: f32, left: f32) {
        self.context_menu = Some(ContextMenu { id, top, left });
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }
}
