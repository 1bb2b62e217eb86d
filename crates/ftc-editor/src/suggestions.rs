//! Suggestion panel state.
//!
//! The working suggestion set travels with snapshots; the panel flag, the
//! in-flight marker and the highlight overlay are ephemeral. Highlights are
//! externally driven (hovering a suggestion lights up the elements its
//! actions reference) and never affect selection or persistence.

use ftc_core::id::Uid;
use ftc_core::project::Suggestion;

#[derive(Debug, Default)]
pub struct SuggestionState {
    pub suggestions: Vec<Suggestion>,
    pub is_checking: bool,
    pub panel_open: bool,
    pub highlighted_element_ids: Vec<Uid>,
}

impl SuggestionState {
    pub fn set_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
    }

    pub fn find(&self, id: &Uid) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| &s.id == id)
    }

    /// One-way transition; there is no path back to unapplied.
    pub fn mark_applied(&mut self, id: &Uid) {
        if let Some(suggestion) = self.suggestions.iter_mut().find(|s| &s.id == id) {
            suggestion.applied = true;
        }
    }

    pub fn dismiss(&mut self, id: &Uid) {
        self.suggestions.retain(|s| &s.id != id);
    }

    /// Closing the panel also drops the highlight overlay.
    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
        if !open {
            self.highlighted_element_ids.clear();
        }
    }

    pub fn set_highlighted(&mut self, ids: Vec<Uid>) {
        self.highlighted_element_ids = ids;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftc_core::project::SuggestionKind;

    fn suggestion(id: &str) -> Suggestion {
        Suggestion {
            id: Uid::from(id),
            kind: SuggestionKind::Node,
            title: "t".into(),
            description: "d".into(),
            actions: Vec::new(),
            applied: false,
        }
    }

    #[test]
    fn applied_is_one_way() {
        let mut state = SuggestionState::default();
        state.set_suggestions(vec![suggestion("s1")]);
        state.mark_applied(&Uid::from("s1"));
        assert!(state.find(&Uid::from("s1")).unwrap().applied);
    }

    #[test]
    fn dismiss_removes_by_id() {
        let mut state = SuggestionState::default();
        state.set_suggestions(vec![suggestion("s1"), suggestion("s2")]);
        state.dismiss(&Uid::from("s1"));
        assert!(state.find(&Uid::from("s1")).is_none());
        assert!(state.find(&Uid::from("s2")).is_some());
    }

    #[test]
    fn closing_the_panel_clears_highlights() {
        let mut state = SuggestionState::default();
        state.set_panel_open(true);
        state.set_highlighted(vec![Uid::from("n1"), Uid::from("e1")]);

        state.set_panel_open(false);
        assert!(state.highlighted_element_ids.is_empty());
    }
}
