pub mod catalog;
pub mod id;
pub mod model;
pub mod project;

pub use id::{Uid, now_millis};
pub use model::*;
pub use project::{
    ActionKind, Project, ProjectKind, ProjectSettings, SNAPSHOT_RETENTION, Snapshot, Suggestion,
    SuggestionAction, SuggestionKind,
};
