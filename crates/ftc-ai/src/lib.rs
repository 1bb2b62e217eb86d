pub mod payload;
pub mod service;

pub use payload::{EdgePayload, NodePayload, ProjectPayload, SubflowPayload, project_payload};
pub use service::{
    AiError, ArchitectService, GeneratedFiles, RequestGuard, RequestTicket, parse_files_response,
    parse_suggestions_response,
};
