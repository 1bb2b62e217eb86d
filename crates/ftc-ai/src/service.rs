//! AI collaborator contract and response validation.
//!
//! The model call itself lives outside this workspace. Consumers implement
//! [`ArchitectService`] over whatever transport they have; the parse helpers
//! here enforce the one rule that matters regardless of transport: a
//! malformed response commits nothing, never a partial result.

use crate::payload::ProjectPayload;
use ftc_core::Uid;
use ftc_core::project::Suggestion;
use log::warn;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Generated file set: path to content.
pub type GeneratedFiles = BTreeMap<String, String>;

/// The opaque generative service the editor talks to.
pub trait ArchitectService {
    fn generate(&self, project: &ProjectPayload) -> Result<GeneratedFiles, AiError>;
    fn suggest(&self, project: &ProjectPayload) -> Result<Vec<Suggestion>, AiError>;
}

/// Validate a raw generate-response. All-or-nothing: any non-string file
/// entry rejects the whole map.
pub fn parse_files_response(raw: &serde_json::Value) -> Result<GeneratedFiles, AiError> {
    let obj = raw.as_object().ok_or_else(|| {
        AiError::MalformedResponse("expected an object of path to content".to_string())
    })?;
    let mut files = GeneratedFiles::new();
    for (path, content) in obj {
        let Some(content) = content.as_str() else {
            return Err(AiError::MalformedResponse(format!(
                "file entry {path:?} is not a string"
            )));
        };
        files.insert(path.clone(), content.to_string());
    }
    Ok(files)
}

/// Validate a raw suggest-response. Entries that fail to decode are logged
/// and skipped so one malformed suggestion does not discard the rest.
/// Every accepted suggestion starts unapplied, whatever the wire said.
pub fn parse_suggestions_response(raw: &serde_json::Value) -> Result<Vec<Suggestion>, AiError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| AiError::MalformedResponse("expected a suggestion array".to_string()))?;

    let mut suggestions = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut entry = entry.clone();
        if let Some(obj) = entry.as_object_mut()
            && !obj.contains_key("id")
        {
            obj.insert(
                "id".to_string(),
                serde_json::Value::String(Uid::generate().to_string()),
            );
        }
        match serde_json::from_value::<Suggestion>(entry) {
            Ok(mut suggestion) => {
                suggestion.applied = false;
                suggestions.push(suggestion);
            }
            Err(e) => warn!("skipping undecodable suggestion: {e}"),
        }
    }
    Ok(suggestions)
}

/// Guards against stale in-flight responses.
///
/// Each outgoing request takes a ticket; a response is applied only if its
/// ticket is still the latest. A newer request or a project switch bumps the
/// generation, so earlier responses are discarded on arrival.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating all earlier tickets.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate every outstanding ticket without starting a request.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
