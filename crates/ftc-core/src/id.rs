use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for nodes, edges, projects and suggestions.
///
/// Backed by a string so imported documents keep their original ids;
/// freshly created elements get a v4 UUID. Ids must stay unique across
/// sessions (they end up in the persistent store), so no interning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Generate a fresh unique id.
    pub fn generate() -> Self {
        Uid(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(s: &str) -> Self {
        Uid(s.to_string())
    }
}

impl From<String> for Uid {
    fn from(s: String) -> Self {
        Uid(s)
    }
}

/// Milliseconds since the Unix epoch. Snapshot timestamps use this.
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = Uid::generate();
        let b = Uid::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn string_roundtrip() {
        let id = Uid::from("backend-1");
        assert_eq!(id.as_str(), "backend-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"backend-1\"");
        let back: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
