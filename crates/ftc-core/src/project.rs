//! Projects, snapshots, settings and AI suggestions.

use crate::id::{Uid, now_millis};
use crate::model::{Edge, Node};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Settings ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectKind {
    #[default]
    Monolithic,
    Microservices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CodeGenerationKind {
    Starter,
    #[default]
    Flexible,
    Complete,
    #[serde(rename = "Test-Driven")]
    TestDriven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CloudProvider {
    #[serde(rename = "AWS")]
    Aws,
    #[serde(rename = "GCP")]
    Gcp,
    Azure,
    DigitalOcean,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeploymentStrategy {
    #[default]
    Docker,
    Kubernetes,
    Serverless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IacTool {
    #[default]
    None,
    Terraform,
    CloudFormation,
    Bicep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SecretManagement {
    #[default]
    #[serde(rename = "Environment Variables")]
    EnvironmentVariables,
    #[serde(rename = "AWS Secrets Manager")]
    AwsSecretsManager,
    #[serde(rename = "Azure Key Vault")]
    AzureKeyVault,
    #[serde(rename = "GCP Secret Manager")]
    GcpSecretManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArchitecturalPatterns {
    #[serde(default)]
    pub ddd: bool,
    #[serde(default)]
    pub eda: bool,
    #[serde(default)]
    pub cqrs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPractices {
    #[serde(default)]
    pub input_validation: bool,
    #[serde(default)]
    pub rbac: bool,
    #[serde(default)]
    pub rate_limiting: bool,
    #[serde(default)]
    pub owasp_compliance: bool,
}

impl Default for SecurityPractices {
    fn default() -> Self {
        Self {
            input_validation: true,
            rbac: false,
            rate_limiting: false,
            owasp_compliance: true,
        }
    }
}

/// Per-project generation settings, surfaced in the settings modal and sent
/// along with the AI payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default)]
    pub cloud_provider: CloudProvider,
    #[serde(default)]
    pub deployment_strategy: DeploymentStrategy,
    #[serde(default)]
    pub cicd_tooling: String,
    #[serde(default)]
    pub architectural_patterns: ArchitecturalPatterns,
    #[serde(default)]
    pub testing_framework: String,
    #[serde(default)]
    pub security_practices: SecurityPractices,
    #[serde(default)]
    pub iac_tool: IacTool,
    #[serde(default)]
    pub secret_management: SecretManagement,
}

// ─── Suggestions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Architectural,
    Node,
    Edge,
}

/// The verb of a suggested edit. Anything else the model emits maps to
/// `Unknown` and is logged and skipped instead of failing the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Add,
    Remove,
    Update,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionAction {
    pub label: String,
    pub action: ActionKind,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// An externally-produced recommended graph edit. `applied` is a one-way
/// flag: once an action has been applied there is no undo path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: Uid,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub actions: Vec<SuggestionAction>,
    #[serde(default)]
    pub applied: bool,
}

// ─── Projects & snapshots ────────────────────────────────────────────────

/// One retained, timestamped version of a project's graph state. The last
/// element of a project's snapshot list is the live, editable state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: u64,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl Snapshot {
    pub fn now(nodes: Vec<Node>, edges: Vec<Edge>, suggestions: Vec<Suggestion>) -> Self {
        Self {
            timestamp: now_millis(),
            nodes,
            edges,
            suggestions,
        }
    }
}

/// How many snapshots a project record retains.
pub const SNAPSHOT_RETENTION: usize = 5;

/// Top-level persisted design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    /// Always non-empty. Enforced by construction and by the store migration.
    pub snapshots: Vec<Snapshot>,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProjectSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_files: Option<BTreeMap<String, String>>,
}

impl Project {
    /// A new project with one empty snapshot.
    pub fn new(name: impl Into<String>, kind: ProjectKind) -> Self {
        Self {
            id: Uid::generate(),
            name: name.into(),
            kind,
            snapshots: vec![Snapshot::now(Vec::new(), Vec::new(), Vec::new())],
            created_at: now_millis(),
            settings: None,
            generated_files: None,
        }
    }

    /// The live snapshot the UI edits.
    pub fn latest_snapshot(&self) -> &Snapshot {
        // Non-empty invariant; a defaulted snapshot only covers hand-edited
        // records that bypassed the migration.
        self.snapshots.last().unwrap_or(&EMPTY_SNAPSHOT)
    }

    /// Append a snapshot, keeping at most [`SNAPSHOT_RETENTION`] entries.
    pub fn push_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
        if self.snapshots.len() > SNAPSHOT_RETENTION {
            let excess = self.snapshots.len() - SNAPSHOT_RETENTION;
            self.snapshots.drain(..excess);
        }
    }

    /// Settings merged over defaults, field-level (stored records may predate
    /// newer settings fields).
    pub fn effective_settings(&self) -> ProjectSettings {
        self.settings.clone().unwrap_or_default()
    }
}

static EMPTY_SNAPSHOT: Snapshot = Snapshot {
    timestamp: 0,
    nodes: Vec::new(),
    edges: Vec::new(),
    suggestions: Vec::new(),
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_project_has_one_snapshot() {
        let p = Project::new("P", ProjectKind::Microservices);
        assert_eq!(p.snapshots.len(), 1);
        assert!(p.latest_snapshot().nodes.is_empty());
    }

    #[test]
    fn snapshot_history_is_bounded() {
        let mut p = Project::new("P", ProjectKind::Monolithic);
        for i in 0..10 {
            let mut s = Snapshot::now(Vec::new(), Vec::new(), Vec::new());
            s.timestamp = i;
            p.push_snapshot(s);
        }
        assert_eq!(p.snapshots.len(), SNAPSHOT_RETENTION);
        // The newest snapshot is always last.
        assert_eq!(p.latest_snapshot().timestamp, 9);
    }

    #[test]
    fn default_settings_match_product_defaults() {
        let s = ProjectSettings::default();
        assert_eq!(s.cloud_provider, CloudProvider::Other);
        assert_eq!(s.deployment_strategy, DeploymentStrategy::Docker);
        assert!(s.security_practices.input_validation);
        assert!(s.security_practices.owasp_compliance);
        assert!(!s.security_practices.rbac);
        assert_eq!(s.iac_tool, IacTool::None);
        assert_eq!(s.secret_management, SecretManagement::EnvironmentVariables);
    }

    #[test]
    fn unknown_action_kind_is_tolerated() {
        let raw = r#"{"label":"Do it","action":"replace","payload":{}}"#;
        let action: SuggestionAction = serde_json::from_str(raw).unwrap();
        assert_eq!(action.action, ActionKind::Unknown);
    }

    #[test]
    fn suggestion_defaults_applied_false() {
        let raw = r#"{
            "id": "s1",
            "type": "node",
            "title": "Add a cache",
            "description": "Reads are hot",
            "actions": []
        }"#;
        let s: Suggestion = serde_json::from_str(raw).unwrap();
        assert!(!s.applied);
        assert_eq!(s.kind, SuggestionKind::Node);
    }
}
