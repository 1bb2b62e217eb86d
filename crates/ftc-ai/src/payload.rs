//! Flattened project projection sent across the AI boundary.
//!
//! The projection decides exactly what the model is told about a design:
//! annotation nodes are dropped at every nesting level, service nodes are
//! reduced to their semantic fields, and subflows recurse. Changing this
//! shape changes generation results, so it is covered by tests.

use ftc_core::model::{Edge, Node};
use ftc_core::project::{ProjectKind, ProjectSettings};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    pub settings: ProjectSettings,
    pub nodes: Vec<NodePayload>,
    pub edges: Vec<EdgePayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePayload {
    pub id: String,
    pub name: String,
    /// Catalog template key when known, otherwise the node's visual kind.
    #[serde(rename = "type")]
    pub node_type: String,
    /// The node's category, e.g. `Backend` or `Data Layer`.
    pub role: String,
    pub tech_stack: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subflow: Option<SubflowPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubflowPayload {
    pub nodes: Vec<NodePayload>,
    pub edges: Vec<EdgePayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePayload {
    pub id: String,
    pub source: String,
    pub target: String,
    /// The connection label; defaults to "API Call" when a label is absent
    /// in imported data.
    #[serde(rename = "type")]
    pub edge_type: String,
    pub data: serde_json::Value,
}

/// Build the payload for a project's current working graph.
pub fn project_payload(
    name: &str,
    kind: ProjectKind,
    settings: ProjectSettings,
    nodes: &[Node],
    edges: &[Edge],
) -> ProjectPayload {
    ProjectPayload {
        name: name.to_string(),
        kind,
        settings,
        nodes: project_nodes(nodes),
        edges: project_edges(edges),
    }
}

fn project_nodes(nodes: &[Node]) -> Vec<NodePayload> {
    nodes
        .iter()
        .filter(|n| !n.is_annotation())
        .map(|n| NodePayload {
            id: n.id.to_string(),
            name: n.data.name.clone(),
            node_type: n
                .data
                .template
                .clone()
                .unwrap_or_else(|| n.data.body.kind().to_string()),
            role: n.data.category.as_str().to_string(),
            tech_stack: n.data.tech_stack.iter().cloned().collect(),
            requirements: n.data.requirements.clone(),
            config: n.data.config.clone(),
            subflow: n.data.subflow.as_ref().map(|sub| SubflowPayload {
                nodes: project_nodes(&sub.nodes),
                edges: project_edges(&sub.edges),
            }),
        })
        .collect()
}

fn project_edges(edges: &[Edge]) -> Vec<EdgePayload> {
    edges
        .iter()
        .map(|e| EdgePayload {
            id: e.id.to_string(),
            source: e.source.to_string(),
            target: e.target.to_string(),
            edge_type: e.label.as_str().to_string(),
            data: serde_json::to_value(&e.data).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftc_core::model::{
        Category, ConnectionKind, NodeBody, NodeData, Position, Subgraph,
    };
    use pretty_assertions::assert_eq;

    fn service(name: &str, category: Category) -> Node {
        Node::new(Position::default(), NodeData::service(name, category))
    }

    #[test]
    fn annotations_are_excluded_at_every_level() {
        let mut backend = service("API", Category::Backend);
        let inner_note = Node::new(
            Position::default(),
            NodeData {
                body: NodeBody::TextNote { text: "hi".into() },
                ..NodeData::service("Note", Category::Annotations)
            },
        );
        backend.data.subflow = Some(Subgraph {
            nodes: vec![service("Worker", Category::Backend), inner_note],
            edges: Vec::new(),
        });
        let top_note = Node::new(
            Position::default(),
            NodeData {
                body: NodeBody::Icon {
                    icon_name: "Cpu".into(),
                },
                ..NodeData::service("Icon", Category::Annotations)
            },
        );

        let payload = project_payload(
            "P",
            ProjectKind::Microservices,
            ProjectSettings::default(),
            &[backend, top_note],
            &[],
        );

        assert_eq!(payload.nodes.len(), 1);
        let sub = payload.nodes[0].subflow.as_ref().unwrap();
        assert_eq!(sub.nodes.len(), 1);
        assert_eq!(sub.nodes[0].name, "Worker");
    }

    #[test]
    fn node_type_prefers_the_template_key() {
        let mut n = service("Express API", Category::Backend);
        n.data.template = Some("backend-express".into());
        let plain = service("Untemplated", Category::Backend);

        let payload = project_payload(
            "P",
            ProjectKind::Monolithic,
            ProjectSettings::default(),
            &[n, plain],
            &[],
        );
        assert_eq!(payload.nodes[0].node_type, "backend-express");
        assert_eq!(payload.nodes[1].node_type, "custom");
    }

    #[test]
    fn edge_type_is_the_label() {
        let a = service("A", Category::Backend);
        let b = service("B", Category::DataLayer);
        let mut edge = Edge::connect(a.id.clone(), b.id.clone(), "right-source", "left-target");
        edge.label = ConnectionKind::Db;
        edge.refresh_derived();

        let payload = project_payload(
            "P",
            ProjectKind::Monolithic,
            ProjectSettings::default(),
            &[a, b],
            &[edge],
        );
        assert_eq!(payload.edges[0].edge_type, "DB");
    }

    #[test]
    fn payload_serializes_with_wire_names() {
        let payload = project_payload(
            "Shop",
            ProjectKind::Microservices,
            ProjectSettings::default(),
            &[service("API", Category::Backend)],
            &[],
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "Microservices");
        assert_eq!(json["nodes"][0]["role"], "Backend");
        assert!(json["nodes"][0].get("techStack").is_some());
        assert_eq!(json["settings"]["deploymentStrategy"], "Docker");
    }
}
