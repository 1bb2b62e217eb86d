//! Core canvas data model.
//!
//! A document is a pair of ordered `nodes`/`edges` arrays. Nodes are
//! self-similar containers: any service node may own a `subflow`, which is a
//! complete graph with its own id space. Array order matters (wholesale
//! replace and z-order both operate on it), so the model is plain vectors
//! rather than an adjacency structure.

use crate::id::Uid;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Geometry ────────────────────────────────────────────────────────────

/// Canvas position of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ─── Node styling ────────────────────────────────────────────────────────

/// Inline node style. Every field is optional; absent fields fall back to
/// whatever the visual layer renders by default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NodeStyle {
    pub const fn sized(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            z_index: None,
            background_color: None,
            color: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Shallow-merge `patch` into `self`, overwriting only `Some` fields.
    pub fn merge(&mut self, patch: &NodeStyle) {
        if patch.width.is_some() {
            self.width = patch.width;
        }
        if patch.height.is_some() {
            self.height = patch.height;
        }
        if patch.z_index.is_some() {
            self.z_index = patch.z_index;
        }
        if patch.background_color.is_some() {
            self.background_color = patch.background_color.clone();
        }
        if patch.color.is_some() {
            self.color = patch.color.clone();
        }
    }
}

// ─── Categories ──────────────────────────────────────────────────────────

/// The catalog category a node was created from. Annotation-category nodes
/// never carry subflows and are excluded from the AI projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Frontend,
    Backend,
    #[serde(rename = "Data Layer")]
    DataLayer,
    #[serde(rename = "Logic & Flow")]
    LogicFlow,
    Gateways,
    Messaging,
    Security,
    #[serde(rename = "External Services")]
    ExternalServices,
    Structural,
    Annotations,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Frontend => "Frontend",
            Category::Backend => "Backend",
            Category::DataLayer => "Data Layer",
            Category::LogicFlow => "Logic & Flow",
            Category::Gateways => "Gateways",
            Category::Messaging => "Messaging",
            Category::Security => "Security",
            Category::ExternalServices => "External Services",
            Category::Structural => "Structural",
            Category::Annotations => "Annotations",
        }
    }
}

// ─── Node bodies ─────────────────────────────────────────────────────────

/// Annotation shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Diamond,
    ArrowRight,
    ArrowLeft,
}

/// Per-kind node payload. The tag doubles as the node's visual type
/// discriminant (`custom`, `group`, `text-note`, `shape`, `icon`,
/// `flowchart`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeBody {
    /// A service-like system component (frontend, backend, database, ...).
    #[serde(rename = "custom")]
    Service,
    /// Structural grouping container. No subflow, no AI semantics.
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "text-note")]
    TextNote { text: String },
    #[serde(rename = "shape", rename_all = "camelCase")]
    Shape {
        shape_type: ShapeKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opacity: Option<f32>,
    },
    #[serde(rename = "icon", rename_all = "camelCase")]
    Icon { icon_name: String },
    /// Flowchart step: a named shape plus its label text.
    #[serde(rename = "flowchart")]
    Flowchart { shape: String, text: String },
}

impl NodeBody {
    /// The wire discriminant, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeBody::Service => "custom",
            NodeBody::Group => "group",
            NodeBody::TextNote { .. } => "text-note",
            NodeBody::Shape { .. } => "shape",
            NodeBody::Icon { .. } => "icon",
            NodeBody::Flowchart { .. } => "flowchart",
        }
    }
}

// ─── Node data & nodes ───────────────────────────────────────────────────

/// A nested graph owned by a node. Independently addressable: node and edge
/// ids inside a subflow form their own scope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subgraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn find_node(&self, id: &Uid) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn find_node_mut(&mut self, id: &Uid) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }
}

/// The record attached to every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub name: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub tech_stack: SmallVec<[String; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    /// Catalog type key this node was instantiated from (e.g.
    /// `backend-express`). The AI projection reports it as the node type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Free-form, schema-less configuration (user or AI supplied JSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(flatten)]
    pub body: NodeBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subflow: Option<Subgraph>,
}

impl NodeData {
    pub fn service(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            tech_stack: SmallVec::new(),
            requirements: None,
            template: None,
            config: None,
            body: NodeBody::Service,
            subflow: None,
        }
    }
}

/// A graph vertex: system component, annotation or structural grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Uid,
    pub position: Position,
    #[serde(default, skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
    pub data: NodeData,
}

impl Node {
    pub fn new(position: Position, data: NodeData) -> Self {
        Self {
            id: Uid::generate(),
            position,
            style: NodeStyle::default(),
            data,
        }
    }

    /// Annotations and groups are decoration/structure only: no subflow
    /// navigation, no service semantics in the AI projection.
    pub fn is_annotation(&self) -> bool {
        self.data.category == Category::Annotations || matches!(self.data.body, NodeBody::Group)
    }

    pub fn can_have_subflow(&self) -> bool {
        !self.is_annotation()
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// Connection type shown as the edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionKind {
    #[default]
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "gRPC")]
    Grpc,
    WebSocket,
    Stream,
    #[serde(rename = "DB")]
    Db,
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::Rest => "REST",
            ConnectionKind::Grpc => "gRPC",
            ConnectionKind::WebSocket => "WebSocket",
            ConnectionKind::Stream => "Stream",
            ConnectionKind::Db => "DB",
        }
    }
}

/// How the edge path is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    #[default]
    Smoothstep,
    Bezier,
    Straight,
    Step,
}

/// Arrow head at the target end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerKind {
    Arrow,
    #[default]
    ArrowClosed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

impl EdgeStyle {
    pub fn has_dash(&self) -> bool {
        self.stroke_dasharray
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default)]
    pub path_type: PathKind,
    /// Derived: true iff the label is WebSocket/Stream and the edge is not
    /// explicitly dashed. Recomputed by [`Edge::refresh_derived`], never set
    /// independently.
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated_icon_color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<String>,
}

impl Default for EdgeData {
    fn default() -> Self {
        Self {
            path_type: PathKind::Smoothstep,
            is_animated: false,
            animated_icon: None,
            animated_icon_color: None,
            endpoints: Vec::new(),
        }
    }
}

/// A directed connection between two nodes in the same graph scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: Uid,
    pub source: Uid,
    pub target: Uid,
    pub source_handle: String,
    pub target_handle: String,
    pub label: ConnectionKind,
    #[serde(default)]
    pub marker_end: MarkerKind,
    #[serde(default)]
    pub data: EdgeData,
    #[serde(default, skip_serializing_if = "edge_style_is_empty")]
    pub style: EdgeStyle,
}

fn edge_style_is_empty(s: &EdgeStyle) -> bool {
    s == &EdgeStyle::default()
}

impl Edge {
    /// A fresh connection with default semantics (REST, smoothstep, closed
    /// arrow, not animated).
    pub fn connect(
        source: Uid,
        target: Uid,
        source_handle: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: Uid::generate(),
            source,
            target,
            source_handle: source_handle.into(),
            target_handle: target_handle.into(),
            label: ConnectionKind::Rest,
            marker_end: MarkerKind::ArrowClosed,
            data: EdgeData::default(),
            style: EdgeStyle::default(),
        }
    }

    /// Recompute the derived fields from label and style. Called after every
    /// edge-data mutation.
    pub fn refresh_derived(&mut self) {
        self.data.is_animated = matches!(
            self.label,
            ConnectionKind::WebSocket | ConnectionKind::Stream
        ) && !self.style.has_dash();
        self.marker_end = if self.label == ConnectionKind::Db {
            MarkerKind::Arrow
        } else {
            MarkerKind::ArrowClosed
        };
    }

    /// Swap source and target, flipping handle roles while preserving the
    /// handle side ("left-source" becomes "left-target" and vice versa).
    pub fn swap_direction(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
        let new_source = self.target_handle.replace("target", "source");
        let new_target = self.source_handle.replace("source", "target");
        self.source_handle = new_source;
        self.target_handle = new_target;
    }
}
