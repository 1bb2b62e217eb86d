//! Canvas state and the mutation engine.
//!
//! The canvas is a tree of graphs: the top-level node/edge arrays plus one
//! optional subflow per node. A cursor (`current_flow_id`) selects which
//! graph is live, and every mutation routes through it, so callers never
//! need to know whether they are editing the top level or a subflow.
//!
//! The cursor resolves against the top-level array only: one level of
//! nesting is navigable at a time. Deeper nesting can exist in the data but
//! cannot be entered. Known limitation, kept deliberately.

use ftc_core::id::Uid;
use ftc_core::model::{
    Category, ConnectionKind, Edge, Node, NodeBody, NodeData, NodeStyle, PathKind, Position,
    Subgraph,
};
use ftc_core::project::Snapshot;
use log::{debug, warn};
use serde::Deserialize;

// ─── Changes & patches ───────────────────────────────────────────────────

/// An incremental node change emitted by the interactive canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    Position { id: Uid, position: Position },
    Dimensions { id: Uid, width: f32, height: f32 },
    Remove { id: Uid },
}

/// An incremental edge change emitted by the interactive canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Remove { id: Uid },
}

/// A connection attempt. Fields are optional because the visual layer can
/// emit half-formed attempts (drag released over empty space).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Connection {
    pub source: Option<Uid>,
    pub target: Option<Uid>,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

/// Shallow partial update of [`NodeData`]. `None` leaves a field untouched.
/// Body fields (`text`, shape colors, `icon_name`) apply only when the
/// node's body actually carries them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeDataPatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub tech_stack: Option<Vec<String>>,
    pub requirements: Option<String>,
    pub config: Option<serde_json::Value>,
    pub text: Option<String>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub opacity: Option<f32>,
    pub icon_name: Option<String>,
}

impl NodeDataPatch {
    pub fn apply(&self, data: &mut NodeData) {
        if let Some(name) = &self.name {
            data.name = name.clone();
        }
        if let Some(category) = self.category {
            data.category = category;
        }
        if let Some(stack) = &self.tech_stack {
            data.tech_stack = stack.iter().cloned().collect();
        }
        if let Some(requirements) = &self.requirements {
            data.requirements = Some(requirements.clone());
        }
        if let Some(config) = &self.config {
            data.config = Some(config.clone());
        }
        match &mut data.body {
            NodeBody::TextNote { text } | NodeBody::Flowchart { text, .. } => {
                if let Some(new_text) = &self.text {
                    *text = new_text.clone();
                }
            }
            NodeBody::Shape {
                fill_color,
                stroke_color,
                opacity,
                ..
            } => {
                if self.fill_color.is_some() {
                    *fill_color = self.fill_color.clone();
                }
                if self.stroke_color.is_some() {
                    *stroke_color = self.stroke_color.clone();
                }
                if self.opacity.is_some() {
                    *opacity = self.opacity;
                }
            }
            NodeBody::Icon { icon_name } => {
                if let Some(new_icon) = &self.icon_name {
                    *icon_name = new_icon.clone();
                }
            }
            NodeBody::Service | NodeBody::Group => {}
        }
    }
}

/// Shallow partial update of an edge's label, data and style.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgePatch {
    pub label: Option<ConnectionKind>,
    pub path_type: Option<PathKind>,
    pub animated_icon: Option<String>,
    pub animated_icon_color: Option<String>,
    pub stroke: Option<String>,
    pub stroke_dasharray: Option<String>,
}

impl EdgePatch {
    fn apply(&self, edge: &mut Edge) {
        if let Some(label) = self.label {
            edge.label = label;
        }
        if let Some(path_type) = self.path_type {
            edge.data.path_type = path_type;
        }
        if self.animated_icon.is_some() {
            edge.data.animated_icon = self.animated_icon.clone();
        }
        if self.animated_icon_color.is_some() {
            edge.data.animated_icon_color = self.animated_icon_color.clone();
        }
        if self.stroke.is_some() {
            edge.style.stroke = self.stroke.clone();
        }
        if self.stroke_dasharray.is_some() {
            edge.style.stroke_dasharray = self.stroke_dasharray.clone();
        }
    }
}

// ─── Canvas state ────────────────────────────────────────────────────────

/// The working graph of the active project, plus the subflow cursor and the
/// current selection. Selection holds clones of the selected elements and
/// is refreshed after every mutation touching them, so it never exposes a
/// stale pre-mutation value.
#[derive(Debug, Default)]
pub struct CanvasState {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub current_flow_id: Option<Uid>,
    pub selected_node: Option<Node>,
    pub selected_edge: Option<Edge>,
}

static EMPTY_NODES: &[Node] = &[];
static EMPTY_EDGES: &[Edge] = &[];

impl CanvasState {
    /// Replace the whole working state from a snapshot. Resets the cursor
    /// and the selection.
    pub fn hydrate(&mut self, snapshot: &Snapshot) {
        self.nodes = snapshot.nodes.clone();
        self.edges = snapshot.edges.clone();
        self.current_flow_id = None;
        self.selected_node = None;
        self.selected_edge = None;
    }

    /// The graph the cursor points at. A missing subflow reads as empty.
    pub fn active_graph(&self) -> (&[Node], &[Edge]) {
        match &self.current_flow_id {
            None => (&self.nodes, &self.edges),
            Some(id) => self
                .nodes
                .iter()
                .find(|n| &n.id == id)
                .and_then(|n| n.data.subflow.as_ref())
                .map(|sub| (sub.nodes.as_slice(), sub.edges.as_slice()))
                .unwrap_or((EMPTY_NODES, EMPTY_EDGES)),
        }
    }

    /// Run `f` against the cursor's graph, lazily materializing the subflow
    /// on first write. Returns `None` when the cursor points at a node that
    /// no longer exists.
    fn with_active_graph<R>(
        &mut self,
        f: impl FnOnce(&mut Vec<Node>, &mut Vec<Edge>) -> R,
    ) -> Option<R> {
        match self.current_flow_id.clone() {
            None => Some(f(&mut self.nodes, &mut self.edges)),
            Some(id) => {
                let Some(parent) = self.nodes.iter_mut().find(|n| n.id == id) else {
                    warn!("subflow cursor points at missing node {id}");
                    return None;
                };
                let sub = parent.data.subflow.get_or_insert_with(Subgraph::default);
                Some(f(&mut sub.nodes, &mut sub.edges))
            }
        }
    }

    // ─── Wholesale & incremental updates ─────────────────────────────

    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.with_active_graph(|n, _| *n = nodes);
    }

    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.with_active_graph(|_, e| *e = edges);
    }

    pub fn add_node(&mut self, node: Node) {
        self.with_active_graph(|nodes, _| nodes.push(node));
    }

    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        self.with_active_graph(|nodes, _| {
            for change in changes {
                match change {
                    NodeChange::Position { id, position } => {
                        if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                            node.position = *position;
                        }
                    }
                    NodeChange::Dimensions { id, width, height } => {
                        if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                            node.style.width = Some(*width);
                            node.style.height = Some(*height);
                        }
                    }
                    NodeChange::Remove { id } => nodes.retain(|n| &n.id != id),
                }
            }
        });
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        self.with_active_graph(|_, edges| {
            for change in changes {
                match change {
                    EdgeChange::Remove { id } => edges.retain(|e| &e.id != id),
                }
            }
        });
    }

    // ─── Connect ─────────────────────────────────────────────────────

    /// Create an edge at the current scope. Rejections are logged no-ops:
    /// missing fields, self-connection, equal handles, or either endpoint
    /// being an annotation.
    pub fn connect(&mut self, connection: Connection) -> Option<Uid> {
        let (Some(source), Some(target), Some(source_handle), Some(target_handle)) = (
            connection.source,
            connection.target,
            connection.source_handle,
            connection.target_handle,
        ) else {
            debug!("ignoring incomplete connection attempt");
            return None;
        };
        if source == target {
            debug!("rejecting self-connection on {source}");
            return None;
        }
        if source_handle == target_handle {
            debug!("rejecting connection with identical handles {source_handle}");
            return None;
        }

        let (nodes, _) = self.active_graph();
        let endpoint_ok = |id: &Uid| {
            nodes
                .iter()
                .find(|n| &n.id == id)
                .is_some_and(|n| !n.is_annotation())
        };
        if !endpoint_ok(&source) || !endpoint_ok(&target) {
            debug!("rejecting connection touching a missing or annotation endpoint");
            return None;
        }

        let edge = Edge::connect(source, target, source_handle, target_handle);
        let id = edge.id.clone();
        self.with_active_graph(|_, edges| edges.push(edge));
        Some(id)
    }

    // ─── Node updates ────────────────────────────────────────────────

    pub fn update_node_data(&mut self, id: &Uid, patch: &NodeDataPatch) {
        self.with_active_graph(|nodes, _| {
            if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                patch.apply(&mut node.data);
            }
        });
        self.refresh_selected_node(id);
    }

    pub fn update_node_dimensions(&mut self, id: &Uid, width: f32, height: f32) {
        self.with_active_graph(|nodes, _| {
            if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                node.style.width = Some(width);
                node.style.height = Some(height);
            }
        });
        self.refresh_selected_node(id);
    }

    pub fn update_node_style(&mut self, id: &Uid, patch: &NodeStyle) {
        self.with_active_graph(|nodes, _| {
            if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                node.style.merge(patch);
            }
        });
        self.refresh_selected_node(id);
    }

    // ─── Edge updates ────────────────────────────────────────────────

    /// Apply a patch, then recompute the derived animation and marker
    /// fields. Derived fields are never written directly.
    pub fn update_edge_data(&mut self, id: &Uid, patch: &EdgePatch) {
        self.with_active_graph(|_, edges| {
            if let Some(edge) = edges.iter_mut().find(|e| &e.id == id) {
                patch.apply(edge);
                edge.refresh_derived();
            }
        });
        self.refresh_selected_edge(id);
    }

    pub fn swap_edge_direction(&mut self, id: &Uid) {
        self.with_active_graph(|_, edges| {
            if let Some(edge) = edges.iter_mut().find(|e| &e.id == id) {
                edge.swap_direction();
            }
        });
        self.refresh_selected_edge(id);
    }

    // ─── Delete ──────────────────────────────────────────────────────

    /// Remove an element at the current scope. Node deletion cascades to
    /// every edge referencing it at that scope. Selection is cleared
    /// unconditionally, whether or not anything matched.
    pub fn delete_element(&mut self, id: &Uid, is_node: bool) {
        self.with_active_graph(|nodes, edges| {
            if is_node {
                nodes.retain(|n| &n.id != id);
                edges.retain(|e| &e.source != id && &e.target != id);
            } else {
                edges.retain(|e| &e.id != id);
            }
        });
        self.selected_node = None;
        self.selected_edge = None;
    }

    // ─── Z-order ─────────────────────────────────────────────────────

    pub fn bring_node_to_front(&mut self, id: &Uid) {
        self.reorder_node(id, true);
    }

    pub fn send_node_to_back(&mut self, id: &Uid) {
        self.reorder_node(id, false);
    }

    fn reorder_node(&mut self, id: &Uid, to_front: bool) {
        self.with_active_graph(|nodes, _| {
            let z_values = nodes.iter().map(|n| n.style.z_index.unwrap_or(0));
            let new_z = if to_front {
                match z_values.max() {
                    Some(max) => max + 1,
                    None => return,
                }
            } else {
                match z_values.min() {
                    Some(min) => min - 1,
                    None => return,
                }
            };
            if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                node.style.z_index = Some(new_z);
            }
        });
        self.refresh_selected_node(id);
    }

    // ─── Subflow navigation ──────────────────────────────────────────

    /// Enter a node's subflow, materializing it on first entry. Only
    /// top-level service-like nodes are navigable. Returns whether the
    /// cursor moved.
    pub fn enter_subflow(&mut self, id: &Uid) -> bool {
        if self.current_flow_id.is_some() {
            warn!("subflow navigation is one level deep; exit first");
            return false;
        }
        let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) else {
            return false;
        };
        if !node.can_have_subflow() {
            debug!("node {id} cannot own a subflow");
            return false;
        }
        node.data.subflow.get_or_insert_with(Subgraph::default);
        self.current_flow_id = Some(id.clone());
        self.selected_node = None;
        self.selected_edge = None;
        true
    }

    pub fn exit_subflow(&mut self) {
        self.current_flow_id = None;
        self.selected_node = None;
        self.selected_edge = None;
    }

    // ─── Selection ───────────────────────────────────────────────────

    /// Setting a node selection clears any edge selection, and vice versa.
    /// The clear is unconditional: passing `None` deselects both kinds.
    pub fn set_selected_node(&mut self, node: Option<Node>) {
        self.selected_edge = None;
        self.selected_node = node;
    }

    pub fn set_selected_edge(&mut self, edge: Option<Edge>) {
        self.selected_node = None;
        self.selected_edge = edge;
    }

    pub fn select_node_by_id(&mut self, id: &Uid) {
        let (nodes, _) = self.active_graph();
        let found = nodes.iter().find(|n| &n.id == id).cloned();
        if found.is_some() {
            self.set_selected_node(found);
        }
    }

    pub fn select_edge_by_id(&mut self, id: &Uid) {
        let (_, edges) = self.active_graph();
        let found = edges.iter().find(|e| &e.id == id).cloned();
        if found.is_some() {
            self.set_selected_edge(found);
        }
    }

    fn refresh_selected_node(&mut self, id: &Uid) {
        if self.selected_node.as_ref().is_some_and(|n| &n.id == id) {
            let (nodes, _) = self.active_graph();
            self.selected_node = nodes.iter().find(|n| &n.id == id).cloned();
        }
    }

    fn refresh_selected_edge(&mut self, id: &Uid) {
        if self.selected_edge.as_ref().is_some_and(|e| &e.id == id) {
            let (_, edges) = self.active_graph();
            self.selected_edge = edges.iter().find(|e| &e.id == id).cloned();
        }
    }

    /// Current working state as a timestamped snapshot. Always taken from
    /// the top level; subflow edits are already reflected in their parent.
    pub fn snapshot(&self, suggestions: Vec<ftc_core::project::Suggestion>) -> Snapshot {
        Snapshot::now(self.nodes.clone(), self.edges.clone(), suggestions)
    }
}
