//! Read-only diagram snapshot the canvas engine works against.
//!
//! Nodes live in a `StableDiGraph` so indices survive removals; each
//! connection is a graph edge carrying its [`Edge`] record. Paint order is
//! kept separately: the last entry of `order` is drawn on top.

use crate::geom::{Size, WorldPoint};
use crate::id::{EdgeId, NodeId};
use crate::model::{Edge, NodeRef};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Problems building or editing a [`Diagram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    DuplicateNode(NodeId),
    DuplicateEdge(EdgeId),
    /// An edge names a node that is not in the diagram.
    MissingEndpoint { edge: EdgeId, node: NodeId },
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramError::DuplicateNode(id) => write!(f, "duplicate node {id}"),
            DiagramError::DuplicateEdge(id) => write!(f, "duplicate edge {id}"),
            DiagramError::MissingEndpoint { edge, node } => {
                write!(f, "edge {edge} references missing node {node}")
            }
        }
    }
}

impl std::error::Error for DiagramError {}

/// Wire form of a diagram, as delivered by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRef>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub graph: StableDiGraph<NodeRef, Edge>,
    id_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    /// Paint order, bottom to top.
    order: Vec<NodeId>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a store snapshot.
    ///
    /// Duplicate node ids are an error. Edges whose endpoints are missing are
    /// skipped with a warning: the store may be mid-delete when it hands us
    /// the snapshot.
    pub fn from_snapshot(snapshot: &DiagramSnapshot) -> Result<Self, DiagramError> {
        let mut diagram = Self::new();
        for node in &snapshot.nodes {
            diagram.add_node(node.clone())?;
        }
        for edge in &snapshot.edges {
            match diagram.add_edge(*edge) {
                Ok(_) => {}
                Err(err @ DiagramError::MissingEndpoint { .. }) => {
                    log::warn!("skipping edge: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(diagram)
    }

    pub fn snapshot(&self) -> DiagramSnapshot {
        DiagramSnapshot {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().copied().collect(),
        }
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    pub fn add_node(&mut self, node: NodeRef) -> Result<NodeIndex, DiagramError> {
        if self.id_index.contains_key(&node.id) {
            return Err(DiagramError::DuplicateNode(node.id));
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        self.order.push(id);
        Ok(idx)
    }

    /// Remove a node together with every edge attached to it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeRef> {
        let idx = self.id_index.remove(&id)?;
        let attached: Vec<EdgeId> = self
            .graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, petgraph::Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        for edge_id in attached {
            self.edge_index.remove(&edge_id);
        }
        self.order.retain(|n| *n != id);
        self.graph.remove_node(idx)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRef> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeRef> {
        self.id_index.get(&id).map(|idx| &mut self.graph[*idx])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Nodes in paint order (bottom first).
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &NodeRef> {
        self.order.iter().filter_map(|id| self.node(*id))
    }

    /// Position in paint order; higher is drawn later (on top).
    pub fn z_index(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|n| *n == id)
    }

    /// Move a node to the top of the paint order.
    pub fn bring_to_front(&mut self, id: NodeId) -> bool {
        match self.z_index(id) {
            Some(pos) => {
                let id = self.order.remove(pos);
                self.order.push(id);
                true
            }
            None => false,
        }
    }

    pub fn set_position(&mut self, id: NodeId, position: WorldPoint) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_size(&mut self, id: NodeId, size: Size) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.size = Some(size);
                true
            }
            None => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.id_index.len()
    }

    // ─── Edges ───────────────────────────────────────────────────────────

    /// Insert a connection. Both endpoints must exist; self-loops are
    /// structurally allowed here and rejected by the connect gesture instead.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeIndex, DiagramError> {
        if self.edge_index.contains_key(&edge.id) {
            return Err(DiagramError::DuplicateEdge(edge.id));
        }
        let missing = |node: NodeId| DiagramError::MissingEndpoint {
            edge: edge.id,
            node,
        };
        let src = *self.id_index.get(&edge.source).ok_or_else(|| missing(edge.source))?;
        let dst = *self.id_index.get(&edge.target).ok_or_else(|| missing(edge.target))?;
        let idx = self.graph.add_edge(src, dst, edge);
        self.edge_index.insert(edge.id, idx);
        Ok(idx)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let idx = self.edge_index.remove(&id)?;
        self.graph.remove_edge(idx)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).and_then(|idx| self.graph.edge_weight(*idx))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
    }

    /// Edges connecting `a` and `b` in either direction.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Vec<&Edge> {
        self.edges()
            .filter(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, NodeKind};
    use pretty_assertions::assert_eq;

    fn node(id: &str, x: f64, y: f64) -> NodeRef {
        NodeRef::new(NodeId::intern(id), NodeKind::Text, WorldPoint::new(x, y))
    }

    #[test]
    fn add_and_lookup_nodes() {
        let mut d = Diagram::new();
        d.add_node(node("a", 0.0, 0.0)).unwrap();
        d.add_node(node("b", 10.0, 0.0)).unwrap();
        assert_eq!(d.node_count(), 2);
        assert_eq!(d.node(NodeId::intern("b")).unwrap().position.x, 10.0);
        assert_eq!(
            d.add_node(node("a", 5.0, 5.0)),
            Err(DiagramError::DuplicateNode(NodeId::intern("a")))
        );
    }

    #[test]
    fn edge_with_missing_endpoint_is_rejected() {
        let mut d = Diagram::new();
        d.add_node(node("a", 0.0, 0.0)).unwrap();
        let edge = Edge::new(NodeId::intern("a"), NodeId::intern("ghost"), EdgeKind::Direct);
        assert!(matches!(
            d.add_edge(edge),
            Err(DiagramError::MissingEndpoint { .. })
        ));
        assert_eq!(d.edge_count(), 0);
    }

    #[test]
    fn snapshot_skips_dangling_edges() {
        let a = NodeId::intern("snap_a");
        let b = NodeId::intern("snap_b");
        let snapshot = DiagramSnapshot {
            nodes: vec![node("snap_a", 0.0, 0.0), node("snap_b", 400.0, 0.0)],
            edges: vec![
                Edge::new(a, b, EdgeKind::Direct),
                Edge::new(a, NodeId::intern("snap_gone"), EdgeKind::Reference),
            ],
        };
        let d = Diagram::from_snapshot(&snapshot).unwrap();
        assert_eq!(d.edge_count(), 1);
        assert_eq!(d.snapshot().edges.len(), 1);
    }

    #[test]
    fn removing_node_drops_attached_edges() {
        let mut d = Diagram::new();
        let a = NodeId::intern("rm_a");
        let b = NodeId::intern("rm_b");
        d.add_node(node("rm_a", 0.0, 0.0)).unwrap();
        d.add_node(node("rm_b", 0.0, 0.0)).unwrap();
        let e = Edge::new(a, b, EdgeKind::Direct);
        d.add_edge(e).unwrap();

        assert!(d.remove_node(b).is_some());
        assert_eq!(d.edge_count(), 0);
        assert!(d.edge(e.id).is_none());
        assert_eq!(d.nodes().count(), 1);
    }

    #[test]
    fn paint_order_follows_insertion_and_bring_to_front() {
        let mut d = Diagram::new();
        for id in ["z1", "z2", "z3"] {
            d.add_node(node(id, 0.0, 0.0)).unwrap();
        }
        assert_eq!(d.z_index(NodeId::intern("z3")), Some(2));
        assert!(d.bring_to_front(NodeId::intern("z1")));
        let order: Vec<&str> = d.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["z2", "z3", "z1"]);
    }

    #[test]
    fn edges_between_is_undirected() {
        let mut d = Diagram::new();
        let a = NodeId::intern("eb_a");
        let b = NodeId::intern("eb_b");
        d.add_node(node("eb_a", 0.0, 0.0)).unwrap();
        d.add_node(node("eb_b", 0.0, 0.0)).unwrap();
        d.add_edge(Edge::new(a, b, EdgeKind::Direct)).unwrap();
        d.add_edge(Edge::new(b, a, EdgeKind::Answer)).unwrap();
        assert_eq!(d.edges_between(a, b).len(), 2);
    }
}
