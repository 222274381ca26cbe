//! Active node / active edge / multi-select set.
//!
//! Focus is exclusive: activating a node clears the active edge and vice
//! versa. The multi-select set is independent of both.

use nc_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selection {
    pub active_node: Option<NodeId>,
    pub active_edge: Option<EdgeId>,
    /// Multi-selected nodes, in the order they were added.
    pub selected: SmallVec<[NodeId; 8]>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or clear) the active node. A new active node clears the active edge.
    pub fn set_active_node(&mut self, id: Option<NodeId>) {
        self.active_node = id;
        if id.is_some() {
            self.active_edge = None;
        }
    }

    /// Set (or clear) the active edge. A new active edge clears the active node.
    pub fn set_active_edge(&mut self, id: Option<EdgeId>) {
        self.active_edge = id;
        if id.is_some() {
            self.active_node = None;
        }
    }

    /// Add or remove `id` from the multi-select set. Returns whether it is
    /// selected afterwards. The active node is left alone.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if let Some(pos) = self.selected.iter().position(|n| *n == id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(id);
            true
        }
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn clear_all(&mut self) {
        self.active_node = None;
        self.active_edge = None;
        self.selected.clear();
    }

    /// Drop references to a node the store no longer has.
    pub fn forget_node(&mut self, id: NodeId) {
        if self.active_node == Some(id) {
            self.active_node = None;
        }
        self.selected.retain(|n| *n != id);
    }

    pub fn forget_edge(&mut self, id: EdgeId) {
        if self.active_edge == Some(id) {
            self.active_edge = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_and_edge_focus_are_exclusive() {
        let mut s = Selection::new();
        let n = NodeId::intern("s_node");
        let e = EdgeId::intern("s_edge");
        s.set_active_edge(Some(e));
        s.set_active_node(Some(n));
        assert_eq!((s.active_node, s.active_edge), (Some(n), None));
        s.set_active_edge(Some(e));
        assert_eq!((s.active_node, s.active_edge), (None, Some(e)));
    }

    #[test]
    fn clearing_one_focus_keeps_the_other() {
        let mut s = Selection::new();
        let n = NodeId::intern("s_keep");
        s.set_active_node(Some(n));
        s.set_active_edge(None);
        assert_eq!(s.active_node, Some(n));
    }

    #[test]
    fn toggle_adds_and_removes_without_touching_active() {
        let mut s = Selection::new();
        let a = NodeId::intern("s_a");
        let b = NodeId::intern("s_b");
        s.set_active_node(Some(a));
        assert!(s.toggle(b));
        assert!(s.toggle(a));
        assert_eq!(s.selected.as_slice(), &[b, a]);
        assert!(!s.toggle(b));
        assert_eq!(s.selected.as_slice(), &[a]);
        assert_eq!(s.active_node, Some(a));
    }

    #[test]
    fn clear_all_empties_everything() {
        let mut s = Selection::new();
        s.set_active_node(Some(NodeId::intern("s_c")));
        s.toggle(NodeId::intern("s_d"));
        s.clear_all();
        assert_eq!(s, Selection::new());
    }

    #[test]
    fn forgetting_a_deleted_node() {
        let mut s = Selection::new();
        let n = NodeId::intern("s_gone");
        s.set_active_node(Some(n));
        s.toggle(n);
        s.forget_node(n);
        assert_eq!(s, Selection::new());
    }

    #[test]
    fn serializes_camel_case() {
        let mut s = Selection::new();
        s.set_active_edge(Some(EdgeId::intern("s_json")));
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"activeNode":null,"activeEdge":"s_json","selected":[]}"#);
    }
}
