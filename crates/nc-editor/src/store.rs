//! Outbound commands and the store seam.
//!
//! The controller never writes node data itself. Each gesture boundary
//! produces zero or more [`CanvasCommand`]s which the host forwards to
//! whatever owns the diagram. [`MemoryStore`] is the in-process owner used
//! by the WASM bridge and by tests.

use crate::selection::Selection;
use nc_core::{Diagram, Edge, EdgeId, NodeId, Viewport, WorldPoint};
use serde::{Deserialize, Serialize};

/// A discrete mutation for the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CanvasCommand {
    /// Final position of a dragged node.
    UpdateNodePosition { node_id: NodeId, position: WorldPoint },
    UpdateViewport { viewport: Viewport },
    CreateEdge { edge: Edge },
    DeleteEdge { edge_id: EdgeId },
    SetActiveNode { node_id: Option<NodeId> },
    SetActiveEdge { edge_id: Option<EdgeId> },
    SetSelectedNodes { node_ids: Vec<NodeId> },
}

/// Anything that can receive canvas commands.
pub trait DiagramStore {
    fn apply(&mut self, command: &CanvasCommand);

    fn apply_all(&mut self, commands: &[CanvasCommand]) {
        for command in commands {
            self.apply(command);
        }
    }
}

/// Diagram, viewport, and selection held in memory, with a journal of every
/// command applied.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub diagram: Diagram,
    pub viewport: Viewport,
    pub selection: Selection,
    journal: Vec<CanvasCommand>,
}

impl MemoryStore {
    pub fn new(diagram: Diagram) -> Self {
        Self {
            diagram,
            ..Self::default()
        }
    }

    /// Every command applied so far, oldest first.
    pub fn journal(&self) -> &[CanvasCommand] {
        &self.journal
    }

    /// Number of position writes received for `node`.
    pub fn position_writes(&self, node: NodeId) -> usize {
        self.journal
            .iter()
            .filter(|c| matches!(c, CanvasCommand::UpdateNodePosition { node_id, .. } if *node_id == node))
            .count()
    }
}

impl DiagramStore for MemoryStore {
    fn apply(&mut self, command: &CanvasCommand) {
        match command {
            CanvasCommand::UpdateNodePosition { node_id, position } => {
                if !self.diagram.set_position(*node_id, *position) {
                    log::warn!("position update for unknown node {node_id}");
                }
            }
            CanvasCommand::UpdateViewport { viewport } => {
                self.viewport = *viewport;
            }
            CanvasCommand::CreateEdge { edge } => {
                if let Err(err) = self.diagram.add_edge(*edge) {
                    log::warn!("edge not created: {err}");
                }
            }
            CanvasCommand::DeleteEdge { edge_id } => {
                if self.diagram.remove_edge(*edge_id).is_none() {
                    log::warn!("delete for unknown edge {edge_id}");
                }
                self.selection.forget_edge(*edge_id);
            }
            CanvasCommand::SetActiveNode { node_id } => {
                // The active node is drawn on top, where hit testing finds it.
                if let Some(id) = node_id {
                    self.diagram.bring_to_front(*id);
                }
                self.selection.active_node = *node_id;
            }
            CanvasCommand::SetActiveEdge { edge_id } => {
                self.selection.active_edge = *edge_id;
            }
            CanvasCommand::SetSelectedNodes { node_ids } => {
                self.selection.selected = node_ids.iter().copied().collect();
            }
        }
        log::trace!("store applied {command:?}");
        self.journal.push(command.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::{EdgeKind, NodeKind, NodeRef};
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        let mut d = Diagram::new();
        for (id, x) in [("st_a", 0.0), ("st_b", 400.0)] {
            d.add_node(NodeRef::new(NodeId::intern(id), NodeKind::Text, WorldPoint::new(x, 0.0)))
                .unwrap();
        }
        MemoryStore::new(d)
    }

    #[test]
    fn commands_serialize_tagged_camel_case() {
        let cmd = CanvasCommand::UpdateNodePosition {
            node_id: NodeId::intern("st_json"),
            position: WorldPoint::new(150.0, 120.0),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"type":"updateNodePosition","nodeId":"st_json","position":{"x":150.0,"y":120.0}}"#
        );
        let back: CanvasCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn applies_position_and_edge_commands() {
        let mut s = store();
        let a = NodeId::intern("st_a");
        let b = NodeId::intern("st_b");
        let edge = Edge::new(a, b, EdgeKind::Direct);
        s.apply_all(&[
            CanvasCommand::UpdateNodePosition {
                node_id: a,
                position: WorldPoint::new(10.0, 20.0),
            },
            CanvasCommand::CreateEdge { edge },
        ]);
        assert_eq!(s.diagram.node(a).unwrap().position, WorldPoint::new(10.0, 20.0));
        assert_eq!(s.diagram.edge_count(), 1);
        assert_eq!(s.position_writes(a), 1);

        s.selection.set_active_edge(Some(edge.id));
        s.apply(&CanvasCommand::DeleteEdge { edge_id: edge.id });
        assert_eq!(s.diagram.edge_count(), 0);
        assert_eq!(s.selection.active_edge, None);
    }

    #[test]
    fn commands_for_unknown_targets_are_absorbed() {
        let mut s = store();
        let ghost = NodeId::intern("st_ghost");
        s.apply(&CanvasCommand::UpdateNodePosition {
            node_id: ghost,
            position: WorldPoint::ORIGIN,
        });
        s.apply(&CanvasCommand::CreateEdge {
            edge: Edge::new(ghost, NodeId::intern("st_a"), EdgeKind::Direct),
        });
        assert_eq!(s.diagram.edge_count(), 0);
        assert_eq!(s.journal().len(), 2);
    }

    #[test]
    fn activating_a_node_raises_it_in_paint_order() {
        let mut s = store();
        let a = NodeId::intern("st_a");
        assert_eq!(s.diagram.nodes().last().map(|n| n.id), Some(NodeId::intern("st_b")));
        s.apply(&CanvasCommand::SetActiveNode { node_id: Some(a) });
        assert_eq!(s.diagram.nodes().last().map(|n| n.id), Some(a));
        s.apply(&CanvasCommand::SetActiveNode { node_id: None });
        assert_eq!(s.diagram.nodes().last().map(|n| n.id), Some(a));
    }

    #[test]
    fn selection_commands_overwrite_fields() {
        let mut s = store();
        let a = NodeId::intern("st_a");
        s.apply(&CanvasCommand::SetActiveNode { node_id: Some(a) });
        s.apply(&CanvasCommand::SetSelectedNodes { node_ids: vec![a] });
        assert_eq!(s.selection.active_node, Some(a));
        assert_eq!(s.selection.selected.as_slice(), &[a]);
    }
}
