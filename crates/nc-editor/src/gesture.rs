//! Gesture state machine.
//!
//! Exactly one [`GestureState`] is live at a time. Every transition goes
//! through [`GestureMachine`], which checks the current state before
//! moving; an operation that does not apply to the current state is a
//! no-op and reports so through its return value.
//!
//! The machine knows nothing about hit testing or the store. The
//! controller decides *which* transition a pointer event means; the
//! machine owns the bookkeeping each state needs (grab offset, last pan
//! position, connection source) and hands back what a gesture produced
//! when it ends.

use kurbo::Vec2;
use nc_core::{EdgeKind, NodeId, NodeRef, ScreenPoint, WorldPoint};

/// In-flight node drag. The position here is transient: it is shown on the
/// canvas but not written to the store until the drag ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDrag {
    pub node: NodeId,
    /// `pointer_world − node.position` at press time.
    pub grab_offset: Vec2,
    /// Node position when the drag started.
    pub origin: WorldPoint,
    /// Current transient position.
    pub current: WorldPoint,
}

impl NodeDrag {
    pub fn moved(&self) -> bool {
        self.current != self.origin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning {
        /// Pointer position at the previous move.
        last: ScreenPoint,
        moved: bool,
    },
    DraggingNode(NodeDrag),
    Connecting {
        source: NodeId,
        /// Kind requested by the connect-start action; inferred on
        /// completion when `None`.
        kind: Option<EdgeKind>,
        /// Live pointer position, for the temporary path.
        pointer: WorldPoint,
    },
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Panning { .. } => "panning",
            GestureState::DraggingNode(_) => "dragging-node",
            GestureState::Connecting { .. } => "connecting",
        }
    }
}

/// What a gesture left behind when it ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEnd {
    /// Nothing was in flight.
    None,
    /// A drag ended; `commit` is the final position if the node moved.
    Drag {
        node: NodeId,
        commit: Option<WorldPoint>,
    },
    /// A pan ended; `moved` says whether the viewport changed.
    Pan { moved: bool },
    /// A connection was abandoned.
    ConnectCancelled { source: NodeId },
}

#[derive(Debug, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    fn transition_to(&mut self, next: GestureState) {
        log::debug!("gesture: {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    // ─── Drag ────────────────────────────────────────────────────────────

    /// Idle → DraggingNode. The grab offset is captured here, once.
    pub fn begin_drag(&mut self, node: &NodeRef, pointer: WorldPoint) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.transition_to(GestureState::DraggingNode(NodeDrag {
            node: node.id,
            grab_offset: pointer - node.position,
            origin: node.position,
            current: node.position,
        }));
        true
    }

    /// Move the dragged node so the grab point stays under `pointer`.
    /// Returns the new transient position.
    pub fn drag_to(&mut self, pointer: WorldPoint) -> Option<WorldPoint> {
        match &mut self.state {
            GestureState::DraggingNode(drag) => {
                drag.current = pointer - drag.grab_offset;
                Some(drag.current)
            }
            _ => None,
        }
    }

    /// Transient position of `node` if it is the one being dragged.
    pub fn dragged_position(&self, node: NodeId) -> Option<WorldPoint> {
        match &self.state {
            GestureState::DraggingNode(drag) if drag.node == node => Some(drag.current),
            _ => None,
        }
    }

    // ─── Pan ─────────────────────────────────────────────────────────────

    /// Idle → Panning, recording the start pointer position once.
    pub fn begin_pan(&mut self, at: ScreenPoint) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.transition_to(GestureState::Panning {
            last: at,
            moved: false,
        });
        true
    }

    /// Screen delta since the previous pan move.
    pub fn pan_to(&mut self, at: ScreenPoint) -> Option<Vec2> {
        match &mut self.state {
            GestureState::Panning { last, moved } => {
                let delta = at - *last;
                *last = at;
                if delta != Vec2::ZERO {
                    *moved = true;
                }
                Some(delta)
            }
            _ => None,
        }
    }

    // ─── Connect ─────────────────────────────────────────────────────────

    /// Idle → Connecting.
    pub fn begin_connect(&mut self, source: NodeId, kind: Option<EdgeKind>, pointer: WorldPoint) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.transition_to(GestureState::Connecting {
            source,
            kind,
            pointer,
        });
        true
    }

    pub fn track_pointer(&mut self, at: WorldPoint) -> bool {
        match &mut self.state {
            GestureState::Connecting { pointer, .. } => {
                *pointer = at;
                true
            }
            _ => false,
        }
    }

    /// Source and requested kind of the connection in progress.
    pub fn connecting(&self) -> Option<(NodeId, Option<EdgeKind>)> {
        match self.state {
            GestureState::Connecting { source, kind, .. } => Some((source, kind)),
            _ => None,
        }
    }

    /// Connecting → Idle after a successful connect.
    pub fn complete_connect(&mut self) -> Option<NodeId> {
        let (source, _) = self.connecting()?;
        self.transition_to(GestureState::Idle);
        Some(source)
    }

    // ─── Ending ──────────────────────────────────────────────────────────

    /// End a drag or pan on pointer-up. Connecting survives pointer-up: the
    /// connection completes on the next press on a node.
    pub fn release(&mut self) -> GestureEnd {
        match self.state {
            GestureState::Connecting { .. } | GestureState::Idle => GestureEnd::None,
            _ => self.end(),
        }
    }

    /// Abandon whatever is in flight. A drag is reverted (no commit); a pan
    /// keeps the viewport it reached.
    pub fn cancel(&mut self) -> GestureEnd {
        match self.end() {
            GestureEnd::Drag { node, .. } => GestureEnd::Drag { node, commit: None },
            other => other,
        }
    }

    fn end(&mut self) -> GestureEnd {
        let ended = match self.state {
            GestureState::Idle => return GestureEnd::None,
            GestureState::DraggingNode(drag) => GestureEnd::Drag {
                node: drag.node,
                commit: drag.moved().then_some(drag.current),
            },
            GestureState::Panning { moved, .. } => GestureEnd::Pan { moved },
            GestureState::Connecting { source, .. } => GestureEnd::ConnectCancelled { source },
        };
        self.transition_to(GestureState::Idle);
        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::NodeKind;
    use pretty_assertions::assert_eq;

    fn node_at(id: &str, x: f64, y: f64) -> NodeRef {
        NodeRef::new(NodeId::intern(id), NodeKind::Text, WorldPoint::new(x, y))
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let mut m = GestureMachine::new();
        let node = node_at("g_drag", 100.0, 100.0);
        assert!(m.begin_drag(&node, WorldPoint::new(120.0, 110.0)));
        assert_eq!(m.drag_to(WorldPoint::new(170.0, 130.0)), Some(WorldPoint::new(150.0, 120.0)));
        assert_eq!(m.dragged_position(node.id), Some(WorldPoint::new(150.0, 120.0)));
        assert_eq!(
            m.release(),
            GestureEnd::Drag {
                node: node.id,
                commit: Some(WorldPoint::new(150.0, 120.0))
            }
        );
        assert!(m.is_idle());
    }

    #[test]
    fn drag_without_movement_commits_nothing() {
        let mut m = GestureMachine::new();
        let node = node_at("g_still", 0.0, 0.0);
        m.begin_drag(&node, WorldPoint::new(5.0, 5.0));
        assert_eq!(m.release(), GestureEnd::Drag { node: node.id, commit: None });
    }

    #[test]
    fn cancel_reverts_drag() {
        let mut m = GestureMachine::new();
        let node = node_at("g_cancel", 0.0, 0.0);
        m.begin_drag(&node, WorldPoint::ORIGIN);
        m.drag_to(WorldPoint::new(40.0, 40.0));
        assert_eq!(m.cancel(), GestureEnd::Drag { node: node.id, commit: None });
        assert_eq!(m.dragged_position(node.id), None);
    }

    #[test]
    fn only_idle_can_start_a_gesture() {
        let mut m = GestureMachine::new();
        assert!(m.begin_pan(ScreenPoint::new(0.0, 0.0)));
        let node = node_at("g_busy", 0.0, 0.0);
        assert!(!m.begin_drag(&node, WorldPoint::ORIGIN));
        assert!(!m.begin_connect(node.id, None, WorldPoint::ORIGIN));
        assert_eq!(m.state().name(), "panning");
    }

    #[test]
    fn pan_reports_incremental_deltas() {
        let mut m = GestureMachine::new();
        m.begin_pan(ScreenPoint::new(10.0, 10.0));
        assert_eq!(m.pan_to(ScreenPoint::new(15.0, 12.0)), Some(Vec2::new(5.0, 2.0)));
        assert_eq!(m.pan_to(ScreenPoint::new(20.0, 12.0)), Some(Vec2::new(5.0, 0.0)));
        assert_eq!(m.release(), GestureEnd::Pan { moved: true });
    }

    #[test]
    fn connecting_survives_release_and_cancels_explicitly() {
        let mut m = GestureMachine::new();
        let src = NodeId::intern("g_src");
        m.begin_connect(src, Some(EdgeKind::Reference), WorldPoint::ORIGIN);
        assert_eq!(m.release(), GestureEnd::None);
        assert!(m.track_pointer(WorldPoint::new(3.0, 4.0)));
        assert_eq!(m.connecting(), Some((src, Some(EdgeKind::Reference))));
        assert_eq!(m.cancel(), GestureEnd::ConnectCancelled { source: src });
        assert!(m.is_idle());
    }

    #[test]
    fn moves_outside_a_gesture_are_no_ops() {
        let mut m = GestureMachine::new();
        assert_eq!(m.drag_to(WorldPoint::ORIGIN), None);
        assert_eq!(m.pan_to(ScreenPoint::new(1.0, 1.0)), None);
        assert!(!m.track_pointer(WorldPoint::ORIGIN));
        assert_eq!(m.complete_connect(), None);
        assert_eq!(m.release(), GestureEnd::None);
        assert_eq!(m.cancel(), GestureEnd::None);
    }
}
