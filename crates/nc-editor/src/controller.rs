//! Canvas controller: input events in, store commands out.
//!
//! The controller owns the viewport, the gesture machine, and the
//! selection. It reads node and edge data from a [`Diagram`] snapshot the
//! host passes in on every call and never writes to it; mutations leave as
//! [`CanvasCommand`]s at gesture boundaries only. The one exception is the
//! transient position of a node being dragged, which lives in the gesture
//! state and is overlaid on the snapshot for rendering.

use crate::gesture::{GestureEnd, GestureMachine, GestureState};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::CanvasCommand;
use kurbo::CubicBez;
use nc_core::{
    CanvasConfig, Diagram, Edge, EdgeId, EdgeKind, NodeId, NodeRef, ScreenPoint, Size, Viewport,
    WorldPoint,
};
use nc_render::{
    Displaced, HitContext, NodeAction, NodeView, RendererRegistry, RoutedEdge, hit_test_edge, node_bounds,
    node_center, paint_edges, paint_nodes, paint_temporary, resolve_node_at, route_edges,
    style_for, temporary_connection_path,
};
use vello::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Source and target are the same node.
    SelfLoop,
    /// The node is not in the diagram.
    UnknownNode,
    /// Another gesture is in flight.
    Busy,
    /// No connection was being made.
    NotConnecting,
}

/// Result of a connect-start or connect-complete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Started,
    Completed(EdgeId),
    Rejected(RejectReason),
}

pub struct CanvasController {
    config: CanvasConfig,
    viewport: Viewport,
    gesture: GestureMachine,
    selection: Selection,
    registry: RendererRegistry,
    /// Canvas surface size in pixels; keyboard zoom anchors on its centre.
    surface: Size,
}

impl CanvasController {
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_registry(config, RendererRegistry::with_defaults())
    }

    pub fn with_registry(config: CanvasConfig, registry: RendererRegistry) -> Self {
        Self {
            config,
            viewport: Viewport::default(),
            gesture: GestureMachine::new(),
            selection: Selection::new(),
            registry,
            surface: Size::new(0.0, 0.0),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture(&self) -> &GestureState {
        self.gesture.state()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    /// Adopt a viewport from the store, clamping its zoom.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport.clamped(self.config.zoom_range());
    }

    /// Adopt the store's current selection.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.surface = Size::new(width, height);
    }

    /// Accept real extents measured by a node renderer. They replace the
    /// configured estimate for routing and hit testing. Non-finite or
    /// non-positive sizes are ignored.
    pub fn report_bounds(&self, diagram: &mut Diagram, node: NodeId, width: f64, height: f64) -> bool {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            log::debug!("ignoring bounds {width}x{height} reported for {node}");
            return false;
        }
        diagram.set_size(node, Size::new(width, height))
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    /// Process one input event. Returns the commands to forward to the
    /// store; empty for every intermediate frame of a gesture.
    pub fn handle(&mut self, event: &InputEvent, diagram: &Diagram) -> Vec<CanvasCommand> {
        let mut out = Vec::new();
        if event.position().is_some_and(|p| !p.is_finite()) {
            log::debug!("dropping event with non-finite position: {event:?}");
            return out;
        }
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(ScreenPoint::new(*x, *y), *button, *modifiers, diagram, &mut out),
            InputEvent::PointerMove { x, y } => self.pointer_move(ScreenPoint::new(*x, *y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(ScreenPoint::new(*x, *y), diagram, &mut out),
            InputEvent::PointerCancel => self.cancel(diagram, &mut out),
            InputEvent::DoubleClick { x, y } => self.double_click(ScreenPoint::new(*x, *y), diagram, &mut out),
            InputEvent::Wheel { x, y, delta_y } => self.wheel(ScreenPoint::new(*x, *y), *delta_y, &mut out),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers, diagram, &mut out),
        }
        out
    }

    fn pointer_down(
        &mut self,
        screen: ScreenPoint,
        button: PointerButton,
        modifiers: Modifiers,
        diagram: &Diagram,
        out: &mut Vec<CanvasCommand>,
    ) {
        if self.gesture.connecting().is_some() {
            if button != PointerButton::Primary {
                return;
            }
            match self.node_at(screen, diagram) {
                Some(target) => {
                    self.finish_connection(target, diagram, out);
                }
                None => self.cancel(diagram, out),
            }
            return;
        }
        if !self.gesture.is_idle() {
            log::trace!("pointer down ignored while {}", self.gesture.state().name());
            return;
        }

        match (button, self.node_at(screen, diagram)) {
            (PointerButton::Primary, Some(node)) => self.press_node(node, screen, modifiers, diagram, out),
            (PointerButton::Primary, None) => self.press_background(screen, diagram, out),
            (_, None) => {
                self.gesture.begin_pan(screen);
            }
            (_, Some(_)) => {}
        }
    }

    fn pointer_move(&mut self, screen: ScreenPoint) {
        let world = self.viewport.screen_to_world(screen);
        if self.gesture.drag_to(world).is_some() {
            return;
        }
        if let Some(delta) = self.gesture.pan_to(screen) {
            self.viewport.pan(delta);
            return;
        }
        self.gesture.track_pointer(world);
    }

    fn pointer_up(&mut self, screen: ScreenPoint, diagram: &Diagram, out: &mut Vec<CanvasCommand>) {
        self.pointer_move(screen);
        if let Some((source, _)) = self.gesture.connecting() {
            // Releasing over a different node completes a drag-to-connect.
            if let Some(target) = self.node_at(screen, diagram)
                && target != source
            {
                self.finish_connection(target, diagram, out);
            }
            return;
        }
        let end = self.gesture.release();
        self.commit(end, diagram, out);
    }

    fn double_click(&mut self, screen: ScreenPoint, diagram: &Diagram, out: &mut Vec<CanvasCommand>) {
        if !self.gesture.is_idle() || self.node_at(screen, diagram).is_some() {
            return;
        }
        let routed = self.routed_edges(diagram);
        if let Some(edge) = hit_test_edge(screen, &routed, self.config.edge_hit_tolerance) {
            self.delete_edge(edge, out);
        }
    }

    fn wheel(&mut self, anchor: ScreenPoint, delta_y: f64, out: &mut Vec<CanvasCommand>) {
        let step = if delta_y < 0.0 {
            self.config.zoom_step
        } else if delta_y > 0.0 {
            -self.config.zoom_step
        } else {
            return;
        };
        if self.viewport.apply_zoom(anchor, step, self.config.zoom_range()) {
            out.push(CanvasCommand::UpdateViewport {
                viewport: self.viewport,
            });
        }
    }

    fn key(&mut self, key: &str, modifiers: Modifiers, diagram: &Diagram, out: &mut Vec<CanvasCommand>) {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return;
        };
        log::trace!("shortcut {action:?}");
        match action {
            ShortcutAction::Cancel => self.cancel(diagram, out),
            ShortcutAction::ZoomIn => self.zoom_about_center(self.viewport.zoom + self.config.zoom_step, out),
            ShortcutAction::ZoomOut => self.zoom_about_center(self.viewport.zoom - self.config.zoom_step, out),
            ShortcutAction::ResetZoom => self.zoom_about_center(1.0, out),
            ShortcutAction::DeleteEdge => {
                if let Some(edge) = self.selection.active_edge
                    && self.gesture.is_idle()
                {
                    self.delete_edge(edge, out);
                }
            }
        }
    }

    // ─── Press handling ──────────────────────────────────────────────────

    fn node_at(&self, screen: ScreenPoint, diagram: &Diagram) -> Option<NodeId> {
        resolve_node_at(screen, diagram, &self.viewport, &self.config)
    }

    fn view_of<'a>(&'a self, node: &'a NodeRef) -> NodeView<'a> {
        NodeView {
            node,
            bounds: node_bounds(node, &self.config),
            is_active: self.selection.active_node == Some(node.id),
            is_selected: self.selection.is_selected(node.id),
            config: &self.config,
        }
    }

    fn press_node(
        &mut self,
        id: NodeId,
        screen: ScreenPoint,
        modifiers: Modifiers,
        diagram: &Diagram,
        out: &mut Vec<CanvasCommand>,
    ) {
        let Some(node) = diagram.node(id) else {
            return;
        };
        let hit = HitContext {
            screen,
            viewport: &self.viewport,
            config: &self.config,
        };
        let action = self.registry.get(&node.kind).action_at(&self.view_of(node), &hit);
        let world = hit.world();
        log::trace!("press on {id}: {action:?}");

        match action {
            NodeAction::StartConnection => {
                self.gesture.begin_connect(id, None, world);
            }
            NodeAction::Select => self.select_node(id, modifiers, out),
            NodeAction::StartDrag => {
                self.select_node(id, modifiers, out);
                self.gesture.begin_drag(node, world);
            }
        }
    }

    fn select_node(&mut self, id: NodeId, modifiers: Modifiers, out: &mut Vec<CanvasCommand>) {
        let before = self.selection.clone();
        if modifiers.toggles_selection() {
            self.selection.toggle(id);
        } else {
            self.selection.set_active_node(Some(id));
        }
        selection_commands(&before, &self.selection, out);
    }

    /// A primary press on empty canvas activates the edge under the pointer,
    /// or clears the selection when there is none.
    fn press_background(&mut self, screen: ScreenPoint, diagram: &Diagram, out: &mut Vec<CanvasCommand>) {
        let before = self.selection.clone();
        let routed = self.routed_edges(diagram);
        match hit_test_edge(screen, &routed, self.config.edge_hit_tolerance) {
            Some(edge) => self.selection.set_active_edge(Some(edge)),
            None => self.selection.clear_all(),
        }
        selection_commands(&before, &self.selection, out);
    }

    fn delete_edge(&mut self, edge: EdgeId, out: &mut Vec<CanvasCommand>) {
        out.push(CanvasCommand::DeleteEdge { edge_id: edge });
        if self.selection.active_edge == Some(edge) {
            self.selection.forget_edge(edge);
            out.push(CanvasCommand::SetActiveEdge { edge_id: None });
        }
    }

    fn zoom_about_center(&mut self, target: f64, out: &mut Vec<CanvasCommand>) {
        let center = ScreenPoint::new(self.surface.width / 2.0, self.surface.height / 2.0);
        if self.viewport.zoom_to(center, target, self.config.zoom_range()) {
            out.push(CanvasCommand::UpdateViewport {
                viewport: self.viewport,
            });
        }
    }

    // ─── Gesture ends ────────────────────────────────────────────────────

    fn cancel(&mut self, diagram: &Diagram, out: &mut Vec<CanvasCommand>) {
        let end = self.gesture.cancel();
        self.commit(end, diagram, out);
    }

    fn commit(&mut self, end: GestureEnd, diagram: &Diagram, out: &mut Vec<CanvasCommand>) {
        match end {
            GestureEnd::Drag {
                node,
                commit: Some(position),
            } => {
                if diagram.contains_node(node) {
                    log::debug!("commit {node} at ({}, {})", position.x, position.y);
                    out.push(CanvasCommand::UpdateNodePosition {
                        node_id: node,
                        position,
                    });
                } else {
                    log::warn!("dragged node {node} was removed before release");
                    let before = self.selection.clone();
                    self.selection.forget_node(node);
                    selection_commands(&before, &self.selection, out);
                }
            }
            GestureEnd::Pan { moved: true } => out.push(CanvasCommand::UpdateViewport {
                viewport: self.viewport,
            }),
            GestureEnd::ConnectCancelled { source } => {
                log::debug!("connection from {source} cancelled");
            }
            GestureEnd::Drag { commit: None, .. } | GestureEnd::Pan { moved: false } | GestureEnd::None => {}
        }
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Explicit connect-start from a node renderer. `kind` overrides the
    /// kind inferred from the endpoints.
    pub fn start_connection(&mut self, source: NodeId, kind: Option<EdgeKind>, diagram: &Diagram) -> ConnectOutcome {
        let Some(node) = diagram.node(source) else {
            return ConnectOutcome::Rejected(RejectReason::UnknownNode);
        };
        let pointer = node_center(node, &self.config);
        if self.gesture.begin_connect(source, kind, pointer) {
            ConnectOutcome::Started
        } else {
            ConnectOutcome::Rejected(RejectReason::Busy)
        }
    }

    /// Explicit connect-complete onto `target`.
    pub fn complete_connection(&mut self, target: NodeId, diagram: &Diagram) -> (ConnectOutcome, Vec<CanvasCommand>) {
        let mut out = Vec::new();
        let outcome = self.finish_connection(target, diagram, &mut out);
        (outcome, out)
    }

    /// Abandon the connection in progress, if any.
    pub fn cancel_connection(&mut self) -> bool {
        if self.gesture.connecting().is_none() {
            return false;
        }
        matches!(self.gesture.cancel(), GestureEnd::ConnectCancelled { .. })
    }

    fn finish_connection(&mut self, target: NodeId, diagram: &Diagram, out: &mut Vec<CanvasCommand>) -> ConnectOutcome {
        let Some((source, kind)) = self.gesture.connecting() else {
            return ConnectOutcome::Rejected(RejectReason::NotConnecting);
        };
        if source == target {
            log::debug!("rejecting self-connection on {source}");
            return ConnectOutcome::Rejected(RejectReason::SelfLoop);
        }
        let (Some(from), Some(to)) = (diagram.node(source), diagram.node(target)) else {
            log::warn!("connection {source} -> {target} lost an endpoint");
            self.gesture.cancel();
            return ConnectOutcome::Rejected(RejectReason::UnknownNode);
        };
        let kind = kind.unwrap_or_else(|| EdgeKind::infer(from.kind, to.kind));
        let edge = Edge::new(source, target, kind);
        self.gesture.complete_connect();
        log::debug!("connect {source} -> {target} ({})", kind.tag());
        out.push(CanvasCommand::CreateEdge { edge });
        ConnectOutcome::Completed(edge.id)
    }

    // ─── Rendering queries ───────────────────────────────────────────────

    /// Transient position of `node` while it is being dragged.
    pub fn transient_position(&self, node: NodeId) -> Option<WorldPoint> {
        self.gesture.dragged_position(node)
    }

    /// The node being dragged and where to draw it. The snapshot keeps the
    /// stored position until the drag commits.
    pub fn displaced(&self) -> Option<Displaced> {
        match self.gesture.state() {
            GestureState::DraggingNode(drag) if drag.moved() => Some(Displaced {
                node: drag.node,
                position: drag.current,
            }),
            _ => None,
        }
    }

    pub fn routed_edges(&self, diagram: &Diagram) -> Vec<RoutedEdge> {
        route_edges(diagram, &self.viewport, &self.config, self.displaced())
    }

    /// Curve from the connection source to the pointer, while connecting.
    pub fn temporary_path(&self, diagram: &Diagram) -> Option<CubicBez> {
        match *self.gesture.state() {
            GestureState::Connecting { source, pointer, .. } => {
                temporary_connection_path(source, pointer, diagram, &self.viewport, &self.config)
            }
            _ => None,
        }
    }

    /// Paint the whole canvas into `scene`: edges, the temporary connection
    /// path, then nodes on top.
    pub fn paint(&self, scene: &mut Scene, diagram: &Diagram) {
        let routed = self.routed_edges(diagram);
        paint_edges(scene, &routed, self.selection.active_edge);
        if let Some(path) = self.temporary_path(diagram) {
            let kind = self.gesture.connecting().and_then(|(_, k)| k).unwrap_or_default();
            paint_temporary(scene, &path, &style_for(kind));
        }
        paint_nodes(
            scene,
            diagram,
            &self.viewport,
            &self.config,
            &self.registry,
            self.selection.active_node,
            &self.selection.selected,
            self.displaced(),
        );
    }
}

/// Emit one command per selection field that changed.
fn selection_commands(before: &Selection, after: &Selection, out: &mut Vec<CanvasCommand>) {
    if before.active_node != after.active_node {
        out.push(CanvasCommand::SetActiveNode {
            node_id: after.active_node,
        });
    }
    if before.active_edge != after.active_edge {
        out.push(CanvasCommand::SetActiveEdge {
            edge_id: after.active_edge,
        });
    }
    if before.selected != after.selected {
        out.push(CanvasCommand::SetSelectedNodes {
            node_ids: after.selected.to_vec(),
        });
    }
}
