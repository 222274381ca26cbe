//! Per-node-type renderers.
//!
//! Each node kind gets a [`NodeRenderer`] that paints its chrome and says
//! what a press at a given point means (select, drag, or start a
//! connection). Renderers never touch gesture state; they only report
//! back through [`NodeAction`] and the controller decides.

use crate::hit::{PortSide, port_position, ports, resolve_port_at};
use crate::paint::to_peniko;
use kurbo::{Affine, Circle, Rect, RoundedRect, Stroke};
use nc_core::{Bounds, CanvasConfig, Color, NodeKind, NodeRef, ScreenPoint, Viewport, WorldPoint};
use peniko::Fill;
use std::collections::HashMap;
use vello::Scene;

/// What a renderer gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub node: &'a NodeRef,
    /// World-space box (reported or estimated).
    pub bounds: Bounds,
    pub is_active: bool,
    pub is_selected: bool,
    pub config: &'a CanvasConfig,
}

/// A press being classified by a renderer.
#[derive(Debug, Clone, Copy)]
pub struct HitContext<'a> {
    pub screen: ScreenPoint,
    pub viewport: &'a Viewport,
    pub config: &'a CanvasConfig,
}

impl HitContext<'_> {
    pub fn world(&self) -> WorldPoint {
        self.viewport.screen_to_world(self.screen)
    }
}

/// Meaning of a press on a node, as reported by its renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    /// Select without dragging (e.g. a press inside editable content).
    Select,
    /// Select and begin moving the node.
    StartDrag,
    /// Begin a connection from this node.
    StartConnection,
}

pub trait NodeRenderer: Send + Sync {
    /// Registry key; matches [`NodeKind::tag`].
    fn kind_tag(&self) -> &'static str;

    /// World-space centre of the connect handle, if this kind has one.
    fn connect_handle(&self, view: &NodeView<'_>) -> Option<WorldPoint> {
        let b = view.bounds;
        Some(WorldPoint::new(b.x + b.width, b.y + b.height / 2.0))
    }

    /// Classify a press that already landed on this node.
    fn action_at(&self, view: &NodeView<'_>, hit: &HitContext<'_>) -> NodeAction {
        if on_handle(self.connect_handle(view), hit) {
            NodeAction::StartConnection
        } else {
            NodeAction::StartDrag
        }
    }

    /// Paint node chrome. `transform` maps world units to screen pixels.
    fn paint(&self, scene: &mut Scene, view: &NodeView<'_>, transform: Affine);
}

/// Whether a press lands within the connect-handle radius, measured in
/// screen pixels at the current zoom.
fn on_handle(handle: Option<WorldPoint>, hit: &HitContext<'_>) -> bool {
    handle.is_some_and(|h| {
        let radius = hit.viewport.scale_to_screen(hit.config.connect_handle_radius);
        hit.viewport.world_to_screen(h).distance(hit.screen) <= radius
    })
}

// ─── Card renderer ───────────────────────────────────────────────────────

const CARD_FILL: Color = Color::rgb8(0xFF, 0xFF, 0xFF);
const SELECTED_RING: Color = Color::rgb8(0x38, 0xBD, 0xF8);

/// Rounded card with a coloured header strip. Used for every content kind.
///
/// Whether a card has a drag header is a per-kind choice. Kinds whose body
/// holds editable content (text, prompt, answer, debate in the default
/// registry) only drag from the header, so a body press selects the node
/// and leaves the gesture idle. Headerless kinds drag from anywhere.
pub struct CardRenderer {
    tag: &'static str,
    accent: Color,
    /// When set, only the header strip starts a drag; presses in the body
    /// select so the content stays editable.
    drag_header: Option<f64>,
}

impl CardRenderer {
    pub fn new(tag: &'static str, accent: Color) -> Self {
        Self {
            tag,
            accent,
            drag_header: None,
        }
    }

    pub fn with_drag_header(mut self, height: f64) -> Self {
        self.drag_header = Some(height);
        self
    }
}

impl NodeRenderer for CardRenderer {
    fn kind_tag(&self) -> &'static str {
        self.tag
    }

    fn action_at(&self, view: &NodeView<'_>, hit: &HitContext<'_>) -> NodeAction {
        if on_handle(self.connect_handle(view), hit) {
            return NodeAction::StartConnection;
        }
        match self.drag_header {
            Some(header) if hit.world().y > view.bounds.y + header => NodeAction::Select,
            _ => NodeAction::StartDrag,
        }
    }

    fn paint(&self, scene: &mut Scene, view: &NodeView<'_>, transform: Affine) {
        paint_card(scene, view, transform, self.accent);
        if let Some(handle) = self.connect_handle(view) {
            let dot = Circle::new(handle.to_point(), 5.0);
            scene.fill(Fill::NonZero, transform, to_peniko(self.accent), None, &dot);
        }
    }
}

fn paint_card(scene: &mut Scene, view: &NodeView<'_>, transform: Affine, accent: Color) {
    let b = view.bounds;
    let rect = Rect::new(b.x, b.y, b.x + b.width, b.y + b.height);
    let card: RoundedRect = rect.to_rounded_rect(8.0);
    scene.fill(Fill::NonZero, transform, to_peniko(CARD_FILL), None, &card);

    let header = Rect::new(b.x, b.y, b.x + b.width, b.y + 6.0_f64.min(b.height));
    scene.fill(Fill::NonZero, transform, to_peniko(accent), None, &header);

    let border_width = if view.is_active { 2.5 } else { 1.0 };
    scene.stroke(&Stroke::new(border_width), transform, to_peniko(accent), None, &card);

    if view.is_selected {
        let ring = rect.inflate(4.0, 4.0).to_rounded_rect(10.0);
        let dashed = Stroke::new(1.5).with_dashes(0.0, [4.0, 3.0]);
        scene.stroke(&dashed, transform, to_peniko(SELECTED_RING), None, &ring);
    }
}

// ─── Port renderer ───────────────────────────────────────────────────────

/// Node with input ports down the left edge and output ports down the right.
/// Ports replace the connect handle: pressing an output starts a connection.
pub struct PortRenderer {
    accent: Color,
}

impl PortRenderer {
    pub fn new(accent: Color) -> Self {
        Self { accent }
    }
}

impl NodeRenderer for PortRenderer {
    fn kind_tag(&self) -> &'static str {
        "port"
    }

    fn connect_handle(&self, _view: &NodeView<'_>) -> Option<WorldPoint> {
        None
    }

    fn action_at(&self, view: &NodeView<'_>, hit: &HitContext<'_>) -> NodeAction {
        match resolve_port_at(hit.screen, view.node, hit.viewport, hit.config) {
            Some(port) if port.side == PortSide::Output => NodeAction::StartConnection,
            Some(_) => NodeAction::Select,
            None => NodeAction::StartDrag,
        }
    }

    fn paint(&self, scene: &mut Scene, view: &NodeView<'_>, transform: Affine) {
        paint_card(scene, view, transform, self.accent);
        let config = view.config;
        for port in ports(view.node) {
            let center = port_position(view.node, port, config);
            let dot = Circle::new(center.to_point(), config.port_radius * 0.75);
            let fill = match port.side {
                PortSide::Input => CARD_FILL,
                PortSide::Output => self.accent,
            };
            scene.fill(Fill::NonZero, transform, to_peniko(fill), None, &dot);
            scene.stroke(&Stroke::new(1.5), transform, to_peniko(self.accent), None, &dot);
        }
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

/// Map from node-kind tag to renderer, with a generic fallback for kinds
/// nobody registered.
pub struct RendererRegistry {
    renderers: HashMap<&'static str, Box<dyn NodeRenderer>>,
    fallback: Box<dyn NodeRenderer>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RendererRegistry {
    pub fn new(fallback: Box<dyn NodeRenderer>) -> Self {
        Self {
            renderers: HashMap::new(),
            fallback,
        }
    }

    /// Registry with a renderer for every built-in [`NodeKind`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Box::new(CardRenderer::new(
            "generic",
            Color::rgb8(0x94, 0xA3, 0xB8),
        )));
        let cards: [(&'static str, Color, Option<f64>); 7] = [
            ("text", Color::rgb8(0x64, 0x74, 0x8B), Some(28.0)),
            ("prompt", Color::rgb8(0x3B, 0x82, 0xF6), Some(28.0)),
            ("question", Color::rgb8(0xF5, 0x9E, 0x0B), None),
            ("answer", Color::rgb8(0x10, 0xB9, 0x81), Some(28.0)),
            ("image", Color::rgb8(0xEC, 0x48, 0x99), None),
            ("link", Color::rgb8(0x8B, 0x5C, 0xF6), None),
            ("debate", Color::rgb8(0xEF, 0x44, 0x44), Some(28.0)),
        ];
        for (tag, accent, header) in cards {
            let card = CardRenderer::new(tag, accent);
            let card = match header {
                Some(h) => card.with_drag_header(h),
                None => card,
            };
            registry.register(Box::new(card));
        }
        registry.register(Box::new(PortRenderer::new(Color::rgb8(0x14, 0xB8, 0xA6))));
        registry
    }

    /// Add or replace the renderer for its tag. Returns the one it replaced.
    pub fn register(&mut self, renderer: Box<dyn NodeRenderer>) -> Option<Box<dyn NodeRenderer>> {
        self.renderers.insert(renderer.kind_tag(), renderer)
    }

    pub fn get(&self, kind: &NodeKind) -> &dyn NodeRenderer {
        self.renderers
            .get(kind.tag())
            .map(|r| r.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }
}
