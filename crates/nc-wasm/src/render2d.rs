//! Canvas2D renderer.
//!
//! Draws routed edges, the in-progress connection path, and node outlines
//! to an HTML `<canvas>` via `CanvasRenderingContext2d`. Node content is
//! rendered by the host; the outlines here only mark where each node's
//! hit box is.

use kurbo::CubicBez;
use nc_core::{Bounds, CanvasConfig, Diagram, EdgeId, NodeId, ScreenPoint, Size, Viewport};
use nc_render::{ArrowHead, Displaced, EdgeStyle, RoutedEdge, node_bounds, placed};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub node_border: &'static str,
    pub active: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.05)",
            node_border: "#C7C7CC",
            active: "#38BDF8",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.04)",
            node_border: "#48484A",
            active: "#38BDF8",
        }
    }
}

/// Everything one frame needs, already resolved by the controller.
pub struct Frame<'a> {
    pub diagram: &'a Diagram,
    /// Node drawn away from its stored position, mid-drag.
    pub displaced: Option<Displaced>,
    pub viewport: &'a Viewport,
    pub config: &'a CanvasConfig,
    pub routed: &'a [RoutedEdge],
    pub temporary: Option<(CubicBez, EdgeStyle)>,
    pub active_node: Option<NodeId>,
    pub active_edge: Option<EdgeId>,
    pub selected: &'a [NodeId],
    pub width: f64,
    pub height: f64,
}

pub fn render_frame(ctx: &CanvasRenderingContext2d, frame: &Frame<'_>, theme: &CanvasTheme) {
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, frame.width, frame.height);
    draw_grid(ctx, frame, theme);

    draw_edges(ctx, frame.routed, frame.active_edge);
    if let Some((path, style)) = &frame.temporary {
        stroke_curve(ctx, path, style, 0.0);
    }
    draw_node_outlines(ctx, frame, theme);
}

/// Dot grid that moves with the pan offset and scales with zoom.
fn draw_grid(ctx: &CanvasRenderingContext2d, frame: &Frame<'_>, theme: &CanvasTheme) {
    let spacing = 20.0 * frame.viewport.zoom;
    if spacing < 4.0 {
        return;
    }
    ctx.set_fill_style_str(theme.grid);
    let mut x = frame.viewport.pan_x.rem_euclid(spacing);
    while x < frame.width {
        let mut y = frame.viewport.pan_y.rem_euclid(spacing);
        while y < frame.height {
            ctx.fill_rect(x, y, 1.0, 1.0);
            y += spacing;
        }
        x += spacing;
    }
}

// ─── Edge rendering ──────────────────────────────────────────────────────

fn draw_edges(ctx: &CanvasRenderingContext2d, routed: &[RoutedEdge], active: Option<EdgeId>) {
    for edge in routed {
        let extra = if active == Some(edge.id) { 1.5 } else { 0.0 };
        stroke_curve(ctx, &edge.curve, &edge.style, extra);
        draw_arrowhead(ctx, &edge.arrow, &edge.style.color.to_hex());
    }
}

fn stroke_curve(ctx: &CanvasRenderingContext2d, curve: &CubicBez, style: &EdgeStyle, extra: f64) {
    ctx.save();
    ctx.set_stroke_style_str(&style.color.to_hex());
    ctx.set_line_width(style.stroke_width + extra);
    let dash = js_sys::Array::new();
    for len in &style.dash {
        dash.push(&JsValue::from_f64(*len));
    }
    let _ = ctx.set_line_dash(&dash);

    ctx.begin_path();
    ctx.move_to(curve.p0.x, curve.p0.y);
    ctx.bezier_curve_to(curve.p1.x, curve.p1.y, curve.p2.x, curve.p2.y, curve.p3.x, curve.p3.y);
    ctx.stroke();
    ctx.restore();
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, arrow: &ArrowHead, color: &str) {
    ctx.save();
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    ctx.move_to(arrow.tip.x, arrow.tip.y);
    ctx.line_to(arrow.left.x, arrow.left.y);
    ctx.line_to(arrow.right.x, arrow.right.y);
    ctx.close_path();
    ctx.fill();
    ctx.restore();
}

// ─── Node outlines ───────────────────────────────────────────────────────

fn draw_node_outlines(ctx: &CanvasRenderingContext2d, frame: &Frame<'_>, theme: &CanvasTheme) {
    let zoom = frame.viewport.zoom;
    let visible = Bounds::from_origin_size(
        frame.viewport.screen_to_world(ScreenPoint::new(0.0, 0.0)),
        Size::new(frame.width / zoom, frame.height / zoom),
    );
    for node in frame.diagram.nodes() {
        let node = placed(node, frame.displaced);
        let b = node_bounds(&node, frame.config);
        if !b.intersects(&visible) {
            continue;
        }
        let origin = frame.viewport.world_to_screen(b.origin());
        let w = frame.viewport.scale_to_screen(b.width);
        let h = frame.viewport.scale_to_screen(b.height);

        let is_active = frame.active_node == Some(node.id);
        let is_selected = frame.selected.contains(&node.id);
        ctx.save();
        ctx.set_stroke_style_str(if is_active || is_selected {
            theme.active
        } else {
            theme.node_border
        });
        ctx.set_line_width(if is_active { 2.0 } else { 1.0 });
        if is_selected && !is_active {
            let _ = ctx.set_line_dash(&js_sys::Array::of2(
                &JsValue::from_f64(4.0),
                &JsValue::from_f64(3.0),
            ));
        }
        ctx.stroke_rect(origin.x, origin.y, w, h);
        ctx.restore();
    }
}
