//! Edge routing: node positions → screen-space curves.
//!
//! Anchors are node centers computed from the reported size when a renderer
//! has sent one, otherwise from the configured estimate (300×150 by
//! default). The estimate is an approximation: edges attach to the centre
//! of the estimated box, not the box the user actually sees.
//!
//! Curves are cubic Béziers whose control points sit at one and two thirds
//! of the way along the chord, pushed sideways by `curve_offset × |Δ|`.
//! The side is picked from the sign of the chord's slope, so `A→B` and
//! `B→A` bow apart instead of drawing on top of each other.

use kurbo::{CubicBez, ParamCurve, Point, Vec2};
use nc_core::{
    Bounds, CanvasConfig, Color, Diagram, Edge, EdgeId, EdgeKind, NodeId, NodeRef, ScreenPoint,
    Viewport, WorldPoint,
};
use smallvec::{SmallVec, smallvec};
use std::borrow::Cow;

// ─── Styles ──────────────────────────────────────────────────────────────

/// Visual style of an edge kind. Static per kind, never per instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub color: Color,
    pub stroke_width: f64,
    /// Dash lengths in screen pixels; empty for a solid line.
    pub dash: SmallVec<[f64; 4]>,
    /// Arrowhead marker id, for hosts that draw markers themselves.
    pub marker_id: &'static str,
}

/// Style lookup for an edge kind.
pub fn style_for(kind: EdgeKind) -> EdgeStyle {
    match kind {
        EdgeKind::Direct => EdgeStyle {
            color: Color::rgb8(0x64, 0x74, 0x8B),
            stroke_width: 2.0,
            dash: SmallVec::new(),
            marker_id: "arrow-direct",
        },
        EdgeKind::Reference => EdgeStyle {
            color: Color::rgb8(0x8B, 0x5C, 0xF6),
            stroke_width: 1.5,
            dash: smallvec![6.0, 4.0],
            marker_id: "arrow-reference",
        },
        EdgeKind::Question => EdgeStyle {
            color: Color::rgb8(0xF5, 0x9E, 0x0B),
            stroke_width: 2.0,
            dash: smallvec![10.0, 4.0, 2.0, 4.0],
            marker_id: "arrow-question",
        },
        EdgeKind::Answer => EdgeStyle {
            color: Color::rgb8(0x10, 0xB9, 0x81),
            stroke_width: 2.5,
            dash: SmallVec::new(),
            marker_id: "arrow-answer",
        },
    }
}

// ─── Node anchors ────────────────────────────────────────────────────────

/// World-space box used for a node: reported size, else the estimate.
pub fn node_bounds(node: &NodeRef, config: &CanvasConfig) -> Bounds {
    Bounds::from_origin_size(node.position, node.size_or(config.estimated_node_size()))
}

/// Anchor point of a node (centre of its box).
pub fn node_center(node: &NodeRef, config: &CanvasConfig) -> WorldPoint {
    node_bounds(node, config).center()
}

/// A node drawn away from its stored position, e.g. while it is dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displaced {
    pub node: NodeId,
    pub position: WorldPoint,
}

/// `node` as it should be drawn. Only the displaced node is copied.
pub fn placed(node: &NodeRef, displaced: Option<Displaced>) -> Cow<'_, NodeRef> {
    match displaced {
        Some(d) if d.node == node.id => Cow::Owned(NodeRef {
            position: d.position,
            ..node.clone()
        }),
        _ => Cow::Borrowed(node),
    }
}

// ─── Curves ──────────────────────────────────────────────────────────────

/// Build the connection curve between two screen points.
///
/// Coincident endpoints produce a degenerate (zero-length) curve rather
/// than NaN control points.
pub fn build_curve(from: ScreenPoint, to: ScreenPoint, offset_factor: f64) -> CubicBez {
    let p0 = from.to_point();
    let p3 = to.to_point();
    let d = to - from;
    let len = d.hypot();
    if len < f64::EPSILON {
        return CubicBez::new(p0, p0, p3, p3);
    }

    let normal = Vec2::new(-d.y, d.x) / len;
    let bias = if d.x * d.y >= 0.0 { 1.0 } else { -1.0 };
    let push = normal * (offset_factor * len * bias);

    CubicBez::new(p0, p0 + d / 3.0 + push, p0 + d * (2.0 / 3.0) + push, p3)
}

/// Arrowhead triangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

impl ArrowHead {
    /// Triangle pointing along `direction` with its tip at `tip`.
    pub fn new(tip: Point, direction: Vec2, stroke_width: f64) -> Self {
        let angle = direction.atan2();
        let size = 8.0 + stroke_width * 1.5;
        let wing = |a: f64| Point::new(tip.x - size * a.cos(), tip.y - size * a.sin());
        Self {
            tip,
            left: wing(angle - 0.4),
            right: wing(angle + 0.4),
        }
    }
}

/// A fully resolved, ready-to-paint edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub curve: CubicBez,
    pub style: EdgeStyle,
    pub arrow: ArrowHead,
}

/// Route one edge. Returns `None` if either endpoint is gone.
pub fn route_edge(
    edge: &Edge,
    diagram: &Diagram,
    viewport: &Viewport,
    config: &CanvasConfig,
    displaced: Option<Displaced>,
) -> Option<RoutedEdge> {
    let source = placed(diagram.node(edge.source)?, displaced);
    let target = placed(diagram.node(edge.target)?, displaced);
    let from = viewport.world_to_screen(node_center(&source, config));
    let to = viewport.world_to_screen(node_center(&target, config));
    let curve = build_curve(from, to, config.curve_offset);

    let style = style_for(edge.kind);
    let target_box = screen_box(&node_bounds(&target, config), viewport);
    let arrow = arrow_at_boundary(&curve, &target_box, style.stroke_width);

    Some(RoutedEdge {
        id: edge.id,
        kind: edge.kind,
        curve,
        style,
        arrow,
    })
}

/// Route every edge in the diagram, skipping those with missing endpoints.
pub fn route_edges(
    diagram: &Diagram,
    viewport: &Viewport,
    config: &CanvasConfig,
    displaced: Option<Displaced>,
) -> Vec<RoutedEdge> {
    diagram
        .edges()
        .filter_map(|edge| {
            let routed = route_edge(edge, diagram, viewport, config, displaced);
            if routed.is_none() {
                log::trace!("edge {} has a missing endpoint, not routed", edge.id);
            }
            routed
        })
        .collect()
}

/// Curve from a node centre to the live pointer, shown while connecting.
pub fn temporary_connection_path(
    source: NodeId,
    pointer: WorldPoint,
    diagram: &Diagram,
    viewport: &Viewport,
    config: &CanvasConfig,
) -> Option<CubicBez> {
    let node = diagram.node(source)?;
    let from = viewport.world_to_screen(node_center(node, config));
    let to = viewport.world_to_screen(pointer);
    Some(build_curve(from, to, config.curve_offset))
}

// ─── Arrow placement ─────────────────────────────────────────────────────

fn screen_box(bounds: &Bounds, viewport: &Viewport) -> kurbo::Rect {
    let p0 = viewport.world_to_screen(bounds.origin());
    let p1 = viewport.world_to_screen(WorldPoint::new(
        bounds.x + bounds.width,
        bounds.y + bounds.height,
    ));
    kurbo::Rect::from_points(p0.to_point(), p1.to_point())
}

/// Put the arrow tip where the curve enters the target box, so it is not
/// hidden under the node. Falls back to the curve end when the curve starts
/// inside the box (overlapping nodes).
fn arrow_at_boundary(curve: &CubicBez, target: &kurbo::Rect, stroke_width: f64) -> ArrowHead {
    let end_direction = |t: f64| {
        let ahead = curve.eval(t);
        let behind = curve.eval((t - 0.01).max(0.0));
        let d = ahead - behind;
        if d.hypot2() < f64::EPSILON {
            curve.p3 - curve.p0
        } else {
            d
        }
    };

    if target.contains(curve.p0) {
        return ArrowHead::new(curve.p3, end_direction(1.0), stroke_width);
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..24 {
        let mid = (lo + hi) / 2.0;
        if target.contains(curve.eval(mid)) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    ArrowHead::new(curve.eval(hi), end_direction(hi), stroke_width)
}
