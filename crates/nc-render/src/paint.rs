//! Paint routed edges and nodes into a Vello scene.
//!
//! Edges are painted in screen space (their curves are already projected).
//! Nodes are painted in world space by their renderer under the viewport
//! transform.

use crate::renderer::{NodeView, RendererRegistry};
use crate::router::{ArrowHead, Displaced, EdgeStyle, RoutedEdge, node_bounds, placed};
use kurbo::{Affine, BezPath, CubicBez, Stroke};
use nc_core::{CanvasConfig, Color, Diagram, EdgeId, NodeId, Viewport};
use peniko::Fill;
use vello::Scene;

/// Convert a model color to a peniko color.
pub fn to_peniko(c: Color) -> peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

/// Highlight applied to the active edge.
const ACTIVE_EDGE_EXTRA_WIDTH: f64 = 1.5;

/// Paint every routed edge. The active edge is drawn wider.
pub fn paint_edges(scene: &mut Scene, routed: &[RoutedEdge], active: Option<EdgeId>) {
    for edge in routed {
        let extra = if active == Some(edge.id) {
            ACTIVE_EDGE_EXTRA_WIDTH
        } else {
            0.0
        };
        stroke_curve(scene, &edge.curve, &edge.style, extra);
        fill_arrow(scene, &edge.arrow, edge.style.color);
    }
    log::trace!("painted {} edges", routed.len());
}

/// Paint the in-progress connection path.
pub fn paint_temporary(scene: &mut Scene, path: &CubicBez, style: &EdgeStyle) {
    stroke_curve(scene, path, style, 0.0);
}

/// Paint every node in paint order through its registered renderer.
#[allow(clippy::too_many_arguments)]
pub fn paint_nodes(
    scene: &mut Scene,
    diagram: &Diagram,
    viewport: &Viewport,
    config: &CanvasConfig,
    registry: &RendererRegistry,
    active: Option<NodeId>,
    selected: &[NodeId],
    displaced: Option<Displaced>,
) {
    let transform = viewport.to_affine();
    for node in diagram.nodes() {
        let node = placed(node, displaced);
        let view = NodeView {
            node: &node,
            bounds: node_bounds(&node, config),
            is_active: active == Some(node.id),
            is_selected: selected.contains(&node.id),
            config,
        };
        registry.get(&node.kind).paint(scene, &view, transform);
    }
}

fn stroke_curve(scene: &mut Scene, curve: &CubicBez, style: &EdgeStyle, extra: f64) {
    let mut stroke = Stroke::new(style.stroke_width + extra);
    if !style.dash.is_empty() {
        stroke = stroke.with_dashes(0.0, style.dash.iter().copied());
    }
    let mut path = BezPath::new();
    path.move_to(curve.p0);
    path.curve_to(curve.p1, curve.p2, curve.p3);
    scene.stroke(&stroke, Affine::IDENTITY, to_peniko(style.color), None, &path);
}

fn fill_arrow(scene: &mut Scene, arrow: &ArrowHead, color: Color) {
    let mut path = BezPath::new();
    path.move_to(arrow.tip);
    path.line_to(arrow.left);
    path.line_to(arrow.right);
    path.close_path();
    scene.fill(Fill::NonZero, Affine::IDENTITY, to_peniko(color), None, &path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{route_edges, style_for};
    use nc_core::{Edge, EdgeKind, NodeKind, NodeRef, WorldPoint};
    use pretty_assertions::assert_eq;

    #[test]
    fn color_conversion_keeps_channels() {
        let c = to_peniko(Color::rgb8(0x10, 0xB9, 0x81));
        let [r, g, b, a] = c.components;
        assert!((r - 16.0 / 255.0).abs() < 1e-3);
        assert!((g - 185.0 / 255.0).abs() < 1e-3);
        assert!((b - 129.0 / 255.0).abs() < 1e-3);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn paints_board_without_panicking() {
        let mut d = Diagram::new();
        let a = NodeId::intern("paint_a");
        let b = NodeId::intern("paint_b");
        d.add_node(NodeRef::new(a, NodeKind::Question, WorldPoint::ORIGIN)).unwrap();
        d.add_node(NodeRef::new(
            b,
            NodeKind::Port { inputs: 1, outputs: 2 },
            WorldPoint::new(500.0, 300.0),
        ))
        .unwrap();
        let edge = Edge::new(a, b, EdgeKind::Question);
        d.add_edge(edge).unwrap();

        let vp = Viewport::default();
        let config = CanvasConfig::default();
        let registry = RendererRegistry::with_defaults();
        let routed = route_edges(&d, &vp, &config, None);

        let mut scene = Scene::new();
        paint_edges(&mut scene, &routed, Some(edge.id));
        paint_nodes(&mut scene, &d, &vp, &config, &registry, Some(a), &[a, b], None);
        let moved = Displaced {
            node: b,
            position: WorldPoint::new(40.0, 40.0),
        };
        paint_nodes(&mut scene, &d, &vp, &config, &registry, None, &[], Some(moved));
        let temp = CubicBez::new((0.0, 0.0), (10.0, 10.0), (20.0, 10.0), (30.0, 0.0));
        paint_temporary(&mut scene, &temp, &style_for(EdgeKind::Direct));
    }
}
