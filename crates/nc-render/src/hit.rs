//! Hit testing: screen point → node, port, or edge.
//!
//! Node hits are resolved in world space against each node's box (reported
//! or estimated). Ports and edges are tested in screen space so their hit
//! zones stay a usable size at any zoom.

use crate::router::{RoutedEdge, node_bounds};
use kurbo::ParamCurveNearest;
use nc_core::{CanvasConfig, Diagram, EdgeId, NodeId, NodeRef, ScreenPoint, Viewport, WorldPoint};

/// Find the node under `screen`.
///
/// On overlap the node painted last wins, so a press always lands on the
/// node the user sees. Stores raise the active node to the top of paint
/// order, which makes it win too.
pub fn resolve_node_at(
    screen: ScreenPoint,
    diagram: &Diagram,
    viewport: &Viewport,
    config: &CanvasConfig,
) -> Option<NodeId> {
    let world = viewport.screen_to_world(screen);
    diagram
        .nodes()
        .rev()
        .find(|node| node_bounds(node, config).contains(world))
        .map(|node| node.id)
}

// ─── Ports ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    /// Left edge.
    Input,
    /// Right edge.
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId {
    pub side: PortSide,
    pub index: u8,
}

/// World-space centre of a port: `first_offset + index × spacing` below the
/// node top, on the left (input) or right (output) edge.
pub fn port_position(node: &NodeRef, port: PortId, config: &CanvasConfig) -> WorldPoint {
    let bounds = node_bounds(node, config);
    let x = match port.side {
        PortSide::Input => bounds.x,
        PortSide::Output => bounds.x + bounds.width,
    };
    let y = bounds.y + config.port_first_offset + f64::from(port.index) * config.port_spacing;
    WorldPoint::new(x, y)
}

/// Every port a node exposes, inputs first.
pub fn ports(node: &NodeRef) -> impl Iterator<Item = PortId> {
    let (inputs, outputs) = node.kind.port_counts();
    let ins = (0..inputs).map(|index| PortId {
        side: PortSide::Input,
        index,
    });
    let outs = (0..outputs).map(|index| PortId {
        side: PortSide::Output,
        index,
    });
    ins.chain(outs)
}

/// Find the port of `node` under `screen`, if any. The nearest port wins
/// when zones overlap.
pub fn resolve_port_at(
    screen: ScreenPoint,
    node: &NodeRef,
    viewport: &Viewport,
    config: &CanvasConfig,
) -> Option<PortId> {
    let radius = viewport.scale_to_screen(config.port_radius);
    ports(node)
        .map(|port| {
            let center = viewport.world_to_screen(port_position(node, port, config));
            (port, center.distance(screen))
        })
        .filter(|(_, dist)| *dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(port, _)| port)
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// Find the routed edge closest to `screen` within `tolerance` pixels.
/// Later edges (painted on top) win exact ties.
pub fn hit_test_edge(screen: ScreenPoint, routed: &[RoutedEdge], tolerance: f64) -> Option<EdgeId> {
    let p = screen.to_point();
    let tolerance_sq = tolerance * tolerance;
    let mut best: Option<(EdgeId, f64)> = None;
    for edge in routed {
        let nearest = edge.curve.nearest(p, 0.1);
        if nearest.distance_sq > tolerance_sq {
            continue;
        }
        match best {
            Some((_, d)) if nearest.distance_sq > d => {}
            _ => best = Some((edge.id, nearest.distance_sq)),
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::route_edges;
    use nc_core::{Edge, EdgeKind, NodeKind, Size};
    use pretty_assertions::assert_eq;

    fn board() -> Diagram {
        let mut d = Diagram::new();
        for (id, x, y) in [("h_a", 0.0, 0.0), ("h_b", 200.0, 100.0), ("h_c", 1000.0, 0.0)] {
            d.add_node(NodeRef::new(NodeId::intern(id), NodeKind::Text, WorldPoint::new(x, y)))
                .unwrap();
        }
        d
    }

    #[test]
    fn background_hits_nothing() {
        let d = board();
        let hit = resolve_node_at(
            ScreenPoint::new(700.0, 500.0),
            &d,
            &Viewport::default(),
            &CanvasConfig::default(),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn topmost_wins_overlap_deterministically() {
        let d = board();
        let vp = Viewport::default();
        let config = CanvasConfig::default();
        // (250, 120) lies inside both h_a [0..300 × 0..150] and h_b [200..500 × 100..250].
        let p = ScreenPoint::new(250.0, 120.0);
        for _ in 0..5 {
            assert_eq!(resolve_node_at(p, &d, &vp, &config), Some(NodeId::intern("h_b")));
        }
    }

    #[test]
    fn raised_node_wins_overlap() {
        let mut d = board();
        let p = ScreenPoint::new(250.0, 120.0);
        d.bring_to_front(NodeId::intern("h_a"));
        let hit = resolve_node_at(p, &d, &Viewport::default(), &CanvasConfig::default());
        assert_eq!(hit, Some(NodeId::intern("h_a")));
        assert_eq!(d.nodes().last().map(|n| n.id), hit);
    }

    #[test]
    fn node_hit_accounts_for_viewport() {
        let d = board();
        let vp = Viewport::new(-500.0, 0.0, 0.5);
        // World (1100, 50) inside h_c → screen (1100·0.5 − 500, 25) = (50, 25).
        let hit = resolve_node_at(ScreenPoint::new(50.0, 25.0), &d, &vp, &CanvasConfig::default());
        assert_eq!(hit, Some(NodeId::intern("h_c")));
    }

    #[test]
    fn reported_size_shrinks_hit_box() {
        let mut d = board();
        d.set_size(NodeId::intern("h_c"), Size::new(50.0, 50.0));
        let config = CanvasConfig::default();
        let vp = Viewport::default();
        assert_eq!(resolve_node_at(ScreenPoint::new(1100.0, 20.0), &d, &vp, &config), None);
        assert_eq!(
            resolve_node_at(ScreenPoint::new(1020.0, 20.0), &d, &vp, &config),
            Some(NodeId::intern("h_c"))
        );
    }

    #[test]
    fn ports_are_placed_down_the_sides() {
        let node = NodeRef::new(
            NodeId::intern("p_node"),
            NodeKind::Port { inputs: 2, outputs: 1 },
            WorldPoint::new(100.0, 100.0),
        );
        let config = CanvasConfig::default();
        let in1 = PortId { side: PortSide::Input, index: 1 };
        let out0 = PortId { side: PortSide::Output, index: 0 };
        assert_eq!(port_position(&node, in1, &config), WorldPoint::new(100.0, 190.0));
        assert_eq!(port_position(&node, out0, &config), WorldPoint::new(400.0, 160.0));
        assert_eq!(ports(&node).count(), 3);
    }

    #[test]
    fn port_hit_scales_with_zoom() {
        let node = NodeRef::new(
            NodeId::intern("p_zoom"),
            NodeKind::Port { inputs: 1, outputs: 1 },
            WorldPoint::new(0.0, 0.0),
        );
        let config = CanvasConfig::default();
        let vp = Viewport::new(0.0, 0.0, 2.0);
        // Output 0 at world (300, 60) → screen (600, 120). Radius 8 world → 16 px.
        let near = ScreenPoint::new(612.0, 120.0);
        let far = ScreenPoint::new(620.0, 120.0);
        assert_eq!(
            resolve_port_at(near, &node, &vp, &config),
            Some(PortId { side: PortSide::Output, index: 0 })
        );
        assert_eq!(resolve_port_at(far, &node, &vp, &config), None);
    }

    #[test]
    fn non_port_nodes_have_no_ports() {
        let node = NodeRef::new(NodeId::intern("p_none"), NodeKind::Prompt, WorldPoint::ORIGIN);
        let hit = resolve_port_at(
            ScreenPoint::new(0.0, 60.0),
            &node,
            &Viewport::default(),
            &CanvasConfig::default(),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn edge_hit_uses_curve_distance() {
        let mut d = board();
        let edge = Edge::new(NodeId::intern("h_a"), NodeId::intern("h_c"), EdgeKind::Direct);
        d.add_edge(edge).unwrap();
        let config = CanvasConfig {
            curve_offset: 0.0,
            ..CanvasConfig::default()
        };
        let routed = route_edges(&d, &Viewport::default(), &config, None);
        // Straight chord from (150, 75) to (1150, 75).
        assert_eq!(hit_test_edge(ScreenPoint::new(650.0, 79.0), &routed, 6.0), Some(edge.id));
        assert_eq!(hit_test_edge(ScreenPoint::new(650.0, 90.0), &routed, 6.0), None);
    }
}
