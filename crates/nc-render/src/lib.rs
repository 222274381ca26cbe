//! Geometry and painting for the node canvas.
//!
//! Turns a [`nc_core::Diagram`] plus a viewport into screen-space edge
//! curves, answers "what is under this point", and paints the result into
//! a Vello scene through per-kind node renderers.

pub mod hit;
pub mod paint;
pub mod renderer;
pub mod router;

pub use hit::{PortId, PortSide, hit_test_edge, port_position, ports, resolve_node_at, resolve_port_at};
pub use paint::{paint_edges, paint_nodes, paint_temporary, to_peniko};
pub use renderer::{
    CardRenderer, HitContext, NodeAction, NodeRenderer, NodeView, PortRenderer, RendererRegistry,
};
pub use router::{
    ArrowHead, Displaced, EdgeStyle, RoutedEdge, build_curve, node_bounds, node_center, placed, route_edge,
    route_edges, style_for, temporary_connection_path,
};
