pub mod config;
pub mod diagram;
pub mod geom;
pub mod id;
pub mod model;
pub mod viewport;

pub use config::{CanvasConfig, ConfigError};
pub use diagram::{Diagram, DiagramError, DiagramSnapshot};
pub use geom::{Bounds, ScreenPoint, Size, WorldPoint};
pub use id::{EdgeId, NodeId};
pub use model::*;
pub use viewport::{Viewport, ZoomRange};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::{EdgeIndex, NodeIndex};
