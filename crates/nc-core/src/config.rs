//! Canvas tuning knobs.
//!
//! Every field has a working default; hosts override a subset by handing
//! JSON to [`CanvasConfig::from_json`]. Missing fields keep their defaults.

use crate::geom::Size;
use crate::viewport::ZoomRange;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Lower zoom bound. Default: **0.1**.
    pub zoom_min: f64,
    /// Upper zoom bound. Default: **2.0**.
    pub zoom_max: f64,
    /// Zoom change per wheel tick or keyboard zoom. Default: **0.05**.
    pub zoom_step: f64,

    /// Estimated node width in world units, used when a renderer has not
    /// reported real bounds. Default: **300**.
    pub node_width: f64,
    /// Estimated node height in world units. Default: **150**.
    pub node_height: f64,

    /// Perpendicular control-point offset as a fraction of the
    /// source→target distance. Default: **0.2**.
    pub curve_offset: f64,

    /// Offset of the first port from the node top, world units. Default: **60**.
    pub port_first_offset: f64,
    /// Vertical distance between ports, world units. Default: **30**.
    pub port_spacing: f64,
    /// Port hit radius, world units. Default: **8**.
    pub port_radius: f64,
    /// Connect-handle hit radius, world units. Default: **10**.
    pub connect_handle_radius: f64,

    /// Max distance from a curve that still counts as hitting the edge,
    /// screen pixels. Default: **6**.
    pub edge_hit_tolerance: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 2.0,
            zoom_step: 0.05,
            node_width: 300.0,
            node_height: 150.0,
            curve_offset: 0.2,
            port_first_offset: 60.0,
            port_spacing: 30.0,
            port_radius: 8.0,
            connect_handle_radius: 10.0,
            edge_hit_tolerance: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Input was not valid JSON for this struct.
    Parse(String),
    InvalidZoomRange { min: f64, max: f64 },
    /// A field that must be strictly positive was not.
    NonPositive(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid canvas config: {msg}"),
            ConfigError::InvalidZoomRange { min, max } => {
                write!(f, "zoom range [{min}, {max}] is empty or non-positive")
            }
            ConfigError::NonPositive(field) => write!(f, "`{field}` must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl CanvasConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed JSON or out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max) {
            return Err(ConfigError::InvalidZoomRange {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        let positive = [
            ("zoom_step", self.zoom_step),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("port_radius", self.port_radius),
            ("connect_handle_radius", self.connect_handle_radius),
            ("edge_hit_tolerance", self.edge_hit_tolerance),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive(field));
            }
        }
        Ok(())
    }

    pub fn zoom_range(&self) -> ZoomRange {
        ZoomRange {
            min: self.zoom_min,
            max: self.zoom_max,
        }
    }

    pub fn estimated_node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CanvasConfig::from_json(r#"{ "zoom_max": 4.0 }"#).unwrap();
        assert_eq!(config.zoom_max, 4.0);
        assert_eq!(config.zoom_min, 0.1);
        assert_eq!(config.estimated_node_size(), Size::new(300.0, 150.0));
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let err = CanvasConfig::from_json(r#"{ "zoom_min": 3.0, "zoom_max": 2.0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidZoomRange { min: 3.0, max: 2.0 });
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = CanvasConfig::from_json(r#"{ "zoom_step": 0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::NonPositive("zoom_step"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            CanvasConfig::from_json("{ zoom_max: }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
