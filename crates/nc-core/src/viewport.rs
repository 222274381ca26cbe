//! Pan/zoom transform between screen pixels and world units.
//!
//! `screen = world * zoom + pan` and `world = (screen - pan) / zoom`.
//! Pan is unbounded; zoom is always kept inside a [`ZoomRange`].

use crate::geom::{ScreenPoint, WorldPoint};
use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

/// Inclusive zoom bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub const DEFAULT: Self = Self { min: 0.1, max: 2.0 };

    /// Clamp `zoom` into range. NaN collapses to the lower bound.
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(pan_x: f64, pan_y: f64, zoom: f64) -> Self {
        Self { pan_x, pan_y, zoom }
    }

    pub fn pan_offset(&self) -> Vec2 {
        Vec2::new(self.pan_x, self.pan_y)
    }

    pub fn screen_to_world(&self, p: ScreenPoint) -> WorldPoint {
        WorldPoint::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }

    pub fn world_to_screen(&self, p: WorldPoint) -> ScreenPoint {
        ScreenPoint::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    /// Convert a world-space length to screen pixels.
    pub fn scale_to_screen(&self, world_len: f64) -> f64 {
        world_len * self.zoom
    }

    /// The world→screen transform as an affine, for renderers.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.pan_offset()) * Affine::scale(self.zoom)
    }

    /// Translate by a screen-space delta. No clamping; non-finite deltas
    /// are dropped.
    pub fn pan(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.pan_x += delta.x;
        self.pan_y += delta.y;
    }

    /// Adjust zoom by `delta`, keeping the world point under `anchor` fixed
    /// on screen. Returns `true` if the zoom actually changed.
    pub fn apply_zoom(&mut self, anchor: ScreenPoint, delta: f64, range: ZoomRange) -> bool {
        self.zoom_to(anchor, self.zoom + delta, range)
    }

    /// Set zoom to `target` (clamped) about `anchor`. A non-finite anchor
    /// or target leaves the viewport untouched.
    pub fn zoom_to(&mut self, anchor: ScreenPoint, target: f64, range: ZoomRange) -> bool {
        if !anchor.is_finite() || !target.is_finite() {
            return false;
        }
        let next = range.clamp(target);
        if (next - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        let world = self.screen_to_world(anchor);
        self.zoom = next;
        self.pan_x = anchor.x - world.x * next;
        self.pan_y = anchor.y - world.y * next;
        true
    }

    /// Pull a stored viewport back into a valid state (e.g. one restored
    /// from an older save with a wider zoom range).
    pub fn clamped(mut self, range: ZoomRange) -> Self {
        self.zoom = range.clamp(self.zoom);
        self
    }
}
