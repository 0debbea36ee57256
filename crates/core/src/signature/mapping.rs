//! Coordinate mapping from client (viewport) space to backing-pixel space.

use serde::{Deserialize, Serialize};

/// A point in some 2-D coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The displayed (logical) rectangle of the surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pixel dimensions of a raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Map a client-space point onto the backing buffer.
///
/// The point is first made relative to the surface origin, then scaled by
/// `backing / logical` on each axis. A degenerate rect (zero or negative
/// extent) maps with a scale of 1 on that axis.
pub fn map_to_backing_space(client: Point, rect: SurfaceRect, backing: PixelSize) -> Point {
    let scale = |backing_px: u32, logical: f64| {
        if logical > 0.0 {
            f64::from(backing_px) / logical
        } else {
            1.0
        }
    };
    Point {
        x: (client.x - rect.left) * scale(backing.width, rect.width),
        y: (client.y - rect.top) * scale(backing.height, rect.height),
    }
}
