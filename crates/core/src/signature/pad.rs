//! Freehand signature pad.
//!
//! Drawing state machine:
//!
//! ```text
//! Idle --down--> Drawing --move--> Drawing --up/leave--> Idle
//! ```
//!
//! A down event only records the starting point; ink appears on the first
//! move. Mouse and touch input share one mapping and drawing path.

use serde::{Deserialize, Serialize};

use super::mapping::{self, PixelSize, Point, SurfaceRect};
use super::surface::Surface;
use super::SignatureImage;
use crate::error::CoreError;

pub const DEFAULT_WIDTH: f64 = 400.0;
pub const DEFAULT_HEIGHT: f64 = 200.0;

/// Smallest logical width the pad lays out at.
pub const MIN_LOGICAL_WIDTH: u32 = 100;
/// Smallest logical height the pad lays out at.
pub const MIN_LOGICAL_HEIGHT: u32 = 80;
/// Widest logical layout; larger containers are clamped.
pub const MAX_LOGICAL_WIDTH: u32 = 1600;
/// Tallest logical layout, whatever the aspect ratio.
pub const MAX_LOGICAL_HEIGHT: u32 = 800;
/// Highest pixel density the backing buffer is allocated at.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 3.0;

/// Pen width in logical pixels.
const PEN_WIDTH: f64 = 2.0;

/// Construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    /// Nominal width; only its ratio to `height` is retained.
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
    pub disabled: bool,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            device_pixel_ratio: 1.0,
            disabled: false,
        }
    }
}

impl PadConfig {
    /// `height / width`, or 0.5 when either is not positive.
    pub fn aspect(&self) -> f64 {
        if self.width > 0.0 && self.height > 0.0 {
            self.height / self.width
        } else {
            0.5
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Input delivered to the pad. Coordinates are in client space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PadEvent {
    Down {
        #[serde(default = "default_pointer")]
        pointer: PointerKind,
        x: f64,
        y: f64,
    },
    Move {
        #[serde(default = "default_pointer")]
        pointer: PointerKind,
        x: f64,
        y: f64,
    },
    Up,
    Leave,
    /// The container changed width.
    Resize { container_width: f64 },
}

fn default_pointer() -> PointerKind {
    PointerKind::Mouse
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DrawState {
    Idle,
    Drawing { last: Point },
}

/// What the host should do with the originating input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventDisposition {
    /// Suppress the platform's default gesture (scroll, zoom, selection).
    pub prevent_default: bool,
    /// A segment was drawn.
    pub drew: bool,
}

/// The signature pad: a drawing surface whose backing resolution is
/// `logical size * device pixel ratio`.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    aspect: f64,
    dpr: f64,
    disabled: bool,
    logical: PixelSize,
    origin: Point,
    surface: Surface,
    state: DrawState,
    has_content: bool,
}

impl SignaturePad {
    /// Lay the pad out inside a container `container_width` logical pixels wide.
    pub fn new(config: PadConfig, container_width: f64) -> Self {
        let aspect = config.aspect();
        let dpr = device_pixel_ratio(config.device_pixel_ratio);
        let logical = logical_size(container_width, aspect);
        Self {
            aspect,
            dpr,
            disabled: config.disabled,
            logical,
            origin: Point::new(0.0, 0.0),
            surface: Surface::blank(backing_size(logical, dpr)),
            state: DrawState::Idle,
            has_content: false,
        }
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    pub fn logical_size(&self) -> PixelSize {
        self.logical
    }

    pub fn backing_size(&self) -> PixelSize {
        self.surface.size()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.state = DrawState::Idle;
        }
    }

    /// Move the surface's top-left corner in client space.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    fn rect(&self) -> SurfaceRect {
        SurfaceRect {
            left: self.origin.x,
            top: self.origin.y,
            width: f64::from(self.logical.width),
            height: f64::from(self.logical.height),
        }
    }

    fn to_backing(&self, x: f64, y: f64) -> Point {
        mapping::map_to_backing_space(Point::new(x, y), self.rect(), self.surface.size())
    }

    /// Feed one input event through the state machine.
    pub fn handle(&mut self, event: PadEvent) -> EventDisposition {
        let prevent_default = match event {
            PadEvent::Down { pointer, .. } | PadEvent::Move { pointer, .. } => {
                pointer == PointerKind::Touch || !self.disabled
            }
            _ => false,
        };

        if let PadEvent::Resize { container_width } = event {
            self.resize(container_width);
            return EventDisposition::default();
        }

        if self.disabled {
            return EventDisposition {
                prevent_default,
                drew: false,
            };
        }

        let drew = match (self.state, event) {
            (_, PadEvent::Down { x, y, .. }) => {
                self.state = DrawState::Drawing {
                    last: self.to_backing(x, y),
                };
                false
            }
            (DrawState::Drawing { last }, PadEvent::Move { x, y, .. }) => {
                let current = self.to_backing(x, y);
                self.surface
                    .stroke_segment(last, current, PEN_WIDTH * self.dpr);
                self.state = DrawState::Drawing { last: current };
                self.has_content = true;
                true
            }
            (_, PadEvent::Up | PadEvent::Leave) => {
                self.state = DrawState::Idle;
                false
            }
            _ => false,
        };

        EventDisposition {
            prevent_default,
            drew,
        }
    }

    /// Replay a sequence of events.
    pub fn replay<I: IntoIterator<Item = PadEvent>>(&mut self, events: I) {
        for event in events {
            self.handle(event);
        }
    }

    /// Re-lay the pad out for a new container width, keeping existing ink.
    ///
    /// The current content is captured at the new logical size, the backing
    /// buffer is rebuilt at `logical * dpr`, and the capture is drawn back.
    pub fn resize(&mut self, container_width: f64) {
        let logical = logical_size(container_width, self.aspect);
        let backing = backing_size(logical, self.dpr);

        let offscreen = self.surface.resampled(logical);
        self.surface = offscreen.resampled(backing);
        self.logical = logical;
        self.state = DrawState::Idle;
        tracing::debug!(
            width = logical.width,
            height = logical.height,
            backing_width = backing.width,
            backing_height = backing.height,
            "Signature pad resized",
        );
    }

    /// Blank the surface at its current backing resolution.
    pub fn clear(&mut self) {
        self.surface.fill_white();
        self.has_content = false;
        self.state = DrawState::Idle;
    }

    /// Encode the backing surface as PNG.
    ///
    /// Fails with [`CoreError::EmptyCanvas`] until a segment has been drawn.
    pub fn export_image(&self) -> Result<SignatureImage, CoreError> {
        if !self.has_content {
            return Err(CoreError::EmptyCanvas);
        }
        let png = self
            .surface
            .encode_png()
            .map_err(|e| CoreError::Internal(format!("Failed to encode signature: {e}")))?;
        Ok(SignatureImage {
            png,
            size: self.surface.size(),
        })
    }
}

/// Logical size for a container width: width within 100..=1600, height
/// derived from the aspect ratio and kept within 80..=800.
fn logical_size(container_width: f64, aspect: f64) -> PixelSize {
    let width =
        (container_width.max(0.0).floor() as u32).clamp(MIN_LOGICAL_WIDTH, MAX_LOGICAL_WIDTH);
    let height = ((f64::from(width) * aspect).floor() as u32)
        .clamp(MIN_LOGICAL_HEIGHT, MAX_LOGICAL_HEIGHT);
    PixelSize { width, height }
}

/// Density in `1.0..=MAX_DEVICE_PIXEL_RATIO`; non-finite or non-positive
/// ratios fall back to 1.
fn device_pixel_ratio(requested: f64) -> f64 {
    if requested.is_finite() && requested > 0.0 {
        requested.clamp(1.0, MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    }
}

fn backing_size(logical: PixelSize, dpr: f64) -> PixelSize {
    PixelSize {
        width: ((f64::from(logical.width) * dpr).round() as u32).max(1),
        height: ((f64::from(logical.height) * dpr).round() as u32).max(1),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn mouse_down(x: f64, y: f64) -> PadEvent {
        PadEvent::Down {
            pointer: PointerKind::Mouse,
            x,
            y,
        }
    }

    fn mouse_move(x: f64, y: f64) -> PadEvent {
        PadEvent::Move {
            pointer: PointerKind::Mouse,
            x,
            y,
        }
    }

    fn pad(dpr: f64, container_width: f64) -> SignaturePad {
        SignaturePad::new(
            PadConfig {
                device_pixel_ratio: dpr,
                ..Default::default()
            },
            container_width,
        )
    }

    /// Horizontal strokes every 2 logical px between y=90 and y=110,
    /// x from 100 to 300: a solid band on a 400-wide pad.
    fn draw_band(pad: &mut SignaturePad) {
        let mut y = 90.0;
        while y <= 110.0 {
            pad.replay([mouse_down(100.0, y), mouse_move(300.0, y), PadEvent::Up]);
            y += 2.0;
        }
    }

    #[test]
    fn layout_follows_container_and_density() {
        let p = pad(2.0, 400.0);
        assert_eq!(p.logical_size(), PixelSize { width: 400, height: 200 });
        assert_eq!(p.backing_size(), PixelSize { width: 800, height: 400 });
    }

    #[test]
    fn layout_clamps_to_minimums() {
        let p = pad(1.0, 50.0);
        assert_eq!(p.logical_size(), PixelSize { width: 100, height: 80 });
    }

    #[test]
    fn oversized_layout_is_clamped() {
        let p = pad(1000.0, 1e12);
        assert_eq!(p.logical_size(), PixelSize { width: 1600, height: 800 });
        assert_eq!(p.backing_size(), PixelSize { width: 4800, height: 2400 });

        let tall = SignaturePad::new(
            PadConfig {
                width: 1.0,
                height: 1e9,
                device_pixel_ratio: f64::NAN,
                disabled: false,
            },
            400.0,
        );
        assert_eq!(tall.logical_size(), PixelSize { width: 400, height: 800 });
        assert_eq!(tall.backing_size(), PixelSize { width: 400, height: 800 });
    }

    #[test]
    fn oversized_resize_is_clamped() {
        let mut p = pad(2.0, 400.0);
        p.replay([PadEvent::Resize {
            container_width: 60000.0,
        }]);
        assert_eq!(p.logical_size(), PixelSize { width: 1600, height: 800 });
        assert_eq!(p.backing_size(), PixelSize { width: 3200, height: 1600 });
    }

    #[test]
    fn far_off_surface_stroke_finishes() {
        let mut p = pad(1.0, 400.0);
        p.replay([mouse_down(10.0, 100.0), mouse_move(1e15, 100.0), PadEvent::Up]);
        assert!(p.has_content());
        assert_eq!(p.surface().luma_at(200, 100), Some(0));
    }

    #[test]
    fn invalid_dimensions_fall_back_to_half_aspect() {
        let config = PadConfig {
            width: 0.0,
            ..Default::default()
        };
        assert_eq!(config.aspect(), 0.5);
    }

    #[test]
    fn export_before_any_stroke_fails() {
        let p = pad(1.0, 400.0);
        assert_matches!(p.export_image(), Err(CoreError::EmptyCanvas));
    }

    #[test]
    fn down_alone_draws_nothing() {
        let mut p = pad(1.0, 400.0);
        let d = p.handle(mouse_down(50.0, 50.0));
        assert!(!d.drew);
        assert!(p.is_drawing());
        assert!(!p.has_content());
        assert_eq!(p.surface().luma_at(50, 50), Some(255));
    }

    #[test]
    fn one_segment_sets_content_and_exports() {
        let mut p = pad(1.0, 400.0);
        p.handle(mouse_down(10.0, 10.0));
        let d = p.handle(mouse_move(60.0, 10.0));
        assert!(d.drew);
        assert!(p.has_content());
        let image = p.export_image().unwrap();
        assert_eq!(image.size, p.backing_size());
        assert!(image.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn move_while_idle_draws_nothing() {
        let mut p = pad(1.0, 400.0);
        p.replay([mouse_down(10.0, 10.0), PadEvent::Leave, mouse_move(60.0, 10.0)]);
        assert!(!p.has_content());
    }

    #[test]
    fn strokes_land_in_backing_space() {
        let mut p = pad(2.0, 400.0);
        p.replay([mouse_down(100.0, 50.0), mouse_move(120.0, 50.0), PadEvent::Up]);
        // Logical (110, 50) is backing (220, 100).
        assert_eq!(p.surface().luma_at(220, 100), Some(0));
        assert_eq!(p.surface().luma_at(110, 50), Some(255));
    }

    #[test]
    fn origin_offset_is_subtracted() {
        let mut p = pad(1.0, 400.0);
        p.set_origin(Point::new(30.0, 40.0));
        p.replay([mouse_down(40.0, 50.0), mouse_move(80.0, 50.0)]);
        assert_eq!(p.surface().luma_at(30, 10), Some(0));
    }

    #[test]
    fn touch_always_prevents_default() {
        let mut p = pad(1.0, 400.0);
        p.set_disabled(true);
        let d = p.handle(PadEvent::Down {
            pointer: PointerKind::Touch,
            x: 1.0,
            y: 1.0,
        });
        assert!(d.prevent_default);
        assert!(!p.is_drawing());
    }

    #[test]
    fn disabled_pad_ignores_input() {
        let mut p = pad(1.0, 400.0);
        p.set_disabled(true);
        p.replay([mouse_down(10.0, 10.0), mouse_move(60.0, 10.0)]);
        assert!(!p.has_content());
    }

    #[test]
    fn clear_resets_content() {
        let mut p = pad(1.0, 400.0);
        p.replay([mouse_down(10.0, 10.0), mouse_move(60.0, 10.0), PadEvent::Up]);
        p.clear();
        assert!(!p.has_content());
        assert_eq!(p.surface().luma_at(30, 10), Some(255));
        assert_eq!(p.backing_size(), PixelSize { width: 400, height: 200 });
        assert_matches!(p.export_image(), Err(CoreError::EmptyCanvas));
    }

    #[test]
    fn shrinking_preserves_ink() {
        let mut p = pad(1.0, 400.0);
        draw_band(&mut p);
        p.resize(200.0);

        assert_eq!(p.logical_size(), PixelSize { width: 200, height: 100 });
        assert!(p.has_content());
        // Logical (200, 100) on the old pad is (100, 50) on the new one.
        assert!(p.surface().luma_at(100, 50).unwrap() < 64);
        assert!(p.surface().luma_at(5, 5).unwrap() > 192);
    }

    #[test]
    fn growing_preserves_ink_and_aspect() {
        let mut p = pad(1.0, 400.0);
        draw_band(&mut p);
        p.resize(800.0);

        assert_eq!(p.logical_size(), PixelSize { width: 800, height: 400 });
        assert!(p.surface().luma_at(400, 200).unwrap() < 64);
        assert!(p.surface().luma_at(790, 390).unwrap() > 192);
    }

    #[test]
    fn resize_keeps_density_scaling() {
        let mut p = pad(2.0, 400.0);
        draw_band(&mut p);
        p.resize(300.0);
        assert_eq!(p.backing_size(), PixelSize { width: 600, height: 300 });
        // Logical (200, 100) scales to (150, 75), backing (300, 150).
        assert!(p.surface().luma_at(300, 150).unwrap() < 64);
    }

    #[test]
    fn resize_event_in_replay() {
        let mut p = pad(1.0, 400.0);
        p.replay([PadEvent::Resize {
            container_width: 250.0,
        }]);
        assert_eq!(p.logical_size().width, 250);
    }
}
