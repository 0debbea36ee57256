//! Opaque raster drawing surface.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};

use super::mapping::{PixelSize, Point};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Distance between consecutive pen stamps along a segment, in pixels.
const STAMP_SPACING: f64 = 0.5;

/// A white-filled RGBA buffer that strokes are drawn onto.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    pub fn blank(size: PixelSize) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width.max(1), size.height.max(1), WHITE),
        }
    }

    pub fn size(&self) -> PixelSize {
        let (width, height) = self.image.dimensions();
        PixelSize { width, height }
    }

    pub fn fill_white(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = WHITE;
        }
    }

    /// Draw a round-capped line of `width` pixels from `from` to `to`.
    ///
    /// The segment is clipped to the surface first, so only the visible part
    /// is stamped however far off-surface its endpoints lie.
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f64) {
        let radius = (width / 2.0).max(0.5);
        let Some((from, to)) = self.clip(from, to, radius) else {
            return;
        };
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let steps = ((dx.hypot(dy) / STAMP_SPACING).ceil() as usize).max(1);
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            self.stamp(from.x + dx * t, from.y + dy * t, radius);
        }
    }

    /// Liang-Barsky clip of `from -> to` against the surface grown by
    /// `margin` on every side. `None` when nothing of the segment is inside
    /// or an endpoint is not finite.
    fn clip(&self, from: Point, to: Point, margin: f64) -> Option<(Point, Point)> {
        if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (w, h) = self.image.dimensions();
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let bounds = [
            (-dx, from.x + margin),
            (dx, f64::from(w) + margin - from.x),
            (-dy, from.y + margin),
            (dy, f64::from(h) + margin - from.y),
        ];

        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in bounds {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        Some((
            Point::new(from.x + dx * t0, from.y + dy * t0),
            Point::new(from.x + dx * t1, from.y + dy * t1),
        ))
    }

    fn stamp(&mut self, cx: f64, cy: f64, radius: f64) {
        let (w, h) = self.image.dimensions();
        let x0 = ((cx - radius).floor() as i64).max(0);
        let y0 = ((cy - radius).floor() as i64).max(0);
        let x1 = ((cx + radius).ceil() as i64).min(i64::from(w) - 1);
        let y1 = ((cy + radius).ceil() as i64).min(i64::from(h) - 1);
        let r2 = radius * radius;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let ddx = px as f64 + 0.5 - cx;
                let ddy = py as f64 + 0.5 - cy;
                if ddx * ddx + ddy * ddy <= r2 {
                    self.image.put_pixel(px as u32, py as u32, INK);
                }
            }
        }
    }

    /// Rescale the content to `size` with bilinear filtering.
    pub fn resampled(&self, size: PixelSize) -> Self {
        Self {
            image: imageops::resize(
                &self.image,
                size.width.max(1),
                size.height.max(1),
                FilterType::Triangle,
            ),
        }
    }

    /// Luma of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn luma_at(&self, x: u32, y: u32) -> Option<u8> {
        let (w, h) = self.image.dimensions();
        if x >= w || y >= h {
            return None;
        }
        let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
        Some(((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: u32, height: u32) -> PixelSize {
        PixelSize { width, height }
    }

    #[test]
    fn blank_surface_is_white() {
        let s = Surface::blank(size(10, 10));
        assert_eq!(s.luma_at(0, 0), Some(255));
        assert_eq!(s.luma_at(9, 9), Some(255));
        assert_eq!(s.luma_at(10, 0), None);
    }

    #[test]
    fn segment_inks_its_path() {
        let mut s = Surface::blank(size(50, 20));
        s.stroke_segment(Point::new(5.0, 10.0), Point::new(45.0, 10.0), 2.0);
        assert_eq!(s.luma_at(25, 10), Some(0));
        assert_eq!(s.luma_at(25, 2), Some(255));
    }

    #[test]
    fn off_surface_segment_is_clipped() {
        let mut s = Surface::blank(size(10, 10));
        s.stroke_segment(Point::new(-20.0, -20.0), Point::new(-5.0, -5.0), 2.0);
        assert!((0..10).all(|x| s.luma_at(x, 0) == Some(255)));
    }

    #[test]
    fn distant_endpoint_keeps_visible_part() {
        let mut s = Surface::blank(size(40, 20));
        s.stroke_segment(Point::new(-1e15, 10.0), Point::new(1e15, 10.0), 2.0);
        assert_eq!(s.luma_at(0, 10), Some(0));
        assert_eq!(s.luma_at(39, 10), Some(0));
        assert_eq!(s.luma_at(20, 2), Some(255));
    }

    #[test]
    fn non_finite_segment_is_skipped() {
        let mut s = Surface::blank(size(10, 10));
        s.stroke_segment(Point::new(f64::NAN, 5.0), Point::new(9.0, 5.0), 2.0);
        s.stroke_segment(Point::new(0.0, 5.0), Point::new(f64::INFINITY, 5.0), 2.0);
        assert!((0..10).all(|x| s.luma_at(x, 5) == Some(255)));
    }

    #[test]
    fn png_has_signature_bytes() {
        let png = Surface::blank(size(4, 4)).encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
