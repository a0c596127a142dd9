//! CPU drawing surface: transformed alpha-over draws and matte application.

use framecut_core::{Matte, Raster, Rect, Rgba, Vec2};
use framecut_timeline::MatteRef;
use glam::Affine2;

/// Placement of a source raster on the canvas. `center` is the destination
/// of the source's visual center, in canvas pixels; rotation is about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center: Vec2,
    pub scale: Vec2,
    pub rotation_degrees: f32,
}

impl Placement {
    fn to_affine(self, src_size: Vec2) -> Affine2 {
        Affine2::from_scale_angle_translation(
            self.scale,
            self.rotation_degrees.to_radians(),
            self.center,
        ) * Affine2::from_translation(-src_size * 0.5)
    }
}

/// An RGBA8 drawing surface, straight alpha.
#[derive(Debug, Clone)]
pub struct Surface {
    raster: Raster,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn into_raster(self) -> Raster {
        self.raster
    }

    /// Fill with a solid color.
    pub fn clear(&mut self, color: Rgba) {
        self.raster.fill(color);
    }

    /// Reset to fully transparent.
    pub fn clear_transparent(&mut self) {
        self.raster.fill([0, 0, 0, 0]);
    }

    /// Checkerboard underlay marking transparent regions in the preview.
    pub fn fill_checkerboard(&mut self, cell: u32, light: Rgba, dark: Rgba) {
        let cell = cell.max(1);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 {
                    light
                } else {
                    dark
                };
                self.raster.set_pixel(x, y, color);
            }
        }
    }

    /// Draw a raster with translate/scale/rotate about its center, alpha-over
    /// at the given opacity.
    ///
    /// Destination pixels are inverse-mapped into the source and sampled
    /// nearest-neighbor, so the same placement math produces bit-identical
    /// output wherever it runs.
    pub fn draw_raster(&mut self, src: &Raster, placement: &Placement, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity == 0.0 || src.width() == 0 || src.height() == 0 {
            return;
        }

        let src_size = Vec2::new(src.width() as f32, src.height() as f32);
        let forward = placement.to_affine(src_size);
        let inverse = forward.inverse();

        // Destination bounding box from the transformed source corners.
        let corners = [
            forward.transform_point2(Vec2::ZERO),
            forward.transform_point2(Vec2::new(src_size.x, 0.0)),
            forward.transform_point2(Vec2::new(0.0, src_size.y)),
            forward.transform_point2(src_size),
        ];
        let min_x = corners.iter().map(|c| c.x).fold(f32::MAX, f32::min);
        let min_y = corners.iter().map(|c| c.y).fold(f32::MAX, f32::min);
        let max_x = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max);
        let max_y = corners.iter().map(|c| c.y).fold(f32::MIN, f32::max);

        let x0 = (min_x.floor().max(0.0)) as u32;
        let y0 = (min_y.floor().max(0.0)) as u32;
        let x1 = (max_x.ceil().min(self.width() as f32)) as u32;
        let y1 = (max_y.ceil().min(self.height() as f32)) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let dst_point = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let src_point = inverse.transform_point2(dst_point);
                if src_point.x < 0.0
                    || src_point.y < 0.0
                    || src_point.x >= src_size.x
                    || src_point.y >= src_size.y
                {
                    continue;
                }
                let sample = src.pixel(src_point.x as u32, src_point.y as u32);
                self.blend_pixel(x, y, sample, opacity);
            }
        }
    }

    /// Straight-alpha "over" of one source pixel.
    #[inline]
    fn blend_pixel(&mut self, x: u32, y: u32, src: Rgba, opacity: f32) {
        let sa = (src[3] as f32 / 255.0) * opacity;
        if sa <= 0.0 {
            return;
        }
        let dst = self.raster.pixel(x, y);
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let mut out = [0u8; 4];
        for c in 0..3 {
            let sc = src[c] as f32;
            let dc = dst[c] as f32;
            out[c] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
        }
        out[3] = (out_a * 255.0).round() as u8;
        self.raster.set_pixel(x, y, out);
    }

    /// Destination-alpha multiply by a matte sample. White keeps, black
    /// erases. A matte of a different size is sampled proportionally.
    pub fn apply_matte(&mut self, matte: &MatteRef<'_>) {
        let (w, h) = (self.width(), self.height());
        let coverage = |m: &Matte, x: u32, y: u32| -> f32 {
            let mx = (x as u64 * m.width() as u64 / w.max(1) as u64) as u32;
            let my = (y as u64 * m.height() as u64 / h.max(1) as u64) as u32;
            m.sample(mx, my) as f32 / 255.0
        };

        for y in 0..h {
            for x in 0..w {
                let c = match matte {
                    MatteRef::Single(m) => coverage(m, x, y),
                    MatteRef::Blend { from, to, t } => {
                        coverage(from, x, y) * (1.0 - t) + coverage(to, x, y) * t
                    }
                };
                let mut px = self.raster.pixel(x, y);
                px[3] = (px[3] as f32 * c).round() as u8;
                self.raster.set_pixel(x, y, px);
            }
        }
    }

    /// Alpha-over another surface of the same size at an extra opacity.
    pub fn composite_over(&mut self, src: &Surface, opacity: f32) {
        let w = self.width().min(src.width());
        let h = self.height().min(src.height());
        for y in 0..h {
            for x in 0..w {
                self.blend_pixel(x, y, src.raster.pixel(x, y), opacity);
            }
        }
    }

    /// Scale a raster into a destination rectangle (nearest), alpha-over.
    /// Used by the preview fit; the letterbox area is left untouched.
    pub fn blit_scaled(&mut self, src: &Raster, dst: Rect) {
        if dst.width <= 0.0 || dst.height <= 0.0 {
            return;
        }
        let x0 = dst.x.floor().max(0.0) as u32;
        let y0 = dst.y.floor().max(0.0) as u32;
        let x1 = (dst.x + dst.width).ceil().min(self.width() as f32) as u32;
        let y1 = (dst.y + dst.height).ceil().min(self.height() as f32) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let u = ((x as f32 + 0.5 - dst.x) / dst.width).clamp(0.0, 1.0);
                let v = ((y as f32 + 0.5 - dst.y) / dst.height).clamp(0.0, 1.0);
                let sx = ((u * src.width() as f32) as u32).min(src.width().saturating_sub(1));
                let sy = ((v * src.height() as f32) as u32).min(src.height().saturating_sub(1));
                self.blend_pixel(x, y, src.pixel(sx, sy), 1.0);
            }
        }
    }
}
