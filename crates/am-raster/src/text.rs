use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use am_core::frame::FrameBuffer;

/// Total padding added around the measured text box (half on each side).
pub const PADDING: u32 = 40;

/// Left/top inset of the text within the padded surface.
pub const INSET: f32 = 20.0;

/// Surface pixel dimensions for a measured text box: padding added, then
/// rounded up to even numbers. Even dimensions avoid half-pixel sampling
/// artifacts downstream.
///
/// # Example
/// ```
/// use am_raster::text::surface_dims;
/// let (w, h) = surface_dims(101.3, 57.0);
/// assert_eq!((w, h), (142, 98));
/// assert_eq!(w % 2, 0);
/// assert_eq!(h % 2, 0);
/// ```
#[must_use]
pub fn surface_dims(text_width: f32, text_height: f32) -> (u32, u32) {
    let w = (text_width.max(0.0).ceil() as u32) + PADDING;
    let h = (text_height.max(0.0).ceil() as u32) + PADDING;
    (w.div_ceil(2) * 2, h.div_ceil(2) * 2)
}

/// The off-screen raster a `TextRaster` paints into, together with the
/// inputs that produced it. Recreated (not mutated) whenever its
/// dimensions change; repainted in place every frame.
pub struct RasterSurface {
    /// RGBA pixel buffer.
    pub pixels: FrameBuffer,
    /// Source string.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Fill color.
    pub color: (u8, u8, u8),
}

/// Renders a string to an off-screen RGBA raster.
///
/// Sizing is recomputed by `configure`; `paint` clears to transparency and
/// draws the text once, left-aligned, baseline offset by the font ascent.
/// Callers re-fetch texture data after each `paint`.
pub struct TextRaster {
    font: FontVec,
    surface: RasterSurface,
    ascent: f32,
}

impl TextRaster {
    /// Create an unconfigured raster. Call `configure` before `paint`.
    #[must_use]
    pub fn new(font: FontVec) -> Self {
        Self {
            font,
            surface: RasterSurface {
                pixels: FrameBuffer::new(2, 2),
                text: String::new(),
                font_size: 0.0,
                color: (255, 255, 255),
            },
            ascent: 0.0,
        }
    }

    /// Measure `text` and size the backing surface to its bounding box
    /// plus fixed padding, rounded up to even dimensions.
    ///
    /// Deterministic for a given font: same inputs, same surface. The
    /// pixel buffer is recreated only when the dimensions actually change.
    pub fn configure(&mut self, text: &str, font_size: f32, color: (u8, u8, u8)) {
        let scale = PxScale::from(font_size);
        let scaled = self.font.as_scaled(scale);
        let ascent = scaled.ascent();
        // ab_glyph descent is negative going down.
        let text_height = ascent - scaled.descent();
        let text_width = measure_width(&self.font, scale, text);

        let (w, h) = surface_dims(text_width, text_height);
        if w != self.surface.pixels.width || h != self.surface.pixels.height {
            self.surface.pixels = FrameBuffer::new(w, h);
        }
        self.surface.text = text.to_string();
        self.surface.font_size = font_size;
        self.surface.color = color;
        self.ascent = ascent;
    }

    /// Clear the surface to full transparency and draw the text once.
    ///
    /// Left-aligned at the inset, baseline adjusted by the font ascent.
    /// Mutates the backing raster in place.
    pub fn paint(&mut self) {
        self.surface.pixels.clear();

        let scale = PxScale::from(self.surface.font_size);
        let scaled = self.font.as_scaled(scale);
        let (cr, cg, cb) = self.surface.color;
        let baseline = INSET + self.ascent;

        let mut pen_x = INSET;
        let mut prev_glyph = None;
        // Split borrows: the draw closure writes pixels while the font is read.
        let pixels = &mut self.surface.pixels;
        for ch in self.surface.text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = prev_glyph {
                pen_x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(pen_x, baseline));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, v| {
                    let px = gx as i64 + bounds.min.x as i64;
                    let py = gy as i64 + bounds.min.y as i64;
                    if px < 0 || py < 0 {
                        return;
                    }
                    let (px, py) = (px as u32, py as u32);
                    let alpha = (v * 255.0).round() as u8;
                    // Max-blend so overlapping outlines never darken.
                    let (_, _, _, prev_a) = pixels.pixel(px, py);
                    if alpha > prev_a {
                        pixels.set_pixel(px, py, (cr, cg, cb, alpha));
                    }
                });
            }
            pen_x += scaled.h_advance(id);
            prev_glyph = Some(id);
        }
    }

    /// The painted surface. Texture data must be re-fetched after each
    /// `paint`.
    #[must_use]
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.surface.pixels.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.surface.pixels.height
    }

    /// Width / height of the current surface.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.surface.pixels.width as f32 / self.surface.pixels.height.max(1) as f32
    }
}

fn measure_width(font: &FontVec, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::resolve_font;

    #[test]
    fn dims_are_even_and_padded() {
        for w in [0.0, 1.0, 99.5, 100.0, 333.7] {
            for h in [1.0, 57.2, 240.0] {
                let (sw, sh) = surface_dims(w, h);
                assert_eq!(sw % 2, 0);
                assert_eq!(sh % 2, 0);
                assert!(sw >= w.ceil() as u32 + PADDING);
                assert!(sh >= h.ceil() as u32 + PADDING);
                // Even rounding adds at most one pixel.
                assert!(sw <= w.ceil() as u32 + PADDING + 1);
                assert!(sh <= h.ceil() as u32 + PADDING + 1);
            }
        }
    }

    #[test]
    fn configure_then_paint_produces_opaque_pixels() {
        // Needs a platform font; skip quietly on bare systems.
        let Ok(font) = resolve_font(None) else {
            return;
        };
        let mut raster = TextRaster::new(font);
        raster.configure("AB", 200.0, (253, 249, 243));
        assert_eq!(raster.width() % 2, 0);
        assert_eq!(raster.height() % 2, 0);
        assert!(raster.width() > PADDING);
        assert!(raster.height() > PADDING);

        raster.paint();
        let visible = raster
            .surface()
            .pixels
            .data
            .chunks_exact(4)
            .filter(|px| px[3] > 0)
            .count();
        assert!(visible > 100, "text did not rasterize ({visible} px)");
    }

    #[test]
    fn reconfigure_with_same_inputs_keeps_dimensions() {
        let Ok(font) = resolve_font(None) else {
            return;
        };
        let mut raster = TextRaster::new(font);
        raster.configure("hello", 120.0, (255, 255, 255));
        let dims = (raster.width(), raster.height());
        raster.configure("hello", 120.0, (255, 255, 255));
        assert_eq!((raster.width(), raster.height()), dims);
    }
}
