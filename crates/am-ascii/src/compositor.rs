use am_core::CoreError;
use am_core::ease::Damped;
use am_core::frame::{FrameBuffer, GlyphGrid};
use am_core::ramp::GlyphRamp;
use am_scene::SceneRenderer;
use glam::Vec2;

use crate::validity::ValidityState;

/// Monospace cell aspect: a glyph cell is 0.6 em wide per 1 em tall.
pub const CELL_WIDTH_RATIO: f32 = 0.6;
/// Per-frame fraction the hue closes toward the pointer-derived angle.
const HUE_FACTOR: f32 = 0.075;
/// The content heuristic inspects every 100th pixel of the sampling canvas.
const CONTENT_SAMPLE_STRIDE: usize = 100;
/// More than this many sampled pixels must be non-transparent.
const CONTENT_MIN_HITS: u32 = 10;
/// Fade-in duration once content is first detected.
const FADE_SECS: f32 = 1.5;

/// What `capture_frame` did with the scene's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The glyph grid was rebuilt from this frame.
    Updated,
    /// The frame was dropped (warm-up, zero-sized surface, failed
    /// readback, or no sampled content). The previous grid contents stand.
    Skipped,
}

/// Converts rendered frames into the glyph overlay.
///
/// Owns the sampling canvas, the glyph grid, the validity gating, and the
/// pointer-driven hue rotation. Every per-frame failure is absorbed here:
/// `capture_frame` reports `Skipped` instead of surfacing an error, because
/// a dropped frame is invisible while a crashed loop is not.
pub struct AsciiCompositor {
    font_size: f32,
    ramp: GlyphRamp,
    invert: bool,
    width: f32,
    height: f32,
    cols: u16,
    rows: u16,
    sample: FrameBuffer,
    grid: GlyphGrid,
    validity: ValidityState,
    hue: Damped,
    visible_since: Option<f32>,
}

impl AsciiCompositor {
    /// Build a compositor with no surface yet; `set_size` attaches one.
    #[must_use]
    pub fn new(ascii_font_size: f32, charset: &str, invert: bool) -> Self {
        Self {
            font_size: ascii_font_size.max(1.0),
            ramp: GlyphRamp::new(charset),
            invert,
            width: 0.0,
            height: 0.0,
            cols: 0,
            rows: 0,
            sample: FrameBuffer::new(0, 0),
            grid: GlyphGrid::new(0, 0),
            validity: ValidityState::new(),
            hue: Damped::new(0.0, HUE_FACTOR),
            visible_since: None,
        }
    }

    /// Resize the overlay surface. Dimensions are floored to whole pixels;
    /// non-positive sizes detach the surface until a real size arrives.
    ///
    /// Calling twice with the same size is a no-op: the sampling canvas and
    /// grid allocations are reused whenever the cell count is unchanged.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.floor().max(0.0);
        self.height = height.floor().max(0.0);
        self.rebuild_grid();
    }

    /// Change the overlay font size and re-derive the cell grid.
    pub fn set_font_size(&mut self, ascii_font_size: f32) {
        self.font_size = ascii_font_size.max(1.0);
        self.rebuild_grid();
    }

    /// Flip the luminance→glyph mapping. Takes effect next frame.
    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    /// Replace the glyph ramp. Grid and validity state are untouched.
    pub fn set_ramp(&mut self, charset: &str) {
        self.ramp = GlyphRamp::new(charset);
    }

    fn rebuild_grid(&mut self) {
        let cols = (self.width / (self.font_size * CELL_WIDTH_RATIO)) as u16;
        let rows = (self.height / self.font_size) as u16;
        if cols == self.cols && rows == self.rows {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        self.sample = FrameBuffer::new(u32::from(cols), u32::from(rows));
        self.grid = GlyphGrid::new(cols, rows);
        log::debug!("overlay grid {cols}×{rows} at font size {}", self.font_size);
    }

    /// Render one frame through the scene and rebuild the glyph grid.
    ///
    /// `pointer_px` is the pointer position in surface pixels; it drives
    /// both the mesh rotation (normalized) and the hue angle (relative to
    /// the surface center).
    pub fn capture_frame(
        &mut self,
        scene: &mut SceneRenderer,
        elapsed_secs: f32,
        pointer_px: Vec2,
    ) -> CaptureOutcome {
        let pointer_norm = if self.width > 0.0 && self.height > 0.0 {
            Vec2::new(pointer_px.x / self.width, pointer_px.y / self.height)
        } else {
            Vec2::splat(0.5)
        };
        let frame = scene.render_frame(elapsed_secs, pointer_norm);

        // First frames carry initialization garbage; render them, never
        // sample them.
        if self.validity.begin_frame() {
            return CaptureOutcome::Skipped;
        }
        if self.cols == 0 || self.rows == 0 {
            return CaptureOutcome::Skipped;
        }
        if frame.width == 0 || frame.height == 0 {
            self.validity.record_invalid();
            return CaptureOutcome::Skipped;
        }
        if let Err(err) = readback(&mut self.sample, frame) {
            // Transient; the next frame retries from scratch.
            log::debug!("frame readback dropped: {err}");
            self.validity.record_invalid();
            return CaptureOutcome::Skipped;
        }

        // No content, no update: the overlay freezes on the last valid
        // frame instead of blanking out on a transient transparent one.
        if content_hits(&self.sample) <= CONTENT_MIN_HITS {
            self.validity.record_invalid();
            return CaptureOutcome::Skipped;
        }
        if self.validity.record_valid() {
            self.visible_since = Some(elapsed_secs);
            log::info!(
                "overlay visible after {} frames",
                self.validity.frame_count()
            );
        }

        self.asciify();

        if self.validity.is_visible() {
            let dx = pointer_px.x - self.width / 2.0;
            let dy = pointer_px.y - self.height / 2.0;
            self.hue.step(dy.atan2(dx).to_degrees());
        }

        CaptureOutcome::Updated
    }

    /// Map every sampled pixel to a ramp glyph. The grid is rebuilt whole;
    /// no diffing against the previous frame.
    fn asciify(&mut self) {
        for cy in 0..self.rows {
            for cx in 0..self.cols {
                let (r, g, b, a) = self.sample.pixel(u32::from(cx), u32::from(cy));
                self.grid.set(cx, cy, self.ramp.map_pixel(r, g, b, a, self.invert));
            }
        }
    }

    /// The current glyph grid.
    #[must_use]
    pub fn grid(&self) -> &GlyphGrid {
        &self.grid
    }

    /// The downsampled frame behind the grid, for per-cell coloring.
    #[must_use]
    pub fn sample(&self) -> &FrameBuffer {
        &self.sample
    }

    /// Grid dimensions in cells (columns, rows).
    #[must_use]
    pub fn cell_dims(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// True once any frame has passed the content heuristic.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.validity.is_visible()
    }

    /// Lifecycle stage, for status display.
    #[must_use]
    pub fn stage(&self) -> crate::validity::Stage {
        self.validity.stage()
    }

    /// Smoothed hue rotation in degrees.
    #[must_use]
    pub fn hue_degrees(&self) -> f32 {
        self.hue.value()
    }

    /// The hue filter in wire format, one decimal place.
    ///
    /// # Example
    /// ```
    /// use am_ascii::AsciiCompositor;
    /// let c = AsciiCompositor::new(8.0, " .:#@", false);
    /// assert_eq!(c.filter_value(), "hue-rotate(0.0deg)");
    /// ```
    #[must_use]
    pub fn filter_value(&self) -> String {
        format!("hue-rotate({:.1}deg)", self.hue.value())
    }

    /// Overlay opacity at the given time: 0 until content is detected,
    /// then an ease-in-out ramp to 1 over the fade duration.
    #[must_use]
    pub fn opacity(&self, elapsed_secs: f32) -> f32 {
        match self.visible_since {
            None => 0.0,
            Some(t0) => {
                let x = ((elapsed_secs - t0) / FADE_SECS).clamp(0.0, 1.0);
                x * x * (3.0 - 2.0 * x)
            }
        }
    }
}

/// Nearest-neighbor downsample of the rendered frame into the sampling
/// canvas. Smoothing would blur glyph boundaries, so each cell takes the
/// single frame pixel its center maps onto.
fn readback(sample: &mut FrameBuffer, frame: &FrameBuffer) -> Result<(), CoreError> {
    if sample.width == 0 || sample.height == 0 {
        return Err(CoreError::Readback("sampling canvas is empty".into()));
    }
    for cy in 0..sample.height {
        let py = cy * frame.height / sample.height;
        for cx in 0..sample.width {
            let px = cx * frame.width / sample.width;
            sample.set_pixel(cx, cy, frame.pixel(px, py));
        }
    }
    Ok(())
}

/// Alpha-probe every 100th pixel of the sampling canvas and count hits.
fn content_hits(sample: &FrameBuffer) -> u32 {
    sample
        .data
        .iter()
        .skip(3)
        .step_by(CONTENT_SAMPLE_STRIDE * 4)
        .filter(|&&a| a > 0)
        .count() as u32
}
