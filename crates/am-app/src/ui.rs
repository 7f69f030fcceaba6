use std::collections::VecDeque;
use std::time::Instant;

use am_ascii::AsciiCompositor;
use am_core::color::hue_rotate;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use crate::orchestrator::Orchestrator;

/// Everything the draw pass reads, borrowed for one frame.
pub struct DrawContext<'a> {
    pub orchestrator: &'a Orchestrator,
    /// Seconds since the effect started, for the fade-in curve.
    pub elapsed: f32,
    pub fps: f64,
    pub paused: bool,
    /// Text-edit buffer when the editor is open.
    pub editing: Option<&'a str>,
}

/// Sliding-window FPS counter. Zero allocation after init.
pub struct FpsCounter {
    timestamps: VecDeque<Instant>,
    window: usize,
    fps: f64,
}

impl FpsCounter {
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(window + 1),
            window,
            fps: 0.0,
        }
    }

    /// Call once per frame, after the draw.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.timestamps.push_back(now);
        if self.timestamps.len() > self.window {
            self.timestamps.pop_front();
        }
        if self.timestamps.len() >= 2 {
            let first = self.timestamps.front().copied().unwrap_or(now);
            let secs = now.duration_since(first).as_secs_f64();
            if secs > 0.0 {
                self.fps = (self.timestamps.len() - 1) as f64 / secs;
            }
        }
    }

    /// Average FPS over the window.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Top-level draw: glyph overlay plus one status row at the bottom.
pub fn draw(frame: &mut Frame, ctx: &DrawContext) {
    let area = frame.area();
    if area.height == 0 {
        return;
    }
    let overlay_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height - 1,
        height: 1,
        ..area
    };

    let buf = frame.buffer_mut();
    if let Some(compositor) = ctx.orchestrator.compositor() {
        render_overlay(buf, overlay_area, compositor, ctx.elapsed);
    }
    render_status(buf, status_area, ctx);
}

/// Write the glyph grid directly into the ratatui buffer.
///
/// No Canvas widget, direct cell writes. Each glyph takes its color from
/// the sampled frame pixel behind it, hue-rotated by the pointer angle and
/// scaled by the fade-in opacity.
pub fn render_overlay(buf: &mut Buffer, area: Rect, compositor: &AsciiCompositor, elapsed: f32) {
    let opacity = compositor.opacity(elapsed);
    if opacity <= 0.0 {
        return;
    }
    let hue = compositor.hue_degrees();
    let grid = compositor.grid();
    let sample = compositor.sample();

    for cy in 0..grid.height.min(area.height) {
        for cx in 0..grid.width.min(area.width) {
            let ch = grid.get(cx, cy);
            if ch == ' ' {
                continue;
            }
            if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                let (r, g, b, _) = sample.pixel(u32::from(cx), u32::from(cy));
                let (r, g, b) = hue_rotate(r, g, b, hue);
                cell.set_char(ch).set_fg(Color::Rgb(
                    (f32::from(r) * opacity) as u8,
                    (f32::from(g) * opacity) as u8,
                    (f32::from(b) * opacity) as u8,
                ));
            }
        }
    }
}

fn render_status(buf: &mut Buffer, area: Rect, ctx: &DrawContext) {
    let line = if let Some(text) = ctx.editing {
        format!(" text: {text}\u{2588}  (Enter apply, Esc cancel)")
    } else {
        let config = ctx.orchestrator.config();
        let stage = ctx
            .orchestrator
            .compositor()
            .map_or("detached".to_string(), |c| format!("{:?}", c.stage()));
        let state = if ctx.paused { "paused" } else { "live" };
        format!(
            " asciimesh \u{2502} {} \u{2502} {stage} \u{2502} {:.0} fps \u{2502} {state} \u{2502} q quit  space pause  w waves  i invert  -/+ size  e text",
            config.text, ctx.fps,
        )
    };
    buf.set_stringn(
        area.x,
        area.y,
        line,
        area.width as usize,
        Style::default().fg(Color::DarkGray),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_counter_reports_zero_before_two_ticks() {
        let mut counter = FpsCounter::new(60);
        assert!(counter.fps().abs() < f64::EPSILON);
        counter.tick();
        assert!(counter.fps().abs() < f64::EPSILON);
    }

    #[test]
    fn fps_counter_window_is_bounded() {
        let mut counter = FpsCounter::new(4);
        for _ in 0..20 {
            counter.tick();
        }
        assert!(counter.timestamps.len() <= 5);
        assert!(counter.fps() > 0.0);
    }

    #[test]
    fn invisible_compositor_leaves_buffer_untouched() {
        let compositor = AsciiCompositor::new(8.0, " .:#@", false);
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        let before = buf.clone();
        render_overlay(&mut buf, area, &compositor, 5.0);
        assert_eq!(buf, before, "opacity 0 must not paint");
    }
}
