/// Frame-to-glyph conversion with visibility gating.
///
/// Samples the scene's rendered pixels into a small cell grid, maps
/// luminance to ramp glyphs, and owns the warm-up / content-heuristic /
/// fade-in state machine plus the pointer-driven hue rotation.

pub mod compositor;
pub mod validity;

pub use compositor::AsciiCompositor;
pub use validity::{Stage, ValidityState};
