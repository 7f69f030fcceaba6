/// Configuration, types, and shared structures for asciimesh.
///
/// This crate contains all shared types, the glyph ramp math, and
/// configuration logic used across the asciimesh workspace.

pub mod color;
pub mod config;
pub mod ease;
pub mod error;
pub mod frame;
pub mod ramp;

pub use config::EffectConfig;
pub use ease::Damped;
pub use error::CoreError;
pub use frame::{FrameBuffer, GlyphGrid};
pub use ramp::GlyphRamp;
