/// Off-screen text rasterization.
///
/// Renders the effect's source string to an RGBA raster that the scene
/// consumes as its quad texture. Software rasterization via ab_glyph;
/// no platform text stack involved.

pub mod font;
pub mod text;

pub use font::resolve_font;
pub use text::{RasterSurface, TextRaster};
