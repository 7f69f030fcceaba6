/// Default ramp, ordered sparse→dense. 67 characters.
pub const RAMP_STANDARD: &str =
    " .'`^\",:;Il!i~+_-?][}{1)(|/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Compact 10-character ramp, good contrast at small grid sizes.
pub const RAMP_COMPACT: &str = " .:-=+*#%@";

/// Glyph index for a normalized luminance value.
///
/// `floor((1 − L) × (R − 1))` clamped into `[0, R − 1]`, so bright pixels
/// map to the sparse end of the ramp. Inversion exactly mirrors the index.
///
/// # Example
/// ```
/// use am_core::ramp::glyph_index;
/// assert_eq!(glyph_index(1.0, 70, false), 0);
/// assert_eq!(glyph_index(0.0, 70, false), 69);
/// assert_eq!(glyph_index(0.0, 70, true), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn glyph_index(luminance: f32, ramp_len: usize, invert: bool) -> usize {
    debug_assert!(ramp_len >= 2, "ramp too short");
    let last = ramp_len - 1;
    let idx = (((1.0 - luminance.clamp(0.0, 1.0)) * last as f32) as usize).min(last);
    if invert { last - idx } else { idx }
}

/// An ordered character ramp with the pixel→glyph mapping law.
///
/// # Example
/// ```
/// use am_core::ramp::GlyphRamp;
/// let ramp = GlyphRamp::new(" .:#@");
/// assert_eq!(ramp.len(), 5);
/// // Fully transparent pixels are always blank, regardless of color.
/// assert_eq!(ramp.map_pixel(255, 255, 255, 0, false), ' ');
/// // Pure white, no inversion: sparsest glyph.
/// assert_eq!(ramp.map_pixel(255, 255, 255, 255, false), ' ');
/// ```
pub struct GlyphRamp {
    chars: Vec<char>,
}

impl GlyphRamp {
    /// Build a ramp from a charset ordered sparse→dense.
    ///
    /// Charsets with fewer than 2 characters fall back to a minimal ramp.
    #[must_use]
    pub fn new(charset: &str) -> Self {
        let chars: Vec<char> = charset.chars().collect();
        if chars.len() < 2 {
            return Self {
                chars: vec![' ', '@'],
            };
        }
        Self { chars }
    }

    /// Number of characters in the ramp.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; construction guarantees at least 2 characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at a raw ramp index (clamped).
    #[inline]
    #[must_use]
    pub fn glyph_at(&self, idx: usize) -> char {
        self.chars[idx.min(self.chars.len() - 1)]
    }

    /// Map one RGBA pixel to a glyph.
    ///
    /// Luminance is 0.3·R + 0.6·G + 0.1·B normalized to [0, 1]. Fully
    /// transparent pixels always map to a space.
    #[inline(always)]
    #[must_use]
    pub fn map_pixel(&self, r: u8, g: u8, b: u8, a: u8, invert: bool) -> char {
        if a == 0 {
            return ' ';
        }
        let lum =
            (0.3 * f32::from(r) + 0.6 * f32::from(g) + 0.1 * f32::from(b)) / 255.0;
        self.chars[glyph_index(lum, self.chars.len(), invert)]
    }
}
