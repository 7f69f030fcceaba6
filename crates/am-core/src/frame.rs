/// Reusable pixel buffer. Stores pixels in RGBA row-major, 4 bytes per pixel.
///
/// Recreated when dimensions change, overwritten in place every frame.
///
/// # Example
/// ```
/// use am_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// RGBA pixels, row-major, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a buffer pre-allocated to the given dimensions, fully transparent.
    ///
    /// # Example
    /// ```
    /// use am_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.height, 50);
    /// assert_eq!(fb.data.len(), 100 * 50 * 4);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; (width * height * 4) as usize],
            width,
            height,
        }
    }

    /// Clear every pixel to fully transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Pixel access at (x, y) → (r, g, b, a).
    ///
    /// Out-of-bounds reads return transparent black instead of panicking;
    /// the glyph mapping treats those as blank cells.
    ///
    /// # Example
    /// ```
    /// use am_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(10, 10);
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
    /// assert_eq!(fb.pixel(99, 99), (0, 0, 0, 0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0, 0, 0, 0);
        }
        let idx = ((y * self.width + x) * 4) as usize;
        if idx + 3 >= self.data.len() {
            return (0, 0, 0, 0);
        }
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Write the pixel at (x, y). No-op when out of bounds.
    #[inline(always)]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: (u8, u8, u8, u8)) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        self.data[idx] = rgba.0;
        self.data[idx + 1] = rgba.1;
        self.data[idx + 2] = rgba.2;
        self.data[idx + 3] = rgba.3;
    }

    /// Perceptual luminance, green-weighted: 0.3·R + 0.6·G + 0.1·B.
    ///
    /// # Example
    /// ```
    /// use am_core::frame::FrameBuffer;
    /// let mut fb = FrameBuffer::new(1, 1);
    /// fb.data.copy_from_slice(&[255, 255, 255, 255]);
    /// assert_eq!(fb.luminance(0, 0), 255);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luminance(&self, x: u32, y: u32) -> u8 {
        let (r, g, b, _) = self.pixel(x, y);
        ((u32::from(r) * 3 + u32::from(g) * 6 + u32::from(b)) / 10) as u8
    }
}

/// Character grid produced by the compositor. Pre-allocated, rebuilt from
/// scratch every frame (never diffed against the previous frame).
///
/// # Example
/// ```
/// use am_core::frame::GlyphGrid;
/// let mut grid = GlyphGrid::new(4, 2);
/// grid.set(0, 0, '@');
/// assert_eq!(grid.get(0, 0), '@');
/// ```
#[derive(Clone)]
pub struct GlyphGrid {
    /// Flat array of characters, row-major.
    pub cells: Vec<char>,
    /// Width in characters (columns).
    pub width: u16,
    /// Height in characters (rows).
    pub height: u16,
}

impl GlyphGrid {
    /// Create a grid pre-filled with spaces.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![' '; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    /// Set the character at (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u16, y: u16, ch: char) {
        self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)] = ch;
    }

    /// Character at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> char {
        self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    /// Reset all cells to spaces.
    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// The grid as one string, each row terminated by a newline.
    ///
    /// This is the overlay wire format: the string is assigned verbatim as
    /// the text content of the overlay.
    ///
    /// # Example
    /// ```
    /// use am_core::frame::GlyphGrid;
    /// let grid = GlyphGrid::new(2, 2);
    /// assert_eq!(grid.to_text(), "  \n  \n");
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out =
            String::with_capacity((usize::from(self.width) + 1) * usize::from(self.height));
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.get(x, y));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_out_of_bounds_is_transparent() {
        let fb = FrameBuffer::new(4, 4);
        assert_eq!(fb.pixel(4, 0), (0, 0, 0, 0));
        assert_eq!(fb.pixel(0, 4), (0, 0, 0, 0));
    }

    #[test]
    fn luminance_weights_are_green_heavy() {
        let mut fb = FrameBuffer::new(3, 1);
        fb.set_pixel(0, 0, (255, 0, 0, 255));
        fb.set_pixel(1, 0, (0, 255, 0, 255));
        fb.set_pixel(2, 0, (0, 0, 255, 255));
        assert_eq!(fb.luminance(0, 0), 76); // 0.3 × 255
        assert_eq!(fb.luminance(1, 0), 153); // 0.6 × 255
        assert_eq!(fb.luminance(2, 0), 25); // 0.1 × 255
    }

    #[test]
    fn grid_text_has_trailing_newline_per_row() {
        let mut grid = GlyphGrid::new(3, 2);
        grid.set(0, 0, '#');
        grid.set(2, 1, '.');
        assert_eq!(grid.to_text(), "#  \n  .\n");
    }
}
