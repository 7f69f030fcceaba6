/// Convert RGB [0,255] → HSV. H ∈ [0.0, 1.0), S ∈ [0.0, 1.0], V ∈ [0.0, 1.0].
///
/// # Example
/// ```
/// use am_core::color::rgb_to_hsv;
/// let (h, s, v) = rgb_to_hsv(255, 0, 0);
/// assert!((h - 0.0).abs() < 0.01);
/// assert!((s - 1.0).abs() < 0.01);
/// assert!((v - 1.0).abs() < 0.01);
/// ```
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        (((g - b) / delta) % 6.0) / 6.0
    } else if (max - g).abs() < f32::EPSILON {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let h = if h < 0.0 { h + 1.0 } else { h };

    (h, s, v)
}

/// Convert HSV → RGB [0,255]. H ∈ [0.0, 1.0), S ∈ [0.0, 1.0], V ∈ [0.0, 1.0].
///
/// # Example
/// ```
/// use am_core::color::hsv_to_rgb;
/// assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
/// ```
#[must_use]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h * 6.0;
    let i = h.floor() as u32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Rotate the hue of an RGB color by `degrees`, preserving S and V.
///
/// This is the terminal-side equivalent of a `hue-rotate()` color filter:
/// the overlay text keeps its glyphs and brightness, only the hue cycles.
///
/// # Example
/// ```
/// use am_core::color::hue_rotate;
/// let (r, g, b) = hue_rotate(255, 0, 0, 120.0);
/// assert!(g > 200 && r < 50 && b < 50);
/// ```
#[must_use]
pub fn hue_rotate(r: u8, g: u8, b: u8, degrees: f32) -> (u8, u8, u8) {
    let (h, s, v) = rgb_to_hsv(r, g, b);
    let h = (h + degrees / 360.0).rem_euclid(1.0);
    hsv_to_rgb(h, s, v)
}

/// Parse a `#rrggbb` hex color. Returns `None` on malformed input.
///
/// # Example
/// ```
/// use am_core::color::parse_hex;
/// assert_eq!(parse_hex("#fdf9f3"), Some((0xfd, 0xf9, 0xf3)));
/// assert_eq!(parse_hex("fdf9f3"), Some((0xfd, 0xf9, 0xf3)));
/// assert_eq!(parse_hex("#xyz"), None);
/// ```
#[must_use]
pub fn parse_hex(s: &str) -> Option<(u8, u8, u8)> {
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_hsv_roundtrip() {
        for r in (0..=255).step_by(51) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(51) {
                    let (r, g, b) = (r as u8, g as u8, b as u8);
                    let (h, s, v) = rgb_to_hsv(r, g, b);
                    let (r2, g2, b2) = hsv_to_rgb(h, s, v);
                    assert!((i16::from(r) - i16::from(r2)).abs() <= 1, "{r} vs {r2}");
                    assert!((i16::from(g) - i16::from(g2)).abs() <= 1, "{g} vs {g2}");
                    assert!((i16::from(b) - i16::from(b2)).abs() <= 1, "{b} vs {b2}");
                }
            }
        }
    }

    #[test]
    fn hue_rotate_full_turn_is_identity() {
        let (r, g, b) = hue_rotate(200, 120, 40, 360.0);
        assert!((i16::from(r) - 200).abs() <= 2);
        assert!((i16::from(g) - 120).abs() <= 2);
        assert!((i16::from(b) - 40).abs() <= 2);
    }

    #[test]
    fn hue_rotate_handles_negative_degrees() {
        let a = hue_rotate(255, 0, 0, -120.0);
        let b = hue_rotate(255, 0, 0, 240.0);
        assert_eq!(a, b);
    }
}
