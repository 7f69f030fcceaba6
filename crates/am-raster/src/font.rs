use std::path::Path;

use ab_glyph::FontVec;
use am_core::CoreError;

/// Well-known monospace font locations, probed in order when no font path
/// is configured. A missing configured font falls back here too, so a bad
/// path degrades instead of failing.
const PLATFORM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/Library/Fonts/Andale Mono.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

fn load_font_file(path: &Path) -> Option<FontVec> {
    let data = std::fs::read(path).ok()?;
    match FontVec::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("unusable font {}: {e}", path.display());
            None
        }
    }
}

/// Resolve a usable font: the configured path if it loads, otherwise the
/// first platform default that does.
///
/// # Errors
/// `FontUnavailable` if neither the configured path nor any platform
/// default yields a parseable font file.
pub fn resolve_font(configured: Option<&Path>) -> Result<FontVec, CoreError> {
    if let Some(path) = configured {
        if let Some(font) = load_font_file(path) {
            return Ok(font);
        }
        log::warn!(
            "configured font {} not usable, falling back to platform default",
            path.display()
        );
    }
    for candidate in PLATFORM_FONTS {
        if let Some(font) = load_font_file(Path::new(candidate)) {
            log::debug!("using platform font {candidate}");
            return Ok(font);
        }
    }
    Err(CoreError::FontUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_configured_path_falls_back_without_error() {
        // Either a platform font exists (fallback succeeds) or none does
        // (FontUnavailable) — a bogus configured path must never be the
        // failure itself.
        match resolve_font(Some(Path::new("/nonexistent/font.ttf"))) {
            Ok(_) | Err(CoreError::FontUnavailable) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
