use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Complete effect configuration. Serializable to TOML; every field has a
/// sane default, so a partial file overrides only what it names.
///
/// # Example
/// ```
/// use am_core::config::EffectConfig;
/// let config = EffectConfig::default();
/// assert_eq!(config.text, "David!");
/// assert_eq!(config.target_fps, 60);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EffectConfig {
    // === Content ===
    /// The string rendered onto the quad. Changing it rebuilds the scene.
    pub text: String,
    /// Font size in pixels used to rasterize `text` onto the texture.
    pub text_font_size: f32,
    /// Text color as `#rrggbb`.
    pub text_color: String,
    /// Optional font file. None → probe the platform monospace defaults.
    pub font_path: Option<PathBuf>,

    // === Scene ===
    /// World-space height of the textured quad; width follows the texture
    /// aspect ratio.
    pub plane_base_height: f32,
    /// Enable the sinusoidal vertex wobble (toggled via a uniform, no
    /// pipeline rebuild).
    pub enable_waves: bool,

    // === Overlay ===
    /// Monospace font size assumed for the glyph cell grid. Cell width is
    /// `ascii_font_size × 0.6`, cell height is `ascii_font_size`.
    pub ascii_font_size: f32,
    /// Glyph ramp, ordered sparse→dense.
    pub ramp: String,
    /// Mirror the glyph index (for dark-on-light output).
    pub invert: bool,

    // === Host ===
    /// Frame rate the render loop paces itself to.
    pub target_fps: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            text: "David!".to_string(),
            text_font_size: 200.0,
            text_color: "#fdf9f3".to_string(),
            font_path: None,
            plane_base_height: 8.0,
            enable_waves: true,
            ascii_font_size: 8.0,
            ramp: crate::ramp::RAMP_STANDARD.to_string(),
            invert: true,
            target_fps: 60,
        }
    }
}

impl EffectConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.text_font_size = self.text_font_size.clamp(8.0, 800.0);
        self.plane_base_height = self.plane_base_height.clamp(1.0, 30.0);
        self.ascii_font_size = self.ascii_font_size.clamp(1.0, 64.0);
        self.target_fps = self.target_fps.clamp(15, 120);
        if self.text.is_empty() {
            self.text = Self::default().text;
        }
    }

    /// True if switching to `other` needs a full scene rebuild rather than
    /// the cheap resize path. Waves and inversion are per-frame parameters;
    /// everything that feeds the texture or the quad geometry is not.
    #[must_use]
    pub fn needs_rebuild(&self, other: &Self) -> bool {
        self.text != other.text
            || (self.text_font_size - other.text_font_size).abs() > f32::EPSILON
            || self.text_color != other.text_color
            || self.font_path != other.font_path
            || (self.plane_base_height - other.plane_base_height).abs() > f32::EPSILON
    }
}

/// TOML file shape: optional sections, optional fields.
#[derive(Deserialize)]
struct ConfigFile {
    effect: Option<EffectSection>,
    host: Option<HostSection>,
}

/// Effect section, all fields optional for partial override.
#[derive(Deserialize)]
struct EffectSection {
    text: Option<String>,
    text_font_size: Option<f32>,
    text_color: Option<String>,
    font_path: Option<PathBuf>,
    plane_base_height: Option<f32>,
    enable_waves: Option<bool>,
    ascii_font_size: Option<f32>,
    ramp: Option<String>,
    invert: Option<bool>,
}

/// Host section, all fields optional.
#[derive(Deserialize)]
struct HostSection {
    target_fps: Option<u32>,
}

/// Load a TOML file and merge it over the defaults.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use am_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("asciimesh.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<EffectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("TOML parse error in {}", path.display()))?;

    let mut config = EffectConfig::default();

    if let Some(e) = file.effect {
        if let Some(v) = e.text {
            config.text = v;
        }
        if let Some(v) = e.text_font_size {
            config.text_font_size = v;
        }
        if let Some(v) = e.text_color {
            config.text_color = v;
        }
        if let Some(v) = e.font_path {
            config.font_path = Some(v);
        }
        if let Some(v) = e.plane_base_height {
            config.plane_base_height = v;
        }
        if let Some(v) = e.enable_waves {
            config.enable_waves = v;
        }
        if let Some(v) = e.ascii_font_size {
            config.ascii_font_size = v;
        }
        if let Some(v) = e.ramp {
            config.ramp = v;
        }
        if let Some(v) = e.invert {
            config.invert = v;
        }
    }
    if let Some(h) = file.host
        && let Some(v) = h.target_fps
    {
        config.target_fps = v;
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let toml = r#"
            [effect]
            text = "AB"
            enable_waves = false

            [host]
            target_fps = 30
        "#;
        let file: ConfigFile = toml::from_str(toml).expect("parse");
        let mut config = EffectConfig::default();
        if let Some(e) = file.effect {
            if let Some(v) = e.text {
                config.text = v;
            }
            if let Some(v) = e.enable_waves {
                config.enable_waves = v;
            }
        }
        if let Some(h) = file.host
            && let Some(v) = h.target_fps
        {
            config.target_fps = v;
        }
        assert_eq!(config.text, "AB");
        assert!(!config.enable_waves);
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.text_font_size, 200.0);
    }

    #[test]
    fn clamp_restores_empty_text() {
        let mut config = EffectConfig {
            text: String::new(),
            ..EffectConfig::default()
        };
        config.clamp_all();
        assert!(!config.text.is_empty());
    }

    #[test]
    fn rebuild_detection() {
        let a = EffectConfig::default();
        let mut b = a.clone();
        b.enable_waves = !b.enable_waves;
        assert!(!a.needs_rebuild(&b), "wave toggle is a uniform change");
        b.text = "other".into();
        assert!(a.needs_rebuild(&b));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = EffectConfig::default();
        let s = toml::to_string(&config).expect("serialize");
        let back: EffectConfig = toml::from_str(&s).expect("deserialize");
        assert_eq!(back.text, config.text);
        assert_eq!(back.ramp, config.ramp);
    }
}
