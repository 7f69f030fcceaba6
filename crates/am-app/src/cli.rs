use std::path::PathBuf;

use am_core::config::{EffectConfig, load_config};
use anyhow::Result;
use clap::Parser;

/// asciimesh — 3D wobbling text rendered as live ASCII art.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Text to render on the mesh (overrides the config file).
    #[arg(long)]
    pub text: Option<String>,

    /// TOML configuration file.
    #[arg(short, long, default_value = "asciimesh.toml")]
    pub config: PathBuf,

    /// Target frame rate (15–120).
    #[arg(long)]
    pub fps: Option<u32>,

    /// Font file used to rasterize the text. Defaults to a platform
    /// monospace font.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Disable the sinusoidal vertex wobble.
    #[arg(long, default_value_t = false)]
    pub no_waves: bool,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Load the config file (or defaults when absent) and apply CLI
    /// overrides on top.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn resolve_config(&self) -> Result<EffectConfig> {
        let mut config = if self.config.exists() {
            load_config(&self.config)?
        } else {
            log::warn!(
                "config not found: {}. Using defaults.",
                self.config.display()
            );
            EffectConfig::default()
        };

        if let Some(ref text) = self.text {
            config.text = text.clone();
        }
        if let Some(fps) = self.fps {
            config.target_fps = fps;
        }
        if let Some(ref font) = self.font {
            config.font_path = Some(font.clone());
        }
        if self.no_waves {
            config.enable_waves = false;
        }

        config.clamp_all();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_cli() -> Cli {
        Cli {
            text: None,
            config: PathBuf::from("/nonexistent/asciimesh.toml"),
            fps: None,
            font: None,
            no_waves: false,
            log_level: "warn".into(),
        }
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = bare_cli().resolve_config().expect("defaults");
        assert_eq!(config.text, EffectConfig::default().text);
    }

    #[test]
    fn cli_overrides_win_over_defaults() {
        let mut cli = bare_cli();
        cli.text = Some("Hi".into());
        cli.fps = Some(30);
        cli.no_waves = true;
        let config = cli.resolve_config().expect("defaults");
        assert_eq!(config.text, "Hi");
        assert_eq!(config.target_fps, 30);
        assert!(!config.enable_waves);
    }

    #[test]
    fn overridden_fps_is_clamped() {
        let mut cli = bare_cli();
        cli.fps = Some(10_000);
        let config = cli.resolve_config().expect("defaults");
        assert_eq!(config.target_fps, 120);
    }
}
