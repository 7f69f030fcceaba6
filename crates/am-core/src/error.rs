use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The render target could not be created. Fatal to the instance;
    /// there is no software fallback below a software renderer.
    #[error("rendering context unavailable ({width}×{height})")]
    ContextUnavailable {
        /// Requested target width.
        width: u32,
        /// Requested target height.
        height: u32,
    },

    /// Zero or negative container/canvas dimensions. Treated as "not ready
    /// yet" at frame boundaries, an error only at construction.
    #[error("invalid dimensions: {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Pixel capture failed for this frame. Caught at the loop boundary;
    /// the frame is skipped and the effect continues next frame.
    #[error("frame readback failed: {0}")]
    Readback(String),

    /// No usable font: neither the configured path nor any platform
    /// default could be loaded.
    #[error("no usable monospace font found (configure one with `font_path`)")]
    FontUnavailable,

    /// Invalid configuration value or structure.
    #[error("invalid configuration: {0}")]
    Config(String),
}
