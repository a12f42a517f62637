//! Error types for configuration and setup

use thiserror::Error;

/// Invalid configuration values
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("milestone list must not be empty")]
    EmptyMilestones,
    #[error("milestone at index {index} must be positive")]
    NonPositiveMilestone { index: usize },
    #[error("milestone at index {index} ({value}) must be greater than {previous}")]
    MilestonesNotIncreasing {
        index: usize,
        previous: u32,
        value: u32,
    },
    #[error("reveal duration `{name}` must be positive, got {value}")]
    InvalidDuration { name: &'static str, value: f32 },
    #[error("malformed settings JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Json(err.to_string())
    }
}

/// Failures that prevent the frame loop from starting
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("rendering backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("sprite for {glyph:?} at {size}px rasterized blank")]
    BlankSprite { glyph: String, size: u32 },
    #[error("sprite for {glyph:?} is {actual} bytes, expected {expected}")]
    SpriteSize {
        glyph: String,
        expected: usize,
        actual: usize,
    },
    #[error("no GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
