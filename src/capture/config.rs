//! Camera, still-frame and kiosk configuration.
//!
//! The requested resolution is a hint to the device. Stills are always
//! encoded at whatever resolution the stream actually decodes.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for acquiring a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index.
    pub device_id: u32,
    /// Requested frame width in pixels.
    pub width: u32,
    /// Requested frame height in pixels.
    pub height: u32,
    /// Requested frames per second.
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Encoding used for still frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StillFormat {
    Png,
    Jpeg,
}

impl StillFormat {
    /// MIME type used in data URLs.
    pub fn mime_type(self) -> &'static str {
        match self {
            StillFormat::Png => "image/png",
            StillFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Still-frame encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StillConfig {
    pub format: StillFormat,
    /// JPEG quality (1-100). Ignored for PNG.
    pub jpeg_quality: u8,
}

impl Default for StillConfig {
    fn default() -> Self {
        Self {
            format: StillFormat::Png,
            jpeg_quality: 90,
        }
    }
}

impl StillConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        Ok(())
    }
}

/// Retry policy applied by the kiosk driver.
///
/// The session itself never retries; these values belong to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// How long to wait for a device grant before giving up.
    pub acquire_timeout_ms: u64,
    /// Number of times a denied acquisition is retried.
    pub acquire_retries: u32,
    /// Delay between capture attempts while no frame is available.
    pub frame_retry_interval_ms: u64,
    /// Capture attempts before giving up on a silent stream.
    pub frame_retries: u32,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 5_000,
            acquire_retries: 1,
            frame_retry_interval_ms: 50,
            frame_retries: 40,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("invalid jpeg quality {0} (must be 1-100)")]
    InvalidQuality(u8),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub still: StillConfig,
    #[serde(default)]
    pub kiosk: KioskConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        config.still.validate()?;
        Ok(config)
    }
}
