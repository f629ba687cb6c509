//! Camera abstraction for live video input.
//!
//! A [`CameraSource`] stands in for the host's media-device service: it
//! hands out [`Camera`] streams on request. A [`Camera`] is one live video
//! input; it decodes frames until it is closed.

use super::{CaptureConfig, Frame};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera device busy: {0}")]
    DeviceBusy(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// One live video input stream.
pub trait Camera: Send {
    /// Opens the stream with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Returns the most recently decoded frame.
    ///
    /// `Ok(None)` means the stream is open but has not decoded a frame yet.
    fn current_frame(&mut self) -> Result<Option<Frame>, CameraError>;

    /// Checks if the stream is currently open.
    fn is_open(&self) -> bool;

    /// Stops every track of the stream. Must be safe to call repeatedly.
    fn close(&mut self);
}

/// Hands out camera streams.
pub trait CameraSource: Send + Sync + 'static {
    /// Requests a video input device. The returned camera is not yet open.
    fn connect(&self) -> Result<Box<dyn Camera>, CameraError>;
}

/// Requests a device from `source` and opens it.
///
/// A camera that fails to open is closed before the error is returned, so
/// a failed acquisition never leaves a device held.
pub fn acquire(
    source: &dyn CameraSource,
    config: &CaptureConfig,
) -> Result<Box<dyn Camera>, CameraError> {
    config
        .validate()
        .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

    let mut camera = source.connect()?;
    if let Err(e) = camera.open(config) {
        camera.close();
        return Err(e);
    }
    Ok(camera)
}
