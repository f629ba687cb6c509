use super::state::InvalidTransition;
use super::still::EncodeError;
use crate::capture::CameraError;
use thiserror::Error;

/// Errors surfaced by a camera session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No camera, permission refused, or device busy. The caller decides
    /// whether to retry.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(CameraError),
    /// The stream has not decoded a frame yet. Retry after a short wait.
    #[error("no frame available yet")]
    NoFrameAvailable,
    #[error(transparent)]
    InvalidState(#[from] InvalidTransition),
    #[error("failed to encode still frame: {0}")]
    Encode(#[from] EncodeError),
    /// A live stream failed while being read.
    #[error("camera stream failed: {0}")]
    Device(CameraError),
}

impl SessionError {
    /// True for errors that leave the session usable as-is.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::NoFrameAvailable)
    }
}
