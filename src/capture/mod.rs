//! Camera input and frame handling.
//!
//! This module provides the abstractions the camera session is built on:
//! a source that hands out live video streams, the streams themselves,
//! and the decoded frames they produce.

mod camera;
mod config;
mod frame;
mod mock;
#[cfg(feature = "camera")]
mod webcam;

pub use camera::{acquire, Camera, CameraError, CameraSource};
pub use config::{CaptureConfig, ConfigError, FileConfig, KioskConfig, StillConfig, StillFormat};
pub use frame::{Frame, RGB_CHANNELS};
pub use mock::{MockCamera, MockFault, MockGate, MockLedger, MockOutcome, MockSource};
#[cfg(feature = "camera")]
pub use webcam::{NokhwaCamera, NokhwaSource};
