//! Camera session lifecycle.
//!
//! A [`CameraSession`] moves through an explicit state machine:
//!
//! ```text
//! Idle --start--> Acquiring --granted--> Live --capture--> Captured --retake--> Idle
//!                     |
//!                     +--denied--> Error --start--> Acquiring
//! any --stop--> Idle
//! ```
//!
//! The device is owned by a [`DeviceHandle`] that releases it on drop, so
//! every exit path (stop, capture, error, teardown) gives the camera back.

mod acquire;
mod error;
mod handle;
mod manager;
mod state;
mod still;

pub use error::SessionError;
pub use handle::DeviceHandle;
pub use manager::CameraSession;
pub use state::{transition, InvalidTransition, SessionEvent, SessionState};
pub use still::{EncodeError, StillFrame};
