//! Check-in Kiosk Library
//!
//! Camera-backed employee and visitor check-in. The heart of the crate is
//! the camera session: acquiring a webcam, showing its live feed, taking a
//! single still, and giving the camera back on every exit path.
//!
//! # Architecture
//!
//! ```text
//! capture (sources, streams, frames)
//!     ↓
//! session (state machine, device handle, stills)
//!     ↓
//! checkin (employee / visitor screens, routes, hand-off)
//!
//! metrics (acquire / release / capture counters)
//! ```
//!
//! # Design Principles
//!
//! - **Release is structural**: a held camera lives in a handle that closes
//!   it on drop, so no early return or navigation can leak it
//! - **Explicit state**: sessions move through a pure transition table
//! - **Caller owns retries**: refused devices and empty streams are
//!   reported, never retried internally
//! - **Stills stay in memory**: nothing is written to disk or sent anywhere
//!
//! # Example
//!
//! ```no_run
//! use checkin_kiosk::{
//!     capture::{CaptureConfig, MockSource},
//!     session::{CameraSession, SessionState},
//! };
//! use std::{sync::Arc, time::Duration};
//!
//! let mut session = CameraSession::new(Arc::new(MockSource::new(640, 480)), CaptureConfig::default());
//! session.start().unwrap();
//!
//! if session.wait_live(Duration::from_secs(5)).unwrap() == SessionState::Live {
//!     let still = session.capture().unwrap();
//!     println!("captured {}x{}", still.width(), still.height());
//! }
//!
//! // The camera was released by the capture; stop() is still safe.
//! session.stop();
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod checkin;
pub mod metrics;
pub mod session;

// Re-export commonly used types at crate root
pub use capture::{Camera, CameraError, CameraSource, CaptureConfig, FileConfig, Frame, MockSource};
pub use checkin::{EmployeeCheckIn, Handoff, Kiosk, Route, VisitorCheckIn};
pub use metrics::SessionMetrics;
pub use session::{CameraSession, SessionError, SessionState, StillFrame};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
