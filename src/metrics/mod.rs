//! Prometheus metrics for camera sessions.
//!
//! # Metrics Exposed
//!
//! - `checkin_camera_acquisitions_total` - Devices successfully acquired
//! - `checkin_camera_releases_total` - Devices released
//! - `checkin_camera_acquire_failures_total` - Refused or failed acquisitions
//! - `checkin_camera_devices_held` - Devices currently held (should settle at 0)
//! - `checkin_captures_total` - Still frames captured
//! - `checkin_capture_no_frame_total` - Captures attempted before the first frame
//!
//! # Example
//!
//! ```no_run
//! use checkin_kiosk::metrics::SessionMetrics;
//!
//! let metrics = SessionMetrics::new().expect("Failed to create registry");
//! metrics.record_acquired();
//! metrics.record_released();
//! println!("{}", metrics.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, SessionMetrics};
