//! Check-in screens built on camera sessions.
//!
//! Each camera screen owns exactly one [`CameraSession`](crate::session::CameraSession).
//! Leaving a screen, whether by navigation, submission or drop, stops it.

mod employee;
mod error;
mod form;
mod handoff;
mod kiosk;
mod routes;
mod visitor;

pub use employee::EmployeeCheckIn;
pub use error::{FlowError, KioskError};
pub use form::{ContactField, FormError, Purpose, VisitorContact};
pub use handoff::{EmployeeHandoff, Handoff, Navigation, VisitorHandoff, VisitorName};
pub use kiosk::{Kiosk, Screen};
pub use routes::{Route, UnknownRoute, LANDING_CHOICES};
pub use visitor::VisitorCheckIn;
