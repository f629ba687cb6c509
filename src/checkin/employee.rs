//! Employee check-in: take one photo, retake as often as needed, continue.

use super::error::FlowError;
use super::handoff::{EmployeeHandoff, Handoff, Navigation};
use crate::session::{CameraSession, SessionState, StillFrame};
use chrono::Utc;

/// The employee check-in screen.
#[derive(Debug)]
pub struct EmployeeCheckIn {
    session: CameraSession,
}

impl EmployeeCheckIn {
    /// Opens the screen and requests the camera.
    ///
    /// A refused request leaves the screen up with its session in `Error`
    /// so it can offer a retry.
    pub fn enter(mut session: CameraSession) -> Self {
        if let Err(e) = session.start() {
            tracing::warn!(error = %e, "employee check-in could not request the camera");
        }
        Self { session }
    }

    pub fn session(&self) -> &CameraSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CameraSession {
        &mut self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn photo(&self) -> Option<&StillFrame> {
        self.session.still()
    }

    pub fn capture_photo(&mut self) -> Result<&StillFrame, FlowError> {
        Ok(self.session.capture()?)
    }

    /// Throws the photo away. The camera stays off until
    /// [`restart_camera`](Self::restart_camera) is called.
    pub fn retake_photo(&mut self) -> Result<(), FlowError> {
        Ok(self.session.retake()?)
    }

    /// Requests the camera again after a retake or a refused request.
    pub fn restart_camera(&mut self) -> Result<(), FlowError> {
        Ok(self.session.start()?)
    }

    /// Hands the photo to the confirmation screen.
    pub fn continue_with_photo(&mut self) -> Result<Navigation, FlowError> {
        let photo = self.session.take_still().ok_or(FlowError::NoPhoto)?;
        tracing::info!(fingerprint = %photo.fingerprint_hex(), "employee check-in complete");
        Ok(Navigation::with_handoff(Handoff::Employee(EmployeeHandoff {
            photo,
            checked_in_at: Utc::now(),
        })))
    }

    /// Closes the screen, releasing the camera.
    pub fn leave(mut self) {
        self.session.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, MockSource};
    use crate::checkin::Route;
    use std::sync::Arc;
    use std::time::Duration;

    fn screen(source: MockSource) -> EmployeeCheckIn {
        EmployeeCheckIn::enter(CameraSession::new(
            Arc::new(source),
            CaptureConfig::default(),
        ))
    }

    #[test]
    fn test_enter_requests_camera() {
        let screen = screen(MockSource::new(16, 16));
        assert_eq!(screen.state(), SessionState::Acquiring);
    }

    #[test]
    fn test_capture_and_continue() {
        let mut screen = screen(MockSource::new(16, 12));
        screen.session_mut().wait_live(Duration::from_secs(5)).unwrap();
        screen.capture_photo().unwrap();

        let nav = screen.continue_with_photo().unwrap();
        assert_eq!(nav.route, Route::Confirmation);
        let photo = nav.handoff.as_ref().and_then(|h| h.photo()).unwrap();
        assert_eq!(photo.dimensions(), (16, 12));
    }

    #[test]
    fn test_continue_without_photo() {
        let mut screen = screen(MockSource::new(16, 16));
        assert!(matches!(
            screen.continue_with_photo(),
            Err(FlowError::NoPhoto)
        ));
    }

    #[test]
    fn test_retake_then_restart() {
        let source = MockSource::new(16, 16);
        let ledger = source.ledger();
        let mut screen = screen(source);
        screen.session_mut().wait_live(Duration::from_secs(5)).unwrap();
        screen.capture_photo().unwrap();

        screen.retake_photo().unwrap();
        assert_eq!(screen.state(), SessionState::Idle);
        assert!(screen.photo().is_none());

        screen.restart_camera().unwrap();
        screen.session_mut().wait_live(Duration::from_secs(5)).unwrap();
        assert_eq!(ledger.acquired(), 2);
        assert_eq!(ledger.held(), 1);

        screen.leave();
        assert_eq!(ledger.held(), 0);
    }
}
