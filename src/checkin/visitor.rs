//! Visitor check-in: photo plus contact form, submitted together.

use super::error::FlowError;
use super::form::VisitorContact;
use super::handoff::{Handoff, Navigation, VisitorHandoff, VisitorName};
use crate::session::{CameraSession, SessionState, StillFrame};
use chrono::Utc;

/// The visitor check-in screen.
#[derive(Debug)]
pub struct VisitorCheckIn {
    session: CameraSession,
    contact: VisitorContact,
}

impl VisitorCheckIn {
    /// Opens the screen with an empty form and requests the camera.
    pub fn enter(mut session: CameraSession) -> Self {
        if let Err(e) = session.start() {
            tracing::warn!(error = %e, "visitor check-in could not request the camera");
        }
        Self {
            session,
            contact: VisitorContact::default(),
        }
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

    pub fn contact(&self) -> &VisitorContact {
        &self.contact
    }

    pub fn photo(&self) -> Option<&StillFrame> {
        self.session.still()
    }

    pub fn capture_photo(&mut self) -> Result<&StillFrame, FlowError> {
        Ok(self.session.capture()?)
    }

    pub fn retake_photo(&mut self) -> Result<(), FlowError> {
        Ok(self.session.retake()?)
    }

    pub fn restart_camera(&mut self) -> Result<(), FlowError> {
        Ok(self.session.start()?)
    }

    /// Updates one form field by its widget name.
    pub fn update_field(&mut self, name: &str, value: &str) -> Result<(), FlowError> {
        Ok(self.contact.set_named(name, value)?)
    }

    /// Submits the form with whatever photo has been taken and stops the
    /// camera.
    pub fn submit(&mut self) -> Navigation {
        let photo = self.session.take_still();
        self.session.stop();

        let name = VisitorName {
            first_name: self.contact.first_name.clone(),
            last_name: self.contact.last_name.clone(),
        };
        tracing::info!(
            visitor = %name.full(),
            with_photo = photo.is_some(),
            "visitor check-in submitted"
        );

        Navigation::with_handoff(Handoff::Visitor(VisitorHandoff {
            photo,
            name,
            purpose: self.contact.purpose,
            checked_in_at: Utc::now(),
        }))
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
    use crate::checkin::{Purpose, Route};
    use std::sync::Arc;
    use std::time::Duration;

    fn screen(source: MockSource) -> VisitorCheckIn {
        VisitorCheckIn::enter(CameraSession::new(
            Arc::new(source),
            CaptureConfig::default(),
        ))
    }

    #[test]
    fn test_submit_with_photo() {
        let source = MockSource::new(20, 20);
        let ledger = source.ledger();
        let mut screen = screen(source);
        screen.session_mut().wait_live(Duration::from_secs(5)).unwrap();
        screen.capture_photo().unwrap();
        screen.update_field("firstName", "Ada").unwrap();
        screen.update_field("lastName", "Lovelace").unwrap();
        screen.update_field("purpose", "meeting").unwrap();

        let nav = screen.submit();
        assert_eq!(nav.route, Route::VisitorConfirmation);
        match nav.handoff {
            Some(Handoff::Visitor(handoff)) => {
                assert_eq!(handoff.name.full(), "Ada Lovelace");
                assert_eq!(handoff.purpose, Some(Purpose::Meeting));
                assert_eq!(handoff.photo.unwrap().dimensions(), (20, 20));
            }
            other => panic!("unexpected handoff: {other:?}"),
        }
        assert_eq!(ledger.held(), 0);
    }

    #[test]
    fn test_submit_without_photo_stops_camera() {
        let source = MockSource::new(20, 20);
        let ledger = source.ledger();
        let mut screen = screen(source);
        screen.session_mut().wait_live(Duration::from_secs(5)).unwrap();

        let nav = screen.submit();
        assert!(nav.handoff.as_ref().and_then(|h| h.photo()).is_none());
        assert_eq!(screen.state(), SessionState::Idle);
        assert_eq!(ledger.held(), 0);
    }

    #[test]
    fn test_form_edits_show_in_contact() {
        let mut screen = screen(MockSource::new(4, 4));
        screen.update_field("first_name", "Grace").unwrap();
        screen.update_field("purpose", "interview").unwrap();

        assert_eq!(screen.contact().first_name, "Grace");
        assert_eq!(screen.contact().purpose, Some(Purpose::Interview));
        assert!(screen.contact().last_name.is_empty());
    }

    #[test]
    fn test_bad_field_is_form_error() {
        let mut screen = screen(MockSource::new(4, 4));
        assert!(matches!(
            screen.update_field("nickname", "x"),
            Err(FlowError::Form(_))
        ));
    }
}
