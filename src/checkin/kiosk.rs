//! The kiosk: one screen at a time, camera released on every exit.

use super::employee::EmployeeCheckIn;
use super::error::KioskError;
use super::handoff::{Handoff, Navigation};
use super::routes::Route;
use super::visitor::VisitorCheckIn;
use crate::capture::{CameraSource, CaptureConfig, StillConfig};
use crate::metrics::SessionMetrics;
use crate::session::CameraSession;
use std::sync::Arc;

/// The screen currently shown.
#[derive(Debug)]
pub enum Screen {
    Landing,
    Employee(EmployeeCheckIn),
    Visitor(VisitorCheckIn),
    Confirmation(Handoff),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Screen::Landing => Route::Landing,
            Screen::Employee(_) => Route::EmployeeCheckIn,
            Screen::Visitor(_) => Route::VisitorCheckIn,
            Screen::Confirmation(handoff) => handoff.route(),
        }
    }

    fn holds_device(&self) -> bool {
        match self {
            Screen::Employee(s) => s.session().holds_device(),
            Screen::Visitor(s) => s.session().holds_device(),
            Screen::Landing | Screen::Confirmation(_) => false,
        }
    }

    fn leave(self) {
        match self {
            Screen::Employee(s) => s.leave(),
            Screen::Visitor(s) => s.leave(),
            Screen::Landing | Screen::Confirmation(_) => {}
        }
    }
}

/// Owns the current screen and builds a fresh camera session for every
/// screen that needs one.
pub struct Kiosk {
    source: Arc<dyn CameraSource>,
    capture_config: CaptureConfig,
    still_config: StillConfig,
    metrics: Option<SessionMetrics>,
    screen: Screen,
}

impl Kiosk {
    /// Creates a kiosk showing the landing screen.
    pub fn new(source: Arc<dyn CameraSource>, capture_config: CaptureConfig) -> Self {
        Self {
            source,
            capture_config,
            still_config: StillConfig::default(),
            metrics: None,
            screen: Screen::Landing,
        }
    }

    pub fn with_still_config(mut self, still_config: StillConfig) -> Self {
        self.still_config = still_config;
        self
    }

    pub fn with_metrics(mut self, metrics: SessionMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn route(&self) -> Route {
        self.screen.route()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn employee_mut(&mut self) -> Option<&mut EmployeeCheckIn> {
        match &mut self.screen {
            Screen::Employee(s) => Some(s),
            _ => None,
        }
    }

    pub fn visitor_mut(&mut self) -> Option<&mut VisitorCheckIn> {
        match &mut self.screen {
            Screen::Visitor(s) => Some(s),
            _ => None,
        }
    }

    /// True while the current screen holds (or is requesting) a camera.
    pub fn holds_device(&self) -> bool {
        self.screen.holds_device()
    }

    /// Moves to `route`, tearing the current screen down first.
    ///
    /// Confirmation screens cannot be opened directly; use
    /// [`follow`](Self::follow) with the check-in's hand-off.
    pub fn navigate(&mut self, route: Route) -> Result<(), KioskError> {
        if route.is_confirmation() {
            return Err(KioskError::MissingHandoff(route));
        }
        self.teardown();
        self.screen = match route {
            Route::EmployeeCheckIn => Screen::Employee(EmployeeCheckIn::enter(self.new_session())),
            Route::VisitorCheckIn => Screen::Visitor(VisitorCheckIn::enter(self.new_session())),
            _ => Screen::Landing,
        };
        tracing::info!(route = %route, "navigated");
        Ok(())
    }

    pub fn navigate_path(&mut self, path: &str) -> Result<(), KioskError> {
        self.navigate(path.parse()?)
    }

    /// Applies a navigation produced by a screen.
    pub fn follow(&mut self, navigation: Navigation) -> Result<(), KioskError> {
        match navigation.handoff {
            Some(handoff) => {
                let expected = handoff.route();
                if navigation.route != expected {
                    return Err(KioskError::HandoffMismatch {
                        route: navigation.route,
                        expected,
                    });
                }
                self.teardown();
                tracing::info!(route = %expected, "showing confirmation");
                self.screen = Screen::Confirmation(handoff);
                Ok(())
            }
            None => self.navigate(navigation.route),
        }
    }

    /// Returns to the landing screen, releasing any camera.
    pub fn reset(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let previous = std::mem::replace(&mut self.screen, Screen::Landing);
        if previous.holds_device() {
            tracing::info!(route = %previous.route(), "leaving screen with camera active");
        }
        previous.leave();
    }

    fn new_session(&self) -> CameraSession {
        let session = CameraSession::new(Arc::clone(&self.source), self.capture_config.clone())
            .with_still_config(self.still_config.clone());
        match &self.metrics {
            Some(metrics) => session.with_metrics(metrics.clone()),
            None => session,
        }
    }
}

impl std::fmt::Debug for Kiosk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kiosk")
            .field("route", &self.route())
            .field("holds_device", &self.holds_device())
            .finish_non_exhaustive()
    }
}
