//! Kiosk screens and the paths they live at.

use std::fmt;
use std::str::FromStr;

/// A navigable kiosk screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    EmployeeCheckIn,
    VisitorCheckIn,
    Confirmation,
    VisitorConfirmation,
}

/// Buttons offered by the landing screen, in display order.
pub const LANDING_CHOICES: [(&str, Route); 2] = [
    ("Check-In", Route::EmployeeCheckIn),
    ("Visitor Check-In", Route::VisitorCheckIn),
];

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Landing,
        Route::EmployeeCheckIn,
        Route::VisitorCheckIn,
        Route::Confirmation,
        Route::VisitorConfirmation,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::EmployeeCheckIn => "/checkin",
            Route::VisitorCheckIn => "/checkin-visitor",
            Route::Confirmation => "/confirmation",
            Route::VisitorConfirmation => "/confirmation-visitor",
        }
    }

    /// Resolves a path, ignoring a trailing slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }

    /// Screens that exist only to show a hand-off payload.
    pub fn is_confirmation(self) -> bool {
        matches!(self, Route::Confirmation | Route::VisitorConfirmation)
    }

    /// Screens that own a camera session.
    pub fn uses_camera(self) -> bool {
        matches!(self, Route::EmployeeCheckIn | Route::VisitorCheckIn)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Path that does not name a kiosk screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no screen at path {0:?}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::from_path(s).ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn test_trailing_slash_ignored() {
        assert_eq!(Route::from_path("/checkin/"), Some(Route::EmployeeCheckIn));
        assert_eq!(Route::from_path(""), Some(Route::Landing));
    }

    #[test]
    fn test_unknown_path() {
        assert!("/admin".parse::<Route>().is_err());
    }

    #[test]
    fn test_landing_offers_both_flows() {
        let targets: Vec<_> = LANDING_CHOICES.iter().map(|(_, r)| *r).collect();
        assert_eq!(targets, [Route::EmployeeCheckIn, Route::VisitorCheckIn]);
        assert!(targets.iter().all(|r| r.uses_camera()));
    }
}
