//! Data carried from a check-in screen to its confirmation screen.

use super::form::Purpose;
use super::routes::Route;
use crate::session::StillFrame;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorName {
    pub first_name: String,
    pub last_name: String,
}

impl VisitorName {
    pub fn full(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct EmployeeHandoff {
    pub photo: StillFrame,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VisitorHandoff {
    /// Visitors may submit the form without a photo.
    pub photo: Option<StillFrame>,
    pub name: VisitorName,
    pub purpose: Option<Purpose>,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum Handoff {
    Employee(EmployeeHandoff),
    Visitor(VisitorHandoff),
}

impl Handoff {
    /// The confirmation screen this payload is meant for.
    pub fn route(&self) -> Route {
        match self {
            Handoff::Employee(_) => Route::Confirmation,
            Handoff::Visitor(_) => Route::VisitorConfirmation,
        }
    }

    pub fn photo(&self) -> Option<&StillFrame> {
        match self {
            Handoff::Employee(h) => Some(&h.photo),
            Handoff::Visitor(h) => h.photo.as_ref(),
        }
    }

    pub fn checked_in_at(&self) -> DateTime<Utc> {
        match self {
            Handoff::Employee(h) => h.checked_in_at,
            Handoff::Visitor(h) => h.checked_in_at,
        }
    }
}

/// A request to move to another screen.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub route: Route,
    pub handoff: Option<Handoff>,
}

impl Navigation {
    pub fn to(route: Route) -> Self {
        Self {
            route,
            handoff: None,
        }
    }

    pub fn with_handoff(handoff: Handoff) -> Self {
        Self {
            route: handoff.route(),
            handoff: Some(handoff),
        }
    }
}
