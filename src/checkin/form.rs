//! Visitor contact form.
//!
//! Fields are edited by name, the way the form widgets report changes.
//! Apart from the purpose list, values are taken as typed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown form field {0:?}")]
    UnknownField(String),
    #[error("unknown visit purpose {0:?}")]
    UnknownPurpose(String),
}

/// Reason for the visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Meeting,
    Delivery,
    Interview,
    Other,
}

impl Purpose {
    pub const ALL: [Purpose; 4] = [
        Purpose::Meeting,
        Purpose::Delivery,
        Purpose::Interview,
        Purpose::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Meeting => "meeting",
            Purpose::Delivery => "delivery",
            Purpose::Interview => "interview",
            Purpose::Other => "other",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Purpose::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| FormError::UnknownPurpose(s.to_string()))
    }
}

/// Editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    Purpose,
    MeetingWith,
}

impl FromStr for ContactField {
    type Err = FormError;

    /// Accepts the widget names (`firstName`) and snake case (`first_name`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "firstName" | "first_name" => ContactField::FirstName,
            "lastName" | "last_name" => ContactField::LastName,
            "email" => ContactField::Email,
            "phoneNumber" | "phone_number" => ContactField::PhoneNumber,
            "purpose" => ContactField::Purpose,
            "meetingWith" | "meeting_with" => ContactField::MeetingWith,
            other => return Err(FormError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// What a visitor typed into the check-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// `None` until a purpose is picked.
    pub purpose: Option<Purpose>,
    pub meeting_with: String,
}

impl VisitorContact {
    /// Sets one field. An empty purpose clears the selection.
    pub fn set(&mut self, field: ContactField, value: &str) -> Result<(), FormError> {
        match field {
            ContactField::FirstName => self.first_name = value.to_string(),
            ContactField::LastName => self.last_name = value.to_string(),
            ContactField::Email => self.email = value.to_string(),
            ContactField::PhoneNumber => self.phone_number = value.to_string(),
            ContactField::MeetingWith => self.meeting_with = value.to_string(),
            ContactField::Purpose => {
                self.purpose = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                };
            }
        }
        Ok(())
    }

    /// Sets a field by its widget name.
    pub fn set_named(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        self.set(name.parse()?, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_by_widget_name() {
        let mut contact = VisitorContact::default();
        contact.set_named("firstName", "Ada").unwrap();
        contact.set_named("phoneNumber", "555-0100").unwrap();
        contact.set_named("meeting_with", "Grace").unwrap();

        assert_eq!(contact.first_name, "Ada");
        assert_eq!(contact.phone_number, "555-0100");
        assert_eq!(contact.meeting_with, "Grace");
    }

    #[test]
    fn test_purpose_parsing() {
        let mut contact = VisitorContact::default();
        contact.set_named("purpose", "Interview").unwrap();
        assert_eq!(contact.purpose, Some(Purpose::Interview));

        contact.set_named("purpose", "").unwrap();
        assert_eq!(contact.purpose, None);

        assert!(matches!(
            contact.set_named("purpose", "sightseeing"),
            Err(FormError::UnknownPurpose(_))
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut contact = VisitorContact::default();
        assert!(matches!(
            contact.set_named("badgeNumber", "7"),
            Err(FormError::UnknownField(_))
        ));
        assert_eq!(contact, VisitorContact::default());
    }

    #[test]
    fn test_values_not_validated() {
        let mut contact = VisitorContact::default();
        contact.set_named("email", "not an email").unwrap();
        assert_eq!(contact.email, "not an email");
    }
}
