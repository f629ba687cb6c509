use super::form::FormError;
use super::routes::{Route, UnknownRoute};
use crate::session::SessionError;
use thiserror::Error;

/// Errors raised by a check-in screen.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("no photo has been captured")]
    NoPhoto,
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Errors raised while moving between screens.
#[derive(Debug, Error)]
pub enum KioskError {
    #[error(transparent)]
    UnknownRoute(#[from] UnknownRoute),
    #[error("{0} needs check-in data to display")]
    MissingHandoff(Route),
    #[error("check-in data for {expected} cannot be shown at {route}")]
    HandoffMismatch { route: Route, expected: Route },
    #[error(transparent)]
    Flow(#[from] FlowError),
}
