//! Session lifecycle states and the transition table.
//!
//! Transitions are a pure function of `(state, event)`. The session
//! manager applies them; nothing else mutates a session's state.

use std::fmt;

/// Lifecycle state of a camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No device held, no still frame.
    #[default]
    Idle,
    /// A device has been requested and the grant is pending.
    Acquiring,
    /// A device is held and feeding the preview.
    Live,
    /// A still frame exists; the device has been released.
    Captured,
    /// The last acquisition or capture failed; no device held.
    Error,
}

impl SessionState {
    /// True in the states where a device handle (or pending request) exists.
    pub fn holds_device(self) -> bool {
        matches!(self, SessionState::Acquiring | SessionState::Live)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Acquiring => "acquiring",
            SessionState::Live => "live",
            SessionState::Captured => "captured",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Inputs that drive the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    Start,
    Granted,
    Denied,
    Captured,
    Retake,
    Stop,
    Fault,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An event that is not accepted in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event {event} is not valid in state {state}")]
pub struct InvalidTransition {
    pub state: SessionState,
    pub event: SessionEvent,
}

/// Computes the next state for `event` arriving in `state`.
pub fn transition(
    state: SessionState,
    event: SessionEvent,
) -> Result<SessionState, InvalidTransition> {
    use SessionEvent as E;
    use SessionState as S;

    let next = match (state, event) {
        (_, E::Stop) => S::Idle,
        (S::Idle | S::Error, E::Start) => S::Acquiring,
        (S::Acquiring, E::Granted) => S::Live,
        (S::Acquiring, E::Denied) => S::Error,
        (S::Live, E::Captured) => S::Captured,
        (S::Captured, E::Retake) => S::Idle,
        (S::Acquiring | S::Live, E::Fault) => S::Error,
        _ => return Err(InvalidTransition { state, event }),
    };
    Ok(next)
}
