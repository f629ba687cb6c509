//! Camera session manager.

use super::acquire::{AcquirePoll, PendingAcquire};
use super::error::SessionError;
use super::handle::DeviceHandle;
use super::state::{transition, InvalidTransition, SessionEvent, SessionState};
use super::still::StillFrame;
use crate::capture::{CameraError, CameraSource, CaptureConfig, Frame, StillConfig};
use crate::metrics::SessionMetrics;
use std::sync::Arc;
use std::time::Duration;

/// Owns one camera-backed live preview and its single-shot captures.
///
/// The session holds at most one device at a time and releases it on
/// [`stop`](Self::stop), after a successful [`capture`](Self::capture), on
/// any fatal error, and when dropped.
pub struct CameraSession {
    source: Arc<dyn CameraSource>,
    capture_config: CaptureConfig,
    still_config: StillConfig,
    metrics: Option<SessionMetrics>,

    state: SessionState,
    pending: Option<PendingAcquire>,
    handle: Option<DeviceHandle>,
    preview: Option<Frame>,
    still: Option<StillFrame>,
    last_error: Option<CameraError>,
}

impl CameraSession {
    pub fn new(source: Arc<dyn CameraSource>, capture_config: CaptureConfig) -> Self {
        Self {
            source,
            capture_config,
            still_config: StillConfig::default(),
            metrics: None,
            state: SessionState::Idle,
            pending: None,
            handle: None,
            preview: None,
            still: None,
            last_error: None,
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

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The still frame produced by the last capture, if still held.
    pub fn still(&self) -> Option<&StillFrame> {
        self.still.as_ref()
    }

    /// The most recent frame bound to the preview surface.
    pub fn preview(&self) -> Option<&Frame> {
        self.preview.as_ref()
    }

    /// The device error behind the current `Error` state.
    pub fn last_error(&self) -> Option<&CameraError> {
        self.last_error.as_ref()
    }

    /// True while a device is held or a request for one is in flight.
    pub fn holds_device(&self) -> bool {
        self.handle.is_some() || self.pending.is_some()
    }

    /// Requests a camera. Valid from `Idle` or `Error`.
    ///
    /// Returns once the request is in flight; use [`poll`](Self::poll) or
    /// [`wait_live`](Self::wait_live) to learn the outcome.
    pub fn start(&mut self) -> Result<(), SessionError> {
        transition(self.state, SessionEvent::Start)?;

        self.still = None;
        self.preview = None;
        self.last_error = None;

        let pending = PendingAcquire::spawn(
            Arc::clone(&self.source),
            self.capture_config.clone(),
            self.metrics.clone(),
        );
        self.apply(SessionEvent::Start)?;
        tracing::info!(device = self.capture_config.device_id, "camera requested");

        match pending {
            Ok(pending) => {
                self.pending = Some(pending);
                Ok(())
            }
            Err(e) => self.fail_acquire(e),
        }
    }

    /// Checks on an in-flight request without blocking.
    pub fn poll(&mut self) -> Result<SessionState, SessionError> {
        let outcome = match &self.pending {
            Some(pending) => pending.try_complete(),
            None => return Ok(self.state),
        };
        self.complete(outcome)
    }

    /// Waits up to `timeout` for an in-flight request to be answered.
    ///
    /// Returns `Ok(SessionState::Acquiring)` if it is still pending.
    pub fn wait_live(&mut self, timeout: Duration) -> Result<SessionState, SessionError> {
        let outcome = match &self.pending {
            Some(pending) => pending.wait(timeout),
            None => return Ok(self.state),
        };
        self.complete(outcome)
    }

    /// Pulls the stream's current frame onto the preview surface.
    pub fn refresh_preview(&mut self) -> Result<Option<&Frame>, SessionError> {
        if let Some(handle) = self.handle.as_mut() {
            match handle.current_frame() {
                Ok(Some(frame)) => self.preview = Some(frame),
                Ok(None) => {}
                Err(e) => return self.fault(e),
            }
        }
        Ok(self.preview.as_ref())
    }

    /// Takes a still from the current frame. Valid from `Live`.
    ///
    /// Fails with [`SessionError::NoFrameAvailable`] and stays `Live` if
    /// the stream has not decoded a frame yet. On success the device is
    /// released and the session is `Captured`.
    pub fn capture(&mut self) -> Result<&StillFrame, SessionError> {
        if self.state != SessionState::Live {
            return Err(InvalidTransition {
                state: self.state,
                event: SessionEvent::Captured,
            }
            .into());
        }

        self.refresh_preview()?;
        let frame = match self.preview.take() {
            Some(frame) if frame.is_valid() => frame,
            _ => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_no_frame();
                }
                tracing::debug!("capture requested before first decoded frame");
                return Err(SessionError::NoFrameAvailable);
            }
        };

        let still = match StillFrame::encode(&frame, &self.still_config) {
            Ok(still) => still,
            Err(e) => {
                tracing::error!(error = %e, "still encoding failed");
                self.release_handle();
                self.apply(SessionEvent::Fault)?;
                return Err(e.into());
            }
        };

        self.release_handle();
        self.apply(SessionEvent::Captured)?;
        if let Some(metrics) = &self.metrics {
            metrics.record_capture();
        }
        tracing::info!(
            width = still.width(),
            height = still.height(),
            fingerprint = %still.fingerprint_hex(),
            "photo captured"
        );
        Ok(self.still.insert(still))
    }

    /// Discards the still. Valid from `Captured`; leaves the session
    /// `Idle` without re-requesting the camera.
    pub fn retake(&mut self) -> Result<(), SessionError> {
        self.apply(SessionEvent::Retake)?;
        self.still = None;
        Ok(())
    }

    /// Hands the still off to the caller, leaving the session `Idle`.
    pub fn take_still(&mut self) -> Option<StillFrame> {
        if self.state != SessionState::Captured {
            return None;
        }
        let still = self.still.take();
        self.state = transition(self.state, SessionEvent::Retake).unwrap_or(SessionState::Idle);
        still
    }

    /// Releases everything and returns to `Idle`. Safe in any state.
    ///
    /// An in-flight request is abandoned; if the device is granted later
    /// it is released as soon as it arrives.
    pub fn stop(&mut self) {
        if self.pending.take().is_some() {
            tracing::info!("abandoning in-flight camera request");
        }
        self.release_handle();
        self.still = None;

        let previous = self.state;
        self.state = transition(previous, SessionEvent::Stop).unwrap_or(SessionState::Idle);
        if previous != SessionState::Idle {
            tracing::info!(from = %previous, "camera session stopped");
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Result<SessionState, SessionError> {
        let next = transition(self.state, event)?;
        tracing::debug!(from = %self.state, to = %next, event = %event, "session transition");
        self.state = next;
        Ok(next)
    }

    fn complete(&mut self, outcome: AcquirePoll) -> Result<SessionState, SessionError> {
        match outcome {
            AcquirePoll::Pending => Ok(self.state),
            AcquirePoll::Granted(handle) => {
                self.pending = None;
                self.handle = Some(handle);
                self.apply(SessionEvent::Granted)
            }
            AcquirePoll::Failed(e) => {
                self.pending = None;
                self.fail_acquire(e)
            }
        }
    }

    fn fail_acquire<T>(&mut self, e: CameraError) -> Result<T, SessionError> {
        self.apply(SessionEvent::Denied)?;
        self.last_error = Some(e.clone());
        Err(SessionError::DeviceUnavailable(e))
    }

    fn fault<T>(&mut self, e: CameraError) -> Result<T, SessionError> {
        tracing::error!(error = %e, "camera stream failed");
        self.release_handle();
        self.apply(SessionEvent::Fault)?;
        self.last_error = Some(e.clone());
        Err(SessionError::Device(e))
    }

    fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.release();
        }
        self.preview = None;
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("state", &self.state)
            .field("holds_device", &self.holds_device())
            .field("still", &self.still)
            .finish_non_exhaustive()
    }
}
