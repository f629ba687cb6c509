//! Background device acquisition.
//!
//! Acquiring a camera can block for as long as the user takes to answer a
//! permission prompt, so it runs on a worker thread and reports back over
//! a one-slot channel. If the session gives up on the request before the
//! grant arrives, the worker (or the channel, if the grant was already
//! queued) drops the late handle, which releases the device.

use super::handle::DeviceHandle;
use crate::capture::{acquire, CameraError, CameraSource, CaptureConfig};
use crate::metrics::SessionMetrics;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of checking on an in-flight acquisition.
#[derive(Debug)]
pub(crate) enum AcquirePoll {
    Pending,
    Granted(DeviceHandle),
    Failed(CameraError),
}

/// An acquisition request that has not been answered yet.
#[derive(Debug)]
pub(crate) struct PendingAcquire {
    rx: Receiver<Result<DeviceHandle, CameraError>>,
    requested_at: Instant,
}

impl PendingAcquire {
    /// Starts acquiring a device from `source` on a worker thread.
    pub(crate) fn spawn(
        source: Arc<dyn CameraSource>,
        config: CaptureConfig,
        metrics: Option<SessionMetrics>,
    ) -> Result<Self, CameraError> {
        let (tx, rx) = bounded(1);

        thread::Builder::new()
            .name("camera-acquire".into())
            .spawn(move || {
                let result = acquire(source.as_ref(), &config)
                    .map(|camera| DeviceHandle::new(camera, metrics.clone()));

                if let Err(e) = &result {
                    if let Some(metrics) = &metrics {
                        metrics.record_acquire_failure();
                    }
                    tracing::warn!(error = %e, "camera acquisition failed");
                }

                if let Err(unclaimed) = tx.send(result) {
                    if let Ok(handle) = unclaimed.into_inner() {
                        tracing::info!(
                            handle = handle.id(),
                            "acquisition abandoned before grant, releasing device"
                        );
                        handle.release();
                    }
                }
            })
            .map_err(|e| CameraError::OpenFailed(format!("failed to spawn acquisition: {e}")))?;

        Ok(Self {
            rx,
            requested_at: Instant::now(),
        })
    }

    /// Checks for an answer without blocking.
    pub(crate) fn try_complete(&self) -> AcquirePoll {
        match self.rx.try_recv() {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) => AcquirePoll::Pending,
            Err(TryRecvError::Disconnected) => Self::worker_lost(),
        }
    }

    /// Waits up to `timeout` for an answer.
    pub(crate) fn wait(&self, timeout: Duration) -> AcquirePoll {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => self.finish(result),
            Err(RecvTimeoutError::Timeout) => AcquirePoll::Pending,
            Err(RecvTimeoutError::Disconnected) => Self::worker_lost(),
        }
    }

    fn finish(&self, result: Result<DeviceHandle, CameraError>) -> AcquirePoll {
        tracing::debug!(
            elapsed_ms = self.requested_at.elapsed().as_millis() as u64,
            granted = result.is_ok(),
            "camera acquisition answered"
        );
        match result {
            Ok(handle) => AcquirePoll::Granted(handle),
            Err(e) => AcquirePoll::Failed(e),
        }
    }

    fn worker_lost() -> AcquirePoll {
        AcquirePoll::Failed(CameraError::OpenFailed(
            "acquisition worker exited without answering".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{MockOutcome, MockSource};

    fn wait_answer(pending: &PendingAcquire) -> AcquirePoll {
        pending.wait(Duration::from_secs(5))
    }

    #[test]
    fn test_grant_delivers_handle() {
        let source = Arc::new(MockSource::new(8, 8));
        let ledger = source.ledger();
        let pending = PendingAcquire::spawn(source, CaptureConfig::default(), None).unwrap();

        match wait_answer(&pending) {
            AcquirePoll::Granted(handle) => {
                assert_eq!(ledger.held(), 1);
                drop(handle);
            }
            other => panic!("unexpected poll result: {other:?}"),
        }
        assert_eq!(ledger.held(), 0);
    }

    #[test]
    fn test_denial_delivers_error() {
        let source = Arc::new(MockSource::new(8, 8).with_outcomes([MockOutcome::PermissionDenied]));
        let pending = PendingAcquire::spawn(source, CaptureConfig::default(), None).unwrap();

        assert!(matches!(
            wait_answer(&pending),
            AcquirePoll::Failed(CameraError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_gated_acquisition_is_pending() {
        let (source, gate) = MockSource::new(8, 8).gated();
        let pending = PendingAcquire::spawn(Arc::new(source), CaptureConfig::default(), None).unwrap();

        assert!(matches!(pending.try_complete(), AcquirePoll::Pending));
        gate.grant();
        assert!(matches!(wait_answer(&pending), AcquirePoll::Granted(_)));
    }

    #[test]
    fn test_abandoned_acquisition_releases_late_grant() {
        let (source, gate) = MockSource::new(8, 8).gated();
        let source = Arc::new(source);
        let ledger = source.ledger();
        let pending = PendingAcquire::spawn(source, CaptureConfig::default(), None).unwrap();

        drop(pending);
        gate.grant();

        let deadline = Instant::now() + Duration::from_secs(5);
        while ledger.released() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(ledger.acquired(), 1);
        assert_eq!(ledger.held(), 0);
    }
}
