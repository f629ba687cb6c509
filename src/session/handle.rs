//! Owning handle for an acquired camera.

use crate::capture::{Camera, CameraError, Frame};
use crate::metrics::SessionMetrics;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Exclusive ownership of one open camera.
///
/// The camera is closed exactly once: by [`DeviceHandle::release`] or,
/// failing that, when the handle is dropped. There is no way to obtain the
/// camera back out of the handle.
pub struct DeviceHandle {
    id: u64,
    camera: Box<dyn Camera>,
    metrics: Option<SessionMetrics>,
    released: bool,
}

impl DeviceHandle {
    /// Takes ownership of an already opened camera.
    pub(crate) fn new(camera: Box<dyn Camera>, metrics: Option<SessionMetrics>) -> Self {
        let id = NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed);
        if let Some(metrics) = &metrics {
            metrics.record_acquired();
        }
        tracing::info!(handle = id, "camera device acquired");
        Self {
            id,
            camera,
            metrics,
            released: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reads the stream's most recently decoded frame.
    pub fn current_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        self.camera.current_frame()
    }

    /// Stops every track and gives up the device.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.camera.close();
        self.released = true;
        if let Some(metrics) = &self.metrics {
            metrics.record_released();
        }
        tracing::info!(handle = self.id, "camera device released");
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("id", &self.id)
            .field("open", &self.camera.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{acquire, CameraSource, CaptureConfig, MockSource};

    fn open_handle(source: &MockSource, metrics: Option<SessionMetrics>) -> DeviceHandle {
        let camera = acquire(source as &dyn CameraSource, &CaptureConfig::default()).unwrap();
        DeviceHandle::new(camera, metrics)
    }

    #[test]
    fn test_drop_releases_device() {
        let source = MockSource::new(16, 16);
        let ledger = source.ledger();

        let handle = open_handle(&source, None);
        assert_eq!(ledger.held(), 1);

        drop(handle);
        assert_eq!(ledger.held(), 0);
    }

    #[test]
    fn test_explicit_release_counts_once() {
        let source = MockSource::new(16, 16);
        let ledger = source.ledger();
        let metrics = SessionMetrics::new().unwrap();

        let handle = open_handle(&source, Some(metrics.clone()));
        handle.release();

        assert_eq!(ledger.released(), 1);
        assert_eq!(metrics.releases(), 1);
        assert_eq!(metrics.devices_held(), 0);
    }

    #[test]
    fn test_handles_get_distinct_ids() {
        let source = MockSource::new(16, 16);
        let a = open_handle(&source, None);
        let b = open_handle(&source, None);
        assert_ne!(a.id(), b.id());
    }
}
