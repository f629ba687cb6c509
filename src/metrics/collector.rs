//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus registry for camera session activity.
///
/// Cloning is cheap; clones share the same underlying counters, so a
/// device handle can carry its own copy and record its release on drop.
#[derive(Clone)]
pub struct SessionMetrics {
    registry: Registry,

    acquisitions: IntCounter,
    releases: IntCounter,
    acquire_failures: IntCounter,
    devices_held: IntGauge,

    captures: IntCounter,
    no_frame: IntCounter,
}

impl SessionMetrics {
    /// Creates a registry with all session metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let acquisitions = IntCounter::new(
            "checkin_camera_acquisitions_total",
            "Camera devices successfully acquired",
        )?;
        let releases = IntCounter::new(
            "checkin_camera_releases_total",
            "Camera devices released",
        )?;
        let acquire_failures = IntCounter::new(
            "checkin_camera_acquire_failures_total",
            "Camera acquisitions that failed or were refused",
        )?;
        let devices_held = IntGauge::new(
            "checkin_camera_devices_held",
            "Camera devices currently held",
        )?;
        let captures = IntCounter::new("checkin_captures_total", "Still frames captured")?;
        let no_frame = IntCounter::new(
            "checkin_capture_no_frame_total",
            "Capture attempts made before the stream decoded a frame",
        )?;

        registry.register(Box::new(acquisitions.clone()))?;
        registry.register(Box::new(releases.clone()))?;
        registry.register(Box::new(acquire_failures.clone()))?;
        registry.register(Box::new(devices_held.clone()))?;
        registry.register(Box::new(captures.clone()))?;
        registry.register(Box::new(no_frame.clone()))?;

        Ok(Self {
            registry,
            acquisitions,
            releases,
            acquire_failures,
            devices_held,
            captures,
            no_frame,
        })
    }

    pub fn record_acquired(&self) {
        self.acquisitions.inc();
        self.devices_held.inc();
    }

    pub fn record_released(&self) {
        self.releases.inc();
        self.devices_held.dec();
    }

    pub fn record_acquire_failure(&self) {
        self.acquire_failures.inc();
    }

    pub fn record_capture(&self) {
        self.captures.inc();
    }

    pub fn record_no_frame(&self) {
        self.no_frame.inc();
    }

    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.get()
    }

    pub fn releases(&self) -> u64 {
        self.releases.get()
    }

    pub fn devices_held(&self) -> i64 {
        self.devices_held.get()
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for SessionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMetrics")
            .field("acquisitions", &self.acquisitions.get())
            .field("releases", &self.releases.get())
            .field("devices_held", &self.devices_held.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        assert!(SessionMetrics::new().is_ok());
    }

    #[test]
    fn test_acquire_release_balance() {
        let metrics = SessionMetrics::new().unwrap();
        let clone = metrics.clone();

        metrics.record_acquired();
        assert_eq!(metrics.devices_held(), 1);

        clone.record_released();
        assert_eq!(metrics.devices_held(), 0);
        assert_eq!(metrics.acquisitions(), 1);
        assert_eq!(metrics.releases(), 1);
    }

    #[test]
    fn test_metrics_encode() {
        let metrics = SessionMetrics::new().unwrap();
        metrics.record_capture();
        metrics.record_capture();

        let output = metrics.encode().unwrap();
        assert!(output.contains("checkin_captures_total 2"));
        assert!(output.contains("checkin_camera_devices_held 0"));
        assert!(output.contains("checkin_capture_no_frame_total"));
    }
}
