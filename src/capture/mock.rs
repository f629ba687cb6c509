//! Scriptable mock camera for tests and demos.

use super::camera::{Camera, CameraError, CameraSource};
use super::frame::RGB_CHANNELS;
use super::{CaptureConfig, Frame};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Result of one scripted acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    Grant,
    PermissionDenied,
    NoDevice,
    Busy,
}

/// Counts devices opened and closed across every camera of a source.
#[derive(Debug, Default)]
pub struct MockLedger {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl MockLedger {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Devices currently open.
    pub fn held(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }
}

/// Holds a gated [`MockSource`] inside `connect` until a grant is issued.
#[derive(Debug, Clone)]
pub struct MockGate {
    tx: Sender<()>,
}

impl MockGate {
    /// Lets one pending (or future) acquisition proceed.
    pub fn grant(&self) {
        let _ = self.tx.send(());
    }
}

/// Breaks the stream of whichever [`MockSource`] camera reads next.
#[derive(Debug, Clone)]
pub struct MockFault {
    tripped: Arc<AtomicBool>,
}

impl MockFault {
    /// Makes the next frame read fail as if the device were unplugged.
    pub fn trip(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }
}

/// Mock media-device service.
///
/// Acquisitions follow the scripted outcomes in order; once the script is
/// exhausted every acquisition is granted.
#[derive(Debug)]
pub struct MockSource {
    native: (u32, u32),
    warmup: u32,
    fail_after: Option<u32>,
    outcomes: Mutex<VecDeque<MockOutcome>>,
    gate: Option<Receiver<()>>,
    fault: Option<Arc<AtomicBool>>,
    ledger: Arc<MockLedger>,
}

impl MockSource {
    /// Creates a source whose cameras decode frames at `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            native: (width, height),
            warmup: 0,
            fail_after: None,
            outcomes: Mutex::new(VecDeque::new()),
            gate: None,
            fault: None,
            ledger: Arc::new(MockLedger::default()),
        }
    }

    /// Number of `current_frame` polls that return no frame after opening.
    pub fn with_warmup(mut self, polls: u32) -> Self {
        self.warmup = polls;
        self
    }

    /// Makes each camera's stream fail for good after delivering `frames`
    /// frames.
    pub fn with_read_failure_after(mut self, frames: u32) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Scripts the outcomes of the next acquisitions.
    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        self.outcomes = Mutex::new(outcomes.into_iter().collect());
        self
    }

    /// Blocks every acquisition until the returned gate grants it.
    pub fn gated(mut self) -> (Self, MockGate) {
        let (tx, rx) = unbounded();
        self.gate = Some(rx);
        (self, MockGate { tx })
    }

    /// Lets the returned handle break a live stream on demand.
    pub fn faultable(mut self) -> (Self, MockFault) {
        let tripped = Arc::new(AtomicBool::new(false));
        self.fault = Some(Arc::clone(&tripped));
        (self, MockFault { tripped })
    }

    pub fn ledger(&self) -> Arc<MockLedger> {
        Arc::clone(&self.ledger)
    }

    fn next_outcome(&self) -> MockOutcome {
        let mut queue = match self.outcomes.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.pop_front().unwrap_or(MockOutcome::Grant)
    }
}

impl CameraSource for MockSource {
    fn connect(&self) -> Result<Box<dyn Camera>, CameraError> {
        if let Some(gate) = &self.gate {
            // A dropped gate lets everything through.
            let _ = gate.recv();
        }

        match self.next_outcome() {
            MockOutcome::Grant => {
                let (width, height) = self.native;
                Ok(Box::new(MockCamera {
                    native: (width, height),
                    warmup: self.warmup,
                    fail_after: self.fail_after,
                    fault: self.fault.clone(),
                    ledger: Some(Arc::clone(&self.ledger)),
                    ..MockCamera::default()
                }))
            }
            MockOutcome::PermissionDenied => Err(CameraError::PermissionDenied(
                "user dismissed the camera prompt".into(),
            )),
            MockOutcome::NoDevice => Err(CameraError::DeviceNotFound("mock".into())),
            MockOutcome::Busy => Err(CameraError::DeviceBusy("mock".into())),
        }
    }
}

/// Mock camera that generates synthetic RGB frames.
#[derive(Debug)]
pub struct MockCamera {
    native: (u32, u32),
    warmup: u32,
    warmup_remaining: u32,
    fail_after: Option<u32>,
    fault: Option<Arc<AtomicBool>>,
    config: Option<CaptureConfig>,
    sequence: u64,
    ledger: Option<Arc<MockLedger>>,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self {
            native: (640, 480),
            warmup: 0,
            warmup_remaining: 0,
            fail_after: None,
            fault: None,
            config: None,
            sequence: 0,
            ledger: None,
        }
    }
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a standalone camera with the given native resolution.
    pub fn with_native(width: u32, height: u32) -> Self {
        Self {
            native: (width, height),
            ..Self::default()
        }
    }

    fn synthesize(&self) -> Vec<u8> {
        let (width, height) = self.native;
        let pixel_count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(pixel_count * RGB_CHANNELS);
        for i in 0..pixel_count {
            let x = (i % width as usize) as u64;
            let y = (i / width as usize) as u64;
            pixels.push(((x + self.sequence) % 256) as u8);
            pixels.push(((y + self.sequence) % 256) as u8);
            pixels.push(((x ^ y) % 256) as u8);
        }
        pixels
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        if self.config.is_none() {
            if let Some(ledger) = &self.ledger {
                ledger.acquired.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.config = Some(config.clone());
        self.sequence = 0;
        self.warmup_remaining = self.warmup;
        tracing::debug!(
            width = self.native.0,
            height = self.native.1,
            "MockCamera opened"
        );
        Ok(())
    }

    fn current_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        if self.config.is_none() {
            return Err(CameraError::NotInitialized);
        }
        let tripped = self
            .fault
            .as_ref()
            .map_or(false, |fault| fault.swap(false, Ordering::SeqCst));
        let exhausted = self
            .fail_after
            .map_or(false, |frames| self.sequence >= u64::from(frames));
        if tripped || exhausted {
            return Err(CameraError::CaptureFailed("mock stream lost".into()));
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return Ok(None);
        }

        let pixels = self.synthesize();
        self.sequence += 1;
        Ok(Some(Frame::new(
            pixels,
            self.native.0,
            self.native.1,
            self.sequence,
        )))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        if self.config.take().is_some() {
            if let Some(ledger) = &self.ledger {
                ledger.released.fetch_add(1, Ordering::SeqCst);
            }
            tracing::debug!("MockCamera closed");
        }
    }
}
