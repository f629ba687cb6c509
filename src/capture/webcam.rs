//! Native webcam backend built on nokhwa.
//!
//! The nokhwa device is created, polled and stopped on a dedicated capture
//! thread. The [`NokhwaCamera`] handle only shares the latest decoded frame
//! with it, so the handle itself is `Send`.
//!
//! A failed read is retried after a short pause. After ten failures in a
//! row the stream is considered lost: the thread stops, the last frame is
//! dropped, and later `current_frame` calls report
//! [`CameraError::CaptureFailed`].

use super::camera::{Camera, CameraError, CameraSource};
use super::{CaptureConfig, Frame};
use crossbeam_channel::bounded;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::NokhwaError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Consecutive failed reads tolerated before the stream is declared lost.
const MAX_READ_FAILURES: u32 = 10;

/// Pause before retrying a failed read.
const READ_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Opens native webcams by index.
#[derive(Debug, Clone, Default)]
pub struct NokhwaSource;

impl NokhwaSource {
    pub fn new() -> Self {
        Self
    }
}

impl CameraSource for NokhwaSource {
    fn connect(&self) -> Result<Box<dyn Camera>, CameraError> {
        Ok(Box::new(NokhwaCamera::default()))
    }
}

/// State shared between the handle and its capture thread.
#[derive(Debug, Default)]
struct Shared {
    latest: Option<Frame>,
    fault: Option<CameraError>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Counts consecutive failed reads on the capture thread.
#[derive(Debug, Default)]
struct ReadFailures {
    consecutive: u32,
}

impl ReadFailures {
    /// Records a failed read. Returns true once the stream should be
    /// given up.
    fn failed(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive >= MAX_READ_FAILURES
    }

    fn succeeded(&mut self) {
        self.consecutive = 0;
    }
}

/// Handle to a webcam streaming on its own capture thread.
#[derive(Debug, Default)]
pub struct NokhwaCamera {
    shared: Arc<Mutex<Shared>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

fn classify(err: NokhwaError) -> CameraError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("not authorized") {
        CameraError::PermissionDenied(message)
    } else if lower.contains("busy") || lower.contains("in use") {
        CameraError::DeviceBusy(message)
    } else if lower.contains("not found") || lower.contains("no device") {
        CameraError::DeviceNotFound(message)
    } else {
        CameraError::OpenFailed(message)
    }
}

fn build_camera(config: &CaptureConfig) -> Result<nokhwa::Camera, NokhwaError> {
    let format = CameraFormat::new(
        Resolution::new(config.width, config.height),
        FrameFormat::MJPEG,
        config.fps,
    );
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));
    let mut camera = nokhwa::Camera::new(CameraIndex::Index(config.device_id), requested)?;
    camera.open_stream()?;
    Ok(camera)
}

impl Camera for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        if self.is_open() {
            return Ok(());
        }

        self.stop.store(false, Ordering::SeqCst);
        *lock(&self.shared) = Shared::default();
        let stop = Arc::clone(&self.stop);
        let shared = Arc::clone(&self.shared);
        let config = config.clone();
        let (ready_tx, ready_rx) = bounded::<Result<(), CameraError>>(1);

        let handle = thread::spawn(move || {
            let mut camera = match build_camera(&config) {
                Ok(camera) => {
                    let _ = ready_tx.send(Ok(()));
                    camera
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(classify(err)));
                    return;
                }
            };

            let mut sequence = 0u64;
            let mut failures = ReadFailures::default();
            while !stop.load(Ordering::Relaxed) {
                let read = camera
                    .frame()
                    .and_then(|buffer| buffer.decode_image::<RgbFormat>())
                    .map_err(|err| err.to_string())
                    .and_then(|img| {
                        let (width, height) = img.dimensions();
                        let pixels = img.into_raw();
                        if pixels.is_empty() {
                            Err("webcam delivered an empty frame".to_string())
                        } else {
                            Ok((pixels, width, height))
                        }
                    });

                let (pixels, width, height) = match read {
                    Ok(decoded) => {
                        failures.succeeded();
                        decoded
                    }
                    Err(message) => {
                        if failures.failed() {
                            tracing::error!(
                                error = %message,
                                failures = failures.consecutive,
                                "webcam stream lost"
                            );
                            let mut slot = lock(&shared);
                            slot.latest = None;
                            slot.fault = Some(CameraError::CaptureFailed(message));
                            break;
                        }
                        tracing::warn!(
                            error = %message,
                            failures = failures.consecutive,
                            "webcam frame read failed"
                        );
                        thread::sleep(READ_RETRY_BACKOFF);
                        continue;
                    }
                };

                sequence += 1;
                lock(&shared).latest = Some(Frame::new(pixels, width, height, sequence));
            }

            if let Err(err) = camera.stop_stream() {
                tracing::warn!(error = %err, "failed to stop webcam stream");
            }
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.thread = Some(handle);
                tracing::info!("webcam stream opened");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CameraError::OpenFailed("capture thread exited".into()))
            }
        }
    }

    fn current_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        if !self.is_open() {
            return Err(CameraError::NotInitialized);
        }
        let slot = lock(&self.shared);
        match &slot.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(slot.latest.clone()),
        }
    }

    fn is_open(&self) -> bool {
        self.thread.is_some()
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::error!("webcam capture thread panicked");
            }
            tracing::info!("webcam stream closed");
        }
        *lock(&self.shared) = Shared::default();
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.close();
    }
}
