//! Check-in Kiosk CLI
//!
//! Drives the employee and visitor check-in flows from the command line.
//! Uses the mock camera unless built with the `camera` feature and given
//! `--device`.

use checkin_kiosk::{
    capture::{CameraError, CameraSource, FileConfig, KioskConfig, MockOutcome, MockSource},
    checkin::{FlowError, Handoff, Kiosk, KioskError, Route, Screen},
    metrics::SessionMetrics,
    session::{CameraSession, SessionError, SessionState},
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "checkin-kiosk", version, about = "Camera check-in kiosk")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the native webcam with this index (requires the `camera` feature).
    #[arg(long)]
    device: Option<u32>,

    /// Native resolution of the mock camera.
    #[arg(long, default_value = "640x480", value_parser = parse_resolution)]
    native: (u32, u32),

    /// Polls before the mock camera decodes its first frame.
    #[arg(long, default_value_t = 0)]
    warmup: u32,

    /// Number of mock acquisitions to refuse before granting one.
    #[arg(long, default_value_t = 0)]
    deny: u32,

    /// Print Prometheus metrics when done.
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    flow: Flow,
}

#[derive(Debug, Subcommand)]
enum Flow {
    /// Employee check-in: photo, optional retake, continue.
    Employee {
        /// Retake the photo once before continuing.
        #[arg(long)]
        retake: bool,
    },
    /// Visitor check-in: photo plus contact form.
    Visitor {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// meeting, delivery, interview or other
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long)]
        meeting_with: Option<String>,
        /// Submit the form without taking a photo.
        #[arg(long)]
        no_photo: bool,
    },
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Kiosk(#[from] KioskError),
    #[error("camera was not granted within {0} ms")]
    AcquireTimeout(u64),
    #[error("camera was never requested (session is {0})")]
    NotRequested(SessionState),
    #[error("expected to be on {0}")]
    WrongScreen(Route),
    #[error("interrupted")]
    Interrupted,
}

fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let height = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if width == 0 || height == 0 {
        return Err("resolution must be non-zero".into());
    }
    Ok((width, height))
}

fn select_source(cli: &Cli) -> Arc<dyn CameraSource> {
    #[cfg(feature = "camera")]
    if cli.device.is_some() {
        info!("Using native webcam");
        return Arc::new(checkin_kiosk::capture::NokhwaSource::new());
    }
    #[cfg(not(feature = "camera"))]
    if cli.device.is_some() {
        warn!("Built without the `camera` feature; using mock camera");
    }

    let (width, height) = cli.native;
    info!(width, height, "Using mock camera");
    Arc::new(
        MockSource::new(width, height)
            .with_warmup(cli.warmup)
            .with_outcomes(std::iter::repeat(MockOutcome::PermissionDenied).take(cli.deny as usize)),
    )
}

fn check_interrupt(interrupted: &AtomicBool) -> Result<(), RunError> {
    if interrupted.load(Ordering::SeqCst) {
        return Err(RunError::Interrupted);
    }
    Ok(())
}

/// Waits for the camera, re-requesting it as the retry policy allows.
fn bring_live(
    session: &mut CameraSession,
    policy: &KioskConfig,
    interrupted: &AtomicBool,
) -> Result<(), RunError> {
    let mut retries_left = policy.acquire_retries;
    loop {
        check_interrupt(interrupted)?;

        let unavailable = match session.wait_live(Duration::from_millis(policy.acquire_timeout_ms)) {
            Ok(SessionState::Live) => return Ok(()),
            Ok(SessionState::Acquiring) => {
                return Err(RunError::AcquireTimeout(policy.acquire_timeout_ms))
            }
            Ok(SessionState::Error) => SessionError::DeviceUnavailable(
                session
                    .last_error()
                    .cloned()
                    .unwrap_or(CameraError::NotInitialized),
            ),
            Ok(state) => return Err(RunError::NotRequested(state)),
            Err(e @ SessionError::DeviceUnavailable(_)) => e,
            Err(e) => return Err(FlowError::from(e).into()),
        };

        if retries_left == 0 {
            return Err(FlowError::from(unavailable).into());
        }
        retries_left -= 1;
        warn!(error = %unavailable, retries_left, "Camera unavailable, asking again");
        session.start().map_err(FlowError::from)?;
    }
}

/// Captures, waiting out a stream that has not decoded a frame yet.
fn capture_when_ready(
    session: &mut CameraSession,
    policy: &KioskConfig,
    interrupted: &AtomicBool,
) -> Result<(), RunError> {
    let mut attempts = 0;
    loop {
        check_interrupt(interrupted)?;
        match session.capture() {
            Ok(_) => return Ok(()),
            Err(e) if e.is_recoverable() && attempts < policy.frame_retries => {
                attempts += 1;
                thread::sleep(Duration::from_millis(policy.frame_retry_interval_ms));
            }
            Err(e) => return Err(FlowError::from(e).into()),
        }
    }
}

fn run_employee(
    kiosk: &mut Kiosk,
    policy: &KioskConfig,
    interrupted: &AtomicBool,
    retake: bool,
) -> Result<(), RunError> {
    kiosk.navigate(Route::EmployeeCheckIn)?;
    let screen = kiosk
        .employee_mut()
        .ok_or(RunError::WrongScreen(Route::EmployeeCheckIn))?;

    bring_live(screen.session_mut(), policy, interrupted)?;
    capture_when_ready(screen.session_mut(), policy, interrupted)?;

    if retake {
        info!("Retaking photo");
        screen.retake_photo()?;
        screen.restart_camera()?;
        bring_live(screen.session_mut(), policy, interrupted)?;
        capture_when_ready(screen.session_mut(), policy, interrupted)?;
    }

    let navigation = screen.continue_with_photo()?;
    kiosk.follow(navigation)?;
    Ok(())
}

fn run_visitor(
    kiosk: &mut Kiosk,
    policy: &KioskConfig,
    interrupted: &AtomicBool,
    fields: &[(&str, Option<&str>)],
    take_photo: bool,
) -> Result<(), RunError> {
    kiosk.navigate(Route::VisitorCheckIn)?;
    let screen = kiosk
        .visitor_mut()
        .ok_or(RunError::WrongScreen(Route::VisitorCheckIn))?;

    if take_photo {
        bring_live(screen.session_mut(), policy, interrupted)?;
        capture_when_ready(screen.session_mut(), policy, interrupted)?;
    }

    for (name, value) in fields {
        if let Some(value) = value {
            screen.update_field(name, value)?;
        }
    }

    let navigation = screen.submit();
    kiosk.follow(navigation)?;
    Ok(())
}

fn print_handoff(handoff: &Handoff) {
    match handoff {
        Handoff::Employee(_) => println!("Employee checked in"),
        Handoff::Visitor(v) => {
            println!("Visitor checked in: {}", v.name.full());
            if let Some(purpose) = v.purpose {
                println!("Purpose: {}", purpose);
            }
        }
    }
    println!("Time: {}", handoff.checked_in_at().to_rfc3339());
    match handoff.photo() {
        Some(photo) => println!(
            "Photo: {}x{} {:?}, {} bytes, sha256 {}",
            photo.width(),
            photo.height(),
            photo.format(),
            photo.bytes().len(),
            photo.fingerprint_hex()
        ),
        None => println!("Photo: none"),
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Check-in Kiosk v{}", checkin_kiosk::VERSION);

    let mut config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(device) = cli.device {
        config.capture.device_id = device;
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let mut kiosk = Kiosk::new(select_source(&cli), config.capture.clone())
        .with_still_config(config.still.clone());
    let metrics = match SessionMetrics::new() {
        Ok(metrics) => {
            kiosk = kiosk.with_metrics(metrics.clone());
            Some(metrics)
        }
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    let result = match &cli.flow {
        Flow::Employee { retake } => run_employee(&mut kiosk, &config.kiosk, &interrupted, *retake),
        Flow::Visitor {
            first_name,
            last_name,
            email,
            phone,
            purpose,
            meeting_with,
            no_photo,
        } => {
            let fields = [
                ("firstName", Some(first_name.as_str())),
                ("lastName", Some(last_name.as_str())),
                ("email", email.as_deref()),
                ("phoneNumber", phone.as_deref()),
                ("purpose", purpose.as_deref()),
                ("meetingWith", meeting_with.as_deref()),
            ];
            run_visitor(&mut kiosk, &config.kiosk, &interrupted, &fields, !no_photo)
        }
    };

    let exit_code = match result {
        Ok(()) => {
            if let Screen::Confirmation(handoff) = kiosk.screen() {
                print_handoff(handoff);
            }
            0
        }
        Err(RunError::Interrupted) => {
            warn!("Interrupted, releasing camera");
            130
        }
        Err(e) => {
            eprintln!("Check-in failed: {}", e);
            1
        }
    };

    kiosk.reset();
    if kiosk.holds_device() {
        warn!("Camera still held after reset");
    }

    if cli.metrics {
        if let Some(metrics) = &metrics {
            match metrics.encode() {
                Ok(output) => print!("{}", output),
                Err(e) => warn!("Failed to encode metrics: {}", e),
            }
        }
    }

    std::process::exit(exit_code);
}
