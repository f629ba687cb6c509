//! End-to-end camera session scenarios against the mock camera.

use checkin_kiosk::capture::{CameraError, CaptureConfig, MockLedger, MockOutcome, MockSource};
use checkin_kiosk::checkin::{Kiosk, Route};
use checkin_kiosk::session::{CameraSession, SessionError, SessionState};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

fn session(source: MockSource) -> (CameraSession, Arc<MockLedger>) {
    let ledger = source.ledger();
    (
        CameraSession::new(Arc::new(source), CaptureConfig::default()),
        ledger,
    )
}

fn wait_for_release(ledger: &MockLedger, released: usize) {
    let deadline = Instant::now() + WAIT;
    while ledger.released() < released && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn live_feed_capture_matches_native_resolution() {
    let (mut session, ledger) = session(MockSource::new(1280, 720).with_warmup(3));
    session.start().unwrap();
    assert_eq!(session.wait_live(WAIT).unwrap(), SessionState::Live);

    // Let the stream deliver frames for a while.
    for _ in 0..10 {
        session.refresh_preview().unwrap();
    }

    let still = session.capture().unwrap().clone();
    assert_eq!(still.dimensions(), (1280, 720));
    assert_eq!(still.decoded_dimensions().unwrap(), (1280, 720));
    assert_eq!(session.state(), SessionState::Captured);
    assert!(!session.holds_device());
    assert_eq!(ledger.acquired(), 1);
    assert_eq!(ledger.released(), 1);
}

#[test]
fn denied_then_retried_goes_live() {
    let (mut session, ledger) =
        session(MockSource::new(320, 240).with_outcomes([MockOutcome::PermissionDenied]));

    session.start().unwrap();
    let err = session.wait_live(WAIT).unwrap_err();
    assert!(matches!(
        err,
        SessionError::DeviceUnavailable(CameraError::PermissionDenied(_))
    ));
    assert_eq!(session.state(), SessionState::Error);

    session.start().unwrap();
    assert_eq!(session.wait_live(WAIT).unwrap(), SessionState::Live);
    assert_eq!(ledger.held(), 1);
}

#[test]
fn capture_retake_then_leave_holds_nothing() {
    let source = MockSource::new(320, 240);
    let ledger = source.ledger();
    let mut kiosk = Kiosk::new(Arc::new(source), CaptureConfig::default());

    kiosk.navigate(Route::EmployeeCheckIn).unwrap();
    let screen = kiosk.employee_mut().unwrap();
    screen.session_mut().wait_live(WAIT).unwrap();
    screen.capture_photo().unwrap();
    screen.retake_photo().unwrap();

    kiosk.navigate(Route::Landing).unwrap();
    assert!(!kiosk.holds_device());
    assert_eq!(ledger.acquired(), 1);
    assert_eq!(ledger.held(), 0);
}

#[test]
fn stop_during_acquisition_releases_late_grant() {
    let (source, gate) = MockSource::new(320, 240).gated();
    let (mut session, ledger) = session(source);

    session.start().unwrap();
    assert_eq!(session.state(), SessionState::Acquiring);
    session.stop();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.holds_device());

    gate.grant();
    wait_for_release(&ledger, 1);
    assert_eq!(ledger.acquired(), 1);
    assert_eq!(ledger.held(), 0);
}

#[test]
fn leaving_screen_mid_acquisition_releases_late_grant() {
    let (source, gate) = MockSource::new(320, 240).gated();
    let ledger = source.ledger();
    let mut kiosk = Kiosk::new(Arc::new(source), CaptureConfig::default());

    kiosk.navigate(Route::VisitorCheckIn).unwrap();
    kiosk.reset();
    gate.grant();

    wait_for_release(&ledger, 1);
    assert_eq!(ledger.held(), 0);
}

#[test]
fn retake_never_returns_stale_still() {
    let (mut session, _) = session(MockSource::new(64, 64));
    session.start().unwrap();
    session.wait_live(WAIT).unwrap();
    let first_taken_at = session.capture().unwrap().captured_at();

    session.retake().unwrap();
    assert!(session.still().is_none());
    assert!(matches!(
        session.capture(),
        Err(SessionError::InvalidState(_))
    ));

    session.start().unwrap();
    session.wait_live(WAIT).unwrap();
    let second = session.capture().unwrap();
    assert_eq!(second.dimensions(), (64, 64));
    assert!(second.captured_at() >= first_taken_at);
}

#[test]
fn lost_stream_releases_device_until_restarted() {
    let (mut session, ledger) = session(MockSource::new(160, 120).with_read_failure_after(2));
    session.start().unwrap();
    session.wait_live(WAIT).unwrap();
    session.refresh_preview().unwrap();
    session.refresh_preview().unwrap();

    let err = session.capture().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Device(CameraError::CaptureFailed(_))
    ));
    assert_eq!(session.state(), SessionState::Error);
    assert!(matches!(
        session.last_error(),
        Some(CameraError::CaptureFailed(_))
    ));
    assert!(session.still().is_none());
    assert!(!session.holds_device());
    assert_eq!(ledger.held(), 0);

    session.start().unwrap();
    assert_eq!(session.wait_live(WAIT).unwrap(), SessionState::Live);
    assert_eq!(session.capture().unwrap().dimensions(), (160, 120));
    assert_eq!(ledger.acquired(), 2);
    assert_eq!(ledger.held(), 0);
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Refresh,
    Capture,
    Retake,
    Stop,
    Fault,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        Just(Op::Refresh),
        Just(Op::Capture),
        Just(Op::Retake),
        Just(Op::Stop),
        Just(Op::Fault),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_operation_sequence_balances_devices(
        ops in prop::collection::vec(op(), 1..24),
        warmup in 0u32..3,
    ) {
        let (source, fault) = MockSource::new(16, 12).with_warmup(warmup).faultable();
        let (mut session, ledger) = session(source);

        for op in ops {
            match op {
                Op::Start => {
                    if session.start().is_ok() {
                        prop_assert_eq!(session.wait_live(WAIT).unwrap(), SessionState::Live);
                    }
                }
                Op::Refresh => {
                    session.refresh_preview().unwrap();
                }
                Op::Capture => {
                    let before = session.state();
                    match session.capture().map(|still| still.dimensions()) {
                        Ok(dimensions) => prop_assert_eq!(dimensions, (16, 12)),
                        Err(SessionError::NoFrameAvailable) => {
                            prop_assert_eq!(session.state(), SessionState::Live)
                        }
                        Err(SessionError::InvalidState(_)) => {
                            prop_assert_eq!(session.state(), before)
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {}", e),
                    }
                }
                Op::Retake => {
                    let _ = session.retake();
                }
                Op::Stop => {
                    session.stop();
                    prop_assert_eq!(session.state(), SessionState::Idle);
                }
                Op::Fault => {
                    if session.state() == SessionState::Live {
                        fault.trip();
                        let failed = matches!(session.refresh_preview(), Err(SessionError::Device(_)));
                        prop_assert!(failed);
                        prop_assert_eq!(session.state(), SessionState::Error);
                        prop_assert!(session.last_error().is_some());
                    }
                }
            }

            let live = session.state() == SessionState::Live;
            prop_assert_eq!(ledger.held(), usize::from(live));
            prop_assert_eq!(session.holds_device(), live);
        }

        session.stop();
        session.stop();
        prop_assert_eq!(session.state(), SessionState::Idle);
        prop_assert_eq!(ledger.held(), 0);
        prop_assert_eq!(ledger.acquired(), ledger.released());
    }
}
