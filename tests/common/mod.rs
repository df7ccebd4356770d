//! Common test utilities shared across integration tests.

use feige_fiat_shamir::{ConnectionState, Event, Role, Session, SessionConfig};

/// A session that records emitted frames instead of sending them.
pub type RecordingSession = Session<Vec<Vec<u8>>>;

/// Initialize test tracing (call once at the beginning of tests).
///
/// Subsequent calls are safe and will be ignored.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("feige_fiat_shamir=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// A connected prover and verifier sharing `config`.
#[allow(dead_code)]
pub fn connected_pair(config: SessionConfig) -> (RecordingSession, RecordingSession) {
    let mut prover = Session::new(Role::Prover, config.clone(), Vec::new());
    let mut verifier = Session::new(Role::Verifier, config, Vec::new());
    for session in [&mut prover, &mut verifier] {
        session
            .on_connection_state_changed(ConnectionState::Connected)
            .expect("connecting should build the engine");
    }
    prover.set_remote_identity("victor");
    verifier.set_remote_identity("peggy");
    (prover, verifier)
}

/// Moves every frame `from` has emitted into `to`, returning the events `to`
/// produced.
#[allow(dead_code)]
pub fn deliver(from: &mut RecordingSession, to: &mut RecordingSession) -> Vec<Event> {
    let frames: Vec<Vec<u8>> = from.transport_mut().drain(..).collect();
    frames
        .iter()
        .flat_map(|frame| {
            to.on_frame_received(frame)
                .expect("frame should be accepted")
        })
        .collect()
}

/// Delivers frames in both directions until neither side has anything left.
#[allow(dead_code)]
pub fn pump(prover: &mut RecordingSession, verifier: &mut RecordingSession) {
    while !prover.transport().is_empty() || !verifier.transport().is_empty() {
        deliver(prover, verifier);
        deliver(verifier, prover);
    }
}
