//! Error types for the Feige-Fiat-Shamir protocol

use crate::transport::ConnectionState;

/// Main error types for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Parameters or protocol values have the wrong shape or range.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// A frame could not be parsed: unknown tag, truncated record or bad padding.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// An engine operation was invoked outside the state it is valid in.
    #[error("Protocol state violation: {operation} is not valid in state {state}")]
    StateViolation {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the engine was in.
        state: String,
    },

    /// The peer sent a frame that does not match the next expected protocol step.
    #[error("Out of turn: expected {expected}, received {received}")]
    OutOfTurn {
        /// What the session was waiting for.
        expected: String,
        /// What actually arrived.
        received: String,
    },

    /// A frame was emitted while the transport was not connected.
    #[error("Transport unavailable (connection state: {0})")]
    TransportUnavailable(ConnectionState),

    /// Prime or basis sampling gave up.
    #[error("Parameter generation failed: {0}")]
    ParameterGeneration(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure in the stream driver.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
