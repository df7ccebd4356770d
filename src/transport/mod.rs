//! The seam between a protocol session and the byte stream it runs over.

use std::fmt;

use crate::Result;

/// Length-delimited frames over TCP.
pub mod tcp;

mod channel;

pub use channel::ChannelTransport;

/// Connection lifecycle reported by the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No connection and not listening.
    #[default]
    None,
    /// Waiting for an inbound connection.
    Listening,
    /// Dialing out.
    Connecting,
    /// A peer is connected.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Listening => "listening",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        write!(f, "{name}")
    }
}

/// Outbound half of a reliable, ordered byte stream.
///
/// Writes are fire-and-forget; no acknowledgment is modelled above the
/// transport.
pub trait Transport {
    /// Hands one complete frame to the stream.
    fn write(&mut self, frame: &[u8]) -> Result<()>;
}

impl Transport for Vec<Vec<u8>> {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        self.push(frame.to_vec());
        Ok(())
    }
}
