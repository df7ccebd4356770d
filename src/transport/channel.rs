use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{ConnectionState, Transport};
use crate::{Error, Result};

/// Transport backed by an unbounded tokio channel.
///
/// A writer task (or a test) drains the receiving half and puts the frames on
/// the wire.
#[derive(Clone, Debug)]
pub struct ChannelTransport {
    tx: UnboundedSender<Vec<u8>>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver its frames arrive on.
    pub fn new() -> (Self, UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        self.tx
            .send(frame.to_vec())
            .map_err(|_| Error::TransportUnavailable(ConnectionState::None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_arrive_in_order() {
        let (mut transport, mut rx) = ChannelTransport::new();
        transport.write(&[1, 2]).unwrap();
        transport.write(&[3]).unwrap();

        assert_eq!(rx.try_recv().unwrap(), vec![1, 2]);
        assert_eq!(rx.try_recv().unwrap(), vec![3]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_reports_unavailable() {
        let (mut transport, rx) = ChannelTransport::new();
        drop(rx);
        assert!(matches!(
            transport.write(&[0]),
            Err(Error::TransportUnavailable(_))
        ));
    }
}
