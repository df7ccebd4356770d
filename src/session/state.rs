//! Per-session bookkeeping: role, round steps, mailboxes and verdict counters.

use std::fmt;

use num_bigint::BigUint;

use crate::protocol::{Commitment, Prover, Verifier};

/// Which side of the protocol a session plays. Fixed for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Peggy, who holds the secret basis.
    Prover,
    /// Victor, who challenges and checks.
    Verifier,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prover => write!(f, "prover"),
            Self::Verifier => write!(f, "verifier"),
        }
    }
}

/// One message of a round, in protocol order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// `(N, V)`, prover to verifier.
    Commitment,
    /// `X`, prover to verifier.
    Witness,
    /// `A`, verifier to prover.
    Challenge,
    /// `Y`, prover to verifier.
    Response,
    /// `C`, verifier to prover.
    Verdict,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Commitment => "commitment",
            Self::Witness => "witness",
            Self::Challenge => "challenge",
            Self::Response => "response",
            Self::Verdict => "verdict",
        };
        write!(f, "{name}")
    }
}

/// What a session call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A protocol value was encoded and handed to the transport.
    Sent(Step),
    /// A protocol value from the peer was accepted.
    Received(Step),
    /// The next local step needs input the peer has not sent yet.
    WaitingOnPeer(Step),
    /// A round finished, on either side.
    Verdict {
        /// One-based number of the finished round.
        round: u64,
        /// Whether the response was accepted.
        accepted: bool,
    },
    /// The peer sent chat text.
    Text(String),
    /// The configured number of rounds has been played.
    RoundLimitReached,
}

/// Verdict counters for a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Rounds that reached a verdict.
    pub completed: u64,
    /// Rounds whose verdict was positive.
    pub accepted: u64,
    /// Verdict of the most recent round.
    pub last_verdict: Option<bool>,
}

impl RoundSummary {
    pub(crate) fn record(&mut self, accepted: bool) {
        self.completed += 1;
        if accepted {
            self.accepted += 1;
        }
        self.last_verdict = Some(accepted);
    }

    /// True once at least one round completed and every round was accepted.
    pub fn identified(&self) -> bool {
        self.completed > 0 && self.accepted == self.completed
    }
}

/// The active engine, one per session.
#[derive(Debug)]
pub(crate) enum Engine {
    Prover(Prover),
    Verifier(Verifier),
}

/// Single-slot mailboxes for the values of the round in flight.
///
/// Inbound slots hand decoded peer values to the engine; outbound slots record
/// what the local engine emitted.
#[derive(Debug, Default)]
pub(crate) struct Mailbox {
    pub(crate) commitment: Option<Commitment>,
    pub(crate) witness: Option<BigUint>,
    pub(crate) challenge: Option<Vec<bool>>,
    pub(crate) response: Option<BigUint>,
}

impl Mailbox {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
