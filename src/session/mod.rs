//! Protocol session: one engine per connected endpoint.
//!
//! A [`Session`] owns exactly one engine (prover or verifier), decodes inbound
//! frames into it, encodes what it emits, and rejects frames that arrive out of
//! turn. Nothing here blocks: a local step whose input has not arrived yet
//! reports [`Event::WaitingOnPeer`] and is retried by the caller later.

/// Session configuration loading and validation.
pub mod config;
/// Roles, steps, events and round counters.
pub mod state;

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info, trace, warn};

pub use config::SessionConfig;
use state::{Engine, Mailbox};
pub use state::{Event, Role, RoundSummary, Step};

use crate::codec::{to_naturals, Frame};
use crate::primitives::{Parameters, SecureRng};
use crate::protocol::{Commitment, Prover, ProverState, Verifier, VerifierState};
use crate::transport::{ConnectionState, Transport};
use crate::{Error, Result};

/// A protocol session bound to one connection.
pub struct Session<T: Transport> {
    role: Role,
    config: SessionConfig,
    transport: T,
    engine: Option<Engine>,
    mailbox: Mailbox,
    connection: ConnectionState,
    remote_identity: Option<String>,
    summary: RoundSummary,
    rng: SecureRng,
}

impl<T: Transport> Session<T> {
    /// Creates a session in the given role. The engine is built once the
    /// transport reports [`ConnectionState::Connected`].
    pub fn new(role: Role, config: SessionConfig, transport: T) -> Self {
        Self {
            role,
            config,
            transport,
            engine: None,
            mailbox: Mailbox::default(),
            connection: ConnectionState::None,
            remote_identity: None,
            summary: RoundSummary::default(),
            rng: SecureRng::new(),
        }
    }

    /// Returns the session role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the last connection state reported by the transport.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Returns the peer's display name, once known.
    pub fn remote_identity(&self) -> Option<&str> {
        self.remote_identity.as_deref()
    }

    /// Records the peer's display name.
    pub fn set_remote_identity(&mut self, name: impl Into<String>) {
        self.remote_identity = Some(name.into());
    }

    /// Returns the verdict counters.
    pub fn summary(&self) -> RoundSummary {
        self.summary
    }

    /// Returns the one-based number of the round in progress.
    pub fn round(&self) -> u64 {
        self.summary.completed + 1
    }

    /// Returns the prover engine state, for a prover session with an engine.
    pub fn prover_state(&self) -> Option<ProverState> {
        match &self.engine {
            Some(Engine::Prover(prover)) => Some(prover.state()),
            _ => None,
        }
    }

    /// Returns the verifier engine state, for a verifier session with an engine.
    pub fn verifier_state(&self) -> Option<VerifierState> {
        match &self.engine {
            Some(Engine::Verifier(verifier)) => Some(verifier.state()),
            _ => None,
        }
    }

    /// Returns the modulus in use, once known.
    pub fn modulus(&self) -> Option<&BigUint> {
        match &self.engine {
            Some(Engine::Prover(prover)) => Some(prover.modulus()),
            Some(Engine::Verifier(verifier)) => verifier.modulus(),
            None => None,
        }
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Reacts to a transport state change.
    ///
    /// Entering [`ConnectionState::Connected`] builds a fresh engine (a prover
    /// generates new parameters) and clears all round state. Dropping to
    /// [`ConnectionState::None`] or [`ConnectionState::Listening`] tears the
    /// engine down.
    pub fn on_connection_state_changed(&mut self, state: ConnectionState) -> Result<()> {
        debug!(role = %self.role, from = %self.connection, to = %state, "connection state changed");
        self.connection = state;

        match state {
            ConnectionState::Connected => {
                self.engine = None;
                self.mailbox.clear();
                self.summary = RoundSummary::default();
                self.engine = Some(self.build_engine()?);
                info!(role = %self.role, k = self.config.basis_len, "session ready");
            }
            ConnectionState::None | ConnectionState::Listening => {
                self.engine = None;
                self.mailbox.clear();
                self.remote_identity = None;
            }
            ConnectionState::Connecting => {}
        }

        Ok(())
    }

    /// Sends chat text to the peer.
    pub fn send_text(&mut self, text: &str) -> Result<()> {
        self.ensure_connected()?;
        self.emit(&Frame::Text(text.to_string()))
    }

    /// Performs the next local protocol step, if its input is available.
    ///
    /// # Errors
    ///
    /// - [`Error::TransportUnavailable`] when not connected; nothing is sent
    /// - [`Error::StateViolation`] if the engine refuses the step; the round is
    ///   reset before the error is returned
    pub fn on_local_advance(&mut self) -> Result<Event> {
        self.ensure_connected()?;
        let result = match self.role {
            Role::Prover => self.advance_prover(),
            Role::Verifier => self.advance_verifier(),
        };
        self.contain(result)
    }

    /// Advances until the next step needs input from the peer.
    pub fn drive(&mut self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        loop {
            let event = self.on_local_advance()?;
            let stop = matches!(event, Event::WaitingOnPeer(_) | Event::RoundLimitReached);
            events.push(event);
            if stop {
                return Ok(events);
            }
        }
    }

    /// Handles one inbound frame.
    ///
    /// Returns the event for the frame itself followed, with `auto_advance`,
    /// by the events of the automatic continuation. The frame counts as
    /// consumed once accepted; a failing continuation is logged and leaves the
    /// next step to a later advance.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedFrame`] if the frame cannot be decoded
    /// - [`Error::OutOfTurn`] if it is not the step expected from the peer
    /// - [`Error::InvalidParams`] if a value is unusable, such as a commitment
    ///   of the wrong size or a witness that is zero modulo `N`
    ///
    /// All of these leave the session untouched.
    pub fn on_frame_received(&mut self, bytes: &[u8]) -> Result<Vec<Event>> {
        self.ensure_connected()?;
        trace!(role = %self.role, frame = %hex::encode(bytes), "inbound frame");

        let frame = Frame::decode(bytes).inspect_err(|e| warn!(role = %self.role, "{e}"))?;

        let event = match frame {
            Frame::Text(text) => Event::Text(text),
            frame => {
                let result = self.accept(frame);
                self.contain(result).inspect_err(|e| warn!(role = %self.role, "{e}"))?
            }
        };

        let mut events = vec![event];
        if self.config.auto_advance && !matches!(events[0], Event::Text(_)) {
            match self.drive() {
                Ok(more) => events.extend(more),
                Err(e) => warn!(role = %self.role, "automatic continuation stopped: {e}"),
            }
        }
        Ok(events)
    }

    fn build_engine(&mut self) -> Result<Engine> {
        match self.role {
            Role::Prover => {
                let params = Parameters::generate(
                    self.config.prime_bits,
                    self.config.basis_len,
                    self.config.max_sampling_attempts,
                    &mut self.rng,
                )?;
                Ok(Engine::Prover(
                    Prover::new(params).with_max_attempts(self.config.max_sampling_attempts),
                ))
            }
            Role::Verifier => Ok(Engine::Verifier(Verifier::new(self.config.basis_len))),
        }
    }

    fn advance_prover(&mut self) -> Result<Event> {
        let limit_reached = self.limit_reached();
        let Some(Engine::Prover(prover)) = &mut self.engine else {
            return Err(missing_engine(self.role, "advance"));
        };

        match prover.state() {
            ProverState::ReadyToCommit if limit_reached => Ok(Event::RoundLimitReached),
            ProverState::ReadyToCommit => {
                let commitment = prover.commit()?;
                self.emit(&commitment.to_frame())?;
                self.mailbox.commitment = Some(commitment);
                Ok(self.sent(Step::Commitment))
            }
            ProverState::Committed => {
                let x = prover.witness(&mut self.rng)?;
                self.emit(&Frame::naturals(std::slice::from_ref(&x)))?;
                self.mailbox.witness = Some(x);
                Ok(self.sent(Step::Witness))
            }
            ProverState::Challenged => {
                let Some(challenge) = self.mailbox.challenge.clone() else {
                    return Ok(Event::WaitingOnPeer(Step::Challenge));
                };
                let y = prover.respond(&challenge)?;
                self.emit(&Frame::naturals(std::slice::from_ref(&y)))?;
                self.mailbox.response = Some(y);
                Ok(self.sent(Step::Response))
            }
            ProverState::Responded => Ok(Event::WaitingOnPeer(Step::Verdict)),
        }
    }

    fn advance_verifier(&mut self) -> Result<Event> {
        let limit_reached = self.limit_reached();
        let Some(Engine::Verifier(verifier)) = &mut self.engine else {
            return Err(missing_engine(self.role, "advance"));
        };

        match verifier.state() {
            VerifierState::AwaitingCommitment if limit_reached => Ok(Event::RoundLimitReached),
            VerifierState::AwaitingCommitment => Ok(Event::WaitingOnPeer(Step::Commitment)),
            VerifierState::Committed => {
                let Some(x) = self.mailbox.witness.clone() else {
                    return Ok(Event::WaitingOnPeer(Step::Witness));
                };
                let challenge = verifier.challenge(x, &mut self.rng)?;
                self.emit(&Frame::bits(&challenge))?;
                self.mailbox.challenge = Some(challenge);
                Ok(self.sent(Step::Challenge))
            }
            VerifierState::AwaitingResponse => {
                let Some(y) = self.mailbox.response.clone() else {
                    return Ok(Event::WaitingOnPeer(Step::Response));
                };
                let accepted = verifier.check(&y)?;
                self.mailbox.clear();
                self.emit(&Frame::bits(&[accepted]))?;
                Ok(self.finish_round(accepted))
            }
        }
    }

    /// Routes a decoded protocol frame to the step the peer owes us.
    fn accept(&mut self, frame: Frame) -> Result<Event> {
        let expected = self.expected_from_peer();
        let out_of_turn = |frame: &Frame| Error::OutOfTurn {
            expected: expected.map_or_else(|| "nothing".to_string(), |s| s.to_string()),
            received: match frame {
                Frame::Text(_) => "text frame".to_string(),
                Frame::Integers(_) => "integer frame".to_string(),
                Frame::Bits(_) => "bit frame".to_string(),
            },
        };

        match (expected, frame) {
            (Some(Step::Commitment), Frame::Integers(values)) => {
                let commitment = Commitment::from_values(to_naturals(&values)?)?;
                let Some(Engine::Verifier(verifier)) = &mut self.engine else {
                    return Err(missing_engine(self.role, "receive_commitment"));
                };
                verifier.receive_commitment(commitment.clone())?;
                self.mailbox.commitment = Some(commitment);
                Ok(self.received(Step::Commitment))
            }
            (Some(Step::Witness), Frame::Integers(values)) => {
                let x = single_value(&values, Step::Witness)?;
                if let Some(n) = self.modulus() {
                    if x >= *n || (&x % n).is_zero() {
                        return Err(Error::InvalidParams(
                            "Witness must be a nonzero residue below N".to_string(),
                        ));
                    }
                }
                self.mailbox.witness = Some(x);
                Ok(self.received(Step::Witness))
            }
            (Some(Step::Response), Frame::Integers(values)) => {
                self.mailbox.response = Some(single_value(&values, Step::Response)?);
                Ok(self.received(Step::Response))
            }
            (Some(Step::Challenge), Frame::Bits(bits)) => {
                let challenge = bits.unpack(self.config.basis_len)?;
                self.mailbox.challenge = Some(challenge);
                Ok(self.received(Step::Challenge))
            }
            (Some(Step::Verdict), Frame::Bits(bits)) => {
                let accepted = bits.unpack(1)?[0];
                let Some(Engine::Prover(prover)) = &mut self.engine else {
                    return Err(missing_engine(self.role, "advance_round"));
                };
                prover.advance_round();
                self.mailbox.clear();
                Ok(self.finish_round(accepted))
            }
            (_, frame) => Err(out_of_turn(&frame)),
        }
    }

    /// The step the peer is expected to send next, if any.
    fn expected_from_peer(&self) -> Option<Step> {
        match &self.engine {
            Some(Engine::Prover(prover)) => match prover.state() {
                ProverState::Challenged if self.mailbox.challenge.is_none() => {
                    Some(Step::Challenge)
                }
                ProverState::Responded => Some(Step::Verdict),
                _ => None,
            },
            Some(Engine::Verifier(verifier)) => match verifier.state() {
                VerifierState::AwaitingCommitment if !self.limit_reached() => {
                    Some(Step::Commitment)
                }
                VerifierState::Committed if self.mailbox.witness.is_none() => Some(Step::Witness),
                VerifierState::AwaitingResponse if self.mailbox.response.is_none() => {
                    Some(Step::Response)
                }
                _ => None,
            },
            None => None,
        }
    }

    /// Resets the round when an engine reports a state violation.
    fn contain<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(Error::StateViolation { operation, state }) = &result {
            warn!(role = %self.role, operation = *operation, state = %state, "state violation, resetting round");
            self.reset_round();
        }
        result
    }

    fn reset_round(&mut self) {
        match &mut self.engine {
            Some(Engine::Prover(prover)) => prover.advance_round(),
            Some(Engine::Verifier(verifier)) => verifier.reset(),
            None => {}
        }
        self.mailbox.clear();
    }

    fn finish_round(&mut self, accepted: bool) -> Event {
        self.summary.record(accepted);
        let round = self.summary.completed;
        info!(role = %self.role, round, accepted, "round complete");
        Event::Verdict { round, accepted }
    }

    fn limit_reached(&self) -> bool {
        self.config
            .rounds
            .is_some_and(|rounds| self.summary.completed >= rounds)
    }

    fn emit(&mut self, frame: &Frame) -> Result<()> {
        let bytes = frame.encode()?;
        trace!(role = %self.role, frame = %hex::encode(&bytes), "outbound frame");
        self.transport.write(&bytes)
    }

    fn sent(&self, step: Step) -> Event {
        debug!(role = %self.role, round = self.round(), %step, "sent");
        Event::Sent(step)
    }

    fn received(&self, step: Step) -> Event {
        debug!(role = %self.role, round = self.round(), %step, "received");
        Event::Received(step)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connection != ConnectionState::Connected {
            return Err(Error::TransportUnavailable(self.connection));
        }
        Ok(())
    }
}

fn missing_engine(role: Role, operation: &'static str) -> Error {
    Error::StateViolation {
        operation,
        state: format!("{role} session without engine"),
    }
}

fn single_value(values: &[num_bigint::BigInt], step: Step) -> Result<BigUint> {
    match to_naturals(values)?.as_slice() {
        [value] => Ok(value.clone()),
        other => Err(Error::MalformedFrame(format!(
            "{step} must be a single integer, got {}",
            other.len()
        ))),
    }
}
