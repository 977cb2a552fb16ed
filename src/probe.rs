use crate::clock::{Clock, MonotonicClock};
use crate::icmp::v4::{
    decode, EchoRequest, Readiness, SequenceNumber, Socket, SocketType, DEFAULT_PAYLOAD_SIZE,
    ECHO_OVERHEAD, MAX_DATAGRAM_SIZE,
};
use crate::ping_error::{ErrorKind, PingError};
use crate::probe_result::ProbeResult;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// Receive attempts per probe, all sharing one timeout budget.
pub const RECEIVE_ATTEMPTS: usize = 4;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Filler bytes after the echo header and timestamp.
    pub payload_size: usize,
    /// Budget for all receive attempts together.
    pub timeout: Duration,
    pub socket_type: SocketType,
    /// Only accept echo replies carrying the identifier and sequence number
    /// of the request just sent. Off, any echo reply from the target counts.
    pub match_identity: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            payload_size: DEFAULT_PAYLOAD_SIZE,
            timeout: DEFAULT_TIMEOUT,
            socket_type: SocketType::default(),
            match_identity: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Building,
    Sent,
    Waiting,
    Retry,
    Matched,
    TimedOut,
    Error,
}

/// Why one receive attempt did not produce a match.
enum Miss {
    /// Try again while attempts and budget remain.
    Retry,
    /// Give up on this probe.
    Fatal,
}

/// Echo probe session: owns the sequence counter and the clock whose ticks
/// travel in the payload.
pub struct Probe<C = MonotonicClock> {
    config: ProbeConfig,
    clock: C,
    identifier: u16,
    sequence_number: SequenceNumber,
    states: Vec<State>,
}

impl Probe<MonotonicClock> {
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C> Probe<C>
where
    C: Clock,
{
    pub fn with_clock(config: ProbeConfig, clock: C) -> Self {
        Probe {
            config,
            clock,
            identifier: process_identifier(),
            sequence_number: SequenceNumber::start_value(),
            states: vec![],
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// Sequence number the next request will carry.
    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }

    /// State transitions of the most recent probe.
    pub fn get_states(&self) -> Vec<State> {
        self.states.clone()
    }

    /// Sets the total request size, header and timestamp included.
    ///
    /// Accepts `16 < total_size < MAX_DATAGRAM_SIZE`; anything else leaves the
    /// configured size alone.
    pub fn set_payload_size(&mut self, total_size: usize) -> Result<(), PingError> {
        if total_size <= ECHO_OVERHEAD || total_size >= MAX_DATAGRAM_SIZE {
            return Err(PingError::new(
                ErrorKind::InvalidArgument,
                format!(
                    "packet size {total_size} not in ({ECHO_OVERHEAD}, {MAX_DATAGRAM_SIZE})"
                ),
            ));
        }
        self.config.payload_size = total_size - ECHO_OVERHEAD;
        Ok(())
    }

    /// Sends one echo request to `target` and waits for its reply.
    ///
    /// `result` is filled in place and its status log extended. Returns `true`
    /// when a reply matched; on every other path the numeric fields of
    /// `result` are zero.
    pub fn probe<S>(&mut self, socket: &S, target: Ipv4Addr, result: &mut ProbeResult) -> bool
    where
        S: Socket,
    {
        self.states.clear();
        result.reset();

        self.enter(State::Building);
        let sequence_number = self.sequence_number;
        if let Err(e) = self.send_echo_request(socket, target, sequence_number, result) {
            result.status.error(e);
            self.enter(State::Error);
            return false;
        }
        self.enter(State::Sent);
        self.sequence_number = sequence_number.next();

        self.enter(State::Waiting);
        let wait_start = self.clock.now();
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut last_peer: Option<Ipv4Addr> = None;

        for attempt in 1..=RECEIVE_ATTEMPTS {
            if attempt > 1 {
                self.enter(State::Retry);
            }
            let remaining = self
                .config
                .timeout
                .saturating_sub(self.clock.elapsed(wait_start, self.clock.now()));
            tracing::trace!("receive attempt {} with {:?} left", attempt, remaining);

            match self.receive_echo_reply(
                socket,
                target,
                sequence_number,
                remaining,
                &mut buf,
                &mut last_peer,
                result,
            ) {
                Ok(()) => {
                    self.enter(State::Matched);
                    return true;
                }
                Err(Miss::Retry) => {}
                Err(Miss::Fatal) => {
                    self.enter(State::Error);
                    Self::fail(result, last_peer);
                    return false;
                }
            }
        }

        self.enter(State::TimedOut);
        Self::fail(result, last_peer);
        false
    }

    fn send_echo_request<S>(
        &self,
        socket: &S,
        target: Ipv4Addr,
        sequence_number: SequenceNumber,
        result: &mut ProbeResult,
    ) -> Result<(), PingError>
    where
        S: Socket,
    {
        let request = EchoRequest {
            identifier: self.identifier,
            sequence_number,
            timestamp: self.clock.now(),
            payload_size: self.config.payload_size,
        };
        let packet = request.encode()?;

        let addr = SocketAddrV4::new(target, 0).into();
        let bytes = socket.send_to(&packet, &addr).map_err(|e| {
            PingError::new(ErrorKind::Send, format!("failed to send to receiver: {e}"))
        })?;
        if bytes != packet.len() {
            return Err(PingError::new(
                ErrorKind::Send,
                format!(
                    "failed to write the whole packet (bytes: {bytes}, packet size: {})",
                    packet.len()
                ),
            ));
        }

        result.status.info(format!(
            "send: {target} (id {:x}, seq {sequence_number}, len {})",
            self.identifier,
            packet.len()
        ));
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn receive_echo_reply<S>(
        &self,
        socket: &S,
        target: Ipv4Addr,
        sequence_number: SequenceNumber,
        remaining: Duration,
        buf: &mut [u8],
        last_peer: &mut Option<Ipv4Addr>,
        result: &mut ProbeResult,
    ) -> Result<(), Miss>
    where
        S: Socket,
    {
        let status = &mut result.status;
        if remaining.is_zero() {
            status.warn("request timeout");
            return Err(Miss::Retry);
        }
        match socket.wait_readable(remaining) {
            Err(e) => {
                status.error(PingError::new(ErrorKind::Receive, format!("wait error: {e}")));
                return Err(Miss::Retry);
            }
            Ok(Readiness::TimedOut) => {
                status.warn("request timeout");
                return Err(Miss::Retry);
            }
            Ok(Readiness::Ready) => {}
        }

        let (n, from) = match socket.recv_from(buf) {
            Ok(received) => received,
            Err(e) => {
                status.error(PingError::new(ErrorKind::Receive, format!("recvfrom error: {e}")));
                return Err(Miss::Retry);
            }
        };
        *last_peer = Some(from);
        if from != target {
            status.warn(format!("invalid address {from}, discard"));
            return Err(Miss::Retry);
        }

        let reply = match decode(&buf[..n]) {
            Ok(reply) => reply,
            Err(e) => {
                status.error(e);
                return Err(Miss::Fatal);
            }
        };
        if !reply.is_echo_reply() {
            tracing::debug!(
                "ignoring ICMP type {} code {} from {}",
                reply.icmp_type.0,
                reply.icmp_code.0,
                from
            );
            return Err(Miss::Retry);
        }
        if self.config.match_identity
            && (reply.identifier != self.identifier || reply.sequence_number != sequence_number)
        {
            status.warn(format!(
                "unexpected echo reply (id {:x}, seq {}), discard",
                reply.identifier, reply.sequence_number
            ));
            return Err(Miss::Retry);
        }
        let Some(send_time) = reply.timestamp else {
            status.warn("echo reply without timestamp, discard");
            return Err(Miss::Retry);
        };

        let rtt = self.clock.elapsed_seconds(send_time, self.clock.now());
        status.info(format!(
            "recv: {from} (id {:x}, seq {}, len {}, ttl {}, time {rtt:.6} s)",
            reply.identifier, reply.sequence_number, reply.icmp_len, reply.ttl
        ));
        result.icmp_id = reply.identifier;
        result.icmp_seq = reply.sequence_number.into();
        result.icmp_len = reply.icmp_len;
        result.ip_ttl = reply.ttl;
        result.rtt = rtt;
        result.from_addr = from.to_string();
        Ok(())
    }

    fn fail(result: &mut ProbeResult, last_peer: Option<Ipv4Addr>) {
        result.reset();
        if let Some(peer) = last_peer {
            result.from_addr = peer.to_string();
        }
    }

    fn enter(&mut self, state: State) {
        tracing::trace!("probe state {:?}", state);
        self.states.push(state);
    }
}

/// Low 16 bits of the process id, shared by every probe of this process.
fn process_identifier() -> u16 {
    #[allow(clippy::cast_possible_truncation)]
    let identifier = (std::process::id() & 0xFFFF) as u16;
    identifier
}
