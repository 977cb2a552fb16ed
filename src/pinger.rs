use crate::clock::{Clock, MonotonicClock};
use crate::icmp::v4::{IcmpSocket, Socket};
use crate::ping_error::{ErrorKind, PingError};
use crate::probe::{Probe, ProbeConfig};
use crate::probe_result::ProbeResult;
use crate::resolver::resolve_host_v4;
use std::marker::PhantomData;

/// Checks a host by name: resolve, open a socket, probe once, close.
///
/// The probe session, and with it the sequence counter, lives across checks;
/// the socket only lives for one.
pub struct Pinger<S = IcmpSocket, C = MonotonicClock> {
    probe: Probe<C>,
    _socket: PhantomData<fn() -> S>,
}

impl<S> Pinger<S, MonotonicClock>
where
    S: Socket,
{
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        Self::with_probe(Probe::new(config))
    }
}

impl<S, C> Pinger<S, C>
where
    S: Socket,
    C: Clock,
{
    pub fn with_probe(probe: Probe<C>) -> Self {
        Pinger {
            probe,
            _socket: PhantomData,
        }
    }

    pub fn probe(&self) -> &Probe<C> {
        &self.probe
    }

    /// See [`Probe::set_payload_size`].
    pub fn set_payload_size(&mut self, total_size: usize) -> Result<(), PingError> {
        self.probe.set_payload_size(total_size)
    }

    pub fn check(&mut self, hostname: &str) -> (bool, ProbeResult) {
        let mut result = ProbeResult::default();

        let target = match resolve_host_v4(hostname) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!("resolution failed: {}", e);
                result.status.error(PingError::new(
                    ErrorKind::Resolution,
                    format!("unknown host '{hostname}'"),
                ));
                return (false, result);
            }
        };
        result
            .status
            .info(format!("hostname '{hostname}' (to ip: {target})"));

        let socket = match S::create(self.probe.config().socket_type) {
            Ok(socket) => socket,
            Err(e) => {
                let mut error = PingError::from(e);
                error.message = format!("failed to create socket: {}", error.message);
                result.status.error(error);
                return (false, result);
            }
        };

        let success = self.probe.probe(&socket, target, &mut result);
        drop(socket);
        tracing::trace!("socket closed");

        (success, result)
    }
}
