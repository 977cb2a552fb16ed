use crate::icmp::v4::Ttl;
use crate::ping_error::{ErrorKind, PingError};
use std::fmt;
use std::time::Duration;

/// Ordered, human readable account of what a check did.
///
/// Each line is also emitted as a `tracing` event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLog {
    lines: Vec<String>,
    last_error: Option<ErrorKind>,
}

impl StatusLog {
    pub(crate) fn info(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("{}", line);
        self.lines.push(line);
    }

    pub(crate) fn warn(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!("{}", line);
        self.lines.push(line);
    }

    pub(crate) fn error(&mut self, error: PingError) {
        tracing::warn!(kind = ?error.kind, "{}", error.message);
        self.last_error = Some(error.kind);
        self.lines.push(error.message);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Kind of the most recent failure, if any was recorded.
    #[must_use]
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.last_error = None;
    }
}

impl fmt::Display for StatusLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "Ping: {line}")?;
        }
        Ok(())
    }
}

/// Outcome of one echo exchange. Numeric fields are zero unless the probe
/// matched a reply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeResult {
    pub icmp_id: u16,
    pub icmp_seq: u16,
    pub icmp_len: usize,
    pub ip_ttl: Ttl,
    /// Round-trip time in seconds.
    pub rtt: f64,
    /// Last peer heard from; may be empty or a stranger on failure.
    pub from_addr: String,
    pub status: StatusLog,
}

impl ProbeResult {
    /// Zeroes the numeric fields and the peer address, keeping the status log.
    pub(crate) fn reset(&mut self) {
        self.icmp_id = 0;
        self.icmp_seq = 0;
        self.icmp_len = 0;
        self.ip_ttl = Ttl(0);
        self.rtt = 0.0;
        self.from_addr.clear();
    }

    #[must_use]
    pub fn ping_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.rtt).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_log_display() {
        let mut status = StatusLog::default();
        status.info("hostname 'localhost' (to ip: 127.0.0.1)");
        status.warn("request timeout");

        assert_eq!(2, status.lines().len());
        assert_eq!(
            "Ping: hostname 'localhost' (to ip: 127.0.0.1)\nPing: request timeout\n",
            status.to_string()
        );
        status.clear();
        assert!(status.is_empty());
    }

    #[test]
    fn status_log_keeps_last_error_kind() {
        let mut status = StatusLog::default();
        assert_eq!(None, status.last_error());

        status.error(PingError::new(ErrorKind::Send, "failed to send to receiver"));
        status.warn("request timeout");
        status.error(PingError::new(ErrorKind::Receive, "wait error: interrupted"));

        assert_eq!(Some(ErrorKind::Receive), status.last_error());
        assert_eq!("failed to send to receiver", status.lines()[0]);
        assert_eq!("wait error: interrupted", status.lines()[2]);
        status.clear();
        assert_eq!(None, status.last_error());
    }

    #[test]
    fn reset_keeps_status() {
        let mut result = ProbeResult {
            icmp_id: 1,
            icmp_seq: 2,
            icmp_len: 48,
            ip_ttl: Ttl(55),
            rtt: 0.25,
            from_addr: "10.0.0.1".to_string(),
            status: StatusLog::default(),
        };
        result.status.info("send");

        result.reset();

        assert_eq!(
            ProbeResult {
                status: result.status.clone(),
                ..ProbeResult::default()
            },
            result
        );
        assert_eq!(1, result.status.lines().len());
    }

    #[test]
    fn ping_duration() {
        let result = ProbeResult {
            rtt: 0.000_05,
            ..ProbeResult::default()
        };
        assert_eq!(Duration::from_micros(50), result.ping_duration());
        assert_eq!(Duration::ZERO, ProbeResult::default().ping_duration());
    }
}
