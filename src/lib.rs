#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! One ICMPv4 echo exchange with a host: build and checksum the request, send
//! it over a raw socket, wait a bounded number of times for the matching reply
//! and report round-trip time, TTL and a status trail.
//!
//! ```no_run
//! let mut pinger: pinghr::Pinger = pinghr::Pinger::new(pinghr::ProbeConfig::default());
//! let (success, result) = pinger.check("example.com");
//! println!("{} {:.6} s\n{}", success, result.rtt, result.status);
//! ```

pub use clock::{Clock, MonotonicClock, Tick};
pub use ping_error::{ErrorKind, GenericError, PingError};
pub use pinger::Pinger;
pub use probe::{Probe, ProbeConfig, State, DEFAULT_TIMEOUT, RECEIVE_ATTEMPTS};
pub use probe_result::{ProbeResult, StatusLog};
pub use resolver::resolve_host_v4;

pub mod clock;
pub mod icmp;
mod ping_error;
mod pinger;
mod probe;
mod probe_result;
mod resolver;
