use std::{io, net::Ipv4Addr, time::Duration};

pub(crate) mod icmp_socket;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SocketType {
    /// Privileged raw socket; every platform hands us the IP header.
    RAW,
    /// ICMP datagram socket, for platforms which still include the IP header
    /// on receive (macOS).
    DGRAM,
}

impl Default for SocketType {
    #[cfg(target_os = "macos")]
    fn default() -> Self {
        SocketType::DGRAM
    }

    #[cfg(not(target_os = "macos"))]
    fn default() -> Self {
        SocketType::RAW
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Readiness {
    Ready,
    TimedOut,
}

pub trait Socket: Send + Sync {
    fn create(socket_type: SocketType) -> io::Result<Self>
    where
        Self: Sized;

    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;

    /// Blocks until a datagram can be read or `timeout` passes.
    fn wait_readable(&self, timeout: Duration) -> io::Result<Readiness>;

    /// Reads one datagram, IP header included, and the address it came from.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)>;
}
