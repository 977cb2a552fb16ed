use super::{Readiness, Socket, SocketType};
use crate::icmp::v4::MAX_DATAGRAM_SIZE;
use socket2::{Domain, Protocol, Type};
use std::{io, mem::MaybeUninit, net::Ipv4Addr, time::Duration};

// SO_RCVTIMEO has microsecond resolution; anything shorter becomes zero,
// which means no timeout at all.
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

/// ICMPv4 socket; closed when dropped.
pub struct IcmpSocket {
    socket: socket2::Socket,
}

impl Socket for IcmpSocket {
    fn create(socket_type: SocketType) -> io::Result<Self> {
        tracing::trace!("creating ICMPv4 socket of type {:?}", socket_type);
        let ty = match socket_type {
            SocketType::RAW => Type::RAW,
            SocketType::DGRAM => Type::DGRAM,
        };
        let socket = socket2::Socket::new(Domain::IPV4, ty, Some(Protocol::ICMPV4))?;
        socket.set_recv_buffer_size(MAX_DATAGRAM_SIZE)?;
        Ok(IcmpSocket { socket })
    }

    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn wait_readable(&self, timeout: Duration) -> io::Result<Readiness> {
        if timeout < MIN_READ_TIMEOUT {
            return Ok(Readiness::TimedOut);
        }
        self.socket.set_read_timeout(Some(timeout))?;

        // Peeking leaves the datagram queued for `recv_from`. The buffer is full
        // size since some platforms fail a peek that truncates.
        let mut peek_buf = vec![MaybeUninit::<u8>::uninit(); MAX_DATAGRAM_SIZE];
        match self.socket.peek_from(&mut peek_buf) {
            Ok(_) => Ok(Readiness::Ready),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(Readiness::TimedOut)
            }
            Err(e) => Err(e),
        }
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)> {
        // Socket2 gives a safety guaranty which allows us to do an unsafe cast from `&mut [u8]`
        // to `&mut [std::mem::MaybeUninit<u8>]`: it never writes uninitialized bytes into it.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        //
        // On a RAW socket we get an IP packet.
        let (n, socket_addr) = self.socket.recv_from(unsafe {
            &mut *(std::ptr::addr_of_mut!(*buf) as *mut [MaybeUninit<u8>])
        })?;
        let ip = *socket_addr
            .as_socket_ipv4()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "datagram from non-IPv4 address")
            })?
            .ip();
        Ok((n, ip))
    }
}
