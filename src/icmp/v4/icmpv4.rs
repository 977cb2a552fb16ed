use pnet_packet::icmp::{
    echo_reply::EchoReplyPacket, echo_request::MutableEchoRequestPacket, IcmpCode, IcmpType,
    IcmpTypes,
};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;
use std::net::Ipv4Addr;

use super::{checksum, SequenceNumber, Ttl};
use crate::clock::Tick;
use crate::ping_error::{ErrorKind, PingError};

/// Largest request we build and largest datagram we read.
pub const MAX_DATAGRAM_SIZE: usize = 16 * 1024;
pub const ECHO_HEADER_SIZE: usize = 8;
pub const TIMESTAMP_SIZE: usize = 8;
/// Bytes in front of the filler: echo header plus send timestamp.
pub const ECHO_OVERHEAD: usize = ECHO_HEADER_SIZE + TIMESTAMP_SIZE;
pub const DEFAULT_PAYLOAD_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
    pub timestamp: Tick,
    /// Filler bytes after the timestamp.
    pub payload_size: usize,
}

impl EchoRequest {
    /// Serializes the request with its checksum filled in.
    ///
    /// Layout: echo header, big-endian send timestamp, then `payload_size`
    /// filler bytes.
    pub fn encode(&self) -> Result<Vec<u8>, PingError> {
        if self.payload_size == 0 || ECHO_OVERHEAD + self.payload_size >= MAX_DATAGRAM_SIZE {
            return Err(PingError::new(
                ErrorKind::InvalidArgument,
                format!("payload size {} out of range", self.payload_size),
            ));
        }

        let mut buf = vec![0u8; ECHO_OVERHEAD + self.payload_size];
        let mut packet = MutableEchoRequestPacket::new(&mut buf).ok_or_else(|| {
            PingError::new(ErrorKind::InvalidArgument, "could not create ICMP package")
        })?;
        packet.set_icmp_type(IcmpTypes::EchoRequest);
        packet.set_icmp_code(IcmpCode::new(0));
        packet.set_identifier(self.identifier);
        packet.set_sequence_number(self.sequence_number.into());

        let mut payload = Vec::with_capacity(TIMESTAMP_SIZE + self.payload_size);
        payload.extend_from_slice(&self.timestamp.to_be_bytes());
        payload.extend(filler(self.payload_size));
        packet.set_payload(&payload);

        packet.set_checksum(0);
        let value = checksum(packet.packet());
        packet.set_checksum(value);

        Ok(buf)
    }
}

/// `'0'`, `'1'`, ... repeating every 64 bytes.
fn filler(len: usize) -> impl Iterator<Item = u8> {
    #[allow(clippy::cast_possible_truncation)]
    (0..len).map(|i| b'0' + (i & 0x3f) as u8)
}

/// ICMP message read out of a received IPv4 datagram.
///
/// Identifier and sequence are read from the echo header positions whatever
/// the type; `timestamp` is only present for echo replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply {
    pub icmp_type: IcmpType,
    pub icmp_code: IcmpCode,
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
    pub timestamp: Option<Tick>,
    pub source: Ipv4Addr,
    pub ttl: Ttl,
    /// Datagram length minus the IP header.
    pub icmp_len: usize,
}

impl EchoReply {
    #[must_use]
    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == IcmpTypes::EchoReply
    }
}

/// Decodes a datagram as delivered by a raw ICMP socket, IP header included.
pub fn decode(datagram: &[u8]) -> Result<EchoReply, PingError> {
    let ip_packet = Ipv4Packet::new(datagram).ok_or_else(|| {
        malformed(format!(
            "{} bytes cannot hold an IPv4 header",
            datagram.len()
        ))
    })?;
    let ip_header_len = usize::from(ip_packet.get_header_length()) * 4;
    let icmp_len = datagram.len().checked_sub(ip_header_len).ok_or_else(|| {
        malformed(format!(
            "IP header length {ip_header_len} exceeds datagram of {} bytes",
            datagram.len()
        ))
    })?;
    if icmp_len < ECHO_HEADER_SIZE {
        return Err(malformed(format!(
            "ICMP packet's length is less than {ECHO_HEADER_SIZE}"
        )));
    }

    let icmp_packet = EchoReplyPacket::new(&datagram[ip_header_len..])
        .ok_or_else(|| malformed("could not read ICMP header"))?;
    let icmp_type = icmp_packet.get_icmp_type();
    let timestamp = if icmp_type == IcmpTypes::EchoReply {
        icmp_packet
            .payload()
            .get(..TIMESTAMP_SIZE)
            .and_then(|bytes| <[u8; TIMESTAMP_SIZE]>::try_from(bytes).ok())
            .map(Tick::from_be_bytes)
    } else {
        None
    };

    Ok(EchoReply {
        icmp_type,
        icmp_code: icmp_packet.get_icmp_code(),
        identifier: icmp_packet.get_identifier(),
        sequence_number: icmp_packet.get_sequence_number().into(),
        timestamp,
        source: ip_packet.get_source(),
        ttl: ip_packet.get_ttl().into(),
        icmp_len,
    })
}

fn malformed(message: impl Into<String>) -> PingError {
    PingError::new(ErrorKind::Malformed, message)
}
