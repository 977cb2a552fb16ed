mod checksum;
pub use checksum::checksum;

pub(crate) mod icmpv4;
pub use icmpv4::{
    decode, EchoReply, EchoRequest, DEFAULT_PAYLOAD_SIZE, ECHO_HEADER_SIZE, ECHO_OVERHEAD,
    MAX_DATAGRAM_SIZE, TIMESTAMP_SIZE,
};

mod sequence_number;
pub use sequence_number::SequenceNumber;

pub(crate) mod socket;
pub use socket::icmp_socket::IcmpSocket;
pub use socket::{Readiness, Socket, SocketType};

mod ttl;
pub use ttl::Ttl;
