/// Internet checksum (RFC 1071) over `buf`.
///
/// The buffer is summed as big-endian 16-bit words; an odd trailing byte is the
/// high byte of a last, zero-padded word. Carries above bit 15 are folded back
/// until none remain and the one's complement of the result is returned.
///
/// Compute it with the checksum field zeroed and store the result in network
/// byte order. Run over a packet that already carries its checksum, the result
/// is `0`.
#[must_use]
pub fn checksum(buf: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut words = buf.chunks_exact(2);
    for word in &mut words {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
        // keep headroom for long buffers
        if sum > 0xFFFF_0000 {
            sum = fold(sum);
        }
    }
    if let [last] = words.remainder() {
        sum += u32::from(*last) << 8;
    }

    // `fold` leaves at most 16 significant bits
    #[allow(clippy::cast_possible_truncation)]
    let folded = fold(sum) as u16;
    !folded
}

fn fold(mut sum: u32) -> u32 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    sum
}
