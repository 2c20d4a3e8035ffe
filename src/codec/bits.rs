use crate::error::AmqpEncodeError;

/// Packs consecutive `bit` method arguments into one octet.
///
/// The first bit occupies the low-order position.
pub fn pack_bits(bits: &[bool]) -> Result<u8, AmqpEncodeError> {
    if bits.len() > 8 {
        return Err(AmqpEncodeError::TooManyBits(bits.len()));
    }
    Ok(bits
        .iter()
        .enumerate()
        .fold(0u8, |acc, (idx, bit)| acc | (u8::from(*bit) << idx)))
}

/// Inverse of `pack_bits`, yields the first `count` bits of `octet`.
pub fn unpack_bits(octet: u8, count: usize) -> impl Iterator<Item = bool> {
    (0..count.min(8)).map(move |idx| octet & (1 << idx) != 0)
}
