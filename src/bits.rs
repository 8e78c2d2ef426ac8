use bitvec::prelude::*;

/// An ordered, growable sequence of bits.
///
/// Bit 0 is the first bit of the sequence. When packed into bytes, bit 0 lands
/// in the most significant bit of the first byte.
pub type BitSequence = BitVec<u8, Msb0>;

/// Borrowed view of a [`BitSequence`].
pub type Bits = BitSlice<u8, Msb0>;

/// Expand each byte into 8 bits, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> BitSequence {
    BitSequence::from_slice(bytes)
}

/// Pack bits into bytes, most significant bit first.
///
/// If the bit count isn't a multiple of 8, the last byte is padded on the
/// right with zeros. The padding is not recorded anywhere; callers that need
/// the exact bit count have to carry it themselves.
pub fn bits_to_bytes(bits: &Bits) -> Vec<u8> {
    let mut bytes = vec![0; (bits.len() + 7) / 8];
    bytes.view_bits_mut::<Msb0>()[..bits.len()].copy_from_bitslice(bits);
    bytes
}
