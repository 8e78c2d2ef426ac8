//! Extended Hamming code: single error correction, double error detection.
//!
//! Codeword layout, for a payload of `m` bits protected by `p` parity bits:
//!
//! ```text
//! index:  0        1  2  3  4  5  6  7  8  9 ...  m+p
//!         overall  P  P  d  P  d  d  d  P  d ...
//! ```
//!
//! The parity bit at index `2^k` covers every data index with bit `k` set.
//! Index 0 is the parity of all the other bits.

use crate::{config::check_limit, BitSequence, Bits, CodecError, Limits, Result};

/// What [`hamming_decode`] had to repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// The codeword was intact.
    None,

    /// Only the overall parity bit was wrong. The payload was unaffected.
    OverallParity,

    /// The bit at this codeword index was flipped back.
    Flipped(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HammingDecoded {
    pub payload: BitSequence,
    pub correction: Correction,
}

/// Smallest `p` such that `2^p >= m + p + 1`.
pub fn parity_bits(payload_len: usize) -> usize {
    let mut p = 0;
    while (1u128 << p) < (payload_len + p + 1) as u128 {
        p += 1;
    }
    p
}

/// Length of the codeword protecting `payload_len` bits.
pub fn codeword_len(payload_len: usize) -> usize {
    payload_len + parity_bits(payload_len) + 1
}

/// Inverse of [`codeword_len`].
///
/// Returns `None` for lengths that no payload length produces.
pub fn payload_len(codeword_len: usize) -> Option<usize> {
    // The parity bits are exactly the powers of two below the length.
    let highest_index = codeword_len.checked_sub(1)?;
    let p = (usize::BITS - highest_index.leading_zeros()) as usize;
    let m = codeword_len.checked_sub(p + 1)?;
    (m > 0 && parity_bits(m) == p).then_some(m)
}

/// Codeword indices that carry payload bits, ascending.
fn data_indices(codeword_len: usize) -> impl Iterator<Item = usize> {
    (3..codeword_len).filter(|i| !i.is_power_of_two())
}

/// Protect `payload` with parity bits.
///
/// Fails with [`CodecError::EmptyInput`] for an empty payload.
pub fn hamming_encode(payload: &Bits, limits: &Limits) -> Result<BitSequence> {
    if payload.is_empty() {
        return Err(CodecError::EmptyInput);
    }
    check_limit("payload bits", payload.len(), limits.max_payload_bits)?;

    let len = codeword_len(payload.len());
    let mut codeword = BitSequence::repeat(false, len);

    // XOR of the indices of all set data bits. Bit k of this is the parity of
    // the data bits covered by the parity bit at index 2^k.
    let mut coverage = 0;
    for (i, bit) in data_indices(len).zip(payload.iter().by_vals()) {
        if bit {
            codeword.set(i, true);
            coverage ^= i;
        }
    }

    for k in 0..parity_bits(payload.len()) {
        codeword.set(1 << k, (coverage >> k) & 1 == 1);
    }

    let overall = codeword.count_ones() % 2 == 1;
    codeword.set(0, overall);

    Ok(codeword)
}

/// Check `codeword`, repair a single flipped bit if there is one, and extract
/// the payload.
pub fn hamming_decode(codeword: &Bits, limits: &Limits) -> Result<HammingDecoded> {
    let len = codeword.len();
    if len == 0 {
        return Err(CodecError::InvalidCodeword("codeword is empty".into()));
    }
    check_limit("codeword bits", len, codeword_len(limits.max_payload_bits))?;
    let m = payload_len(len).ok_or_else(|| {
        CodecError::InvalidCodeword(format!("no payload encodes to a {len} bit codeword"))
    })?;
    let p = len - m - 1;

    // Recompute parity from the data bits alone, and compare with what's stored.
    let coverage = codeword
        .iter_ones()
        .filter(|&i| i > 2 && !i.is_power_of_two())
        .fold(0, |acc, i| acc ^ i);

    let mut syndrome = 0;
    for k in 0..p {
        let index = 1 << k;
        if codeword[index] != ((coverage >> k) & 1 == 1) {
            syndrome += index;
        }
    }

    let overall_expected = codeword[1..].count_ones() % 2 == 1;
    let overall_matches = overall_expected == codeword[0];

    let correction = match (syndrome, overall_matches) {
        (0, true) => Correction::None,
        (0, false) => Correction::OverallParity,
        (_, true) => return Err(CodecError::DoubleBitError),
        (s, false) if s >= len => {
            let msg = format!("syndrome {s} points outside a {len} bit codeword");
            return Err(CodecError::InvalidCodeword(msg));
        }
        (s, false) => Correction::Flipped(s),
    };

    let mut codeword = codeword.to_bitvec();
    if let Correction::Flipped(i) = correction {
        let bit = codeword[i];
        codeword.set(i, !bit);
    }

    let payload = data_indices(len).map(|i| codeword[i]).collect();
    Ok(HammingDecoded {
        payload,
        correction,
    })
}
