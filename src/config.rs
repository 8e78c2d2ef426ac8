use crate::{CodecError, Result};

/// Size of the symbol alphabet: every possible byte value.
pub const MAX_SYMBOLS: usize = 256;

/// The serialized table stores each code length in a single byte.
pub const MAX_SERIALIZED_CODE_LEN: usize = u8::MAX as usize;

/// Upper bounds on everything the codecs allocate or walk.
///
/// Well-formed input from this crate never gets near them. Corrupted headers
/// and oversized files are rejected before anything is allocated for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Largest input, in bytes, accepted for compression.
    pub max_input_len: usize,

    /// Largest number of entries in a code table.
    pub max_symbols: usize,

    /// Longest code, in bits, accepted when reading a code table.
    pub max_code_len: usize,

    /// Deepest leaf allowed when deriving codes from a tree.
    pub max_tree_depth: usize,

    /// Longest payload, in bits, that the Hamming layer will protect.
    pub max_payload_bits: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_len: 100 * 1024 * 1024,
            max_symbols: MAX_SYMBOLS,
            max_code_len: MAX_SERIALIZED_CODE_LEN,
            max_tree_depth: MAX_SERIALIZED_CODE_LEN,
            // Room for worst-case Huffman expansion of a maximum-size input,
            // plus the table and framing.
            max_payload_bits: 8 * 128 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Longest code the tree traversal may produce.
    pub fn max_depth(&self) -> usize {
        self.max_tree_depth.min(self.max_code_len)
    }
}

/// Fail with [`CodecError::LimitExceeded`] if `actual > limit`.
pub(crate) fn check_limit(what: &'static str, actual: usize, limit: usize) -> Result<()> {
    if actual > limit {
        return Err(CodecError::LimitExceeded {
            what,
            actual,
            limit,
        });
    }
    Ok(())
}
