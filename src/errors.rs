/// An error encountered while encoding or decoding.
///
/// None of these are retried; they end the call that produced them.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("nothing to encode: input is empty")]
    EmptyInput,

    /// Malformed frequency table or code table.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A run of Huffman-coded bits that can't be resolved to any symbol, or
    /// broken payload framing.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    #[error("two bit errors detected in codeword; unable to correct")]
    DoubleBitError,

    #[error("invalid codeword: {0}")]
    InvalidCodeword(String),

    #[error("huffman tree is deeper than {limit} levels")]
    TreeTooDeep { limit: usize },

    #[error("{what} of {actual} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        limit: usize,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;
