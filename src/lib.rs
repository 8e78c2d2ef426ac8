//! Two-stage codec: Huffman compression, then Hamming SEC-DED protection.
//!
//! The four core entry points work on in-memory buffers and never touch the
//! filesystem or log anything:
//!
//! - [`huffman_encode`] / [`huffman_decode`]
//! - [`hamming_encode`] / [`hamming_decode`]
//!
//! [`pipeline`] chains them and adds file I/O.

pub mod bits;
pub mod config;
mod errors;
pub mod hamming;
pub mod huffman;
pub mod pipeline;

pub use crate::bits::{bits_to_bytes, bytes_to_bits, BitSequence, Bits};
pub use crate::config::Limits;
pub use crate::errors::{CodecError, Result};
pub use crate::hamming::{hamming_decode, hamming_encode, Correction, HammingDecoded};
pub use crate::huffman::{huffman_decode, huffman_encode, CodeTable, HuffmanEncoded};
pub use crate::pipeline::{compress, decompress};
