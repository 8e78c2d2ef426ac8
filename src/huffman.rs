mod code_table;
pub mod format;
mod tree;

use std::io::Cursor;

pub use self::code_table::CodeTable;
pub use self::tree::{FrequencyTable, HuffmanTree, Node};
use crate::{config::check_limit, BitSequence, Bits, Limits, Result};

/// The output of [`huffman_encode`]: the code table and the coded bits.
///
/// Both are needed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanEncoded {
    pub table: CodeTable,
    pub bits: BitSequence,
}

impl HuffmanEncoded {
    /// Serialize as a Huffman stream: table, then framed payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![];
        format::write_table(&self.table, &mut out);
        format::write_payload(&self.bits, &mut out);
        out
    }

    /// Parse a Huffman stream. The stream must occupy all of `bytes`.
    pub fn from_bytes(bytes: &[u8], limits: &Limits) -> Result<Self> {
        let mut input = Cursor::new(bytes);
        let table = format::read_table(&mut input, limits)?;
        let bits = format::read_payload(&mut input, limits)?;
        format::expect_eof(&input)?;
        Ok(Self { table, bits })
    }
}

/// Compress `input` with a Huffman code built from its own byte frequencies.
pub fn huffman_encode(input: &[u8], limits: &Limits) -> Result<HuffmanEncoded> {
    encode_with_frequencies(input, &FrequencyTable::from_bytes(input), limits)
}

/// Like [`huffman_encode`], for callers that already counted the input.
pub fn encode_with_frequencies(
    input: &[u8],
    frequencies: &FrequencyTable,
    limits: &Limits,
) -> Result<HuffmanEncoded> {
    if input.is_empty() {
        return Err(crate::CodecError::EmptyInput);
    }
    check_limit("input length", input.len(), limits.max_input_len)?;
    check_limit("symbol count", frequencies.len(), limits.max_symbols)?;

    let tree = HuffmanTree::build(frequencies)?;
    let table = CodeTable::from_tree(&tree, limits.max_depth())?;
    let bits = table.encode(input)?;

    Ok(HuffmanEncoded { table, bits })
}

/// Decode `bits` with `table`.
///
/// The table is used as-is; no tree is rebuilt.
pub fn huffman_decode(bits: &Bits, table: &CodeTable) -> Result<Vec<u8>> {
    table.decode(bits)
}
