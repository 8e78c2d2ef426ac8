//! Byte layout of a Huffman stream.
//!
//! ```text
//! +--------------------+
//! | entry_count (u32)  |  number of code table entries, 1..=256
//! +--------------------+
//! | symbol (u8)        |  \
//! | code_len (u8)      |   } once per entry, ascending symbol order
//! | code bits          |  /  ceil(code_len / 8) bytes, MSB first
//! +--------------------+
//! | padding (u32)      |  zero bits appended to fill the last payload byte
//! +--------------------+
//! | byte_count (u32)   |  length of the packed payload
//! +--------------------+
//! | payload            |  byte_count bytes
//! +--------------------+
//! ```
//!
//! All integers are little-endian. Nothing may follow the payload.

use std::io::{Cursor, Read};

use super::CodeTable;
use crate::{
    bits_to_bytes, bytes_to_bits,
    config::{check_limit, MAX_SERIALIZED_CODE_LEN},
    BitSequence, Bits, CodecError, Limits, Result,
};

/// Append the serialized code table to `out`.
pub fn write_table(table: &CodeTable, out: &mut Vec<u8>) {
    out.extend_from_slice(&(table.len() as u32).to_le_bytes());
    for (symbol, code) in table.iter() {
        // Codes derived under `Limits` never exceed the one-byte length field.
        debug_assert!(code.len() <= MAX_SERIALIZED_CODE_LEN);
        out.push(symbol);
        out.push(code.len() as u8);
        out.extend_from_slice(&bits_to_bytes(code));
    }
}

/// Read a serialized code table.
pub fn read_table(input: &mut impl Read, limits: &Limits) -> Result<CodeTable> {
    let count = read_u32_le(input)
        .map_err(|_| CodecError::InvalidInput("truncated table size".into()))?
        as usize;
    if count == 0 || count > limits.max_symbols {
        let max = limits.max_symbols;
        let msg = format!("table size {count} outside of 1..={max}");
        return Err(CodecError::InvalidInput(msg));
    }

    let mut codes = Vec::with_capacity(count);
    for i in 0..count {
        let mut entry = [0; 2];
        input
            .read_exact(&mut entry)
            .map_err(|_| CodecError::InvalidInput(format!("truncated table entry {i}")))?;
        let [symbol, code_len] = entry;
        let code_len = code_len as usize;

        if code_len == 0 || code_len > limits.max_code_len {
            let max = limits.max_code_len;
            let msg =
                format!("code length {code_len} for symbol {symbol:#04x} outside of 1..={max}");
            return Err(CodecError::InvalidInput(msg));
        }

        let mut packed = vec![0; (code_len + 7) / 8];
        input.read_exact(&mut packed).map_err(|_| {
            CodecError::InvalidInput(format!("truncated code for symbol {symbol:#04x}"))
        })?;
        let mut code = bytes_to_bits(&packed);
        code.truncate(code_len);

        codes.push((symbol, code));
    }

    CodeTable::from_codes(codes)
}

/// Append the payload framing and the packed payload to `out`.
pub fn write_payload(bits: &Bits, out: &mut Vec<u8>) {
    let packed = bits_to_bytes(bits);
    let padding = packed.len() * 8 - bits.len();
    out.extend_from_slice(&(padding as u32).to_le_bytes());
    out.extend_from_slice(&(packed.len() as u32).to_le_bytes());
    out.extend_from_slice(&packed);
}

/// Read the payload framing and unpack the payload, minus its padding.
pub fn read_payload(input: &mut impl Read, limits: &Limits) -> Result<BitSequence> {
    let stream_err = |msg: &str| CodecError::CorruptStream(msg.into());

    let padding = read_u32_le(input).map_err(|_| stream_err("truncated padding size"))? as usize;
    let byte_count =
        read_u32_le(input).map_err(|_| stream_err("truncated payload size"))? as usize;
    check_limit("payload size", byte_count, limits.max_payload_bits / 8)?;

    if padding >= 8 || padding > byte_count * 8 {
        let msg = format!("{padding} padding bits in a {byte_count} byte payload");
        return Err(CodecError::CorruptStream(msg));
    }

    let mut packed = vec![0; byte_count];
    input
        .read_exact(&mut packed)
        .map_err(|_| stream_err("truncated payload"))?;

    let mut bits = bytes_to_bits(&packed);
    bits.truncate(bits.len() - padding);
    Ok(bits)
}

/// Serialize a code table on its own.
pub fn serialize_table(table: &CodeTable) -> Vec<u8> {
    let mut out = vec![];
    write_table(table, &mut out);
    out
}

/// Deserialize a code table that occupies all of `bytes`.
pub fn deserialize_table(bytes: &[u8], limits: &Limits) -> Result<CodeTable> {
    let mut input = Cursor::new(bytes);
    let table = read_table(&mut input, limits)?;
    expect_eof(&input)?;
    Ok(table)
}

/// Fail if `input` has unread bytes.
pub(crate) fn expect_eof(input: &Cursor<&[u8]>) -> Result<()> {
    let remaining = input.get_ref().len() as u64 - input.position();
    if remaining != 0 {
        let msg = format!("expected end of stream, but {remaining} more bytes follow");
        return Err(CodecError::InvalidInput(msg));
    }
    Ok(())
}

fn read_u32_le(input: &mut impl Read) -> std::io::Result<u32> {
    let mut buf = [0; 4];
    input.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
