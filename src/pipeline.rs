//! Chains the codecs: Huffman then Hamming to compress, the reverse to
//! decompress.
//!
//! A compressed file is the Hamming codeword protecting a whole Huffman
//! stream, packed into bytes. It carries no length field of its own: the
//! Huffman stream is always whole bytes, and that pins down the codeword
//! length from the file size alone.

use std::{fs, io::Write, path::Path};

use anyhow::Context;
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::{
    bits_to_bytes, bytes_to_bits,
    config::check_limit,
    hamming::{self, hamming_decode, hamming_encode, Correction, HammingDecoded},
    huffman::{self, huffman_decode, CodeTable, FrequencyTable, HuffmanEncoded},
    CodecError, Limits, Result,
};

#[derive(Debug)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub frequencies: FrequencyTable,
    pub table: CodeTable,
}

#[derive(Debug)]
pub struct Decompressed {
    pub bytes: Vec<u8>,
    pub correction: Correction,
}

pub fn compress(input: &[u8], limits: &Limits) -> Result<Compressed> {
    let frequencies = FrequencyTable::from_bytes(input);
    let encoded = huffman::encode_with_frequencies(input, &frequencies, limits)?;
    let stream = encoded.to_bytes();
    info!(
        "huffman: {} bytes -> {} bytes ({} symbols, longest code {} bits)",
        input.len(),
        stream.len(),
        encoded.table.len(),
        encoded.table.max_code_len()
    );
    debug!(
        "huffman stream header: {}",
        hex::encode(&stream[..stream.len().min(16)])
    );

    let codeword = hamming_encode(&bytes_to_bits(&stream), limits)?;
    debug!(
        "hamming: {} payload bits -> {} codeword bits",
        stream.len() * 8,
        codeword.len()
    );

    Ok(Compressed {
        bytes: bits_to_bytes(&codeword),
        frequencies,
        table: encoded.table,
    })
}

pub fn decompress(input: &[u8], limits: &Limits) -> Result<Decompressed> {
    let len = codeword_len_for(input.len())?;
    let mut codeword = bytes_to_bits(input);
    codeword.truncate(len);

    let HammingDecoded {
        payload,
        correction,
    } = hamming_decode(&codeword, limits)?;
    match correction {
        Correction::None => debug!("hamming: {len} bit codeword intact"),
        Correction::OverallParity => warn!("repaired the overall parity bit"),
        Correction::Flipped(i) => warn!("repaired flipped bit {i} of the {len} bit codeword"),
    }

    let stream = bits_to_bytes(&payload);
    let encoded = HuffmanEncoded::from_bytes(&stream, limits)?;
    let bytes = huffman_decode(&encoded.bits, &encoded.table)?;
    info!(
        "huffman: {} bytes -> {} bytes ({} symbols)",
        stream.len(),
        bytes.len(),
        encoded.table.len()
    );

    Ok(Decompressed { bytes, correction })
}

/// Length of the codeword that packs into `byte_count` bytes.
///
/// Payloads are whole bytes, and each extra payload byte adds at least 8
/// codeword bits, so at most one codeword length rounds up to `byte_count`.
fn codeword_len_for(byte_count: usize) -> Result<usize> {
    // p + 1 <= 80 bits of overhead for any addressable payload, so the payload
    // is within 10 bytes of the packed codeword.
    (byte_count.saturating_sub(10)..=byte_count)
        .filter(|&payload_bytes| payload_bytes > 0)
        .map(|payload_bytes| hamming::codeword_len(payload_bytes * 8))
        .find(|&len| (len + 7) / 8 == byte_count)
        .ok_or_else(|| {
            CodecError::InvalidCodeword(format!("no codeword packs into {byte_count} bytes"))
        })
}

/// Compress the file at `source` into `destination`.
pub fn compress_file(
    source: &Path,
    destination: &Path,
    limits: &Limits,
) -> anyhow::Result<Compressed> {
    let input = read_input(source, limits.max_input_len)?;
    let compressed =
        compress(&input, limits).with_context(|| format!("compressing {}", source.display()))?;
    write_output(destination, &compressed.bytes)?;
    Ok(compressed)
}

/// Decompress the file at `source` into `destination`.
pub fn decompress_file(
    source: &Path,
    destination: &Path,
    limits: &Limits,
) -> anyhow::Result<Decompressed> {
    let max_len = (hamming::codeword_len(limits.max_payload_bits) + 7) / 8;
    let input = read_input(source, max_len)?;
    let decompressed = decompress(&input, limits)
        .with_context(|| format!("decompressing {}", source.display()))?;
    write_output(destination, &decompressed.bytes)?;
    Ok(decompressed)
}

fn read_input(path: &Path, max_len: usize) -> anyhow::Result<Vec<u8>> {
    let context = || format!("reading {}", path.display());

    let len = fs::metadata(path).with_context(context)?.len();
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    check_limit("file size", len, max_len).with_context(context)?;

    fs::read(path).with_context(context)
}

/// Write `bytes` to `path` by way of a temporary file in the same directory.
///
/// The temporary is renamed over `path` only once fully written, and deleted
/// on any failure, so `path` never holds partial output.
fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating a temporary file in {}", dir.display()))?;
    debug!("writing to temporary file {}", tmp.path().display());

    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;

    Ok(())
}
