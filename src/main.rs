use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use huffham::{
    pipeline::{compress_file, decompress_file, Compressed},
    Correction, Limits,
};
use log::{info, warn, LevelFilter};

/// Compress a file with a Huffman code, and protect the result against single
/// bit errors with an extended Hamming code.
///
/// Decompression repairs any one flipped bit and reports two.
#[derive(Parser, Debug)]
#[command(name = "huffham", version)]
struct Cli {
    /// Decompress SOURCE instead of compressing it
    #[arg(short, long)]
    decompress: bool,

    /// File to read
    source: PathBuf,

    /// File to write; replaced only if the whole run succeeds
    destination: PathBuf,

    /// Print each symbol's probability and code after compressing
    #[arg(long, conflicts_with = "decompress")]
    stats: bool,

    /// Largest input file accepted for compression, in bytes
    #[arg(long, value_name = "BYTES")]
    max_input_size: Option<usize>,

    /// Longest Huffman code allowed, in bits
    #[arg(long, value_name = "BITS", value_parser = clap::value_parser!(u8).range(1..))]
    max_code_len: Option<u8>,

    /// Log more; repeat for debug output
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Log errors only
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn limits(&self) -> Limits {
        let mut limits = Limits::default();
        if let Some(max) = self.max_input_size {
            limits.max_input_len = max;
        }
        if let Some(max) = self.max_code_len {
            limits.max_code_len = usize::from(max);
        }
        limits
    }

    fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Warn,
            (false, 1) => LevelFilter::Info,
            (false, _) => LevelFilter::Debug,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let limits = cli.limits();
    if cli.decompress {
        decompress(&cli.source, &cli.destination, &limits)
    } else {
        compress(&cli.source, &cli.destination, &limits, cli.stats)
    }
}

fn compress(source: &Path, destination: &Path, limits: &Limits, stats: bool) -> Result<()> {
    println!("Compressing...");
    let compressed = compress_file(source, destination, limits)?;
    info!(
        "wrote {} bytes to {}",
        compressed.bytes.len(),
        destination.display()
    );

    if stats {
        print_stats(&compressed);
    }
    println!("Compression complete.");
    Ok(())
}

fn decompress(source: &Path, destination: &Path, limits: &Limits) -> Result<()> {
    println!("Decompressing...");
    let decompressed = decompress_file(source, destination, limits)?;
    info!(
        "wrote {} bytes to {}",
        decompressed.bytes.len(),
        destination.display()
    );

    if decompressed.correction != Correction::None {
        warn!("{} was damaged; one bit error was corrected", source.display());
    }
    println!("Decompression complete.");
    Ok(())
}

fn print_stats(compressed: &Compressed) {
    println!("{:>6}  {:>11}  code", "symbol", "probability");
    for (symbol, probability) in compressed.frequencies.probabilities() {
        let code: String = compressed
            .table
            .code(symbol)
            .into_iter()
            .flat_map(|code| code.iter().by_vals())
            .map(|bit| if bit { '1' } else { '0' })
            .collect();
        println!("{:>6}  {probability:>11.4}  {code}", display_symbol(symbol));
    }
}

fn display_symbol(symbol: u8) -> String {
    if symbol.is_ascii_graphic() {
        format!("'{}'", symbol as char)
    } else {
        format!("{symbol:#04x}")
    }
}
