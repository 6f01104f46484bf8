//! parahuff - a byte-granular parallel Huffman codec
//!
//! A command-line driver over `parahuff-core`: splits compression and
//! decompression across worker threads, reporting progress and timing.

use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(name = "parahuff")]
#[command(author, version, about = "Byte-granular parallel Huffman codec")]
#[command(long_about = "
parahuff compresses and decompresses files with a parallel Huffman codec.

Examples:
  parahuff compress input.bin output.phc
  parahuff compress input.bin output.phc --workers 8 --block-size 32768
  parahuff decompress output.phc restored.bin
  parahuff decompress output.phc restored.bin --verify input.bin
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a parahuff container
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Path of the container to write
        output: PathBuf,

        /// Number of parallel workers (sections)
        #[arg(short, long, default_value_t = 16)]
        workers: usize,

        /// Block size in bits; must be a positive multiple of 128
        #[arg(short, long, default_value_t = 4096)]
        block_size: u16,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Decompress a parahuff container
    #[command(alias = "d")]
    Decompress {
        /// Container to decompress
        input: PathBuf,

        /// Path of the restored file to write
        output: PathBuf,

        /// Verify the restored file matches this original via `sha256sum`
        #[arg(long)]
        verify: Option<PathBuf>,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

fn spinner(quiet: bool, message: &'static str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
            .expect("static progress template is always valid"),
    );
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    Some(bar)
}

fn cmd_compress(input: &PathBuf, output: &PathBuf, workers: usize, block_size: u16, quiet: bool) -> Result<(), parahuff_core::CodecError> {
    let bar = spinner(quiet, "compressing");
    let start = Instant::now();

    parahuff_core::compress(input, output, block_size, workers)?;

    let elapsed = start.elapsed();
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    if !quiet {
        let input_len = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0);
        let output_len = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        println!(
            "compressed {} bytes -> {} bytes in {:.2?} ({} workers, {}-bit blocks)",
            input_len, output_len, elapsed, workers, block_size
        );
    }
    Ok(())
}

fn cmd_decompress(input: &PathBuf, output: &PathBuf, verify: Option<&PathBuf>, quiet: bool) -> Result<(), parahuff_core::CodecError> {
    let bar = spinner(quiet, "decompressing");
    let start = Instant::now();

    parahuff_core::decompress(input, output)?;

    let elapsed = start.elapsed();
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    if !quiet {
        println!("decompressed in {:.2?}", elapsed);
    }

    if let Some(original) = verify {
        match verify_with_sha256sum(original, output) {
            Ok(true) => println!("verify: OK"),
            Ok(false) => {
                eprintln!("verify: MISMATCH between {} and {}", original.display(), output.display());
                std::process::exit(1);
            }
            Err(e) => eprintln!("verify: could not run sha256sum ({e}); skipping"),
        }
    }
    Ok(())
}

/// Shells out to `sha256sum` to compare two files. Content verification is
/// explicitly a driver concern, not the core codec's (§9 design note).
fn verify_with_sha256sum(a: &PathBuf, b: &PathBuf) -> std::io::Result<bool> {
    let hash_of = |path: &PathBuf| -> std::io::Result<String> {
        let out = Command::new("sha256sum").arg(path).output()?;
        Ok(String::from_utf8_lossy(&out.stdout)
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string())
    };
    Ok(hash_of(a)? == hash_of(b)?)
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            workers,
            block_size,
            quiet,
        } => cmd_compress(&input, &output, workers, block_size, quiet),
        Commands::Decompress {
            input,
            output,
            verify,
            quiet,
        } => cmd_decompress(&input, &output, verify.as_ref(), quiet),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
