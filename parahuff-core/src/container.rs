//! Container header read/write (§6.1, amended per `SPEC_FULL.md` §A.1 to
//! restore the per-section decompressed byte count the distillation
//! dropped).
//!
//! The header has a two-phase lifecycle: it is written once, provisionally,
//! before any worker starts (every field the planner can compute ahead of
//! time, including the restored decompressed byte count), then the
//! `padding_bits`/`blocks` arrays are rewritten after the workers join with
//! the values each worker actually measured. The two should always agree —
//! this is an implicit consistency check, not a source of new information.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{CodecError, Result};
use crate::symbol::{empty_code_table, CodeTable, Symbol};

/// Width, in bytes, of one code-table entry: a 32-byte codeword field
/// followed by a 1-byte length.
const CODE_TABLE_ENTRY_BYTES: u64 = 33;
/// Width, in bytes, of the whole 256-entry code table.
const CODE_TABLE_BYTES: u64 = 256 * CODE_TABLE_ENTRY_BYTES;

/// Everything the container header carries.
#[derive(Debug, Clone)]
pub struct ContainerHeader {
    /// Per-section decompressed byte count (restored field, §A.1).
    pub decompressed_counts: Vec<u64>,
    /// Per-section padding bits.
    pub padding_bits: Vec<u32>,
    /// Per-section block count.
    pub blocks: Vec<u32>,
    /// Block size in bits; a positive multiple of 128.
    pub block_size_bits: u16,
    /// The 256-entry code table.
    pub table: CodeTable,
}

impl ContainerHeader {
    /// Number of sections, `N`.
    pub fn n(&self) -> usize {
        self.decompressed_counts.len()
    }

    /// Byte offset where the concatenated compressed sections begin.
    pub fn header_len(&self) -> u64 {
        header_len_for(self.n() as u8)
    }
}

/// Byte offset where the compressed sections begin, for `n` sections:
/// `3 + 16·n + 8448`.
pub fn header_len_for(n: u8) -> u64 {
    3 + 16 * n as u64 + CODE_TABLE_BYTES
}

/// Writes the full header (all fields) to `path`, creating or truncating
/// the file first. Used for the provisional write before workers run.
pub fn write_header(path: &Path, header: &ContainerHeader) -> Result<()> {
    let n = header.n();
    if n == 0 || n > u8::MAX as usize {
        return Err(CodecError::bad_container("section count must be 1..=255"));
    }
    if header.block_size_bits == 0 || header.block_size_bits % 128 != 0 {
        return Err(CodecError::bad_container("block size must be a positive multiple of 128"));
    }

    let mut file = File::create(path).map_err(|e| CodecError::open(path.display().to_string(), e))?;

    file.write_all(&[n as u8])
        .map_err(|e| CodecError::io("header write", e))?;
    for &count in &header.decompressed_counts {
        file.write_all(&count.to_le_bytes())
            .map_err(|e| CodecError::io("header write", e))?;
    }
    for &padding in &header.padding_bits {
        file.write_all(&padding.to_le_bytes())
            .map_err(|e| CodecError::io("header write", e))?;
    }
    for &blocks in &header.blocks {
        file.write_all(&blocks.to_le_bytes())
            .map_err(|e| CodecError::io("header write", e))?;
    }
    file.write_all(&header.block_size_bits.to_le_bytes())
        .map_err(|e| CodecError::io("header write", e))?;
    for symbol in header.table.iter() {
        file.write_all(&symbol.bits.to_le_bytes())
            .map_err(|e| CodecError::io("header write", e))?;
        file.write_all(&[symbol.length])
            .map_err(|e| CodecError::io("header write", e))?;
    }

    Ok(())
}

/// Rewrites only the `padding_bits` and `blocks` arrays, after workers join
/// and report their actually-measured counters.
pub fn rewrite_section_counters(path: &Path, padding_bits: &[u32], blocks: &[u32]) -> Result<()> {
    let n = padding_bits.len();
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| CodecError::open(path.display().to_string(), e))?;

    file.seek(SeekFrom::Start(1 + 8 * n as u64))
        .map_err(|e| CodecError::io("header rewrite seek", e))?;
    for &padding in padding_bits {
        file.write_all(&padding.to_le_bytes())
            .map_err(|e| CodecError::io("header rewrite", e))?;
    }
    for &block_count in blocks {
        file.write_all(&block_count.to_le_bytes())
            .map_err(|e| CodecError::io("header rewrite", e))?;
    }
    Ok(())
}

/// Reads and validates the full header from `path`.
pub fn read_header(path: &Path) -> Result<ContainerHeader> {
    let mut file = File::open(path).map_err(|e| CodecError::open(path.display().to_string(), e))?;

    let mut n_buf = [0u8; 1];
    file.read_exact(&mut n_buf).map_err(map_header_err)?;
    let n = n_buf[0];
    if n == 0 {
        return Err(CodecError::bad_container("section count N must be nonzero"));
    }
    let n = n as usize;

    let mut decompressed_counts = Vec::with_capacity(n);
    for _ in 0..n {
        let mut buf = [0u8; 8];
        file.read_exact(&mut buf).map_err(map_header_err)?;
        decompressed_counts.push(u64::from_le_bytes(buf));
    }

    let mut padding_bits = Vec::with_capacity(n);
    for _ in 0..n {
        let mut buf = [0u8; 4];
        file.read_exact(&mut buf).map_err(map_header_err)?;
        padding_bits.push(u32::from_le_bytes(buf));
    }

    let mut blocks = Vec::with_capacity(n);
    for _ in 0..n {
        let mut buf = [0u8; 4];
        file.read_exact(&mut buf).map_err(map_header_err)?;
        blocks.push(u32::from_le_bytes(buf));
    }

    let mut block_size_buf = [0u8; 2];
    file.read_exact(&mut block_size_buf).map_err(map_header_err)?;
    let block_size_bits = u16::from_le_bytes(block_size_buf);
    if block_size_bits == 0 || block_size_bits % 128 != 0 {
        return Err(CodecError::bad_container("block size must be a positive multiple of 128"));
    }

    let mut table = empty_code_table();
    for symbol in table.iter_mut() {
        let mut bits_buf = [0u8; 32];
        file.read_exact(&mut bits_buf).map_err(map_header_err)?;
        let mut length_buf = [0u8; 1];
        file.read_exact(&mut length_buf).map_err(map_header_err)?;
        *symbol = Symbol::new(crate::bigbits::BigBits::from_le_bytes(bits_buf), length_buf[0]);
    }

    Ok(ContainerHeader {
        decompressed_counts,
        padding_bits,
        blocks,
        block_size_bits,
        table,
    })
}

fn map_header_err(e: std::io::Error) -> CodecError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        CodecError::Truncated("container ended before the header was fully read".into())
    } else {
        CodecError::io("header read", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigbits::BigBits;

    fn sample_header(n: usize) -> ContainerHeader {
        let mut table = empty_code_table();
        table[0] = Symbol::new(BigBits::ZERO, 1);
        table[1] = Symbol::new(BigBits::ONE, 1);
        ContainerHeader {
            decompressed_counts: (0..n).map(|i| 10 + i as u64).collect(),
            padding_bits: (0..n).map(|i| i as u32).collect(),
            blocks: (0..n).map(|i| (i + 1) as u32).collect(),
            block_size_bits: 1024,
            table,
        }
    }

    #[test]
    fn header_round_trips() {
        let header = sample_header(3);
        let file = tempfile::NamedTempFile::new().unwrap();
        write_header(file.path(), &header).unwrap();

        let read_back = read_header(file.path()).unwrap();
        assert_eq!(read_back.decompressed_counts, header.decompressed_counts);
        assert_eq!(read_back.padding_bits, header.padding_bits);
        assert_eq!(read_back.blocks, header.blocks);
        assert_eq!(read_back.block_size_bits, header.block_size_bits);
        assert_eq!(read_back.table[0], header.table[0]);
        assert_eq!(read_back.table[1], header.table[1]);
    }

    #[test]
    fn header_len_accounts_for_restored_field() {
        // 1 (N) + 16*n (counts+padding+blocks) + 2 (block size) + 8448 (table)
        assert_eq!(header_len_for(1), 1 + 16 + 2 + CODE_TABLE_BYTES);
    }

    #[test]
    fn rewriting_counters_leaves_other_fields_untouched() {
        let header = sample_header(2);
        let file = tempfile::NamedTempFile::new().unwrap();
        write_header(file.path(), &header).unwrap();

        rewrite_section_counters(file.path(), &[99, 77], &[5, 6]).unwrap();

        let read_back = read_header(file.path()).unwrap();
        assert_eq!(read_back.padding_bits, vec![99, 77]);
        assert_eq!(read_back.blocks, vec![5, 6]);
        assert_eq!(read_back.decompressed_counts, header.decompressed_counts);
        assert_eq!(read_back.block_size_bits, header.block_size_bits);
    }

    #[test]
    fn zero_sections_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [0u8]).unwrap(); // N = 0
        assert!(read_header(file.path()).is_err());
    }
}
