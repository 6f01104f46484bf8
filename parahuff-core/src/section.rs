//! Section descriptors and the planner (§3, §4.5): splits work into
//! per-worker byte ranges on both ends (input/output for encoding,
//! compressed/decompressed for decoding) and pre-computes every offset
//! before any worker starts, so workers write concurrently without
//! contention.

use crate::freq::FrequencyMatrix;
use crate::symbol::CodeTable;

/// One worker's range on both ends of the transform, plus the counters a
/// completed encoder worker reports back (`blocks`, `padding_bits`).
///
/// For encoding, `src_*` indexes the input (raw) file and `dst_*` indexes
/// the compressed file. For decoding, the roles are symmetric: `src_*`
/// indexes the compressed file and `dst_*` indexes the restored output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDescriptor {
    /// Start offset on the source side.
    pub src_begin: u64,
    /// End offset (exclusive) on the source side.
    pub src_end: u64,
    /// Start offset on the destination side.
    pub dst_begin: u64,
    /// End offset (exclusive) on the destination side.
    pub dst_end: u64,
    /// Number of fixed-size blocks this section occupies in its compressed
    /// form.
    pub blocks: u32,
    /// Padding bits in the section's final block.
    pub padding_bits: u32,
}

/// Rounds `bits` up to a multiple of `block_size_bits`, returning
/// `(blocks, padding_bits)`. An all-zero bit count needs no blocks at all,
/// matching [`crate::bitblock::BlockWriter::finalize`]'s behavior for an
/// empty section.
fn blocks_for_bits(bits: u64, block_size_bits: u64) -> (u32, u32) {
    if bits == 0 {
        return (0, 0);
    }
    let blocks = bits.div_ceil(block_size_bits);
    let padding = blocks * block_size_bits - bits;
    (blocks as u32, padding as u32)
}

/// Plans the encode-side layout (§4.5 "Planning"): `header_len` is the byte
/// offset where the concatenated compressed sections begin (i.e. the size
/// of the container header once `N` sections and a fixed-size code table
/// are known).
pub fn plan_encode(
    matrix: &FrequencyMatrix,
    table: &CodeTable,
    block_size_bits: u16,
    header_len: u64,
) -> Vec<SectionDescriptor> {
    let block_size_bits = block_size_bits as u64;
    let mut src_begin = 0u64;
    let mut dst_begin = header_len;
    let mut out = Vec::with_capacity(matrix.len());

    for row in matrix {
        let row_bytes: u64 = row.iter().sum();
        let src_end = src_begin + row_bytes;

        let compressed_bits: u64 = row
            .iter()
            .zip(table.iter())
            .map(|(&count, sym)| count * sym.length as u64)
            .sum();
        let (blocks, padding_bits) = blocks_for_bits(compressed_bits, block_size_bits);
        let dst_end = dst_begin + blocks as u64 * (block_size_bits / 8);

        out.push(SectionDescriptor {
            src_begin,
            src_end,
            dst_begin,
            dst_end,
            blocks,
            padding_bits,
        });

        src_begin = src_end;
        dst_begin = dst_end;
    }

    out
}

/// Plans the decode-side layout from the fields restored to the container
/// header (§A.1): per-section decompressed byte count, padding bits and
/// block count are read directly, so no frequency matrix is needed. `src_*`
/// here indexes the compressed file, `dst_*` the restored output file.
pub fn plan_decode(
    decompressed_counts: &[u64],
    padding_bits: &[u32],
    blocks: &[u32],
    block_size_bits: u16,
    header_len: u64,
) -> Vec<SectionDescriptor> {
    let block_size_bytes = block_size_bits as u64 / 8;
    let mut src_begin = header_len;
    let mut dst_begin = 0u64;
    let n = decompressed_counts.len();
    let mut out = Vec::with_capacity(n);

    for k in 0..n {
        let compressed_bytes = blocks[k] as u64 * block_size_bytes;
        let src_end = src_begin + compressed_bytes;
        let dst_end = dst_begin + decompressed_counts[k];

        out.push(SectionDescriptor {
            src_begin,
            src_end,
            dst_begin,
            dst_end,
            blocks: blocks[k],
            padding_bits: padding_bits[k],
        });

        src_begin = src_end;
        dst_begin = dst_end;
    }

    out
}
