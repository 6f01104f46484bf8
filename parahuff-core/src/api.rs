//! Public entry points (§6.2): `compress` and `decompress`, orchestrating
//! every other module in sequence. No structure here outlives one call;
//! there is no long-lived state between invocations (§3 "Lifecycle").

use std::fs::File;
use std::path::Path;

use crate::container::{self, ContainerHeader};
use crate::error::{CodecError, Result};
use crate::freq;
use crate::huffman::{build_code_table, build_decode_tree};
use crate::section;
use crate::worker;

/// Compresses `input_path` into a container at `output_path`.
///
/// `block_size_bits` must be a positive multiple of 128; `worker_count` must
/// be at least 1. These are caller-guaranteed preconditions (§6.2), not
/// recoverable data errors, so a violation panics rather than returning
/// `CodecError`.
pub fn compress(input_path: &Path, output_path: &Path, block_size_bits: u16, worker_count: usize) -> Result<()> {
    assert!(
        block_size_bits > 0 && block_size_bits % 128 == 0,
        "block_size_bits must be a positive multiple of 128"
    );
    assert!(worker_count >= 1, "worker_count must be at least 1");
    assert!(worker_count <= u8::MAX as usize, "worker_count must fit in the section-count field");

    let input_len = std::fs::metadata(input_path)
        .map_err(|e| CodecError::open(input_path.display().to_string(), e))?
        .len();

    let matrix = freq::count_parallel(input_path, input_len, worker_count)?;
    let frequencies = freq::sum_matrix(&matrix);
    let table = build_code_table(&frequencies);

    let header_len = container::header_len_for(worker_count as u8);
    let descriptors = section::plan_encode(&matrix, &table, block_size_bits, header_len);

    let header = ContainerHeader {
        decompressed_counts: descriptors.iter().map(|d| d.src_end - d.src_begin).collect(),
        padding_bits: descriptors.iter().map(|d| d.padding_bits).collect(),
        blocks: descriptors.iter().map(|d| d.blocks).collect(),
        block_size_bits,
        table,
    };
    container::write_header(output_path, &header)?;

    let total_len = descriptors.last().map_or(header_len, |d| d.dst_end);
    File::options()
        .write(true)
        .open(output_path)
        .map_err(|e| CodecError::open(output_path.display().to_string(), e))?
        .set_len(total_len)
        .map_err(|e| CodecError::io("output preallocation", e))?;

    let measured = worker::encode_all(input_path, output_path, &descriptors, &header.table, block_size_bits)?;
    let measured_padding: Vec<u32> = measured.iter().map(|&(_, p)| p).collect();
    let measured_blocks: Vec<u32> = measured.iter().map(|&(b, _)| b).collect();
    container::rewrite_section_counters(output_path, &measured_padding, &measured_blocks)?;

    Ok(())
}

/// Decompresses the container at `input_path`, restoring bytes to
/// `output_path`.
pub fn decompress(input_path: &Path, output_path: &Path) -> Result<()> {
    let header = container::read_header(input_path)?;
    let tree = build_decode_tree(&header.table)?;

    let header_len = header.header_len();
    let descriptors = section::plan_decode(
        &header.decompressed_counts,
        &header.padding_bits,
        &header.blocks,
        header.block_size_bits,
        header_len,
    );

    let total_output_len = descriptors.last().map_or(0, |d| d.dst_end);
    File::create(output_path)
        .map_err(|e| CodecError::open(output_path.display().to_string(), e))?
        .set_len(total_output_len)
        .map_err(|e| CodecError::io("output preallocation", e))?;

    worker::decode_all(input_path, output_path, &descriptors, &tree, header.block_size_bits)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[u8], block_size_bits: u16, worker_count: usize) {
        let input = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(input.path(), data).unwrap();
        let compressed = tempfile::NamedTempFile::new().unwrap();
        let restored = tempfile::NamedTempFile::new().unwrap();

        compress(input.path(), compressed.path(), block_size_bits, worker_count).unwrap();
        decompress(compressed.path(), restored.path()).unwrap();

        let restored_bytes = std::fs::read(restored.path()).unwrap();
        assert_eq!(restored_bytes, data, "round-trip mismatch for len={}", data.len());
    }

    #[test]
    fn empty_file_round_trips() {
        roundtrip(&[], 1024, 1);
    }

    #[test]
    fn single_byte_round_trips() {
        roundtrip(&[0x41], 1024, 1);
    }

    #[test]
    fn small_repetitive_input_round_trips_single_worker() {
        roundtrip(b"AAAAAABBBBCCD", 1024, 1);
    }

    #[test]
    fn larger_input_round_trips_with_multiple_workers() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        roundtrip(&data, 4096, 8);
    }

    #[test]
    fn single_distinct_byte_round_trips() {
        let data = vec![0x2Au8; 10_000];
        roundtrip(&data, 1024, 3);
    }

    #[test]
    fn prime_length_input_round_trips() {
        let data: Vec<u8> = (0..7919u32).map(|i| ((i * 37) % 256) as u8).collect();
        roundtrip(&data, 128, 5);
    }

    #[test]
    fn worker_count_exceeding_file_length_still_round_trips() {
        roundtrip(&[1, 2, 3], 1024, 16);
    }

    #[test]
    fn section_payloads_differ_but_decode_identically_across_worker_counts() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 17) as u8).collect();

        let single = tempfile::NamedTempFile::new().unwrap();
        let multi = tempfile::NamedTempFile::new().unwrap();
        let input = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(input.path(), &data).unwrap();

        compress(input.path(), single.path(), 1024, 1).unwrap();
        compress(input.path(), multi.path(), 1024, 4).unwrap();

        let restored_single = tempfile::NamedTempFile::new().unwrap();
        let restored_multi = tempfile::NamedTempFile::new().unwrap();
        decompress(single.path(), restored_single.path()).unwrap();
        decompress(multi.path(), restored_multi.path()).unwrap();

        assert_eq!(std::fs::read(restored_single.path()).unwrap(), data);
        assert_eq!(std::fs::read(restored_multi.path()).unwrap(), data);
    }
}
