//! Integration tests exercising `compress`/`decompress` end-to-end against
//! real files, covering the concrete scenarios and testable properties.

use parahuff_core::api::{compress, decompress};
use parahuff_core::container::read_header;
use parahuff_core::huffman::build_code_table;

fn roundtrip(data: &[u8], block_size_bits: u16, worker_count: usize) -> tempfile::TempPath {
    let input = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(input.path(), data).unwrap();
    let compressed = tempfile::NamedTempFile::new().unwrap();
    let restored = tempfile::NamedTempFile::new().unwrap();

    compress(input.path(), compressed.path(), block_size_bits, worker_count).unwrap();
    decompress(compressed.path(), restored.path()).unwrap();

    assert_eq!(std::fs::read(restored.path()).unwrap(), data);
    compressed.into_temp_path()
}

fn lcg(seed: &mut u64) -> u8 {
    *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*seed >> 32) as u8
}

#[test]
fn scenario_empty_file() {
    let path = roundtrip(&[], 1024, 1);
    let header = read_header(&path).unwrap();
    assert_eq!(header.n(), 1);
    assert_eq!(header.blocks, vec![0]);
    assert_eq!(header.padding_bits, vec![0]);
}

#[test]
fn scenario_single_byte() {
    let path = roundtrip(&[0x41], 1024, 1);
    let header = read_header(&path).unwrap();
    assert_eq!(header.table[0x41].length, 1);
    assert_eq!(header.blocks, vec![1]);
    assert_eq!(header.padding_bits, vec![1023]);
}

#[test]
fn scenario_aab_three_bytes() {
    roundtrip(b"AAB", 1024, 1);
}

#[test]
fn scenario_alternating_bytes_four_workers() {
    let mut data = Vec::with_capacity(1024 * 1024);
    while data.len() < 1024 * 1024 {
        data.push(0x00);
        data.push(0xFF);
    }
    roundtrip(&data, 32768, 4);
}

#[test]
fn scenario_prng_seventeen_mib_sixteen_workers() {
    let mut seed = 0xDEAD_BEEF_CAFE_F00Du64;
    let mut data = Vec::with_capacity(17 * 1024 * 1024);
    for _ in 0..17 * 1024 * 1024 {
        data.push(lcg(&mut seed));
    }
    roundtrip(&data, 32768, 16);
}

#[test]
fn scenario_skewed_frequency_distribution() {
    let mut data = Vec::new();
    data.push(0x00u8);
    data.extend(std::iter::repeat(0xFFu8).take(4095));
    roundtrip(&data, 1024, 1);

    let mut freqs = [0u64; 256];
    freqs[0x00] = 1;
    freqs[0xFF] = 4095;
    let table = build_code_table(&freqs);
    assert!(table[0x00].length >= table[0xFF].length);
    assert!(table.iter().all(|s| s.length <= 255));
}

#[test]
fn file_lengths_exercise_boundary_conditions() {
    for &len in &[0usize, 1, 255, 1021 /* prime */, 8 * 1024] {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        roundtrip(&data, 1024, 4);
    }
}

#[test]
fn section_payload_bytes_differ_across_worker_counts_but_decode_identically() {
    let data: Vec<u8> = (0..30_000u32).map(|i| (i % 29) as u8).collect();

    let single = roundtrip(&data, 1024, 1);
    let multi = roundtrip(&data, 1024, 5);

    let single_bytes = std::fs::read(&single).unwrap();
    let multi_bytes = std::fs::read(&multi).unwrap();
    assert_ne!(
        single_bytes, multi_bytes,
        "a single-section and five-section container are not expected to be byte-identical"
    );
}

#[test]
fn worker_count_larger_than_file_produces_some_empty_sections() {
    let path = roundtrip(&[7, 8, 9], 1024, 16);
    let header = read_header(&path).unwrap();
    assert_eq!(header.n(), 16);
    assert!(header.blocks.iter().filter(|&&b| b == 0).count() >= 13);
}
