//! Performance benchmarks for the parallel Huffman codec.
//!
//! Evaluates:
//! - Compression/decompression throughput across data patterns
//! - Scaling with worker count
//! - Impact of block size on throughput

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use parahuff_core::api::{compress, decompress};
use std::hint::black_box;

mod test_data {
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump!";
        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let remaining = size - data.len();
            let chunk_size = remaining.min(text.len());
            data.extend_from_slice(&text[..chunk_size]);
        }
        data
    }
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    let size = 4 * 1024 * 1024;

    for (name, generator) in [
        ("uniform", test_data::uniform as fn(usize) -> Vec<u8>),
        ("random", test_data::random),
        ("text_like", test_data::text_like),
    ] {
        let data = generator(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("workers_4", name), &data, |b, data| {
            let input = tempfile::NamedTempFile::new().unwrap();
            std::fs::write(input.path(), data).unwrap();
            let output = tempfile::NamedTempFile::new().unwrap();
            b.iter(|| {
                compress(black_box(input.path()), output.path(), 4096, 4).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_worker_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_scaling");
    let size = 8 * 1024 * 1024;
    let data = test_data::random(size);
    group.throughput(Throughput::Bytes(size as u64));

    for workers in [1usize, 2, 4, 8, 16] {
        let input = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(input.path(), &data).unwrap();
        let output = tempfile::NamedTempFile::new().unwrap();
        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, &workers| {
            b.iter(|| {
                compress(black_box(input.path()), output.path(), 4096, workers).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    let size = 4 * 1024 * 1024;
    let data = test_data::text_like(size);

    let input = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(input.path(), &data).unwrap();
    let compressed = tempfile::NamedTempFile::new().unwrap();
    compress(input.path(), compressed.path(), 4096, 4).unwrap();

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("workers_4", |b| {
        let output = tempfile::NamedTempFile::new().unwrap();
        b.iter(|| {
            decompress(black_box(compressed.path()), output.path()).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_compress, bench_worker_scaling, bench_decompress);
criterion_main!(benches);
