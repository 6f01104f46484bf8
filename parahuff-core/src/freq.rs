//! Frequency counting (§4.2): per-byte occurrence counts over a file range,
//! computed sequentially or by `worker_count` independent workers running in
//! parallel over disjoint ranges and summed elementwise.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{CodecError, Result};

/// One worker's count vector over its own byte range.
pub type FrequencyVector = [u64; 256];

/// `N × 256`: row `k` is worker `k`'s counts over its own input range. Kept
/// around after counting because the section planner (§4.5) reuses it to
/// compute each worker's exact compressed output size.
pub type FrequencyMatrix = Vec<FrequencyVector>;

/// Splits `[0, len)` into `worker_count` contiguous ranges, the last
/// absorbing the remainder (§4.2). Never returns an empty `Vec` even when
/// `len == 0` or `len < worker_count`; some ranges may be empty.
pub fn partition_ranges(len: u64, worker_count: usize) -> Vec<(u64, u64)> {
    let worker_count = worker_count.max(1) as u64;
    let chunk = len / worker_count;
    (0..worker_count)
        .map(|k| {
            let begin = k * chunk;
            let end = if k + 1 == worker_count { len } else { begin + chunk };
            (begin, end)
        })
        .collect()
}

/// Counts byte occurrences in `[begin, end)` of the file at `path`, using an
/// independently opened read handle.
fn count_range(path: &Path, begin: u64, end: u64) -> Result<FrequencyVector> {
    let mut counts = [0u64; 256];
    if begin >= end {
        return Ok(counts);
    }
    let mut file = File::open(path).map_err(|e| CodecError::open(path.display().to_string(), e))?;
    file.seek(SeekFrom::Start(begin))
        .map_err(|e| CodecError::io("frequency counting seek", e))?;

    let mut remaining = end - begin;
    let mut buf = [0u8; 64 * 1024];
    while remaining > 0 {
        let want = buf.len().min(remaining as usize);
        file.read_exact(&mut buf[..want])
            .map_err(|e| CodecError::io("frequency counting read", e))?;
        for &byte in &buf[..want] {
            counts[byte as usize] += 1;
        }
        remaining -= want as u64;
    }
    Ok(counts)
}

/// Counts byte frequencies over the whole file in `worker_count` parallel
/// ranges (§4.2, §5), returning the per-worker matrix. Column sums give the
/// global frequency vector (see [`sum_matrix`]).
pub fn count_parallel(path: &Path, len: u64, worker_count: usize) -> Result<FrequencyMatrix> {
    let ranges = partition_ranges(len, worker_count);
    let mut rows: Vec<Option<Result<FrequencyVector>>> = (0..ranges.len()).map(|_| None).collect();

    rayon::scope(|scope| {
        for (slot, &(begin, end)) in rows.iter_mut().zip(ranges.iter()) {
            scope.spawn(move |_| {
                *slot = Some(count_range(path, begin, end));
            });
        }
    });

    rows.into_iter()
        .enumerate()
        .map(|(k, row)| row.expect("every slot is filled by its spawned closure").map_err(|e| CodecError::in_worker(k, e)))
        .collect()
}

/// Elementwise column sum of a frequency matrix (§8 property 6).
pub fn sum_matrix(matrix: &FrequencyMatrix) -> FrequencyVector {
    let mut total = [0u64; 256];
    for row in matrix {
        for b in 0..256 {
            total[b] += row[b];
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn partition_ranges_last_worker_absorbs_remainder() {
        let ranges = partition_ranges(10, 3);
        assert_eq!(ranges, vec![(0, 3), (3, 6), (6, 10)]);
    }

    #[test]
    fn partition_ranges_handles_fewer_bytes_than_workers() {
        let ranges = partition_ranges(2, 5);
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges.iter().map(|&(b, e)| e - b).sum::<u64>(), 2);
    }

    #[test]
    fn parallel_count_matches_sequential_over_full_range() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let f = temp_file(&data);

        let sequential = count_range(f.path(), 0, data.len() as u64).unwrap();
        let matrix = count_parallel(f.path(), data.len() as u64, 7).unwrap();
        let parallel_total = sum_matrix(&matrix);

        assert_eq!(sequential, parallel_total);
        let covered: u64 = matrix.iter().flatten().sum();
        assert_eq!(covered, data.len() as u64);
    }

    #[test]
    fn empty_file_yields_all_zero_counts() {
        let f = temp_file(&[]);
        let matrix = count_parallel(f.path(), 0, 4).unwrap();
        assert_eq!(matrix.len(), 4);
        assert_eq!(sum_matrix(&matrix), [0u64; 256]);
    }
}
