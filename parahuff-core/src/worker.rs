//! Encoder and decoder workers (§4.5): each worker owns its own file
//! handles, its own bit buffer, and its own scratch memory, and is fanned
//! out over `rayon::scope` so all sections encode (or decode) concurrently
//! without synchronization (§5).

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::bitblock::{BlockReader, BlockWriter};
use crate::error::{CodecError, Result};
use crate::huffman::DecodeTree;
use crate::section::SectionDescriptor;
use crate::symbol::CodeTable;

/// Decoded-byte write-behind cache (§6.3): amortizes write syscalls, with no
/// effect on output content.
struct CharBuffer<W: Write> {
    buf: Vec<u8>,
    writer: W,
}

impl<W: Write> CharBuffer<W> {
    fn new(writer: W) -> Self {
        CharBuffer {
            buf: Vec::with_capacity(2048),
            writer,
        }
    }

    fn push(&mut self, byte: u8) -> Result<()> {
        self.buf.push(byte);
        if self.buf.len() == self.buf.capacity() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            self.writer
                .write_all(&self.buf)
                .map_err(|e| CodecError::io("decoded output flush", e))?;
            self.buf.clear();
        }
        Ok(())
    }
}

/// Runs one encoder worker over its assigned input range, writing its
/// section to the pre-computed compressed-file offset. Returns the
/// `(blocks, padding_bits)` actually measured, for the header rewrite that
/// follows the join.
pub fn encode_worker(
    input_path: &Path,
    output_path: &Path,
    descriptor: &SectionDescriptor,
    table: &CodeTable,
    block_size_bits: u16,
) -> Result<(u32, u32)> {
    let mut input = File::open(input_path).map_err(|e| CodecError::open(input_path.display().to_string(), e))?;
    input
        .seek(SeekFrom::Start(descriptor.src_begin))
        .map_err(|e| CodecError::io("encoder input seek", e))?;

    let mut output = OpenOptions::new()
        .write(true)
        .open(output_path)
        .map_err(|e| CodecError::open(output_path.display().to_string(), e))?;
    output
        .seek(SeekFrom::Start(descriptor.dst_begin))
        .map_err(|e| CodecError::io("encoder output seek", e))?;

    let block_words = block_size_bits as usize / 128;
    let mut writer = BlockWriter::new(output, block_words);

    let mut remaining = descriptor.src_end - descriptor.src_begin;
    let mut buf = [0u8; 64 * 1024];
    while remaining > 0 {
        let want = buf.len().min(remaining as usize);
        input
            .read_exact(&mut buf[..want])
            .map_err(|e| CodecError::io("encoder input read", e))?;
        for &byte in &buf[..want] {
            writer.push(table[byte as usize])?;
        }
        remaining -= want as u64;
    }

    writer.finalize()
}

/// Runs one decoder worker over its assigned compressed section, writing
/// restored bytes to the pre-computed output-file offset.
pub fn decode_worker(
    compressed_path: &Path,
    output_path: &Path,
    descriptor: &SectionDescriptor,
    tree: &DecodeTree,
    block_size_bits: u16,
) -> Result<()> {
    let mut compressed =
        File::open(compressed_path).map_err(|e| CodecError::open(compressed_path.display().to_string(), e))?;
    compressed
        .seek(SeekFrom::Start(descriptor.src_begin))
        .map_err(|e| CodecError::io("decoder input seek", e))?;

    let mut output = OpenOptions::new()
        .write(true)
        .open(output_path)
        .map_err(|e| CodecError::open(output_path.display().to_string(), e))?;
    output
        .seek(SeekFrom::Start(descriptor.dst_begin))
        .map_err(|e| CodecError::io("decoder output seek", e))?;

    let root = match tree.root {
        Some(root) => root,
        None => return Ok(()), // empty code table: nothing to decode, ever.
    };

    let block_words = block_size_bits as usize / 128;
    let mut reader = BlockReader::new(BufReader::new(compressed), block_words);
    let mut sink = CharBuffer::new(output);

    let mut state = root;
    let mut decode_err: Option<CodecError> = None;
    reader.decode_section(
        descriptor.blocks,
        descriptor.padding_bits,
        |bit| {
            let (next_state, byte) = tree.step(state, bit);
            state = next_state;
            byte
        },
        |byte| {
            if decode_err.is_none() {
                if let Err(e) = sink.push(byte) {
                    decode_err = Some(e);
                }
            }
        },
    )?;
    if let Some(e) = decode_err {
        return Err(e);
    }

    if state != root {
        return Err(CodecError::bad_container(
            "decoder state did not return to the tree root at a section boundary",
        ));
    }

    sink.flush()
}

/// Fans out one encoder worker per descriptor over `rayon::scope`, joins,
/// and reports the first failure (§4.6). Returns each worker's measured
/// `(blocks, padding_bits)`, in section order.
pub fn encode_all(
    input_path: &Path,
    output_path: &Path,
    descriptors: &[SectionDescriptor],
    table: &CodeTable,
    block_size_bits: u16,
) -> Result<Vec<(u32, u32)>> {
    let mut results: Vec<Option<Result<(u32, u32)>>> = (0..descriptors.len()).map(|_| None).collect();

    rayon::scope(|scope| {
        for (slot, descriptor) in results.iter_mut().zip(descriptors.iter()) {
            scope.spawn(move |_| {
                *slot = Some(encode_worker(input_path, output_path, descriptor, table, block_size_bits));
            });
        }
    });

    results
        .into_iter()
        .enumerate()
        .map(|(k, r)| r.expect("every slot is filled by its spawned closure").map_err(|e| CodecError::in_worker(k, e)))
        .collect()
}

/// Fans out one decoder worker per descriptor over `rayon::scope`, joins,
/// and reports the first failure.
pub fn decode_all(
    compressed_path: &Path,
    output_path: &Path,
    descriptors: &[SectionDescriptor],
    tree: &DecodeTree,
    block_size_bits: u16,
) -> Result<()> {
    let mut results: Vec<Option<Result<()>>> = (0..descriptors.len()).map(|_| None).collect();

    rayon::scope(|scope| {
        for (slot, descriptor) in results.iter_mut().zip(descriptors.iter()) {
            scope.spawn(move |_| {
                *slot = Some(decode_worker(compressed_path, output_path, descriptor, tree, block_size_bits));
            });
        }
    });

    for (k, r) in results.into_iter().enumerate() {
        r.expect("every slot is filled by its spawned closure").map_err(|e| CodecError::in_worker(k, e))?;
    }
    Ok(())
}
