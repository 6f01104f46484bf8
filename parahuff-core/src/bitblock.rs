//! The bit-packed block writer and reader (§4.1 / §4.5): packs variable
//! length codewords MSB-first into 128-bit words, groups words into fixed
//! size blocks, and flushes whole blocks to a file.
//!
//! Every section owns one writer (while encoding) or reader (while
//! decoding); buffers are never shared across workers.

use std::io::{self, Read, Write};

use crate::error::{CodecError, Result};
use crate::symbol::Symbol;

/// Packs codewords MSB-first into 128-bit words and flushes full blocks.
///
/// `block_words` is the block size expressed in 128-bit words
/// (`block_size_bits / 128`).
pub struct BlockWriter<W: Write> {
    words: Vec<u128>,
    word_idx: usize,
    /// Free bits remaining in `words[word_idx]`, 0..=128.
    free_bits: u8,
    blocks_written: u32,
    writer: W,
}

impl<W: Write> BlockWriter<W> {
    /// Creates a writer for blocks of `block_words` 128-bit words, writing
    /// flushed blocks to `writer`.
    pub fn new(writer: W, block_words: usize) -> Self {
        BlockWriter {
            words: vec![0u128; block_words],
            word_idx: 0,
            free_bits: 128,
            blocks_written: 0,
            writer,
        }
    }

    fn block_words(&self) -> usize {
        self.words.len()
    }

    /// Pushes one codeword into the buffer, splitting and flushing as
    /// necessary.
    pub fn push(&mut self, code: Symbol) -> Result<()> {
        if code.length == 0 {
            return Ok(());
        }

        if code.length <= self.free_bits {
            self.merge(code);
            if self.free_bits == 0 {
                self.advance_word()?;
            }
        } else {
            let (head, tail) = code.split(self.free_bits);
            self.merge(head);
            self.advance_word()?;
            self.push(tail)?;
        }
        Ok(())
    }

    /// Folds `code` into the current word; caller guarantees
    /// `code.length <= self.free_bits`.
    fn merge(&mut self, code: Symbol) {
        let word = &mut self.words[self.word_idx];
        *word <<= code.length as u32;
        *word |= code.bits.low128();
        self.free_bits -= code.length;
    }

    fn advance_word(&mut self) -> Result<()> {
        if self.free_bits != 0 {
            return Ok(());
        }
        self.word_idx += 1;
        self.free_bits = 128;
        if self.word_idx == self.block_words() {
            self.flush_block()?;
        }
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        for word in &self.words {
            self.writer
                .write_all(&word.to_le_bytes())
                .map_err(|e| CodecError::io("block flush", e))?;
        }
        self.blocks_written += 1;
        self.word_idx = 0;
        self.free_bits = 128;
        for word in &mut self.words {
            *word = 0;
        }
        Ok(())
    }

    /// Flushes any partially-filled trailing block, zero-padding it, and
    /// returns `(blocks_written, padding_bits)`.
    pub fn finalize(mut self) -> Result<(u32, u32)> {
        if self.word_idx == 0 && self.free_bits == 128 {
            return Ok((self.blocks_written, 0));
        }

        let padding = self.free_bits as u32 + 128 * (self.block_words() - self.word_idx - 1) as u32;
        self.words[self.word_idx] <<= self.free_bits as u32;
        self.flush_block()?;
        Ok((self.blocks_written, padding))
    }
}

/// Reads fixed-size blocks of 128-bit words and walks a decoding tree
/// bit-by-bit, MSB-first, emitting decoded bytes through `sink`.
pub struct BlockReader<R: Read> {
    reader: R,
    block_words: usize,
}

impl<R: Read> BlockReader<R> {
    /// Creates a reader for blocks of `block_words` 128-bit words.
    pub fn new(reader: R, block_words: usize) -> Self {
        BlockReader {
            reader,
            block_words,
        }
    }

    /// Reads one block (all `block_words` words) into a freshly allocated
    /// vector.
    fn read_block(&mut self) -> Result<Vec<u128>> {
        let mut out = Vec::with_capacity(self.block_words);
        let mut buf = [0u8; 16];
        for _ in 0..self.block_words {
            self.reader
                .read_exact(&mut buf)
                .map_err(|e| map_read_err(e))?;
            out.push(u128::from_le_bytes(buf));
        }
        Ok(out)
    }

    /// Decodes `blocks` blocks from the stream, using `walk` to advance a
    /// decoding-tree cursor one bit at a time; `walk` returns `Some(byte)`
    /// whenever a leaf is reached (and resets its own cursor to the root).
    /// The trailing `padding_bits` bits of the final block are skipped.
    pub fn decode_section<F: FnMut(bool) -> Option<u8>>(
        &mut self,
        blocks: u32,
        padding_bits: u32,
        mut walk: F,
        mut emit: impl FnMut(u8),
    ) -> Result<()> {
        if blocks == 0 {
            return Ok(());
        }
        let block_size_bits = self.block_words as u32 * 128;
        if padding_bits as u64 >= block_size_bits as u64 {
            return Err(CodecError::bad_container(
                "padding_bits must be smaller than one block",
            ));
        }

        for b in 0..blocks {
            let words = self.read_block()?;
            if b + 1 < blocks {
                for word in &words {
                    decode_word_bits(*word, 128, &mut walk, &mut emit);
                }
            } else {
                let meaningful_bits = block_size_bits - padding_bits;
                let full_words = (meaningful_bits / 128) as usize;
                let remaining_bits = meaningful_bits % 128;
                for word in &words[..full_words] {
                    decode_word_bits(*word, 128, &mut walk, &mut emit);
                }
                if remaining_bits > 0 {
                    decode_word_bits(words[full_words], remaining_bits, &mut walk, &mut emit);
                }
            }
        }
        Ok(())
    }
}

/// Walks the top `bits` bits of `word`, MSB-first, one bit at a time.
fn decode_word_bits(
    word: u128,
    bits: u32,
    walk: &mut impl FnMut(bool) -> Option<u8>,
    emit: &mut impl FnMut(u8),
) {
    // The top `bits` bits of the word, MSB first: shift positions
    // 127 down to 128 - bits.
    for shift in (128 - bits..128).rev() {
        let bit = (word >> shift) & 1 == 1;
        if let Some(byte) = walk(bit) {
            emit(byte);
        }
    }
}

fn map_read_err(e: io::Error) -> CodecError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CodecError::Truncated("compressed section ended before its declared block count".into())
    } else {
        CodecError::io("block read", e)
    }
}
