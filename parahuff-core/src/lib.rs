//! Core of a byte-granular parallel Huffman codec.
//!
//! ```text
//!            ┌──────────────┐
//!            │   bigbits    │  256-bit codeword storage
//!            └──────┬───────┘
//!                   │
//!            ┌──────▼───────┐
//!            │    symbol    │  Symbol / CodeTable
//!            └──────┬───────┘
//!          ┌─────────┴─────────┐
//!   ┌──────▼──────┐     ┌──────▼──────┐
//!   │    freq     │     │   huffman   │  code builder, forward + inverse
//!   └──────┬──────┘     └──────┬──────┘
//!          └─────────┬─────────┘
//!                ┌────▼────┐
//!                │ section │  planner: pre-computed per-worker offsets
//!                └────┬────┘
//!          ┌──────────┴──────────┐
//!   ┌──────▼──────┐       ┌──────▼──────┐
//!   │  bitblock   │◄──────┤   worker    │  fan-out/join over rayon::scope
//!   └─────────────┘       └──────┬──────┘
//!                          ┌──────▼──────┐
//!                          │  container  │  bit-exact header I/O
//!                          └──────┬──────┘
//!                          ┌──────▼──────┐
//!                          │     api     │  compress / decompress
//!                          └─────────────┘
//! ```
//!
//! All structures are created per-invocation; nothing outlives a single
//! [`compress`]/[`decompress`] call.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

/// Public entry points: `compress` and `decompress`.
pub mod api;
/// The 256-bit `BigBits` codeword primitive.
pub mod bigbits;
/// The bit-packed block writer and reader.
pub mod bitblock;
/// Bit-exact container header read/write.
pub mod container;
/// The `CodecError` taxonomy.
pub mod error;
/// Sequential and parallel frequency counting.
pub mod freq;
/// Forward and inverse Huffman code construction.
pub mod huffman;
/// Section descriptors and the encode/decode planner.
pub mod section;
/// The `Symbol` codeword type and `CodeTable`.
pub mod symbol;
/// Encoder and decoder workers.
pub mod worker;

pub use api::{compress, decompress};
pub use error::{CodecError, Result};

/// Re-exports the common entry points for `use parahuff_core::prelude::*;`.
pub mod prelude {
    pub use crate::api::{compress, decompress};
    pub use crate::error::{CodecError, Result};
    pub use crate::symbol::{CodeTable, Symbol};
}
