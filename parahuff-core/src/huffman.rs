//! Code builder: constructs a [`CodeTable`] from a frequency vector (§4.3),
//! and the inverse — reconstructing a decoding tree from a code table
//! (§4.4).

use crate::bigbits::BigBits;
use crate::error::{CodecError, Result};
use crate::symbol::{empty_code_table, CodeTable, Symbol};

/// Sentinel "no child" index, matching the design's `0xFFFF` convention.
pub const NONE: u16 = 0xFFFF;

/// A node in the Huffman tree arena: either a leaf carrying a byte value, or
/// an internal node carrying the indices of its two children.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind {
    /// A leaf corresponding to one byte value.
    Leaf {
        /// The byte value this leaf represents.
        byte: u8,
    },
    /// An internal node with two children.
    Internal {
        /// Index of the left child (bit 0).
        left: u16,
        /// Index of the right child (bit 1).
        right: u16,
    },
}

/// One node of the tree, stored in a flat arena. Capacity is 511 (256
/// leaves + up to 255 internal nodes).
#[derive(Debug, Clone, Copy)]
pub struct TreeNode {
    /// Leaf or internal.
    pub kind: NodeKind,
    /// Combined frequency of the subtree rooted here.
    pub frequency: u64,
    /// `true` once this node has been made the child of some other node.
    pub in_tree: bool,
}

/// The decoding tree: a flat arena plus the index of its root.
pub struct DecodeTree {
    /// Arena of nodes.
    pub nodes: Vec<TreeNode>,
    /// Root node index, or `None` if the table was completely empty.
    pub root: Option<u16>,
}

impl DecodeTree {
    /// Walks one bit from `state` (or the root, if `state` is `None`),
    /// returning the next state and, if a leaf was reached, the decoded
    /// byte (in which case the caller should reset its cursor to the
    /// root for the next call).
    pub fn step(&self, state: u16, bit: bool) -> (u16, Option<u8>) {
        match self.nodes[state as usize].kind {
            NodeKind::Leaf { byte } => (state, Some(byte)),
            NodeKind::Internal { left, right } => {
                let next = if bit { right } else { left };
                match self.nodes[next as usize].kind {
                    NodeKind::Leaf { byte } => (self.root.unwrap(), Some(byte)),
                    NodeKind::Internal { .. } => (next, None),
                }
            }
        }
    }
}

/// Builds a [`CodeTable`] from a 256-entry frequency vector (§4.3).
///
/// Deterministic: the two lowest-frequency not-yet-parented nodes are found
/// by a full left-to-right scan of the arena every time, so ties are always
/// broken the same way for the same input.
pub fn build_code_table(frequencies: &[u64; 256]) -> CodeTable {
    let mut arena: Vec<TreeNode> = Vec::with_capacity(511);
    for byte in 0..256u16 {
        arena.push(TreeNode {
            kind: NodeKind::Leaf { byte: byte as u8 },
            frequency: frequencies[byte as usize],
            in_tree: false,
        });
    }

    let is_active = |node: &TreeNode| !node.in_tree && node.frequency > 0;

    loop {
        let active_count = arena.iter().filter(|n| is_active(n)).count();
        if active_count <= 1 {
            break;
        }

        let first = arena
            .iter()
            .enumerate()
            .filter(|(_, n)| is_active(n))
            .min_by_key(|(i, n)| (n.frequency, *i))
            .map(|(i, _)| i)
            .expect("active_count > 1 guarantees a minimum exists");

        let second = arena
            .iter()
            .enumerate()
            .filter(|(i, n)| *i != first && is_active(n))
            .min_by_key(|(i, n)| (n.frequency, *i))
            .map(|(i, _)| i)
            .expect("active_count > 1 guarantees a second minimum exists");

        arena[first].in_tree = true;
        arena[second].in_tree = true;
        let combined_freq = arena[first].frequency + arena[second].frequency;
        arena.push(TreeNode {
            kind: NodeKind::Internal {
                left: first as u16,
                right: second as u16,
            },
            frequency: combined_freq,
            in_tree: false,
        });
    }

    let mut table = empty_code_table();

    let root = arena
        .iter()
        .enumerate()
        .find(|(_, n)| is_active(n))
        .map(|(i, _)| i as u16);

    let Some(root) = root else {
        return table; // empty file: no non-zero frequencies at all.
    };

    if let NodeKind::Leaf { byte } = arena[root as usize].kind {
        // Degenerate single-symbol case (§4.3 edge case): force length 1 so
        // the symbol actually emits a bit.
        table[byte as usize] = Symbol::new(BigBits::ZERO, 1);
        return table;
    }

    // Depth-first walk assigning codewords; explicit stack to avoid
    // recursion depth concerns on pathological frequency distributions.
    let mut stack = vec![(root, Symbol::EMPTY)];
    while let Some((idx, code)) = stack.pop() {
        match arena[idx as usize].kind {
            NodeKind::Leaf { byte } => {
                table[byte as usize] = code;
            }
            NodeKind::Internal { left, right } => {
                stack.push((left, code.push_bit(0)));
                stack.push((right, code.push_bit(1)));
            }
        }
    }

    table
}

/// Reconstructs a decoding tree from a code table (§4.4), bottom-up: pairs
/// of sibling codewords (same length, differing only in the last bit) are
/// merged into a parent carrying their common prefix, until a single root
/// with length 0 remains.
pub fn build_decode_tree(table: &CodeTable) -> Result<DecodeTree> {
    let mut arena: Vec<TreeNode> = Vec::with_capacity(511);
    // `active` holds (code, length, arena_index) for every not-yet-parented
    // node, initially the 256 leaves with a non-empty code.
    let mut active: Vec<(BigBits, u8, u16)> = Vec::new();

    for (byte, symbol) in table.iter().enumerate() {
        if symbol.length == 0 {
            continue;
        }
        let idx = arena.len() as u16;
        arena.push(TreeNode {
            kind: NodeKind::Leaf { byte: byte as u8 },
            frequency: 0,
            in_tree: false,
        });
        active.push((symbol.bits, symbol.length, idx));
    }

    if active.is_empty() {
        return Ok(DecodeTree {
            nodes: arena,
            root: None,
        });
    }

    while active.len() > 1 {
        let (longest_pos, &(code, length, idx)) = active
            .iter()
            .enumerate()
            .max_by_key(|(_, &(_, length, _))| length)
            .expect("active has > 1 elements");

        let sibling_code = code ^ BigBits::ONE;
        let sibling_pos = active
            .iter()
            .position(|&(c, l, i)| i != idx && l == length && c == sibling_code);

        let Some(sibling_pos) = sibling_pos else {
            return Err(CodecError::bad_code_table(
                "no sibling found for the longest remaining codeword",
            ));
        };

        let (_, _, sibling_idx) = active[sibling_pos];

        let (left_idx, right_idx) = if code.low128() & 1 == 0 {
            (idx, sibling_idx)
        } else {
            (sibling_idx, idx)
        };

        let parent_idx = arena.len() as u16;
        arena.push(TreeNode {
            kind: NodeKind::Internal {
                left: left_idx,
                right: right_idx,
            },
            frequency: 0,
            in_tree: false,
        });

        let parent_code = code.shr(1);
        let parent_len = length - 1;

        // Remove the two merged entries (higher index first so the other
        // index stays valid) and push the new parent.
        let (hi, lo) = if longest_pos > sibling_pos {
            (longest_pos, sibling_pos)
        } else {
            (sibling_pos, longest_pos)
        };
        active.remove(hi);
        active.remove(lo);
        active.push((parent_code, parent_len, parent_idx));
    }

    let root = active[0].2;
    Ok(DecodeTree {
        nodes: arena,
        root: Some(root),
    })
}
