//! `BigBits`: a 256-bit unsigned integer used to hold a single Huffman
//! codeword together with its length stored separately (see [`crate::symbol`]).
//!
//! The codec never needs multiplication, division, or signed arithmetic on
//! this type — only the shift/mask/add/compare operations a codeword packer
//! needs — so it is implemented directly on four little-endian `u64` limbs
//! rather than pulled in from a big-integer crate built for arbitrary
//! precision arithmetic.

use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Not, Shl, Shr};

/// Number of 64-bit limbs backing a [`BigBits`].
const LIMBS: usize = 4;

/// An unsigned 256-bit integer, stored as four `u64` limbs, least
/// significant limb first.
///
/// All arithmetic is implicitly modulo 2²⁵⁶, matching standard fixed-width
/// unsigned integer semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BigBits {
    limbs: [u64; LIMBS],
}

impl BigBits {
    /// The additive identity.
    pub const ZERO: BigBits = BigBits { limbs: [0; LIMBS] };

    /// The multiplicative identity (value `1`).
    pub const ONE: BigBits = BigBits {
        limbs: [1, 0, 0, 0],
    };

    /// Total number of representable bits.
    pub const BITS: u32 = 256;

    /// Constructs a `BigBits` from a small (`u64`) integer.
    pub const fn from_u64(value: u64) -> Self {
        BigBits {
            limbs: [value, 0, 0, 0],
        }
    }

    /// Constructs a `BigBits` from a `u128` integer.
    pub const fn from_u128(value: u128) -> Self {
        BigBits {
            limbs: [value as u64, (value >> 64) as u64, 0, 0],
        }
    }

    /// Extracts the lower 128 bits as a `u128`.
    pub fn low128(self) -> u128 {
        (self.limbs[0] as u128) | ((self.limbs[1] as u128) << 64)
    }

    /// Returns `true` if every bit is zero.
    pub fn is_zero(self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Returns the index (0-based, from the LSB) of the highest set bit, or
    /// `None` if the value is zero.
    pub fn highest_bit(self) -> Option<u32> {
        for (i, &limb) in self.limbs.iter().enumerate().rev() {
            if limb != 0 {
                return Some(i as u32 * 64 + (63 - limb.leading_zeros()));
            }
        }
        None
    }

    /// Shifts left by `shift` bits, filling with zeros. Shifting by `>= 256`
    /// yields zero.
    pub fn shl(self, shift: u32) -> Self {
        if shift == 0 {
            return self;
        }
        if shift >= Self::BITS {
            return Self::ZERO;
        }
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        let mut out = [0u64; LIMBS];
        for i in (0..LIMBS).rev() {
            if i < limb_shift {
                continue;
            }
            let src = i - limb_shift;
            let mut value = self.limbs[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                value |= self.limbs[src - 1] >> (64 - bit_shift);
            }
            out[i] = value;
        }
        BigBits { limbs: out }
    }

    /// Shifts right (logically) by `shift` bits, filling with zeros.
    /// Shifting by `>= 256` yields zero.
    pub fn shr(self, shift: u32) -> Self {
        if shift == 0 {
            return self;
        }
        if shift >= Self::BITS {
            return Self::ZERO;
        }
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        let mut out = [0u64; LIMBS];
        for i in 0..LIMBS {
            let src = i + limb_shift;
            if src >= LIMBS {
                break;
            }
            let mut value = self.limbs[src] >> bit_shift;
            if bit_shift > 0 && src + 1 < LIMBS {
                value |= self.limbs[src + 1] << (64 - bit_shift);
            }
            out[i] = value;
        }
        BigBits { limbs: out }
    }

    /// Returns a mask with the lowest `bits` bits set (and the rest zero).
    /// `bits >= 256` yields all ones.
    pub fn low_mask(bits: u32) -> Self {
        if bits == 0 {
            return Self::ZERO;
        }
        if bits >= Self::BITS {
            return !Self::ZERO;
        }
        Self::ONE.shl(bits).wrapping_sub_one()
    }

    /// `self - 1`, wrapping on underflow. Only ever used on non-zero masks
    /// built from `shl`, so underflow never actually occurs in practice.
    fn wrapping_sub_one(self) -> Self {
        let mut out = self.limbs;
        for limb in out.iter_mut() {
            if *limb == 0 {
                *limb = u64::MAX;
            } else {
                *limb -= 1;
                break;
            }
        }
        BigBits { limbs: out }
    }

    /// Little-endian byte representation (32 bytes).
    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.limbs.iter().enumerate() {
            out[i * 8..i * 8 + 8].copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    /// Reconstructs a `BigBits` from its little-endian byte representation.
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; LIMBS];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
            *limb = u64::from_le_bytes(chunk);
        }
        BigBits { limbs }
    }
}

impl Shl<u32> for BigBits {
    type Output = BigBits;
    fn shl(self, shift: u32) -> BigBits {
        BigBits::shl(self, shift)
    }
}

impl Shr<u32> for BigBits {
    type Output = BigBits;
    fn shr(self, shift: u32) -> BigBits {
        BigBits::shr(self, shift)
    }
}

impl BitAnd for BigBits {
    type Output = BigBits;
    fn bitand(self, rhs: BigBits) -> BigBits {
        let mut out = [0u64; LIMBS];
        for i in 0..LIMBS {
            out[i] = self.limbs[i] & rhs.limbs[i];
        }
        BigBits { limbs: out }
    }
}

impl BitOr for BigBits {
    type Output = BigBits;
    fn bitor(self, rhs: BigBits) -> BigBits {
        let mut out = [0u64; LIMBS];
        for i in 0..LIMBS {
            out[i] = self.limbs[i] | rhs.limbs[i];
        }
        BigBits { limbs: out }
    }
}

impl Not for BigBits {
    type Output = BigBits;
    fn not(self) -> BigBits {
        let mut out = [0u64; LIMBS];
        for i in 0..LIMBS {
            out[i] = !self.limbs[i];
        }
        BigBits { limbs: out }
    }
}

impl BitXor for BigBits {
    type Output = BigBits;
    fn bitxor(self, rhs: BigBits) -> BigBits {
        let mut out = [0u64; LIMBS];
        for i in 0..LIMBS {
            out[i] = self.limbs[i] ^ rhs.limbs[i];
        }
        BigBits { limbs: out }
    }
}

impl Add for BigBits {
    type Output = BigBits;
    fn add(self, rhs: BigBits) -> BigBits {
        let mut out = [0u64; LIMBS];
        let mut carry = 0u64;
        for i in 0..LIMBS {
            let (sum1, c1) = self.limbs[i].overflowing_add(rhs.limbs[i]);
            let (sum2, c2) = sum1.overflowing_add(carry);
            out[i] = sum2;
            carry = (c1 as u64) + (c2 as u64);
        }
        BigBits { limbs: out }
    }
}

impl fmt::Display for BigBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for limb in self.limbs.iter().rev() {
            write!(f, "{:016x}", limb)?;
        }
        Ok(())
    }
}
