// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
bit packing.

Small closed enumerations packed into fixed-width fields of a single word.  The sampler key is built this way.
*/

/// Number of bits needed to store every value in `0..=last`.
pub const fn bits_for(last: u32) -> u32 {
    if last == 0 { 1 } else { u32::BITS - last.leading_zeros() }
}

/// True when `value` is a nonzero power of two.
#[inline] pub const fn is_pow2(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/**
Packs fields low-to-high into a `u64`.

Each field is sized for its enumeration's last value, so the layout only depends on
the order fields are pushed in.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPacker {
    packed: u64,
    shift: u32,
}

impl BitPacker {
    pub const fn new() -> Self {
        Self { packed: 0, shift: 0 }
    }

    /// Appends `value`, which must be in `0..=last`.
    pub const fn push(self, value: u32, last: u32) -> Self {
        let width = bits_for(last);
        debug_assert!(value <= last);
        debug_assert!(self.shift + width <= u64::BITS);
        Self {
            packed: self.packed | ((value as u64) << self.shift),
            shift: self.shift + width,
        }
    }

    pub const fn push_bool(self, value: bool) -> Self {
        self.push(value as u32, 1)
    }

    /// Bits used so far.
    #[cfg(test)]
    pub const fn len(&self) -> u32 {
        self.shift
    }

    pub const fn finish(self) -> u64 {
        self.packed
    }
}

/// Reads back a field written by [BitPacker::push] at bit offset `shift`.
#[cfg(test)]
pub const fn unpack_field(packed: u64, shift: u32, last: u32) -> u32 {
    let width = bits_for(last);
    ((packed >> shift) & ((1u64 << width) - 1)) as u32
}
