// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Addressing: mapping fixed-point texel coordinates to texel indices.

Coordinates arrive in 16.16 fixed point (see [AxisScale::to_fixed](crate::sampler::texture_state::AxisScale::to_fixed)).
A point tap takes the texel containing the coordinate. A linear tap first moves back half a
texel, so that the two taps bracket the coordinate and the fraction is the distance from the
first tap's center.

Each integer index is then folded into `[0, d)` by the axis' [AddressingMode].  All arithmetic
is on `i64`, and wrap uses a true modulo, so the results are exact for every dimension
including non-powers of two.
*/

use crate::sampler::state::AddressingMode;
use crate::sampler::texture_state::{FIXED_HALF, FIXED_ONE, FIXED_SHIFT};

/// Where an addressed tap lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolved {
    Texel(u32),
    /// Outside the texture under border addressing.  Takes the border color.
    Border,
}

/// Folds a tap index into a texture dimension.
pub type AddressFn = fn(i64, u32) -> Resolved;

/// `i` modulo `d`, always non-negative.
#[inline] pub fn wrap(i: i64, d: u32) -> u32 {
    if d == 0 {
        return 0;
    }
    i.rem_euclid(d as i64) as u32
}

/// `i` clamped into `[0, d-1]`.
#[inline] pub fn clamp(i: i64, d: u32) -> u32 {
    if d == 0 {
        return 0;
    }
    i.clamp(0, d as i64 - 1) as u32
}

/// Reflects at every edge: period `2d`, with `d..2d` running backwards.
#[inline] pub fn mirror(i: i64, d: u32) -> u32 {
    if d == 0 {
        return 0;
    }
    let d = d as i64;
    let m = i.rem_euclid(2 * d);
    (if m < d { m } else { 2 * d - 1 - m }) as u32
}

/// Reflects once across the origin edge, then clamps.
#[inline] pub fn mirror_once(i: i64, d: u32) -> u32 {
    let reflected = if i < 0 { -1 - i } else { i };
    clamp(reflected, d)
}

/// Nearest layer to a fixed-point layer coordinate, clamped into `[0, layers-1]`.
#[inline] pub fn layer_index(fixed: i64, layers: u32) -> u32 {
    clamp((fixed + FIXED_HALF) >> FIXED_SHIFT, layers)
}

fn resolve_wrap(i: i64, d: u32) -> Resolved {
    if d == 0 { Resolved::Border } else { Resolved::Texel(wrap(i, d)) }
}

fn resolve_clamp(i: i64, d: u32) -> Resolved {
    if d == 0 { Resolved::Border } else { Resolved::Texel(clamp(i, d)) }
}

fn resolve_mirror(i: i64, d: u32) -> Resolved {
    if d == 0 { Resolved::Border } else { Resolved::Texel(mirror(i, d)) }
}

fn resolve_mirror_once(i: i64, d: u32) -> Resolved {
    if d == 0 { Resolved::Border } else { Resolved::Texel(mirror_once(i, d)) }
}

fn resolve_border(i: i64, d: u32) -> Resolved {
    if (0..d as i64).contains(&i) { Resolved::Texel(i as u32) } else { Resolved::Border }
}

impl AddressingMode {
    /// The folding function for this mode.
    ///
    /// Layer mode folds an index that was already rounded by [layer_index]-style tap
    /// selection, so it behaves as clamp here.
    pub const fn function(self) -> AddressFn {
        match self {
            AddressingMode::Wrap => resolve_wrap,
            AddressingMode::Clamp | AddressingMode::Layer => resolve_clamp,
            AddressingMode::Mirror => resolve_mirror,
            AddressingMode::MirrorOnce => resolve_mirror_once,
            AddressingMode::Border => resolve_border,
        }
    }

    #[inline] pub fn resolve(self, i: i64, d: u32) -> Resolved {
        (self.function())(i, d)
    }
}

/// The texel containing a fixed-point coordinate, before folding.
///
/// Layer mode rounds to the nearest layer instead.
#[inline] pub fn point_index(mode: AddressingMode, fixed: i64) -> i64 {
    match mode {
        AddressingMode::Layer => (fixed + FIXED_HALF) >> FIXED_SHIFT,
        _ => fixed >> FIXED_SHIFT,
    }
}

/// Two taps bracketing a coordinate, and the weight of the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTaps {
    pub i0: i64,
    pub i1: i64,
    /// Weight of `i1`, in `[0, 1)`.
    pub frac: f32,
}

impl LinearTaps {
    /// Taps for a fixed-point coordinate.  Layer mode never blends between layers.
    #[inline] pub fn new(mode: AddressingMode, fixed: i64) -> Self {
        if mode == AddressingMode::Layer {
            let i = point_index(mode, fixed);
            return Self { i0: i, i1: i, frac: 0.0 };
        }
        let t = fixed - FIXED_HALF;
        let i0 = t >> FIXED_SHIFT;
        Self {
            i0,
            i1: i0 + 1,
            frac: (t & (FIXED_ONE - 1)) as f32 / FIXED_ONE as f32,
        }
    }
}
