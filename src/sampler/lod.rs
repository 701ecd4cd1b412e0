// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Level-of-detail selection.

A sample's LOD is either given explicitly or derived from the screen-space gradients of its
coordinate.  Gradients are measured in level-0 texels: `ρ = max(|ddx|, |ddy|)` and
`λ = log2 ρ`.  Anisotropic filtering instead divides the longer axis among several taps, and
picks the level for the per-tap footprint.

Magnification is judged on the biased, unclamped `λ`.  The level(s) actually read come from
`λ` clamped to the bound mip chain.
*/

use crate::sampler::state::MipmapType;

/// Upper bound on anisotropic taps.
pub const MAX_ANISOTROPY_TAPS: u32 = 16;

/// How the LOD of one sample is determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lod {
    /// A shader-specified level.  The sampler bias is still added.
    Explicit(f32),
    /// Coordinate derivatives along screen x and y, plus a shader bias.
    Gradients { ddx: [f32; 3], ddy: [f32; 3], bias: f32 },
}

impl Lod {
    /// Level 0 with no bias.
    pub const BASE: Lod = Lod::Explicit(0.0);

    /// Gradients with no shader bias.
    pub const fn gradients(ddx: [f32; 3], ddy: [f32; 3]) -> Lod {
        Lod::Gradients { ddx, ddy, bias: 0.0 }
    }
}

/// Number of anisotropic taps allowed by a maximum anisotropy.
///
/// The nearest power of two, within `[1, MAX_ANISOTROPY_TAPS]`.
pub fn anisotropy_taps(max_anisotropy: f32) -> u32 {
    if !(max_anisotropy > 1.0) {
        return 1;
    }
    let nearest = max_anisotropy.log2().round();
    if nearest >= MAX_ANISOTROPY_TAPS.ilog2() as f32 {
        MAX_ANISOTROPY_TAPS
    } else {
        1 << nearest as u32
    }
}

/// Gradient footprint of one sample, in level-0 texels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub major: f32,
    pub minor: f32,
    /// Coordinate-space derivative along the major axis.
    pub axis: [f32; 3],
}

impl Footprint {
    /// Measures gradients given the coordinate-to-texel scale of each axis.
    pub fn measure(ddx: [f32; 3], ddy: [f32; 3], scale: [f32; 3]) -> Self {
        let length = |d: [f32; 3]| {
            let t = [d[0] * scale[0], d[1] * scale[1], d[2] * scale[2]];
            (t[0] * t[0] + t[1] * t[1] + t[2] * t[2]).sqrt()
        };
        let (lx, ly) = (length(ddx), length(ddy));
        if lx >= ly {
            Footprint { major: lx, minor: ly, axis: ddx }
        } else {
            Footprint { major: ly, minor: lx, axis: ddy }
        }
    }

    /// Taps needed to cover the major axis, at most `max_taps`.
    pub fn taps(&self, max_taps: u32) -> u32 {
        if max_taps <= 1 || !(self.major > self.minor) {
            return 1;
        }
        let ratio = self.major / self.minor;
        if !(ratio < max_taps as f32) {
            return max_taps;
        }
        (ratio.ceil() as u32).next_power_of_two().min(max_taps)
    }
}

/// Sampler-side inputs to level selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodParams {
    pub mipmap: MipmapType,
    /// Sampler LOD bias.
    pub bias: f32,
    /// `2^bias`, applied to `ρ` before the logarithm.
    pub exp2_bias: f32,
    /// Anisotropic taps allowed, or 1 when not filtering anisotropically.
    pub max_taps: u32,
    /// Highest bound level.
    pub max_level: usize,
}

/// The outcome of level selection for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MipSelection {
    /// Biased `λ` before clamping.
    pub lambda: f32,
    pub magnified: bool,
    /// Level(s) to read.  Equal when only one level is read.
    pub levels: [usize; 2],
    /// Weight of `levels[1]`.
    pub weight: f32,
    /// Anisotropic taps and the coordinate-space axis they are spread along.
    pub taps: u32,
    pub axis: [f32; 3],
}

impl MipSelection {
    /// Computes `λ` and picks levels.
    ///
    /// `scale` converts coordinate derivatives to level-0 texels.
    pub fn select(lod: Lod, scale: [f32; 3], params: &LodParams) -> Self {
        let (lambda, taps, axis) = match lod {
            Lod::Explicit(level) => (level + params.bias, 1, [0.0; 3]),
            Lod::Gradients { ddx, ddy, bias } => {
                let footprint = Footprint::measure(ddx, ddy, scale);
                let taps = footprint.taps(params.max_taps);
                let rho = footprint.major / taps as f32;
                ((rho * params.exp2_bias).log2() + bias, taps, footprint.axis)
            }
        };
        let magnified = !(lambda > 0.0);
        let (levels, weight) = match params.mipmap {
            MipmapType::None => ([0, 0], 0.0),
            mipmap => {
                let max = params.max_level as f32;
                let clamped = if lambda.is_nan() { 0.0 } else { lambda.clamp(0.0, max) };
                match mipmap {
                    MipmapType::Point => {
                        let level = ((clamped + 0.5).floor() as usize).min(params.max_level);
                        ([level, level], 0.0)
                    }
                    _ => {
                        let base = clamped.floor();
                        let l0 = base as usize;
                        ([l0, (l0 + 1).min(params.max_level)], clamped - base)
                    }
                }
            }
        };
        MipSelection { lambda, magnified, levels, weight, taps, axis }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mipmap: MipmapType, max_level: usize) -> LodParams {
        LodParams { mipmap, bias: 0.0, exp2_bias: 1.0, max_taps: 1, max_level }
    }

    #[test]
    fn taps_round_to_power_of_two() {
        assert_eq!(anisotropy_taps(1.0), 1);
        assert_eq!(anisotropy_taps(f32::NAN), 1);
        assert_eq!(anisotropy_taps(2.0), 2);
        assert_eq!(anisotropy_taps(5.0), 4);
        assert_eq!(anisotropy_taps(6.0), 8);
        assert_eq!(anisotropy_taps(64.0), 16);
    }

    #[test]
    fn footprint_taps() {
        let f = Footprint::measure([4.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]);
        assert_eq!((f.major, f.minor), (4.0, 1.0));
        assert_eq!(f.axis, [4.0, 0.0, 0.0]);
        assert_eq!(f.taps(16), 4);
        assert_eq!(f.taps(2), 2);
        let f = Footprint::measure([3.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]);
        assert_eq!(f.taps(16), 4);
        let flat = Footprint::measure([2.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        assert_eq!(flat.taps(8), 8);
    }

    #[test]
    fn gradient_lod_and_magnification() {
        let sel = MipSelection::select(Lod::gradients([4.0 / 16.0, 0.0, 0.0], [0.0; 3]), [16.0, 16.0, 0.0], &params(MipmapType::Point, 4));
        assert_eq!(sel.lambda, 2.0);
        assert!(!sel.magnified);
        assert_eq!(sel.levels, [2, 2]);

        let sel = MipSelection::select(Lod::gradients([0.5 / 16.0, 0.0, 0.0], [0.0; 3]), [16.0, 16.0, 0.0], &params(MipmapType::Point, 4));
        assert_eq!(sel.lambda, -1.0);
        assert!(sel.magnified);
        assert_eq!(sel.levels, [0, 0]);
    }

    #[test]
    fn point_ties_round_up_and_linear_blends() {
        let sel = MipSelection::select(Lod::Explicit(1.5), [0.0; 3], &params(MipmapType::Point, 4));
        assert_eq!(sel.levels, [2, 2]);
        let sel = MipSelection::select(Lod::Explicit(0.5), [0.0; 3], &params(MipmapType::Linear, 4));
        assert_eq!((sel.levels, sel.weight), ([0, 1], 0.5));
        let sel = MipSelection::select(Lod::Explicit(9.0), [0.0; 3], &params(MipmapType::Linear, 2));
        assert_eq!((sel.levels, sel.weight), ([2, 2], 0.0));
        let sel = MipSelection::select(Lod::Explicit(3.0), [0.0; 3], &params(MipmapType::None, 4));
        assert_eq!(sel.levels, [0, 0]);
    }

    #[test]
    fn bias_and_nan() {
        let biased = LodParams { bias: 1.0, exp2_bias: 2.0, ..params(MipmapType::Point, 4) };
        let sel = MipSelection::select(Lod::Explicit(0.0), [0.0; 3], &biased);
        assert_eq!(sel.lambda, 1.0);
        let sel = MipSelection::select(Lod::gradients([1.0, 0.0, 0.0], [0.0; 3]), [4.0, 4.0, 0.0], &biased);
        assert_eq!(sel.lambda, 3.0);
        let sel = MipSelection::select(Lod::Explicit(f32::NAN), [0.0; 3], &params(MipmapType::Linear, 4));
        assert!(sel.magnified);
        assert_eq!(sel.levels, [0, 1]);
        assert_eq!(sel.weight, 0.0);
    }
}
