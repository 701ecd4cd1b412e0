// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Sampling routines specialized on a [SamplerState], and the cache that shares them.

A [Routine] is built once per distinct [SamplerKey].  Everything the key fixes is resolved at
build time: addressing functions per axis, the coordinate shape, the format's channel
precision.  What the key does not fix (border color, LOD bias, anisotropy) arrives per call in
[SamplerParams].
*/

use std::collections::HashMap;
use std::sync::Arc;

use wasm_safe_mutex::Mutex;

use crate::pixel_formats::{ChannelPrecision, Float4, Sampleable};
use crate::sampler::addressing::AddressFn;
use crate::sampler::color::{BorderColor, swizzle};
use crate::sampler::cube;
use crate::sampler::filter::{LevelFilter, Shape};
use crate::sampler::lod::{Lod, LodParams, MipSelection};
use crate::sampler::state::{FilterType, SamplerKey, SamplerState, TextureType};
use crate::sampler::texture_state::TextureState;

/// Per-sampler values that do not take part in the key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    pub border: BorderColor,
    pub lod_bias: f32,
    pub exp2_lod_bias: f32,
    /// Anisotropic taps allowed by the sampler's maximum anisotropy.
    pub anisotropy_taps: u32,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            border: BorderColor::default(),
            lod_bias: 0.0,
            exp2_lod_bias: 1.0,
            anisotropy_taps: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kernel {
    Point,
    Linear,
}

/// A sampling routine for one effective sampler state.
#[derive(Debug)]
pub struct Routine {
    state: SamplerState,
    address: [AddressFn; 3],
    shape: Shape,
    precision: ChannelPrecision,
}

impl Routine {
    pub fn build(state: SamplerState) -> Self {
        let [u, v, w] = state.addressing();
        Self {
            state,
            address: [u.function(), v.function(), w.function()],
            shape: Shape::of(state.texture_type),
            precision: state.texture_format.precision(),
        }
    }

    pub fn state(&self) -> &SamplerState {
        &self.state
    }

    /**
    Samples `texture` at `coord`.

    `lane` picks which of the texture's lane-broadcast scales (and border lanes) to use; all
    lanes hold the same values, so any lane in `0..LANES` gives the same result.

    Gather results are returned as gathered; every other filter's result goes through the
    output swizzle.
    */
    pub fn sample(&self, texture: &TextureState, params: &SamplerParams, coord: [f32; 3], lod: Lod, lane: usize) -> Float4 {
        if self.state.texture_type == TextureType::Null || !texture.has_texture() {
            return Float4::ZERO;
        }
        let Some(base) = texture.mipmap(0) else {
            return Float4::ZERO;
        };
        let (face, coord, lod) = if self.state.texture_type == TextureType::Cube {
            let at = cube::project(coord);
            let lod = match lod {
                Lod::Gradients { ddx, ddy, bias } => {
                    let [dxu, dxv] = cube::project_gradient(&at, coord, ddx);
                    let [dyu, dyv] = cube::project_gradient(&at, coord, ddy);
                    Lod::Gradients { ddx: [dxu, dxv, 0.0], ddy: [dyu, dyv, 0.0], bias }
                }
                explicit => explicit,
            };
            (at.face.slot(), [at.u, at.v, 0.0], lod)
        } else {
            (0, coord, lod)
        };

        let filter = self.state.texture_filter;
        if filter == FilterType::Gather {
            return self.level(texture, 0, face, params, lane, |f| f.gather(coord, self.state.swizzle_r));
        }

        let lod_params = LodParams {
            mipmap: self.state.mipmap_filter,
            bias: params.lod_bias,
            exp2_bias: params.exp2_lod_bias,
            max_taps: if filter == FilterType::Anisotropic { params.anisotropy_taps } else { 1 },
            max_level: texture.max_level(),
        };
        let selection = MipSelection::select(lod, base.lod_scale(lane), &lod_params);
        let kernel = match filter {
            FilterType::Point => Kernel::Point,
            FilterType::MinPointMagLinear if !selection.magnified => Kernel::Point,
            FilterType::MinLinearMagPoint if selection.magnified => Kernel::Point,
            _ => Kernel::Linear,
        };

        let filter_level = |level| self.level(texture, level, face, params, lane, |f| Self::run(f, kernel, coord, &selection));
        let [l0, l1] = selection.levels;
        let first = filter_level(l0);
        let color = if l1 != l0 && selection.weight > 0.0 {
            first.lerp(filter_level(l1), selection.weight)
        } else {
            first
        };
        swizzle(color, self.state.swizzle())
    }

    fn level(&self, texture: &TextureState, level: usize, face: usize, params: &SamplerParams, lane: usize, f: impl FnOnce(&LevelFilter) -> Float4) -> Float4 {
        let Some(mipmap) = texture.mipmap(level) else {
            return Float4::ZERO;
        };
        // unbound cube face
        let Some(storage) = mipmap.storage(face) else {
            return Float4::ZERO;
        };
        let filter = LevelFilter {
            storage: storage.as_ref(),
            mipmap,
            modes: self.state.addressing(),
            address: &self.address,
            shape: self.shape,
            srgb: self.state.srgb,
            border: params.border.resolve(self.precision, lane),
        };
        f(&filter)
    }

    fn run(filter: &LevelFilter, kernel: Kernel, coord: [f32; 3], selection: &MipSelection) -> Float4 {
        match kernel {
            Kernel::Point => filter.point(coord),
            Kernel::Linear if selection.taps <= 1 => filter.linear(coord),
            Kernel::Linear => {
                let n = selection.taps as f32;
                let axis = selection.axis;
                let mut taps = Vec::with_capacity(selection.taps as usize);
                for k in 0..selection.taps {
                    let offset = (k as f32 + 0.5) / n - 0.5;
                    let at = [coord[0] + offset * axis[0], coord[1] + offset * axis[1], coord[2] + offset * axis[2]];
                    taps.push((1.0 / n, filter.linear(at)));
                }
                Float4::avg(&taps)
            }
        }
    }
}

/**
Routines shared by every sampler of one context, keyed by [SamplerKey].

Lookups hold the lock only long enough to clone an `Arc`.  Routines are built outside the
lock, so two threads missing on the same key may both build; the first insert wins and both
get the same routine back.
*/
pub struct RoutineCache {
    routines: Mutex<HashMap<SamplerKey, Arc<Routine>>>,
}

impl RoutineCache {
    pub fn new() -> Self {
        Self {
            routines: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_build(&self, state: &SamplerState) -> Arc<Routine> {
        let key = state.key();
        if let Some(routine) = self.routines.lock_sync().get(&key) {
            return routine.clone();
        }
        logwise::trace_sync!("routine cache miss for key {key}", key = key.bits());
        let built = Arc::new(Routine::build(*state));
        self.routines.lock_sync().entry(key).or_insert(built).clone()
    }

    pub fn len(&self) -> usize {
        self.routines.lock_sync().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RoutineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoutineCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutineCache").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::state::MipmapType;

    #[test]
    fn cache_shares_routines_per_key() {
        let cache = RoutineCache::new();
        assert!(cache.is_empty());
        let state = SamplerState::default();
        let a = cache.get_or_build(&state);
        let b = cache.get_or_build(&state);
        assert!(Arc::ptr_eq(&a, &b));
        let other = cache.get_or_build(&SamplerState { mipmap_filter: MipmapType::Point, ..state });
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(cache.len(), 2);
        assert_eq!(other.state().mipmap_filter, MipmapType::Point);
    }

    #[test]
    fn null_texture_samples_zero() {
        let texture = TextureState::default();
        for filter in FilterType::ALL {
            let routine = Routine::build(SamplerState { texture_filter: filter, ..SamplerState::default() });
            let value = routine.sample(&texture, &SamplerParams::default(), [0.5, 0.5, 0.0], Lod::BASE, 0);
            assert_eq!(value, Float4::ZERO);
        }
    }
}
