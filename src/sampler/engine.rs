// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The sampling engine: contexts, samplers and draw-time snapshots.

# Lifecycle

1. Create a [SamplingContext].  It owns the [QualityPolicy] and the [RoutineCache] shared by
   all of its samplers.
2. Create [Sampler]s from it, bind texture levels with [Sampler::set_texture_level] and
   configure them with the setters.
3. At draw time, take a [SamplerSnapshot].  It is immutable, cheap to clone and `Send + Sync`,
   so any number of rasterizer threads can sample through it while the sampler keeps being
   reconfigured for the next draw.

Setters are copy-on-write.  A snapshot never observes changes made after it was taken.

# Example

```
use std::sync::Arc;
use texels_and_samplers::pixel_formats::R32Float;
use texels_and_samplers::sampler::{Lod, SamplingContext, TextureType, FilterType};
use texels_and_samplers::surface::Surface;

let context = SamplingContext::default();
let mut sampler = context.new_sampler();
let surface = Surface::new_with::<R32Float>(4, 4, |t| t.x as f32).unwrap();
sampler.set_texture_level(0, 0, Some(Arc::new(surface)), TextureType::TwoD).unwrap();
sampler.set_texture_filter(FilterType::Point);

let snapshot = sampler.snapshot();
// wrap addressing: 1.25 lands in column 1
assert_eq!(snapshot.sample([1.25, 0.5, 0.0], Lod::BASE).r, 1.0);
```
*/

use std::sync::Arc;

use some_executor::hint::Hint;

use crate::pixel_formats::Float4;
use crate::sampler::color::BorderColor;
use crate::sampler::lod::{Lod, anisotropy_taps};
use crate::sampler::quality::QualityPolicy;
use crate::sampler::routine::{Routine, RoutineCache, SamplerParams};
use crate::sampler::state::{AddressingMode, FilterType, MipmapType, SamplerState, SwizzleType, TextureType};
use crate::sampler::texture_state::{BindError, CoordinateSpace, LANES, TextureState};
use crate::surface::TexelStorage;
use crate::{Priority, Strategy};

/// Initial settings for a [SamplingContext].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    /// Cap on every sampler's filter.
    pub filter_quality: FilterType,
    /// Cap on every sampler's mipmap filter.
    pub mipmap_quality: MipmapType,
    /// Coordinate convention of new samplers.
    pub coordinate_space: CoordinateSpace,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            filter_quality: FilterType::LAST,
            mipmap_quality: MipmapType::LAST,
            coordinate_space: CoordinateSpace::Normalized,
        }
    }
}

/// Shared state for a family of samplers.
#[derive(Debug, Clone)]
pub struct SamplingContext {
    quality: Arc<QualityPolicy>,
    routines: Arc<RoutineCache>,
    coordinate_space: CoordinateSpace,
}

impl SamplingContext {
    pub fn new(config: ContextConfig) -> Self {
        logwise::info_sync!("sampling context created with {config}", config = logwise::privacy::LogIt(&config));
        Self {
            quality: Arc::new(QualityPolicy::new(config.filter_quality, config.mipmap_quality)),
            routines: Arc::new(RoutineCache::new()),
            coordinate_space: config.coordinate_space,
        }
    }

    /// The quality caps applied to every sampler of this context.
    pub fn quality(&self) -> &QualityPolicy {
        &self.quality
    }

    pub fn routine_cache(&self) -> &RoutineCache {
        &self.routines
    }

    pub fn new_sampler(&self) -> Sampler {
        Sampler {
            quality: self.quality.clone(),
            routines: self.routines.clone(),
            texture: Arc::new(TextureState::new(self.coordinate_space)),
            texture_filter: FilterType::Linear,
            addressing: [AddressingMode::Wrap; 3],
            mipmap_filter: MipmapType::None,
            swizzle: SwizzleType::IDENTITY,
            srgb: false,
            gather: false,
            max_anisotropy: 1.0,
            border_color: Float4::ZERO,
            params: SamplerParams::default(),
        }
    }
}

impl Default for SamplingContext {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnisotropyError {
    #[error("max anisotropy must be a number of at least 1, got {0}")]
    OutOfRange(f32),
}

/**
A texture binding plus the configuration used to sample it.

Setters store what was requested.  [Sampler::state] resolves the requests against the bound
texture and the context's quality caps.
*/
#[derive(Debug, Clone)]
pub struct Sampler {
    quality: Arc<QualityPolicy>,
    routines: Arc<RoutineCache>,
    texture: Arc<TextureState>,
    texture_filter: FilterType,
    addressing: [AddressingMode; 3],
    mipmap_filter: MipmapType,
    swizzle: [SwizzleType; 4],
    srgb: bool,
    gather: bool,
    max_anisotropy: f32,
    border_color: Float4,
    params: SamplerParams,
}

impl Sampler {
    /**
    Binds `storage` to one face and level of this sampler's texture.

    Binding `None` at level 0 face 0, or any level with [TextureType::Null], unbinds the
    texture.  See [TextureState::bind] for the full rules.
    */
    pub fn set_texture_level(&mut self, face: usize, level: usize, storage: Option<Arc<dyn TexelStorage>>, texture_type: TextureType) -> Result<(), BindError> {
        let slot_holds = self.texture.mipmap(level).and_then(|m| m.storage(face)).zip(storage.as_ref()).is_some_and(|(a, b)| Arc::ptr_eq(a, b));
        if slot_holds && self.texture.texture_type() == texture_type && level < self.texture.level_count() {
            return Ok(());
        }
        match Arc::make_mut(&mut self.texture).bind(face, level, storage, texture_type) {
            Ok(changed) => {
                if changed {
                    logwise::info_sync!(
                        "bound level {level} face {face} as {texture_type}",
                        level = level,
                        face = face,
                        texture_type = logwise::privacy::LogIt(&texture_type)
                    );
                }
                Ok(())
            }
            Err(e) => {
                logwise::warn_sync!("texture level rejected: {e}", e = logwise::privacy::LogIt(&e));
                Err(e)
            }
        }
    }

    pub fn set_coordinate_space(&mut self, coordinate_space: CoordinateSpace) {
        if self.texture.coordinate_space() != coordinate_space {
            Arc::make_mut(&mut self.texture).set_coordinate_space(coordinate_space);
        }
    }

    pub fn set_texture_filter(&mut self, filter: FilterType) {
        self.texture_filter = filter;
    }

    pub fn set_addressing_mode_u(&mut self, mode: AddressingMode) {
        self.addressing[0] = mode;
    }

    pub fn set_addressing_mode_v(&mut self, mode: AddressingMode) {
        self.addressing[1] = mode;
    }

    pub fn set_addressing_mode_w(&mut self, mode: AddressingMode) {
        self.addressing[2] = mode;
    }

    pub fn set_mipmap_filter(&mut self, mipmap: MipmapType) {
        self.mipmap_filter = mipmap;
    }

    pub fn set_swizzle_r(&mut self, swizzle: SwizzleType) {
        self.swizzle[0] = swizzle;
    }

    pub fn set_swizzle_g(&mut self, swizzle: SwizzleType) {
        self.swizzle[1] = swizzle;
    }

    pub fn set_swizzle_b(&mut self, swizzle: SwizzleType) {
        self.swizzle[2] = swizzle;
    }

    pub fn set_swizzle_a(&mut self, swizzle: SwizzleType) {
        self.swizzle[3] = swizzle;
    }

    /// Decode sRGB-encoded texels to linear before filtering.
    pub fn set_read_srgb(&mut self, srgb: bool) {
        self.srgb = srgb;
    }

    pub fn set_border_color(&mut self, color: Float4) {
        self.border_color = color;
        self.params.border = BorderColor::new(color);
    }

    /// Sets the maximum anisotropy, which must be at least 1.
    ///
    /// Also sets the number of anisotropic taps: the nearest power of two, at most 16.
    pub fn set_max_anisotropy(&mut self, max_anisotropy: f32) -> Result<(), AnisotropyError> {
        if !(max_anisotropy >= 1.0) {
            logwise::warn_sync!("rejected max anisotropy {value}", value = logwise::privacy::LogIt(&max_anisotropy));
            return Err(AnisotropyError::OutOfRange(max_anisotropy));
        }
        self.max_anisotropy = max_anisotropy;
        self.params.anisotropy_taps = anisotropy_taps(max_anisotropy);
        Ok(())
    }

    /// Return the 2x2 footprint instead of filtering, for single-component formats.
    pub fn set_gather_enable(&mut self, enable: bool) {
        self.gather = enable;
    }

    /// Sets the LOD bias added to every sample's level of detail.
    pub fn set_mipmap_lod(&mut self, bias: f32) {
        self.params.lod_bias = bias;
        self.params.exp2_lod_bias = bias.exp2();
    }

    pub fn texture_filter(&self) -> FilterType {
        self.texture_filter
    }

    pub fn mipmap_filter(&self) -> MipmapType {
        self.mipmap_filter
    }

    pub fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    pub fn anisotropy_taps(&self) -> u32 {
        self.params.anisotropy_taps
    }

    pub fn border_color(&self) -> Float4 {
        self.border_color
    }

    pub fn mipmap_lod(&self) -> f32 {
        self.params.lod_bias
    }

    pub fn texture(&self) -> &TextureState {
        &self.texture
    }

    pub fn has_texture(&self) -> bool {
        self.texture.has_texture()
    }

    pub fn has_unsigned_texture(&self) -> bool {
        self.has_texture() && self.texture.format().is_unsigned()
    }

    pub fn has_cube_texture(&self) -> bool {
        self.has_texture() && self.texture.texture_type() == TextureType::Cube
    }

    /// 3D and array textures.
    pub fn has_volume_texture(&self) -> bool {
        self.has_texture() && matches!(self.texture.texture_type(), TextureType::ThreeD | TextureType::TwoDArray)
    }

    /**
    The effective state: requests resolved against the bound texture and the quality caps.

    - Gather applies only to single-component formats.
    - Anisotropic filtering needs a 2D texture and a maximum anisotropy above 1; otherwise it
      falls back to linear.
    - A single-level chain never mipmaps, and a single texel is always point sampled.
    - Cube faces clamp on u and v.  Arrays select layers on w.
    */
    pub fn state(&self) -> SamplerState {
        let texture = &self.texture;
        let texture_type = if texture.has_texture() { texture.texture_type() } else { TextureType::Null };
        let format = texture.format();

        let mipmap_filter = if texture.level_count() <= 1 {
            MipmapType::None
        } else {
            self.quality.effective_mipmap(self.mipmap_filter)
        };

        let mut filter = self.texture_filter;
        if self.gather && format.component_count() == 1 {
            filter = FilterType::Gather;
        }
        if texture_type != TextureType::TwoD || self.max_anisotropy == 1.0 {
            filter = filter.min(FilterType::Linear);
        }
        filter = self.quality.effective_filter(filter);
        if texture.is_single_texel() && mipmap_filter == MipmapType::None {
            filter = FilterType::Point;
        }

        let [mut u, mut v, mut w] = self.addressing;
        match texture_type {
            TextureType::Cube => {
                u = AddressingMode::Clamp;
                v = AddressingMode::Clamp;
            }
            TextureType::TwoDArray => w = AddressingMode::Layer,
            _ => {}
        }

        SamplerState {
            texture_type,
            texture_format: format,
            texture_filter: filter,
            addressing_u: u,
            addressing_v: v,
            addressing_w: w,
            mipmap_filter,
            has_npot_texture: texture.has_npot(),
            srgb: self.srgb,
            swizzle_r: self.swizzle[0],
            swizzle_g: self.swizzle[1],
            swizzle_b: self.swizzle[2],
            swizzle_a: self.swizzle[3],
        }
    }

    /// An immutable view of the current configuration, for sampling during one draw.
    pub fn snapshot(&self) -> SamplerSnapshot {
        SamplerSnapshot {
            texture: self.texture.clone(),
            routine: self.routines.get_or_build(&self.state()),
            params: self.params,
        }
    }

    /// Samples through a fresh snapshot.
    pub fn sample(&self, coord: [f32; 3], lod: Lod) -> Float4 {
        self.snapshot().sample(coord, lod)
    }
}

/// One sample to evaluate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRequest {
    pub coord: [f32; 3],
    pub lod: Lod,
}

/// A read-only sampler, fixed at the time it was taken.
#[derive(Debug, Clone)]
pub struct SamplerSnapshot {
    texture: Arc<TextureState>,
    routine: Arc<Routine>,
    params: SamplerParams,
}

impl SamplerSnapshot {
    pub fn state(&self) -> &SamplerState {
        self.routine.state()
    }

    pub fn sample(&self, coord: [f32; 3], lod: Lod) -> Float4 {
        self.routine.sample(&self.texture, &self.params, coord, lod, 0)
    }

    /**
    Samples a 2x2 quad with gradients taken from the quad itself.

    Lanes are laid out so that lane 1 is one pixel right of lane 0 and lane 2 one pixel below:
    `coords[1] - coords[0]` is the x derivative and `coords[2] - coords[0]` the y derivative.
    */
    pub fn sample_quad(&self, coords: [[f32; 3]; LANES], bias: f32) -> [Float4; LANES] {
        let diff = |a: [f32; 3], b: [f32; 3]| [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
        let ddx = diff(coords[1], coords[0]);
        let ddy = diff(coords[2], coords[0]);
        let lod = Lod::Gradients { ddx, ddy, bias };
        std::array::from_fn(|lane| self.routine.sample(&self.texture, &self.params, coords[lane], lod, lane))
    }

    /// Samples a batch on the current executor, split according to `strategy`.
    ///
    /// Results are in request order.
    pub async fn sample_parallel(&self, requests: Vec<SampleRequest>, priority: Priority, strategy: Strategy) -> Vec<Float4> {
        let len = requests.len();
        if len == 0 {
            return Vec::new();
        }
        let _batch = logwise::profile_begin!("sample_parallel");
        logwise::trace_sync!("sampling a batch of {len}", len = len);
        let requests = Arc::new(requests);
        let snapshot = self.clone();
        let build_vec = vec_parallel::build_vec(len, strategy, move |index| {
            let request = requests[index];
            snapshot.sample(request.coord, request.lod)
        });
        let mut executor = some_executor::current_executor::current_executor();
        build_vec.spawn_on(&mut executor, priority, Hint::CPU).await
    }
}
