// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Texture state: the mip chain a sampler reads from.

Each level slot holds up to [CUBE_FACES] references to texel storage, together with geometry
derived when the level is bound: the level's extent, the fixed-point scale that maps a
coordinate onto texels, and lane-broadcast copies of the scale for quad evaluation.

The state is rebuilt only by [TextureState::bind] and [TextureState::set_coordinate_space].
Sampling never mutates it.
*/

use std::sync::Arc;

use crate::bittricks::is_pow2;
use crate::pixel_formats::TextureFormat;
use crate::sampler::state::TextureType;
use crate::surface::TexelStorage;

/// Number of mip level slots.
pub const MIPMAP_LEVELS: usize = 14;
/// Number of face slots per level.  Only cube textures use more than one.
pub const CUBE_FACES: usize = 6;
/// Width of a sample batch (a 2x2 quad).
pub const LANES: usize = 4;

/// Fractional bits of a fixed-point texel coordinate.
pub const FIXED_SHIFT: u32 = 16;
pub const FIXED_ONE: i64 = 1 << FIXED_SHIFT;
pub const FIXED_HALF: i64 = FIXED_ONE / 2;
/// Coordinates are saturated to this many texels before conversion, so later index
/// arithmetic never overflows.
const FIXED_LIMIT: f64 = (1i64 << 46) as f64;

/**
Which coordinate convention the rasterizer hands to the sampler.

Under [Normalized](CoordinateSpace::Normalized), `0.0..1.0` spans the whole level on each axis.
Under [Unnormalized](CoordinateSpace::Unnormalized), coordinates are already in texels.
Array layers and cube-map faces ignore this: layers are always indices and cube faces are
always addressed with normalized face coordinates.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinateSpace {
    #[default]
    Normalized,
    Unnormalized,
}

/**
Scale from a coordinate to texels, in 16.16 fixed point.

`int` is the integer part and `frac` the fractional part (in units of `1/65536`).
For normalized coordinates the scale is the level dimension.  Unnormalized coordinates are
level-0 texels, so the scale is the level's size relative to level 0.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisScale {
    pub int: i64,
    pub frac: i64,
}

impl AxisScale {
    pub const UNIT: AxisScale = AxisScale { int: 1, frac: 0 };
    pub const ZERO: AxisScale = AxisScale { int: 0, frac: 0 };

    pub fn from_scale(scale: f64) -> Self {
        let fixed = (scale * FIXED_ONE as f64).round() as i64;
        Self {
            int: fixed >> FIXED_SHIFT,
            frac: fixed & (FIXED_ONE - 1),
        }
    }

    #[inline] pub fn as_f64(self) -> f64 {
        self.int as f64 + self.frac as f64 / FIXED_ONE as f64
    }

    /// Maps `coordinate` to a 16.16 fixed-point texel coordinate.
    ///
    /// Rounds to nearest.  Saturates far out-of-range values, and maps NaN to 0.
    #[inline] pub fn to_fixed(self, coordinate: f32) -> i64 {
        let t = (coordinate as f64 * self.as_f64() * FIXED_ONE as f64).round();
        t.clamp(-FIXED_LIMIT, FIXED_LIMIT) as i64
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BindError {
    #[error("mip level {level} is out of range (max {max})", max = MIPMAP_LEVELS - 1)]
    LevelOutOfRange { level: usize },
    #[error("face {face} is not valid for a {texture_type:?} texture")]
    FaceOutOfRange { face: usize, texture_type: TextureType },
    #[error("level format {actual:?} does not match texture format {expected:?}")]
    FormatMismatch { expected: TextureFormat, actual: TextureFormat },
    #[error("storage has a zero dimension")]
    ZeroSized,
}

/// One level of the mip chain.
#[derive(Debug, Clone)]
pub struct Mipmap {
    faces: [Option<Arc<dyn TexelStorage>>; CUBE_FACES],
    pub width: u32,
    pub height: u32,
    /// Volume depth, or layer count for arrays.
    pub depth: u32,
    pub u: AxisScale,
    pub v: AxisScale,
    pub w: AxisScale,
    /// Per-lane coordinate-to-texel scales, used to measure gradients in texels.
    ///
    /// Zero on axes the texture type does not filter along.
    pub f_width: [f32; LANES],
    pub f_height: [f32; LANES],
    pub f_depth: [f32; LANES],
}

impl Mipmap {
    fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            faces: Default::default(),
            width,
            height,
            depth,
            u: AxisScale::UNIT,
            v: AxisScale::UNIT,
            w: AxisScale::UNIT,
            f_width: [0.0; LANES],
            f_height: [0.0; LANES],
            f_depth: [0.0; LANES],
        }
    }

    pub fn storage(&self, face: usize) -> Option<&Arc<dyn TexelStorage>> {
        self.faces.get(face).and_then(Option::as_ref)
    }

    pub fn dims(&self) -> [u32; 3] {
        [self.width, self.height, self.depth]
    }

    /// Gradient scale on each axis for one lane.
    #[inline] pub fn lod_scale(&self, lane: usize) -> [f32; 3] {
        [self.f_width[lane], self.f_height[lane], self.f_depth[lane]]
    }

    fn is_empty(&self) -> bool {
        self.faces.iter().all(Option::is_none)
    }

    /// `base` is the level-0 extent.
    fn update_geometry(&mut self, texture_type: TextureType, space: CoordinateSpace, base: [u32; 3]) {
        let scale = |dim: u32, base: u32| match (texture_type, space) {
            (TextureType::Cube, _) | (_, CoordinateSpace::Normalized) => AxisScale::from_scale(dim as f64),
            (_, CoordinateSpace::Unnormalized) => AxisScale::from_scale(dim as f64 / base.max(1) as f64),
        };
        self.u = scale(self.width, base[0]);
        self.v = scale(self.height, base[1]);
        let (w, lod_w) = match texture_type {
            TextureType::ThreeD => (scale(self.depth, base[2]), scale(self.depth, base[2])),
            // layers are indices, never filtered
            TextureType::TwoDArray => (AxisScale::UNIT, AxisScale::ZERO),
            _ => (AxisScale::ZERO, AxisScale::ZERO),
        };
        self.w = w;
        self.f_width = [self.u.as_f64() as f32; LANES];
        self.f_height = [self.v.as_f64() as f32; LANES];
        self.f_depth = [lod_w.as_f64() as f32; LANES];
    }
}

/// The full mip chain of one texture binding.
#[derive(Debug, Clone)]
pub struct TextureState {
    texture_type: TextureType,
    format: TextureFormat,
    coordinate_space: CoordinateSpace,
    mipmaps: [Option<Mipmap>; MIPMAP_LEVELS],
}

impl TextureState {
    pub fn new(coordinate_space: CoordinateSpace) -> Self {
        Self {
            texture_type: TextureType::Null,
            format: TextureFormat::default(),
            coordinate_space,
            mipmaps: Default::default(),
        }
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn coordinate_space(&self) -> CoordinateSpace {
        self.coordinate_space
    }

    /// Changes the coordinate convention and rederives every level's scales.
    pub fn set_coordinate_space(&mut self, coordinate_space: CoordinateSpace) {
        self.coordinate_space = coordinate_space;
        self.update_geometry();
    }

    /// Rederives every level's scales against the current level 0.
    fn update_geometry(&mut self) {
        let base = self.mipmaps[0].as_ref().map(Mipmap::dims);
        let (texture_type, space) = (self.texture_type, self.coordinate_space);
        for mipmap in self.mipmaps.iter_mut().flatten() {
            let base = base.unwrap_or_else(|| mipmap.dims());
            mipmap.update_geometry(texture_type, space, base);
        }
    }

    /// A texture is present once level 0 of face 0 is bound under a non-null type.
    pub fn has_texture(&self) -> bool {
        self.texture_type != TextureType::Null
            && self.mipmaps[0].as_ref().is_some_and(|m| m.storage(0).is_some())
    }

    /// Number of consecutive bound levels, starting at level 0.
    pub fn level_count(&self) -> usize {
        self.mipmaps
            .iter()
            .take_while(|m| m.as_ref().is_some_and(|m| m.storage(0).is_some()))
            .count()
    }

    /// Highest mip index sampling may select.
    pub fn max_level(&self) -> usize {
        self.level_count().saturating_sub(1)
    }

    /// The level used for `level`.  Levels past the bound chain replicate the last bound one.
    pub fn mipmap(&self, level: usize) -> Option<&Mipmap> {
        let count = self.level_count();
        if count == 0 {
            return None;
        }
        self.mipmaps[level.min(count - 1)].as_ref()
    }

    /// Some level-0 dimension is not a power of two.
    pub fn has_npot(&self) -> bool {
        match self.mipmap(0) {
            Some(m) => {
                let depth = if self.texture_type == TextureType::ThreeD { m.depth } else { 1 };
                !is_pow2(m.width) || !is_pow2(m.height) || !is_pow2(depth)
            }
            None => false,
        }
    }

    /// True for a single 1x1x1 texel.
    pub fn is_single_texel(&self) -> bool {
        self.mipmap(0).is_some_and(|m| m.dims() == [1, 1, 1])
    }

    fn clear(&mut self) {
        self.mipmaps = Default::default();
    }

    /**
    Binds `storage` to one face of one level.

    - `TextureType::Null`, or `None` at level 0 face 0, clears the whole chain.
    - Binding under a different type than the current one discards the old chain first.
    - Rebinding the storage already in the slot is a no-op; returns `Ok(false)`.
    - Rebinding level 0 face 0 with a new format drops faces and levels of the old format.

    Returns whether anything changed.
    */
    pub fn bind(&mut self, face: usize, level: usize, storage: Option<Arc<dyn TexelStorage>>, texture_type: TextureType) -> Result<bool, BindError> {
        if level >= MIPMAP_LEVELS {
            return Err(BindError::LevelOutOfRange { level });
        }
        if face >= CUBE_FACES || (face > 0 && texture_type != TextureType::Cube) {
            return Err(BindError::FaceOutOfRange { face, texture_type });
        }
        if storage.as_ref().is_some_and(|s| s.width() == 0 || s.height() == 0 || s.depth() == 0) {
            return Err(BindError::ZeroSized);
        }
        if texture_type == TextureType::Null {
            let changed = self.texture_type != TextureType::Null;
            self.clear();
            self.texture_type = TextureType::Null;
            return Ok(changed);
        }
        if texture_type != self.texture_type {
            self.clear();
            self.texture_type = texture_type;
        }
        let Some(storage) = storage else {
            if level == 0 && face == 0 {
                self.clear();
                return Ok(true);
            }
            let Some(mipmap) = self.mipmaps[level].as_mut() else {
                return Ok(false);
            };
            mipmap.faces[face] = None;
            if mipmap.is_empty() {
                self.mipmaps[level] = None;
            }
            return Ok(true);
        };
        if let Some(current) = self.mipmaps[level].as_ref().and_then(|m| m.storage(face)) {
            if Arc::ptr_eq(current, &storage) {
                return Ok(false);
            }
        }
        let format = storage.format();
        let chain_empty = self.mipmaps.iter().all(Option::is_none);
        if level == 0 && face == 0 {
            if format != self.format {
                if let Some(base) = self.mipmaps[0].as_mut() {
                    for slot in base.faces.iter_mut().skip(1) {
                        if slot.as_ref().is_some_and(|s| s.format() != format) {
                            *slot = None;
                        }
                    }
                }
                for mipmap in self.mipmaps.iter_mut().skip(1) {
                    if mipmap.as_ref().is_some_and(|m| m.faces.iter().flatten().any(|s| s.format() != format)) {
                        *mipmap = None;
                    }
                }
            }
            self.format = format;
        }
        else if chain_empty {
            self.format = format;
        }
        else if format != self.format {
            return Err(BindError::FormatMismatch { expected: self.format, actual: format });
        }

        let (width, height, depth) = (storage.width(), storage.height(), storage.depth());
        let mipmap = self.mipmaps[level].get_or_insert_with(|| Mipmap::new(width, height, depth));
        mipmap.width = width;
        mipmap.height = height;
        mipmap.depth = depth;
        mipmap.faces[face] = Some(storage);
        self.update_geometry();
        Ok(true)
    }
}

impl Default for TextureState {
    fn default() -> Self {
        Self::new(CoordinateSpace::default())
    }
}
