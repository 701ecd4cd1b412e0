// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Sampler state: the closed enumerations that configure sampling, and the record that
combines them.

[SamplerState] is the *effective* configuration of a sampler at one point in time.  Two
samplers with equal state sample identically, so the state (or its packed [SamplerKey])
can key caches of specialized sampling routines.
*/

use crate::bittricks::BitPacker;
use crate::pixel_formats::TextureFormat;

/// Kind of texture bound to a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureType {
    #[default]
    Null,
    TwoD,
    Cube,
    ThreeD,
    TwoDArray,
}

impl TextureType {
    pub const LAST: TextureType = TextureType::TwoDArray;
    pub const ALL: [TextureType; 5] = [
        TextureType::Null,
        TextureType::TwoD,
        TextureType::Cube,
        TextureType::ThreeD,
        TextureType::TwoDArray,
    ];
    #[inline] pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Texel filter.
///
/// Variants are ordered by quality, which is what the quality policy caps against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum FilterType {
    Point,
    /// 2x2 footprint returned unblended, one component per texel.
    Gather,
    MinPointMagLinear,
    MinLinearMagPoint,
    #[default]
    Linear,
    Anisotropic,
}

impl FilterType {
    pub const LAST: FilterType = FilterType::Anisotropic;
    pub const ALL: [FilterType; 6] = [
        FilterType::Point,
        FilterType::Gather,
        FilterType::MinPointMagLinear,
        FilterType::MinLinearMagPoint,
        FilterType::Linear,
        FilterType::Anisotropic,
    ];
    #[inline] pub const fn index(self) -> u32 {
        self as u32
    }
    pub const fn from_index(index: u32) -> Option<FilterType> {
        match index {
            0 => Some(FilterType::Point),
            1 => Some(FilterType::Gather),
            2 => Some(FilterType::MinPointMagLinear),
            3 => Some(FilterType::MinLinearMagPoint),
            4 => Some(FilterType::Linear),
            5 => Some(FilterType::Anisotropic),
            _ => None,
        }
    }
}

/// Filtering between mip levels.  Ordered by quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum MipmapType {
    /// Always sample level 0.
    #[default]
    None,
    /// Sample the nearest level.
    Point,
    /// Blend the two nearest levels.
    Linear,
}

impl MipmapType {
    pub const LAST: MipmapType = MipmapType::Linear;
    pub const ALL: [MipmapType; 3] = [MipmapType::None, MipmapType::Point, MipmapType::Linear];
    #[inline] pub const fn index(self) -> u32 {
        self as u32
    }
    pub const fn from_index(index: u32) -> Option<MipmapType> {
        match index {
            0 => Some(MipmapType::None),
            1 => Some(MipmapType::Point),
            2 => Some(MipmapType::Linear),
            _ => None,
        }
    }
}

/// How a texel index outside the texture maps back inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressingMode {
    #[default]
    Wrap,
    Clamp,
    Mirror,
    /// Mirror across the origin edge once, then clamp.
    MirrorOnce,
    /// Out-of-range taps take the border color.
    Border,
    /// Array layer selection: round to the nearest layer and clamp.
    Layer,
}

impl AddressingMode {
    pub const LAST: AddressingMode = AddressingMode::Layer;
    pub const ALL: [AddressingMode; 6] = [
        AddressingMode::Wrap,
        AddressingMode::Clamp,
        AddressingMode::Mirror,
        AddressingMode::MirrorOnce,
        AddressingMode::Border,
        AddressingMode::Layer,
    ];
    #[inline] pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Source of one output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwizzleType {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

impl SwizzleType {
    pub const LAST: SwizzleType = SwizzleType::One;
    pub const ALL: [SwizzleType; 6] = [
        SwizzleType::Red,
        SwizzleType::Green,
        SwizzleType::Blue,
        SwizzleType::Alpha,
        SwizzleType::Zero,
        SwizzleType::One,
    ];
    /// The identity mapping, R to R through A to A.
    pub const IDENTITY: [SwizzleType; 4] = [SwizzleType::Red, SwizzleType::Green, SwizzleType::Blue, SwizzleType::Alpha];
    #[inline] pub const fn index(self) -> u32 {
        self as u32
    }
}

/**
The effective configuration of a sampler.

Fields are already resolved against the bound texture and the quality policy, so this is
exactly what a sampling routine needs to know ahead of time.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerState {
    pub texture_type: TextureType,
    pub texture_format: TextureFormat,
    pub texture_filter: FilterType,
    pub addressing_u: AddressingMode,
    pub addressing_v: AddressingMode,
    pub addressing_w: AddressingMode,
    pub mipmap_filter: MipmapType,
    /// Some level-0 dimension is not a power of two.
    pub has_npot_texture: bool,
    pub srgb: bool,
    pub swizzle_r: SwizzleType,
    pub swizzle_g: SwizzleType,
    pub swizzle_b: SwizzleType,
    pub swizzle_a: SwizzleType,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            texture_type: TextureType::Null,
            texture_format: TextureFormat::default(),
            texture_filter: FilterType::Linear,
            addressing_u: AddressingMode::Wrap,
            addressing_v: AddressingMode::Wrap,
            addressing_w: AddressingMode::Wrap,
            mipmap_filter: MipmapType::None,
            has_npot_texture: false,
            srgb: false,
            swizzle_r: SwizzleType::Red,
            swizzle_g: SwizzleType::Green,
            swizzle_b: SwizzleType::Blue,
            swizzle_a: SwizzleType::Alpha,
        }
    }
}

/// A [SamplerState] packed into fixed-width bit fields.
///
/// Packing is injective: equal keys come from equal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerKey(u64);

impl SamplerKey {
    #[inline] pub const fn bits(self) -> u64 {
        self.0
    }
}

impl SamplerState {
    pub fn addressing(&self) -> [AddressingMode; 3] {
        [self.addressing_u, self.addressing_v, self.addressing_w]
    }

    pub fn swizzle(&self) -> [SwizzleType; 4] {
        [self.swizzle_r, self.swizzle_g, self.swizzle_b, self.swizzle_a]
    }

    pub fn key(&self) -> SamplerKey {
        let packed = BitPacker::new()
            .push(self.texture_type.index(), TextureType::LAST.index())
            .push(self.texture_format.index(), TextureFormat::LAST.index())
            .push(self.texture_filter.index(), FilterType::LAST.index())
            .push(self.addressing_u.index(), AddressingMode::LAST.index())
            .push(self.addressing_v.index(), AddressingMode::LAST.index())
            .push(self.addressing_w.index(), AddressingMode::LAST.index())
            .push(self.mipmap_filter.index(), MipmapType::LAST.index())
            .push_bool(self.has_npot_texture)
            .push_bool(self.srgb)
            .push(self.swizzle_r.index(), SwizzleType::LAST.index())
            .push(self.swizzle_g.index(), SwizzleType::LAST.index())
            .push(self.swizzle_b.index(), SwizzleType::LAST.index())
            .push(self.swizzle_a.index(), SwizzleType::LAST.index())
            .finish();
        SamplerKey(packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bittricks::unpack_field;

    #[test]
    fn quality_ordering() {
        assert!(FilterType::Point < FilterType::Gather);
        assert!(FilterType::Linear < FilterType::Anisotropic);
        assert!(MipmapType::None < MipmapType::Point);
        assert_eq!(FilterType::Anisotropic.min(FilterType::Linear), FilterType::Linear);
        for filter in FilterType::ALL {
            assert_eq!(FilterType::from_index(filter.index()), Some(filter));
        }
        for mipmap in MipmapType::ALL {
            assert_eq!(MipmapType::from_index(mipmap.index()), Some(mipmap));
        }
        assert_eq!(FilterType::from_index(6), None);
    }

    #[test]
    fn key_separates_every_field() {
        let base = SamplerState::default();
        let variants = [
            SamplerState { texture_type: TextureType::Cube, ..base },
            SamplerState { texture_format: TextureFormat::R32SInt, ..base },
            SamplerState { texture_filter: FilterType::Point, ..base },
            SamplerState { addressing_u: AddressingMode::Border, ..base },
            SamplerState { addressing_v: AddressingMode::Border, ..base },
            SamplerState { addressing_w: AddressingMode::Border, ..base },
            SamplerState { mipmap_filter: MipmapType::Linear, ..base },
            SamplerState { has_npot_texture: true, ..base },
            SamplerState { srgb: true, ..base },
            SamplerState { swizzle_r: SwizzleType::One, ..base },
            SamplerState { swizzle_g: SwizzleType::One, ..base },
            SamplerState { swizzle_b: SwizzleType::One, ..base },
            SamplerState { swizzle_a: SwizzleType::One, ..base },
        ];
        let mut keys = vec![base.key()];
        for v in variants {
            keys.push(v.key());
        }
        let count = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), count);
        assert_eq!(base.key(), SamplerState::default().key());
    }

    #[test]
    fn key_layout_low_fields() {
        let state = SamplerState {
            texture_type: TextureType::ThreeD,
            texture_format: TextureFormat::RGFloat,
            ..SamplerState::default()
        };
        let bits = state.key().bits();
        assert_eq!(unpack_field(bits, 0, TextureType::LAST.index()), TextureType::ThreeD.index());
        assert_eq!(unpack_field(bits, 3, TextureFormat::LAST.index()), TextureFormat::RGFloat.index());
    }
}
