// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Output channel remapping and the border color.
*/

use half::f16;

use crate::pixel_formats::{ChannelPrecision, Float4};
use crate::sampler::state::SwizzleType;
use crate::sampler::texture_state::LANES;

/// The value a swizzle selects from `color`.
#[inline] pub fn channel(color: Float4, source: SwizzleType) -> f32 {
    match source {
        SwizzleType::Red => color.r,
        SwizzleType::Green => color.g,
        SwizzleType::Blue => color.b,
        SwizzleType::Alpha => color.a,
        SwizzleType::Zero => 0.0,
        SwizzleType::One => 1.0,
    }
}

/// Remaps each output channel according to `swizzle` (R, G, B, A order).
#[inline] pub fn swizzle(color: Float4, swizzle: [SwizzleType; 4]) -> Float4 {
    if swizzle == SwizzleType::IDENTITY {
        return color;
    }
    Float4::new(
        channel(color, swizzle[0]),
        channel(color, swizzle[1]),
        channel(color, swizzle[2]),
        channel(color, swizzle[3]),
    )
}

/**
The color of taps that fall outside a border-addressed texture.

Kept in two forms, each broadcast across [LANES]: the float color as set, and a 16-bit
unsigned-normalized quantization used to match integer-normalized formats.  A border tap is
converted to the precision of the bound format, so that it filters like a texel of that format
would.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderColor {
    float: [[f32; LANES]; 4],
    words: [[u16; LANES]; 4],
}

impl BorderColor {
    pub const TRANSPARENT_BLACK: BorderColor = BorderColor {
        float: [[0.0; LANES]; 4],
        words: [[0; LANES]; 4],
    };

    pub fn new(color: Float4) -> Self {
        let channels = color.to_array();
        let mut float = [[0.0; LANES]; 4];
        let mut words = [[0u16; LANES]; 4];
        for (c, value) in channels.into_iter().enumerate() {
            let word = (value.clamp(0.0, 1.0) * 65535.0).round() as u16;
            float[c] = [value; LANES];
            words[c] = [word; LANES];
        }
        Self { float, words }
    }

    /// The color as a texel of `precision` would hold it.
    pub fn resolve(&self, precision: ChannelPrecision, lane: usize) -> Float4 {
        let mut out = [0.0f32; 4];
        for (c, value) in out.iter_mut().enumerate() {
            let float = self.float[c][lane];
            let word = self.words[c][lane] as u32;
            *value = match precision {
                ChannelPrecision::UNorm8 => ((word * 255 + 32767) / 65535) as f32 / 255.0,
                ChannelPrecision::UNorm16 => word as f32 / 65535.0,
                ChannelPrecision::Float16 => f16::from_f32(float).to_f32(),
                ChannelPrecision::Float32 => float,
                ChannelPrecision::SInt32 => float.trunc(),
            };
        }
        Float4::from_array(out)
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::TRANSPARENT_BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_ignore_source() {
        let color = Float4::new(0.1, 0.2, 0.3, 0.4);
        let out = swizzle(color, [SwizzleType::Zero, SwizzleType::One, SwizzleType::Red, SwizzleType::Red]);
        assert_eq!(out, Float4::new(0.0, 1.0, 0.1, 0.1));
        assert_eq!(swizzle(color, SwizzleType::IDENTITY), color);
    }

    #[test]
    fn border_matches_format_precision() {
        let border = BorderColor::new(Float4::new(0.5, 1.5, -2.7, 1.0 / 3.0));
        assert_eq!(border.resolve(ChannelPrecision::Float32, 2), Float4::new(0.5, 1.5, -2.7, 1.0 / 3.0));

        let unorm8 = border.resolve(ChannelPrecision::UNorm8, 0);
        assert_eq!(unorm8.r, 128.0 / 255.0);
        assert_eq!(unorm8.g, 1.0);
        assert_eq!(unorm8.b, 0.0);
        assert_eq!(unorm8.a, 85.0 / 255.0);

        let unorm16 = border.resolve(ChannelPrecision::UNorm16, 1);
        assert_eq!(unorm16.r, 32768.0 / 65535.0);

        let sint = border.resolve(ChannelPrecision::SInt32, 3);
        assert_eq!((sint.g, sint.b), (1.0, -2.0));

        let f16 = border.resolve(ChannelPrecision::Float16, 0);
        assert_eq!(f16.r, 0.5);
    }
}
