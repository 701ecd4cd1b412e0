// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Texel format definitions for software textures.
//!
//! Formats show up in two forms:
//!
//! - [`TextureFormat`], a runtime tag stored alongside texel memory.  The sampler keys
//!   its specialized routines on this tag and uses it to decode raw bytes.
//! - Zero-sized marker types such as [`RGBA8UNorm`], used to build surfaces in a
//!   type-checked way.  Each marker names its C-compatible pixel type and its tag.
//!
//! # Available Formats
//!
//! ## Single Channel
//! - [`R8UNorm`] - 8-bit normalized unsigned integer (0-255 mapped to 0.0-1.0)
//! - [`R16Float`] - 16-bit half-precision float
//! - [`R32Float`] - 32-bit single-precision float
//! - [`R32SInt`] - 32-bit signed integer
//!
//! ## Multi-Channel
//! - [`RGFloat`] - 2-channel 32-bit float (8 bytes total)
//! - [`RGBA8UNorm`] - 4-channel 8-bit normalized (4 bytes total)
//! - [`RGBA8UnormSRGB`] - 4-channel 8-bit normalized with sRGB encoding
//! - [`BGRA8UNormSRGB`] - 4-channel 8-bit normalized with sRGB encoding (BGRA order)
//! - [`RGBA16Unorm`] - 4-channel 16-bit normalized (8 bytes total)
//! - [`RGBA32Float`] - 4-channel 32-bit float (16 bytes total)
//!
//! Channels a format does not store decode as 0 for green and blue and 1 for alpha.
//!
//! # Examples
//!
//! ```
//! use texels_and_samplers::pixel_formats::{TextureFormat, Float4};
//!
//! let texel = TextureFormat::RGBA8UNorm.decode(&[255, 0, 51, 255]);
//! assert_eq!(texel, Float4 { r: 1.0, g: 0.0, b: 0.2, a: 1.0 });
//! ```

/*
Quick note on type design.  Formats exist both as types and as an enum.

The typed side lets surface construction check that the pixel values you write match the
format you claim.  The sampler, however, only learns the format when a level is bound at
runtime, and it needs a small closed value it can pack into its key.  So the tag is an enum
and the markers each carry a `FORMAT` constant pointing at it.
 */

use crate::pixel_formats::sealed::{PixelFormat, ReprC};

pub use half::f16;

/// Sealed traits for pixel format type safety.
///
/// Only the pixel formats defined in this crate can be used to build surfaces.
pub(crate) mod sealed {
    use std::fmt::Debug;

    /// Core trait for pixel format types.
    pub trait PixelFormat: std::fmt::Debug + Send + Sync + 'static {
        /// Number of bytes per pixel for this format.
        const BYTES_PER_PIXEL: u8;

        /// Runtime tag for this format.
        const FORMAT: super::TextureFormat;

        /// The concrete pixel type with guaranteed C-compatible memory layout.
        type CPixel: Clone + Debug + Send + ReprC;
    }

    /// Marker trait indicating C-compatible memory layout.
    ///
    /// # Safety
    ///
    /// Implementors must have no padding and no uninitialized bytes, since their
    /// memory is reinterpreted as a byte slice.
    pub unsafe trait ReprC {}
}

/// Convert a slice of C-compatible pixels to raw bytes.
pub(crate) fn pixel_as_bytes<T: ReprC>(t: &[T]) -> &[u8] {
    //safe because we know that T is repr(C)
    //(we offloaded the safety check to the ReprC trait)
    unsafe { std::slice::from_raw_parts(t.as_ptr() as *const u8, std::mem::size_of_val(t)) }
}

/// How a format stores each channel.
///
/// This decides how a border color is quantized before it is substituted for a texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPrecision {
    UNorm8,
    UNorm16,
    Float16,
    Float32,
    SInt32,
}

/// Runtime texel layout tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    R8UNorm,
    #[default]
    RGBA8UNorm,
    RGBA8UNormSRGB,
    BGRA8UNormSRGB,
    RGBA16UNorm,
    R16Float,
    R32Float,
    RGFloat,
    RGBA32Float,
    R32SInt,
}

impl TextureFormat {
    pub const LAST: TextureFormat = TextureFormat::R32SInt;

    pub const ALL: [TextureFormat; 10] = [
        TextureFormat::R8UNorm,
        TextureFormat::RGBA8UNorm,
        TextureFormat::RGBA8UNormSRGB,
        TextureFormat::BGRA8UNormSRGB,
        TextureFormat::RGBA16UNorm,
        TextureFormat::R16Float,
        TextureFormat::R32Float,
        TextureFormat::RGFloat,
        TextureFormat::RGBA32Float,
        TextureFormat::R32SInt,
    ];

    #[inline] pub const fn index(self) -> u32 {
        self as u32
    }

    pub const fn bytes_per_texel(self) -> usize {
        match self {
            TextureFormat::R8UNorm => 1,
            TextureFormat::RGBA8UNorm
            | TextureFormat::RGBA8UNormSRGB
            | TextureFormat::BGRA8UNormSRGB => 4,
            TextureFormat::RGBA16UNorm => 8,
            TextureFormat::R16Float => 2,
            TextureFormat::R32Float | TextureFormat::R32SInt => 4,
            TextureFormat::RGFloat => 8,
            TextureFormat::RGBA32Float => 16,
        }
    }

    pub const fn component_count(self) -> u8 {
        match self {
            TextureFormat::R8UNorm
            | TextureFormat::R16Float
            | TextureFormat::R32Float
            | TextureFormat::R32SInt => 1,
            TextureFormat::RGFloat => 2,
            TextureFormat::RGBA8UNorm
            | TextureFormat::RGBA8UNormSRGB
            | TextureFormat::BGRA8UNormSRGB
            | TextureFormat::RGBA16UNorm
            | TextureFormat::RGBA32Float => 4,
        }
    }

    /// True when no stored channel can hold a negative value.
    pub const fn is_unsigned(self) -> bool {
        matches!(self.precision(), ChannelPrecision::UNorm8 | ChannelPrecision::UNorm16)
    }

    /// True for formats whose bytes are conventionally sRGB-encoded.
    ///
    /// Decoding is driven by the sampler's sRGB flag, not by this.
    pub const fn is_srgb(self) -> bool {
        matches!(self, TextureFormat::RGBA8UNormSRGB | TextureFormat::BGRA8UNormSRGB)
    }

    pub const fn precision(self) -> ChannelPrecision {
        match self {
            TextureFormat::R8UNorm
            | TextureFormat::RGBA8UNorm
            | TextureFormat::RGBA8UNormSRGB
            | TextureFormat::BGRA8UNormSRGB => ChannelPrecision::UNorm8,
            TextureFormat::RGBA16UNorm => ChannelPrecision::UNorm16,
            TextureFormat::R16Float => ChannelPrecision::Float16,
            TextureFormat::R32Float | TextureFormat::RGFloat | TextureFormat::RGBA32Float => {
                ChannelPrecision::Float32
            }
            TextureFormat::R32SInt => ChannelPrecision::SInt32,
        }
    }

    /// Decodes one texel.
    ///
    /// `bytes` must hold at least [Self::bytes_per_texel] bytes in native byte order.
    pub fn decode(self, bytes: &[u8]) -> Float4 {
        fn unorm8(b: u8) -> f32 {
            b as f32 / 255.0
        }
        fn unorm16(bytes: &[u8], i: usize) -> f32 {
            u16::from_ne_bytes([bytes[2 * i], bytes[2 * i + 1]]) as f32 / 65535.0
        }
        fn float32(bytes: &[u8], i: usize) -> f32 {
            f32::from_ne_bytes([bytes[4 * i], bytes[4 * i + 1], bytes[4 * i + 2], bytes[4 * i + 3]])
        }
        match self {
            TextureFormat::R8UNorm => Float4::new(unorm8(bytes[0]), 0.0, 0.0, 1.0),
            TextureFormat::RGBA8UNorm | TextureFormat::RGBA8UNormSRGB => Float4::new(
                unorm8(bytes[0]),
                unorm8(bytes[1]),
                unorm8(bytes[2]),
                unorm8(bytes[3]),
            ),
            TextureFormat::BGRA8UNormSRGB => Float4::new(
                unorm8(bytes[2]),
                unorm8(bytes[1]),
                unorm8(bytes[0]),
                unorm8(bytes[3]),
            ),
            TextureFormat::RGBA16UNorm => Float4::new(
                unorm16(bytes, 0),
                unorm16(bytes, 1),
                unorm16(bytes, 2),
                unorm16(bytes, 3),
            ),
            TextureFormat::R16Float => {
                let h = f16::from_bits(u16::from_ne_bytes([bytes[0], bytes[1]]));
                Float4::new(h.to_f32(), 0.0, 0.0, 1.0)
            }
            TextureFormat::R32Float => Float4::new(float32(bytes, 0), 0.0, 0.0, 1.0),
            TextureFormat::RGFloat => Float4::new(float32(bytes, 0), float32(bytes, 1), 0.0, 1.0),
            TextureFormat::RGBA32Float => Float4::new(
                float32(bytes, 0),
                float32(bytes, 1),
                float32(bytes, 2),
                float32(bytes, 3),
            ),
            TextureFormat::R32SInt => {
                let i = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                Float4::new(i as f32, 0.0, 0.0, 1.0)
            }
        }
    }
}

/// Converts an sRGB-encoded value to linear color space.
///
/// The sRGB decode transfer function:
/// - For values ≤ 0.04045: `encoded / 12.92`
/// - Otherwise: `((encoded + 0.055) / 1.055)^2.4`
///
/// ```
/// use texels_and_samplers::pixel_formats::srgb_to_linear;
///
/// assert_eq!(srgb_to_linear(0.0), 0.0);
/// assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
/// assert!((srgb_to_linear(0.5) - 0.21404).abs() < 0.0001);
/// ```
#[inline] pub fn srgb_to_linear(encoded: f32) -> f32 {
    if encoded <= 0.04045 {
        encoded / 12.92
    }
    else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// 8-bit normalized unsigned integer format with a single red channel.
///
/// Values are stored as 0-255 and interpreted as 0.0-1.0 when sampled.
#[derive(Debug, Clone)]
pub struct R8UNorm;
impl PixelFormat for R8UNorm {
    const BYTES_PER_PIXEL: u8 = 1;
    const FORMAT: TextureFormat = TextureFormat::R8UNorm;
    type CPixel = u8;
}
unsafe impl ReprC for u8 {}

/// 16-bit normalized unsigned integer format with RGBA channels.
///
/// Each channel uses 16 bits (0-65535 mapped to 0.0-1.0).
#[derive(Debug, Clone)]
pub struct RGBA16Unorm;
impl PixelFormat for RGBA16Unorm {
    const BYTES_PER_PIXEL: u8 = 2 * 4;
    const FORMAT: TextureFormat = TextureFormat::RGBA16UNorm;
    type CPixel = RGBA16Pixel;
}

/// Two-channel 32-bit floating point format.
#[derive(Debug, Clone)]
pub struct RGFloat;
impl PixelFormat for RGFloat {
    const BYTES_PER_PIXEL: u8 = 8;
    const FORMAT: TextureFormat = TextureFormat::RGFloat;
    type CPixel = RGFloatPixel;
}

/// Pixel type for [`RGFloat`] format.
#[repr(C)]
#[derive(Clone, Debug)]
pub struct RGFloatPixel {
    /// Red channel value
    pub r: f32,
    /// Green channel value
    pub g: f32,
}
unsafe impl ReprC for RGFloatPixel {}

/// Pixel type for [`RGBA16Unorm`] format.
#[repr(C)]
#[derive(Clone, Debug)]
pub struct RGBA16Pixel {
    /// Red channel (0-65535)
    pub r: u16,
    /// Green channel (0-65535)
    pub g: u16,
    /// Blue channel (0-65535)
    pub b: u16,
    /// Alpha channel (0-65535)
    pub a: u16,
}
unsafe impl ReprC for RGBA16Pixel {}

/// 32-bit signed integer format with a single red channel.
///
/// Values are not normalized; sampling returns them converted to float.
#[derive(Debug, Clone)]
pub struct R32SInt;
impl PixelFormat for R32SInt {
    const BYTES_PER_PIXEL: u8 = 4;
    const FORMAT: TextureFormat = TextureFormat::R32SInt;
    type CPixel = i32;
}
unsafe impl ReprC for i32 {}

/// 32-bit single-precision float format with a single red channel.
#[derive(Debug, Clone)]
pub struct R32Float;
impl PixelFormat for R32Float {
    const BYTES_PER_PIXEL: u8 = 4;
    const FORMAT: TextureFormat = TextureFormat::R32Float;
    type CPixel = f32;
}

/// 16-bit half-precision float format with a single red channel.
#[derive(Debug, Clone)]
pub struct R16Float;
impl PixelFormat for R16Float {
    const BYTES_PER_PIXEL: u8 = 2;
    const FORMAT: TextureFormat = TextureFormat::R16Float;
    type CPixel = half::f16;
}
unsafe impl ReprC for half::f16 {}
unsafe impl ReprC for f32 {}

/// C-compatible RGBA pixel with 8-bit normalized unsigned values.
///
/// This is the pixel type for [`RGBA8UNorm`].
///
/// ```
/// use texels_and_samplers::pixel_formats::{Unorm4, Float4};
///
/// let float_color = Float4 { r: 1.0, g: 0.5, b: 0.0, a: 1.0 };
/// let unorm_color = Unorm4::from_floats(float_color);
/// assert_eq!(unorm_color, Unorm4 { r: 255, g: 128, b: 0, a: 255 });
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unorm4 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}
unsafe impl ReprC for Unorm4 {}
impl Unorm4 {
    /// Convert from normalized float values (0.0-1.0) to 8-bit values (0-255).
    ///
    /// Values are clamped to the valid range and rounded to nearest integer.
    pub fn from_floats(float4: Float4) -> Self {
        Unorm4 {
            r: (float4.r * 255.0).round().clamp(0.0, 255.0) as u8,
            g: (float4.g * 255.0).round().clamp(0.0, 255.0) as u8,
            b: (float4.b * 255.0).round().clamp(0.0, 255.0) as u8,
            a: (float4.a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// 8-bit normalized unsigned integer format with RGBA channels.
#[derive(Debug, Clone)]
pub struct RGBA8UNorm;
impl PixelFormat for RGBA8UNorm {
    const BYTES_PER_PIXEL: u8 = 4;
    const FORMAT: TextureFormat = TextureFormat::RGBA8UNorm;
    type CPixel = Unorm4;
}

/// 8-bit normalized unsigned integer format with BGRA channel order and sRGB encoding.
#[derive(Debug, Copy, Clone)]
pub struct BGRA8UNormSRGB;
impl PixelFormat for BGRA8UNormSRGB {
    const BYTES_PER_PIXEL: u8 = 4;
    const FORMAT: TextureFormat = TextureFormat::BGRA8UNormSRGB;
    type CPixel = BGRA8UnormPixelSRGB;
}

/// Pixel type for [`BGRA8UNormSRGB`] format.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct BGRA8UnormPixelSRGB {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}
unsafe impl ReprC for BGRA8UnormPixelSRGB {}

/// Four-channel floating point color.
///
/// This is both the pixel type for [`RGBA32Float`] and the result type of every sampling
/// operation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Float4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

unsafe impl ReprC for Float4 {}

impl Float4 {
    /// Transparent black.
    pub const ZERO: Float4 = Float4 { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    #[inline] pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline] pub const fn splat(v: f32) -> Self {
        Self { r: v, g: v, b: v, a: v }
    }

    #[inline] pub const fn from_array(c: [f32; 4]) -> Self {
        Self { r: c[0], g: c[1], b: c[2], a: c[3] }
    }

    #[inline] pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation, `self` at `t = 0` and `other` at `t = 1`.
    #[inline] pub fn lerp(self, other: Float4, t: f32) -> Float4 {
        Float4::avg(&[(1.0 - t, self), (t, other)])
    }
}

impl Default for Float4 {
    fn default() -> Self {
        Float4::ZERO
    }
}

/// 32-bit floating point format with RGBA channels.
#[derive(Debug, Clone)]
pub struct RGBA32Float;
impl PixelFormat for RGBA32Float {
    const BYTES_PER_PIXEL: u8 = 16;
    const FORMAT: TextureFormat = TextureFormat::RGBA32Float;
    type CPixel = Float4;
}

/// 8-bit normalized unsigned integer format with RGBA channel order and sRGB encoding.
#[derive(Debug, Clone)]
pub struct RGBA8UnormSRGB;
impl PixelFormat for RGBA8UnormSRGB {
    const BYTES_PER_PIXEL: u8 = 4;
    const FORMAT: TextureFormat = TextureFormat::RGBA8UNormSRGB;
    type CPixel = RGBA8UnormSRGBPixel;
}

unsafe impl ReprC for RGBA8UnormSRGBPixel {}
/// Pixel type for [`RGBA8UnormSRGB`] format.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RGBA8UnormSRGBPixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Types that can be blended with weights.
///
/// Filter kernels are weighted averages over fetched texels; this is the one operation they need.
///
/// ```
/// use texels_and_samplers::pixel_formats::Sampleable;
///
/// let samples = [(0.5, 1.0f32), (0.5, 3.0f32)];
/// assert_eq!(f32::avg(&samples), 2.0);
/// ```
pub trait Sampleable: Sized + Clone {
    /// Calculates a weighted average of samples.
    ///
    /// `elements` holds (weight, value) pairs whose weights should sum to 1.0.
    fn avg(elements: &[(f32, Self)]) -> Self;
}

impl Sampleable for f32 {
    fn avg(elements: &[(f32, Self)]) -> Self {
        let mut avg = 0.0;
        for element in elements {
            avg += element.0 * element.1
        }
        avg
    }
}

impl Sampleable for Float4 {
    fn avg(elements: &[(f32, Self)]) -> Self {
        let mut avg = Float4::default();
        for element in elements {
            avg.r += element.0 * element.1.r;
            avg.g += element.0 * element.1.g;
            avg.b += element.0 * element.1.b;
            avg.a += element.0 * element.1.a;
        }
        avg
    }
}
