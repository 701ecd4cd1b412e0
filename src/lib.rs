// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! texels_and_samplers is a software texture sampler for rasterizers.

It answers one question, many times per pixel: given a bound texture, a sampler configuration
and a texture coordinate, what filtered color does a shader see?

| Concern        | Where                                 |
|----------------|---------------------------------------|
| Texel memory   | [surface::TexelStorage], [surface::Surface] |
| Texel formats  | [pixel_formats]                       |
| Configuration  | [sampler::Sampler] setters, [sampler::ContextConfig] |
| Quality caps   | [sampler::QualityPolicy]              |
| Evaluation     | [sampler::SamplerSnapshot]            |

# Supported configurations

- 2D, cube, 3D and 2D-array textures, up to 14 mip levels
- Point, linear, min/mag split, gather and anisotropic filtering
- Wrap, clamp, mirror, mirror-once, border and layer addressing per axis
- No, nearest or linear mipmapping with LOD bias
- sRGB decoding before filtering, and per-channel output swizzles

# Threading

Samplers are configured through `&mut` setters.  Sampling goes through a [sampler::SamplerSnapshot],
which is immutable and `Send + Sync`.  Batches can be spread over an executor with
[sampler::SamplerSnapshot::sample_parallel].
*/

logwise::declare_logging_domain!();

mod bittricks;
pub mod pixel_formats;
pub mod sampler;
pub mod surface;

pub type Priority = some_executor::Priority;
pub use vec_parallel::Strategy;
