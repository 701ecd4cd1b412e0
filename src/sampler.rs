// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Texture sampling.

Leaf modules first: [state] and [texture_state] describe what is bound and how it is
configured, [addressing], [cube], [lod], [filter] and [color] implement the individual steps,
[routine] assembles them per sampler state, and [engine] is the user-facing surface.
*/

pub mod addressing;
pub mod color;
pub mod cube;
pub mod engine;
pub mod filter;
pub mod lod;
pub mod quality;
pub mod routine;
pub mod state;
pub mod texture_state;

pub use addressing::Resolved;
pub use color::BorderColor;
pub use engine::{AnisotropyError, ContextConfig, SampleRequest, Sampler, SamplerSnapshot, SamplingContext};
pub use lod::Lod;
pub use quality::QualityPolicy;
pub use routine::RoutineCache;
pub use state::{AddressingMode, FilterType, MipmapType, SamplerKey, SamplerState, SwizzleType, TextureType};
pub use texture_state::{BindError, CUBE_FACES, CoordinateSpace, LANES, MIPMAP_LEVELS, TextureState};
