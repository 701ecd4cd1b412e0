// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Filter kernels over one mip level.

A [LevelFilter] reads one face of one level.  It converts coordinates into fixed-point texel
space with the level's [AxisScale](crate::sampler::texture_state::AxisScale)s, addresses each
tap, and fetches.

Fetching substitutes the border color for border taps without reading storage, and decodes
sRGB texels to linear before any weighting.
*/

use crate::pixel_formats::{Float4, Sampleable, srgb_to_linear};
use crate::sampler::addressing::{AddressFn, LinearTaps, Resolved, point_index};
use crate::sampler::color::channel;
use crate::sampler::state::{AddressingMode, SwizzleType, TextureType};
use crate::sampler::texture_state::Mipmap;
use crate::surface::{Texel, TexelStorage};

/// How the third coordinate is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// 2D and cube faces.  The third coordinate is ignored.
    Planar,
    /// Array textures.  The third coordinate selects a layer.
    Layered,
    /// 3D textures.  The third coordinate is filtered like the other two.
    Volume,
}

impl Shape {
    pub const fn of(texture_type: TextureType) -> Shape {
        match texture_type {
            TextureType::ThreeD => Shape::Volume,
            TextureType::TwoDArray => Shape::Layered,
            _ => Shape::Planar,
        }
    }
}

/// Reads filtered values from one face of one level.
pub struct LevelFilter<'a> {
    pub storage: &'a dyn TexelStorage,
    pub mipmap: &'a Mipmap,
    pub modes: [AddressingMode; 3],
    pub address: &'a [AddressFn; 3],
    pub shape: Shape,
    pub srgb: bool,
    /// Border color, already converted to the level's precision.
    pub border: Float4,
}

impl LevelFilter<'_> {
    #[inline] fn fixed(&self, coord: [f32; 3]) -> [i64; 3] {
        [
            self.mipmap.u.to_fixed(coord[0]),
            self.mipmap.v.to_fixed(coord[1]),
            self.mipmap.w.to_fixed(coord[2]),
        ]
    }

    #[inline] fn resolve(&self, axis: usize, index: i64) -> Resolved {
        (self.address[axis])(index, self.mipmap.dims()[axis])
    }

    /// Resolves the third axis for shapes that do not filter along it.
    #[inline] fn fixed_layer(&self, fixed_w: i64) -> Resolved {
        match self.shape {
            Shape::Planar => Resolved::Texel(0),
            _ => self.resolve(2, point_index(self.modes[2], fixed_w)),
        }
    }

    /// One texel, or the border color.
    pub fn fetch(&self, x: Resolved, y: Resolved, z: Resolved) -> Float4 {
        let (Resolved::Texel(x), Resolved::Texel(y), Resolved::Texel(z)) = (x, y, z) else {
            return self.border;
        };
        let texel = self.storage.read(Texel { x, y, z });
        if self.srgb {
            Float4::new(srgb_to_linear(texel.r), srgb_to_linear(texel.g), srgb_to_linear(texel.b), texel.a)
        } else {
            texel
        }
    }

    /// Nearest texel.
    pub fn point(&self, coord: [f32; 3]) -> Float4 {
        let fixed = self.fixed(coord);
        let x = self.resolve(0, point_index(self.modes[0], fixed[0]));
        let y = self.resolve(1, point_index(self.modes[1], fixed[1]));
        let z = self.fixed_layer(fixed[2]);
        self.fetch(x, y, z)
    }

    /// Linear interpolation between the nearest 2, 4 or 8 texels.
    ///
    /// A level one texel tall is filtered along u only.
    pub fn linear(&self, coord: [f32; 3]) -> Float4 {
        let fixed = self.fixed(coord);
        let tu = LinearTaps::new(self.modes[0], fixed[0]);
        let x = [self.resolve(0, tu.i0), self.resolve(0, tu.i1)];
        let wu = [1.0 - tu.frac, tu.frac];

        if self.shape == Shape::Planar && self.mipmap.height == 1 {
            let y = Resolved::Texel(0);
            let z = Resolved::Texel(0);
            return Float4::avg(&[
                (wu[0], self.fetch(x[0], y, z)),
                (wu[1], self.fetch(x[1], y, z)),
            ]);
        }

        let tv = LinearTaps::new(self.modes[1], fixed[1]);
        let y = [self.resolve(1, tv.i0), self.resolve(1, tv.i1)];
        let wv = [1.0 - tv.frac, tv.frac];

        if self.shape != Shape::Volume {
            let z = self.fixed_layer(fixed[2]);
            return Float4::avg(&[
                (wu[0] * wv[0], self.fetch(x[0], y[0], z)),
                (wu[1] * wv[0], self.fetch(x[1], y[0], z)),
                (wu[0] * wv[1], self.fetch(x[0], y[1], z)),
                (wu[1] * wv[1], self.fetch(x[1], y[1], z)),
            ]);
        }

        let tw = LinearTaps::new(self.modes[2], fixed[2]);
        let z = [self.resolve(2, tw.i0), self.resolve(2, tw.i1)];
        let ww = [1.0 - tw.frac, tw.frac];
        let mut taps = [(0.0, Float4::ZERO); 8];
        for (k, tap) in taps.iter_mut().enumerate() {
            let (a, b, c) = (k & 1, (k >> 1) & 1, k >> 2);
            *tap = (wu[a] * wv[b] * ww[c], self.fetch(x[a], y[b], z[c]));
        }
        Float4::avg(&taps)
    }

    /**
    The 2x2 footprint a linear filter would read, one component each, unblended.

    Returns the `component` of texels `(i0, j1)`, `(i1, j1)`, `(i1, j0)`, `(i0, j0)` as
    x, y, z, w.
    */
    pub fn gather(&self, coord: [f32; 3], component: SwizzleType) -> Float4 {
        let fixed = self.fixed(coord);
        let tu = LinearTaps::new(self.modes[0], fixed[0]);
        let tv = LinearTaps::new(self.modes[1], fixed[1]);
        let (i0, i1) = (self.resolve(0, tu.i0), self.resolve(0, tu.i1));
        let (j0, j1) = (self.resolve(1, tv.i0), self.resolve(1, tv.i1));
        let z = self.fixed_layer(fixed[2]);
        let pick = |x, y| channel(self.fetch(x, y, z), component);
        Float4::new(pick(i0, j1), pick(i1, j1), pick(i1, j0), pick(i0, j0))
    }
}
