// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Cube maps: picking a face from a direction and projecting onto it.

/// Face of a cube texture, in face-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// Face slot this face is bound to.
    #[inline] pub const fn slot(self) -> usize {
        self as usize
    }

    /// Selects the face whose axis has the largest magnitude.  Ties go to x, then y.
    pub fn select(direction: [f32; 3]) -> CubeFace {
        let [x, y, z] = direction;
        let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
        if ax >= ay && ax >= az {
            if x.is_sign_negative() { CubeFace::NegativeX } else { CubeFace::PositiveX }
        }
        else if ay >= az {
            if y.is_sign_negative() { CubeFace::NegativeY } else { CubeFace::PositiveY }
        }
        else if z.is_sign_negative() {
            CubeFace::NegativeZ
        }
        else {
            CubeFace::PositiveZ
        }
    }

    /// `(sc, tc, ma)`: the face-local axes and the major axis of `direction`.
    #[inline] fn components(self, direction: [f32; 3]) -> (f32, f32, f32) {
        let [x, y, z] = direction;
        match self {
            CubeFace::PositiveX => (-z, -y, x),
            CubeFace::NegativeX => (z, -y, x),
            CubeFace::PositiveY => (x, z, y),
            CubeFace::NegativeY => (x, -z, y),
            CubeFace::PositiveZ => (x, -y, z),
            CubeFace::NegativeZ => (-x, -y, z),
        }
    }
}

/// A direction projected onto a cube face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCoord {
    pub face: CubeFace,
    /// Normalized face coordinates in `[0, 1]`.
    pub u: f32,
    pub v: f32,
    /// Magnitude of the major axis.
    pub ma: f32,
}

/// Projects `direction` onto its face.
///
/// A zero (or NaN) major axis lands at the face center.
pub fn project(direction: [f32; 3]) -> FaceCoord {
    let face = CubeFace::select(direction);
    let (sc, tc, ma) = face.components(direction);
    let ma = ma.abs();
    if !(ma > 0.0) {
        return FaceCoord { face, u: 0.5, v: 0.5, ma: 0.0 };
    }
    FaceCoord {
        face,
        u: (sc / ma + 1.0) * 0.5,
        v: (tc / ma + 1.0) * 0.5,
        ma,
    }
}

/// Projects a direction derivative onto the face of `at`, in normalized face units.
///
/// Differentiates `u = (sc/|ma| + 1)/2`, holding the face fixed.
pub fn project_gradient(at: &FaceCoord, direction: [f32; 3], derivative: [f32; 3]) -> [f32; 2] {
    if !(at.ma > 0.0) {
        return [0.0, 0.0];
    }
    let (sc, tc, ma) = at.face.components(direction);
    let (dsc, dtc, dma) = at.face.components(derivative);
    let sign = ma.signum();
    let ma_abs = at.ma;
    let dma_abs = dma * sign;
    let scale = 0.5 / (ma_abs * ma_abs);
    [
        (dsc * ma_abs - sc * dma_abs) * scale,
        (dtc * ma_abs - tc * dma_abs) * scale,
    ]
}
