// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Texel storage as seen by the sampler.

The sampler does not own or manage texture memory.  It borrows it through [TexelStorage],
a trait that allows random reading of [Texel]s out of some block of memory with a known
format, extent and pitch.

[Surface] is the in-crate implementation: a plain byte buffer with explicit row and slice
pitches.  It can be built from raw bytes, or in a type-checked way from one of the
[pixel_formats](crate::pixel_formats) markers.

# Coordinate Systems

- Origin (0, 0, 0) is the first texel in memory
- X increases to the right, within a row
- Y increases downward, one row pitch at a time
- Z selects a slice (volume depth or array layer), one slice pitch at a time

# Example

```
use texels_and_samplers::surface::{Surface, Texel, TexelStorage};
use texels_and_samplers::pixel_formats::R8UNorm;

// Create a 4x4 grayscale surface with a gradient along x
let surface = Surface::new_with::<R8UNorm>(4, 4, |texel| (texel.x * 85) as u8).unwrap();

let value = surface.read(Texel { x: 3, y: 2, z: 0 });
assert_eq!(value.r, 1.0);
```
*/

use crate::pixel_formats::sealed::PixelFormat;
use crate::pixel_formats::{Float4, TextureFormat, pixel_as_bytes};

/// Integer texel coordinates.
///
/// The origin (0, 0, 0) is the first texel in memory.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Texel {
    /// X coordinate (horizontal position)
    pub x: u32,
    /// Y coordinate (vertical position)
    pub y: u32,
    /// Z coordinate (slice or layer)
    pub z: u32,
}

impl Texel {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Byte offset of this texel within a buffer with the given layout.
    const fn byte_offset(&self, bytes_per_texel: usize, row_pitch: usize, slice_pitch: usize) -> usize {
        self.z as usize * slice_pitch + self.y as usize * row_pitch + self.x as usize * bytes_per_texel
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface has a zero dimension ({width}x{height}x{depth})")]
    ZeroSized { width: u32, height: u32, depth: u32 },
    #[error("row pitch {row_pitch} is smaller than one row of {row_bytes} bytes")]
    RowPitchTooSmall { row_pitch: usize, row_bytes: usize },
    #[error("slice pitch {slice_pitch} is smaller than {rows} rows of pitch {row_pitch}")]
    SlicePitchTooSmall { slice_pitch: usize, rows: u32, row_pitch: usize },
    #[error("buffer holds {actual} bytes but the layout needs {required}")]
    BufferTooSmall { required: usize, actual: usize },
}

/**
A block of texel memory with a known layout.

This is the boundary between the sampler and whatever owns texture memory.  Implementors
report format, extent and pitches; the sampler only ever reads texels at coordinates inside
the reported extent, after addressing has been applied.

The default [read](TexelStorage::read) decodes out of [bytes](TexelStorage::bytes).  Implementors
may override it, for example to generate texels procedurally or to instrument reads.
*/
pub trait TexelStorage: std::fmt::Debug + Send + Sync {
    fn format(&self) -> TextureFormat;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Depth of a volume, or number of layers of an array.  1 for plain 2D storage.
    fn depth(&self) -> u32;
    /// Distance in bytes between the starts of consecutive rows.
    fn row_pitch(&self) -> usize;
    /// Distance in bytes between the starts of consecutive slices.
    fn slice_pitch(&self) -> usize;
    /// The raw texel memory.
    fn bytes(&self) -> &[u8];

    /// Reads and decodes the texel at `texel`.
    ///
    /// `texel` must lie inside the reported extent.
    fn read(&self, texel: Texel) -> Float4 {
        let format = self.format();
        let size = format.bytes_per_texel();
        let offset = texel.byte_offset(size, self.row_pitch(), self.slice_pitch());
        format.decode(&self.bytes()[offset..offset + size])
    }
}

/// A software surface: a byte buffer plus its layout.
///
/// Rows and slices may be padded; padding bytes are never read by the sampler.
#[derive(Debug, Clone)]
pub struct Surface {
    data: Vec<u8>,
    format: TextureFormat,
    width: u32,
    height: u32,
    depth: u32,
    row_pitch: usize,
    slice_pitch: usize,
}

impl Surface {
    /// Wraps existing bytes with an explicit layout.
    ///
    /// Fails when a dimension is zero, when a pitch cannot hold what it spans, or when
    /// `data` is too short for the last texel.
    ///
    /// ```
    /// use texels_and_samplers::surface::{Surface, Texel, TexelStorage};
    /// use texels_and_samplers::pixel_formats::TextureFormat;
    ///
    /// // 2x2 R8, rows padded to 4 bytes
    /// let bytes = vec![10, 20, 0xEE, 0xEE, 30, 40, 0xEE, 0xEE];
    /// let surface = Surface::from_bytes(TextureFormat::R8UNorm, 2, 2, 1, 4, 8, bytes).unwrap();
    /// assert_eq!(surface.read(Texel::new(0, 1, 0)).r, 30.0 / 255.0);
    /// ```
    pub fn from_bytes(
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
        row_pitch: usize,
        slice_pitch: usize,
        data: Vec<u8>,
    ) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(SurfaceError::ZeroSized { width, height, depth });
        }
        let row_bytes = width as usize * format.bytes_per_texel();
        if row_pitch < row_bytes {
            return Err(SurfaceError::RowPitchTooSmall { row_pitch, row_bytes });
        }
        let rows_bytes = (height as usize - 1) * row_pitch + row_bytes;
        if depth > 1 && slice_pitch < rows_bytes {
            return Err(SurfaceError::SlicePitchTooSmall { slice_pitch, rows: height, row_pitch });
        }
        let required = (depth as usize - 1) * slice_pitch + rows_bytes;
        if data.len() < required {
            return Err(SurfaceError::BufferTooSmall { required, actual: data.len() });
        }
        Ok(Self {
            data,
            format,
            width,
            height,
            depth,
            row_pitch,
            slice_pitch,
        })
    }

    /// Creates a 2D surface with all pixels initialized to the same value.
    ///
    /// ```
    /// use texels_and_samplers::surface::{Surface, TexelStorage};
    /// use texels_and_samplers::pixel_formats::R8UNorm;
    ///
    /// let surface = Surface::new::<R8UNorm>(64, 64, 128u8).unwrap();
    /// assert_eq!(surface.width(), 64);
    /// ```
    pub fn new<Format: PixelFormat>(width: u32, height: u32, initialize_element: Format::CPixel) -> Result<Self, SurfaceError> {
        Self::new_volume_with::<Format, _>(width, height, 1, |_| initialize_element.clone())
    }

    /// Creates a 2D surface with pixels initialized by a function.
    ///
    /// ```
    /// use texels_and_samplers::surface::{Surface, Texel};
    /// use texels_and_samplers::pixel_formats::R8UNorm;
    ///
    /// // Create a checkerboard pattern
    /// let surface = Surface::new_with::<R8UNorm>(64, 64, |texel| {
    ///     if (texel.x / 8 + texel.y / 8) % 2 == 0 { 255u8 } else { 0u8 }
    /// }).unwrap();
    /// ```
    pub fn new_with<Format: PixelFormat>(width: u32, height: u32, initialize_with: impl Fn(Texel) -> Format::CPixel) -> Result<Self, SurfaceError> {
        Self::new_volume_with::<Format, _>(width, height, 1, initialize_with)
    }

    /// Creates a tightly packed surface with `depth` slices, pixels initialized by a function.
    ///
    /// Slices serve as volume depth for 3D textures and as layers for array textures.
    pub fn new_volume_with<Format: PixelFormat, F: Fn(Texel) -> Format::CPixel>(width: u32, height: u32, depth: u32, initialize_with: F) -> Result<Self, SurfaceError> {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * depth as usize);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    pixels.push(initialize_with(Texel { x, y, z }))
                }
            }
        }
        let row_pitch = width as usize * Format::BYTES_PER_PIXEL as usize;
        let slice_pitch = row_pitch * height as usize;
        Self::from_bytes(Format::FORMAT, width, height, depth, row_pitch, slice_pitch, pixel_as_bytes(&pixels).to_vec())
    }
}

impl TexelStorage for Surface {
    fn format(&self) -> TextureFormat {
        self.format
    }
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn depth(&self) -> u32 {
        self.depth
    }
    fn row_pitch(&self) -> usize {
        self.row_pitch
    }
    fn slice_pitch(&self) -> usize {
        self.slice_pitch
    }
    fn bytes(&self) -> &[u8] {
        &self.data
    }
}
