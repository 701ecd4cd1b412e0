// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! End-to-end sampling through the public surface: context, sampler, snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use texels_and_samplers::pixel_formats::{
    Float4, R8UNorm, R32Float, RGBA8UnormSRGB, RGBA8UnormSRGBPixel, RGBA32Float, TextureFormat, srgb_to_linear,
};
use texels_and_samplers::sampler::{
    AddressingMode, ContextConfig, CoordinateSpace, FilterType, Lod, MipmapType, SampleRequest, Sampler, SamplingContext,
    SwizzleType, TextureType,
};
use texels_and_samplers::surface::{Surface, Texel, TexelStorage};
use texels_and_samplers::{Priority, Strategy};

/// Storage that counts how many texels were read.
#[derive(Debug)]
struct CountingStorage {
    inner: Surface,
    reads: AtomicUsize,
}

impl CountingStorage {
    fn new(inner: Surface) -> Arc<Self> {
        Arc::new(Self { inner, reads: AtomicUsize::new(0) })
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed)
    }
}

impl TexelStorage for CountingStorage {
    fn format(&self) -> TextureFormat {
        self.inner.format()
    }
    fn width(&self) -> u32 {
        self.inner.width()
    }
    fn height(&self) -> u32 {
        self.inner.height()
    }
    fn depth(&self) -> u32 {
        self.inner.depth()
    }
    fn row_pitch(&self) -> usize {
        self.inner.row_pitch()
    }
    fn slice_pitch(&self) -> usize {
        self.inner.slice_pitch()
    }
    fn bytes(&self) -> &[u8] {
        self.inner.bytes()
    }
    fn read(&self, texel: Texel) -> Float4 {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.inner.read(texel)
    }
}

fn r32(width: u32, height: u32, f: impl Fn(Texel) -> f32) -> Arc<dyn TexelStorage> {
    Arc::new(Surface::new_with::<R32Float>(width, height, f).unwrap())
}

fn solid(width: u32, height: u32, value: f32) -> Arc<dyn TexelStorage> {
    r32(width, height, |_| value)
}

fn sampler_2d(storage: Arc<dyn TexelStorage>) -> Sampler {
    let mut sampler = SamplingContext::default().new_sampler();
    sampler.set_texture_level(0, 0, Some(storage), TextureType::TwoD).unwrap();
    sampler
}

#[test]
fn wrap_point_lands_in_column_one() {
    let mut sampler = sampler_2d(r32(4, 4, |t| t.x as f32));
    sampler.set_texture_filter(FilterType::Point);
    assert_eq!(sampler.sample([1.25, 0.5, 0.0], Lod::BASE).r, 1.0);
    assert_eq!(sampler.sample([-0.75, 0.5, 0.0], Lod::BASE).r, 1.0);
}

#[test]
fn mirror_addressing_reflects() {
    let mut sampler = sampler_2d(r32(4, 1, |t| t.x as f32));
    sampler.set_texture_filter(FilterType::Point);
    sampler.set_addressing_mode_u(AddressingMode::Mirror);
    assert_eq!(sampler.sample([-0.125, 0.5, 0.0], Lod::BASE).r, 0.0);
    assert_eq!(sampler.sample([1.125, 0.5, 0.0], Lod::BASE).r, 3.0);
}

#[test]
fn mirror_once_reflects_a_single_time() {
    let mut sampler = sampler_2d(r32(4, 1, |t| t.x as f32));
    sampler.set_texture_filter(FilterType::Point);
    sampler.set_addressing_mode_u(AddressingMode::MirrorOnce);
    assert_eq!(sampler.sample([-0.125, 0.5, 0.0], Lod::BASE).r, 0.0);
    assert_eq!(sampler.sample([-0.625, 0.5, 0.0], Lod::BASE).r, 2.0);
    // past the reflected copy, and on the positive side, the edge texel repeats
    assert_eq!(sampler.sample([-1.5, 0.5, 0.0], Lod::BASE).r, 3.0);
    assert_eq!(sampler.sample([1.125, 0.5, 0.0], Lod::BASE).r, 3.0);
    sampler.set_addressing_mode_u(AddressingMode::Mirror);
    assert_eq!(sampler.sample([-1.5, 0.5, 0.0], Lod::BASE).r, 2.0);
}

#[test]
fn mip_linear_blends_to_midpoint() {
    let mut sampler = sampler_2d(solid(4, 4, 0.25));
    sampler.set_texture_level(0, 1, Some(solid(2, 2, 0.75)), TextureType::TwoD).unwrap();
    sampler.set_texture_filter(FilterType::Point);
    sampler.set_mipmap_filter(MipmapType::Linear);
    assert_eq!(sampler.sample([0.3, 0.6, 0.0], Lod::Explicit(0.5)).r, 0.5);
    // bias moves the selection
    sampler.set_mipmap_lod(1.0);
    assert_eq!(sampler.sample([0.3, 0.6, 0.0], Lod::Explicit(0.0)).r, 0.75);
}

#[test]
fn null_texture_is_transparent_black() {
    let mut sampler = SamplingContext::default().new_sampler();
    for filter in FilterType::ALL {
        sampler.set_texture_filter(filter);
        assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::BASE), Float4::ZERO);
    }
    sampler.set_texture_level(0, 0, Some(solid(2, 2, 1.0)), TextureType::TwoD).unwrap();
    sampler.set_texture_level(0, 0, None, TextureType::Null).unwrap();
    assert!(!sampler.has_texture());
    assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::BASE), Float4::ZERO);
}

#[test]
fn border_never_reads_storage() {
    let storage = CountingStorage::new(Surface::new::<R32Float>(2, 2, 1.0).unwrap());
    let mut sampler = sampler_2d(storage.clone());
    sampler.set_addressing_mode_u(AddressingMode::Border);
    sampler.set_addressing_mode_v(AddressingMode::Border);
    sampler.set_border_color(Float4::new(0.25, 0.5, 0.75, 1.0));

    let snapshot = sampler.snapshot();
    let linear = snapshot.sample([-1.0, -1.0, 0.0], Lod::BASE);
    assert_eq!(linear, Float4::new(0.25, 0.5, 0.75, 1.0));
    assert_eq!(storage.reads(), 0);

    sampler.set_texture_filter(FilterType::Point);
    assert_eq!(sampler.sample([0.5, -0.5, 0.0], Lod::BASE), Float4::new(0.25, 0.5, 0.75, 1.0));
    assert_eq!(storage.reads(), 0);

    assert_eq!(sampler.sample([0.25, 0.25, 0.0], Lod::BASE).r, 1.0);
    assert_eq!(storage.reads(), 1);
}

#[test]
fn border_color_takes_format_precision() {
    let storage: Arc<dyn TexelStorage> = Arc::new(Surface::new::<R8UNorm>(2, 2, 0).unwrap());
    let mut sampler = sampler_2d(storage);
    sampler.set_texture_filter(FilterType::Point);
    sampler.set_addressing_mode_u(AddressingMode::Border);
    sampler.set_border_color(Float4::splat(0.5));
    assert_eq!(sampler.sample([-0.5, 0.5, 0.0], Lod::BASE), Float4::splat(128.0 / 255.0));
}

#[test]
fn srgb_decodes_before_filtering() {
    let surface = Surface::new_with::<RGBA8UnormSRGB>(2, 1, |t| {
        let v = if t.x == 0 { 0 } else { 255 };
        RGBA8UnormSRGBPixel { r: v, g: v, b: v, a: v }
    })
    .unwrap();
    let mut sampler = sampler_2d(Arc::new(surface));
    sampler.set_addressing_mode_u(AddressingMode::Clamp);

    let encoded = sampler.sample([0.5, 0.5, 0.0], Lod::BASE);
    assert_eq!(encoded.r, 0.5);

    sampler.set_read_srgb(true);
    let decoded = sampler.sample([0.5, 0.5, 0.0], Lod::BASE);
    assert!((decoded.r - 0.5).abs() < 1e-6);
    assert_eq!(decoded.a, 0.5);
    // filter-then-decode would give a much darker value
    assert!(decoded.r > srgb_to_linear(encoded.r) + 0.2);
}

#[test]
fn swizzle_constants_ignore_source() {
    let storage: Arc<dyn TexelStorage> = Arc::new(Surface::new::<RGBA32Float>(1, 1, Float4::new(0.1, 0.2, 0.3, 0.4)).unwrap());
    let mut sampler = sampler_2d(storage);
    sampler.set_swizzle_r(SwizzleType::Zero);
    sampler.set_swizzle_g(SwizzleType::One);
    sampler.set_swizzle_b(SwizzleType::Red);
    sampler.set_swizzle_a(SwizzleType::Green);
    assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::BASE), Float4::new(0.0, 1.0, 0.1, 0.2));
}

#[test]
fn cube_selects_faces() {
    let mut sampler = SamplingContext::default().new_sampler();
    for face in 0..6 {
        sampler.set_texture_level(face, 0, Some(solid(2, 2, face as f32)), TextureType::Cube).unwrap();
    }
    assert!(sampler.has_cube_texture());
    assert_eq!(sampler.sample([-1.0, 0.2, 0.1], Lod::BASE).r, 1.0);
    assert_eq!(sampler.sample([0.1, 2.0, 0.3], Lod::BASE).r, 2.0);
    assert_eq!(sampler.sample([0.1, 0.2, -3.0], Lod::BASE).r, 5.0);
    // an edge direction clamps rather than wrapping onto the opposite side
    assert_eq!(sampler.sample([1.0, 1.0, 0.0], Lod::BASE).r, 0.0);
}

#[test]
fn cube_rejects_face_for_2d() {
    let mut sampler = SamplingContext::default().new_sampler();
    assert!(sampler.set_texture_level(3, 0, Some(solid(2, 2, 0.0)), TextureType::TwoD).is_err());
    assert!(!sampler.has_texture());
}

#[test]
fn array_layers_round_and_clamp() {
    let layers: Arc<dyn TexelStorage> = Arc::new(Surface::new_volume_with::<R32Float, _>(2, 2, 3, |t| t.z as f32).unwrap());
    let mut sampler = SamplingContext::default().new_sampler();
    sampler.set_texture_level(0, 0, Some(layers), TextureType::TwoDArray).unwrap();
    assert!(sampler.has_volume_texture());
    assert_eq!(sampler.sample([0.5, 0.5, 1.6], Lod::BASE).r, 2.0);
    assert_eq!(sampler.sample([0.5, 0.5, 1.4], Lod::BASE).r, 1.0);
    assert_eq!(sampler.sample([0.5, 0.5, -5.0], Lod::BASE).r, 0.0);
    assert_eq!(sampler.sample([0.5, 0.5, 12.0], Lod::BASE).r, 2.0);
}

#[test]
fn volume_filters_trilinearly() {
    let volume: Arc<dyn TexelStorage> = Arc::new(Surface::new_volume_with::<R32Float, _>(2, 2, 2, |t| (t.z * 8) as f32).unwrap());
    let mut sampler = SamplingContext::default().new_sampler();
    sampler.set_texture_level(0, 0, Some(volume), TextureType::ThreeD).unwrap();
    sampler.set_addressing_mode_w(AddressingMode::Clamp);
    assert_eq!(sampler.sample([0.5, 0.5, 0.5], Lod::BASE).r, 4.0);
    assert_eq!(sampler.sample([0.25, 0.25, 0.25], Lod::BASE).r, 0.0);
}

#[test]
fn gather_returns_footprint() {
    let mut sampler = sampler_2d(r32(2, 2, |t| (t.y * 2 + t.x) as f32));
    sampler.set_gather_enable(true);
    assert_eq!(sampler.state().texture_filter, FilterType::Gather);
    assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::BASE), Float4::new(2.0, 3.0, 1.0, 0.0));
}

#[test]
fn min_point_mag_linear_switches_on_magnification() {
    let mut sampler = sampler_2d(r32(2, 1, |t| t.x as f32 * 10.0));
    sampler.set_addressing_mode_u(AddressingMode::Clamp);
    sampler.set_texture_filter(FilterType::MinPointMagLinear);
    assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::Explicit(0.0)).r, 5.0);
    assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::Explicit(1.0)).r, 10.0);
}

#[test]
fn min_linear_mag_point_switches_on_magnification() {
    let mut sampler = sampler_2d(r32(2, 1, |t| t.x as f32 * 10.0));
    sampler.set_addressing_mode_u(AddressingMode::Clamp);
    sampler.set_texture_filter(FilterType::MinLinearMagPoint);
    assert_eq!(sampler.state().texture_filter, FilterType::MinLinearMagPoint);
    assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::Explicit(0.0)).r, 10.0);
    assert_eq!(sampler.sample([0.5, 0.5, 0.0], Lod::Explicit(1.0)).r, 5.0);
}

#[test]
fn anisotropic_tap_count_follows_footprint() {
    let storage = CountingStorage::new(Surface::new::<R32Float>(16, 16, 0.5).unwrap());
    let mut sampler = sampler_2d(storage.clone());
    sampler.set_addressing_mode_u(AddressingMode::Clamp);
    sampler.set_addressing_mode_v(AddressingMode::Clamp);
    sampler.set_texture_filter(FilterType::Anisotropic);
    sampler.set_max_anisotropy(16.0).unwrap();
    let lod = Lod::gradients([8.0 / 16.0, 0.0, 0.0], [0.0, 1.0 / 16.0, 0.0]);

    let value = sampler.sample([0.5, 0.5, 0.0], lod);
    assert!((value.r - 0.5).abs() < 1e-6);
    assert_eq!(storage.reads(), 8 * 4);

    storage.reset();
    sampler.set_max_anisotropy(4.0).unwrap();
    sampler.sample([0.5, 0.5, 0.0], lod);
    assert_eq!(storage.reads(), 4 * 4);

    storage.reset();
    sampler.sample([0.5, 0.5, 0.0], Lod::Explicit(0.0));
    assert_eq!(storage.reads(), 4);
}

#[test]
fn quad_gradients_pick_level() {
    let mut sampler = sampler_2d(solid(8, 8, 0.0));
    for (level, size) in [(1, 4), (2, 2), (3, 1)] {
        sampler.set_texture_level(0, level, Some(solid(size, size, level as f32)), TextureType::TwoD).unwrap();
    }
    sampler.set_texture_filter(FilterType::Point);
    sampler.set_mipmap_filter(MipmapType::Point);
    let base = [0.5, 0.5, 0.0];
    let step = 2.0 / 8.0;
    let quad = [
        base,
        [base[0] + step, base[1], 0.0],
        [base[0], base[1] + step, 0.0],
        [base[0] + step, base[1] + step, 0.0],
    ];
    let out = sampler.snapshot().sample_quad(quad, 0.0);
    assert_eq!(out.map(|c| c.r), [1.0; 4]);
    let biased = sampler.snapshot().sample_quad(quad, 1.0);
    assert_eq!(biased.map(|c| c.r), [2.0; 4]);
}

#[test]
fn unnormalized_coordinates_are_texels() {
    let context = SamplingContext::new(ContextConfig {
        coordinate_space: CoordinateSpace::Unnormalized,
        ..ContextConfig::default()
    });
    let mut sampler = context.new_sampler();
    sampler.set_texture_level(0, 0, Some(r32(4, 4, |t| t.x as f32)), TextureType::TwoD).unwrap();
    sampler.set_texture_filter(FilterType::Point);
    assert_eq!(sampler.sample([2.5, 0.5, 0.0], Lod::BASE).r, 2.0);
    sampler.set_coordinate_space(CoordinateSpace::Normalized);
    assert_eq!(sampler.sample([0.6, 0.5, 0.0], Lod::BASE).r, 2.0);
}

#[test]
fn unnormalized_coordinates_address_every_level() {
    let context = SamplingContext::new(ContextConfig {
        coordinate_space: CoordinateSpace::Unnormalized,
        ..ContextConfig::default()
    });
    let mut sampler = context.new_sampler();
    sampler.set_texture_level(0, 0, Some(r32(8, 8, |t| 100.0 + t.x as f32)), TextureType::TwoD).unwrap();
    sampler.set_texture_level(0, 1, Some(r32(4, 4, |t| 100.0 + t.x as f32)), TextureType::TwoD).unwrap();
    sampler.set_texture_filter(FilterType::Point);
    sampler.set_mipmap_filter(MipmapType::Point);

    assert_eq!(sampler.sample([6.5, 0.5, 0.0], Lod::Explicit(0.0)).r, 106.0);
    assert_eq!(sampler.sample([6.5, 0.5, 0.0], Lod::Explicit(1.0)).r, 103.0);
    // wraps at the level's own extent
    assert_eq!(sampler.sample([9.0, 0.5, 0.0], Lod::Explicit(1.0)).r, 100.0);
    // two level-0 texels per pixel select level 1
    let lod = Lod::gradients([2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
    assert_eq!(sampler.sample([6.5, 0.5, 0.0], lod).r, 103.0);

    sampler.set_coordinate_space(CoordinateSpace::Normalized);
    assert_eq!(sampler.sample([6.5 / 8.0, 0.5 / 8.0, 0.0], Lod::Explicit(1.0)).r, 103.0);
}

#[test]
fn quality_caps_are_shared_and_non_destructive() {
    let context = SamplingContext::default();
    let mut a = context.new_sampler();
    let mut b = context.new_sampler();
    for sampler in [&mut a, &mut b] {
        sampler.set_texture_level(0, 0, Some(solid(4, 4, 0.0)), TextureType::TwoD).unwrap();
        sampler.set_texture_level(0, 1, Some(solid(2, 2, 0.0)), TextureType::TwoD).unwrap();
        sampler.set_mipmap_filter(MipmapType::Linear);
    }
    context.quality().set_filter_quality(FilterType::Point);
    context.quality().set_mipmap_quality(MipmapType::Point);
    for sampler in [&a, &b] {
        assert_eq!(sampler.state().texture_filter, FilterType::Point);
        assert_eq!(sampler.state().mipmap_filter, MipmapType::Point);
        assert_eq!(sampler.texture_filter(), FilterType::Linear);
        assert_eq!(sampler.mipmap_filter(), MipmapType::Linear);
    }
    context.quality().set_filter_quality(FilterType::Anisotropic);
    context.quality().set_mipmap_quality(MipmapType::Linear);
    assert_eq!(a.state().texture_filter, FilterType::Linear);
    assert_eq!(b.state().mipmap_filter, MipmapType::Linear);
}

#[test]
fn routine_cache_reuses_equal_states() {
    let context = SamplingContext::default();
    let mut a = context.new_sampler();
    let mut b = context.new_sampler();
    a.set_texture_level(0, 0, Some(solid(4, 4, 0.0)), TextureType::TwoD).unwrap();
    b.set_texture_level(0, 0, Some(solid(4, 4, 1.0)), TextureType::TwoD).unwrap();
    assert_eq!(a.state().key(), b.state().key());
    let _ = (a.snapshot(), b.snapshot());
    assert_eq!(context.routine_cache().len(), 1);
    b.set_texture_filter(FilterType::Point);
    let _ = b.snapshot();
    assert_eq!(context.routine_cache().len(), 2);
}

#[test]
fn parallel_matches_sequential() {
    let storage: Arc<dyn TexelStorage> = Arc::new(
        Surface::new_with::<RGBA32Float>(8, 8, |t| Float4::new(t.x as f32, t.y as f32, (t.x * t.y) as f32, 1.0)).unwrap(),
    );
    let mut sampler = sampler_2d(storage);
    sampler.set_texture_level(0, 1, Some(Arc::new(Surface::new::<RGBA32Float>(4, 4, Float4::splat(0.5)).unwrap())), TextureType::TwoD).unwrap();
    sampler.set_mipmap_filter(MipmapType::Linear);
    let snapshot = sampler.snapshot();

    let requests: Vec<SampleRequest> = (0..64)
        .map(|i| SampleRequest {
            coord: [i as f32 * 0.037 - 0.4, i as f32 * 0.051, 0.0],
            lod: Lod::Explicit((i % 5) as f32 * 0.3),
        })
        .collect();
    let sequential: Vec<Float4> = requests.iter().map(|r| snapshot.sample(r.coord, r.lod)).collect();
    let parallel = test_executors::sleep_on(async {
        snapshot.sample_parallel(requests.clone(), Priority::UserInitiated, Strategy::One).await
    });
    assert_eq!(parallel, sequential);
}
