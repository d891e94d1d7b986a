use super::*;
use crate::{
    filter::eval::evaluate,
    test_support::{MockBackend, host_source},
    texture::pool::TexturePool,
};

fn size(w: u32, h: u32) -> TextureSize {
    TextureSize::new(w, h)
}

#[test]
fn untagged_same_size_resize_passes_input_through() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let host = backend.host_texture(4, 4);
    let src = std::rc::Rc::new(crate::texture::managed::ManagedTexture::host(host.clone()))
        .to_filter();
    let noop = Filter::new(ResizeFilter::new(src, size(4, 4), ResizeOptions::default()));

    let (out, stats) = evaluate(&noop, &mut backend, &pool).unwrap();
    assert_eq!(out.id(), host.id());
    assert_eq!(stats.passes, 0);
    assert_eq!(backend.count("resample"), 0);
}

#[test]
fn tagged_same_size_resize_runs() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let src = host_source(&mut backend, 4, 4);
    let resize = ResizeFilter::new(src, size(4, 4), ResizeOptions::default());
    resize.enable_tag();

    let (_out, stats) = evaluate(&Filter::new(resize), &mut backend, &pool).unwrap();
    assert_eq!(stats.passes, 1);
    assert_eq!(backend.count("resample 4x4 -> 4x4"), 1);
}

#[test]
fn format_change_is_not_a_noop() {
    let mut backend = MockBackend::new();
    let src = host_source(&mut backend, 4, 4);
    let resize = ResizeFilter::new(
        src,
        size(4, 4),
        ResizeOptions {
            format: Some(TextureFormat::Float32),
            ..ResizeOptions::default()
        },
    );
    assert!(!resize.is_noop());
    assert_eq!(resize.output().format, TextureFormat::Float32);
}

#[test]
fn output_format_defaults_to_input_format() {
    let mut backend = MockBackend::new();
    let src = host_source(&mut backend, 4, 4);
    let up = src.resize(size(8, 8), ResizeOptions::default());
    assert_eq!(up.format(), TextureFormat::Unorm8);
    assert_eq!(up.size(), size(8, 8));
}

#[test]
fn convolve_keeps_size_and_always_runs() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let src = host_source(&mut backend, 4, 4);
    let sharp = src.convolve(Scaler::bicubic());
    assert_eq!(sharp.size(), size(4, 4));
    assert!(sharp.set_size(size(4, 4), false).same_node(&sharp));

    let (_out, stats) = evaluate(&sharp, &mut backend, &pool).unwrap();
    assert_eq!(stats.passes, 1);
}

#[test]
fn rederived_resize_keeps_options() {
    let mut backend = MockBackend::new();
    let src = host_source(&mut backend, 4, 4);
    let options = ResizeOptions {
        channels: TextureChannels::ChromaOnly,
        offset: Vec2::new(0.25, 0.0),
        ..ResizeOptions::scalers(Scaler::Nearest, Scaler::Bilinear)
    };
    let up = ResizeFilter::new(src, size(8, 8), options.clone());
    let bigger = up.set_size(size(12, 12));
    assert_eq!(bigger.size(), size(12, 12));
    assert!(bigger.node().describe().contains("ChromaOnly"));

    let corrected = ResizeFilter::new(bigger.inputs()[0].clone(), size(8, 8), options);
    assert_eq!(corrected.params().offset, Vec2::new(0.25, 0.0));
    assert_eq!(corrected.params().upscaler, Some(Scaler::Nearest));
}

#[test]
fn offset_correction_reaches_the_backend_params() {
    let mut backend = MockBackend::new();
    let src = host_source(&mut backend, 4, 4);
    let up = ResizeFilter::new(src, size(8, 8), ResizeOptions::default());
    assert!(!up.params().offset_correction);
    let corrected = up.force_offset_correction();
    assert!(!corrected.same_node(&Filter::new(up)));
    assert_eq!(corrected.size(), size(8, 8));
}

#[test]
fn offset_makes_same_size_resize_significant() {
    let mut backend = MockBackend::new();
    let src = host_source(&mut backend, 4, 4);
    let shifted = ResizeFilter::new(
        src.clone(),
        size(8, 8),
        ResizeOptions {
            offset: Vec2::new(0.5, 0.5),
            ..ResizeOptions::default()
        },
    );
    let back = shifted.set_size(size(4, 4));
    assert!(!back.same_node(&src));
}

#[test]
fn channel_masked_same_size_resize_still_runs() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let src = host_source(&mut backend, 4, 4);
    let chroma_only = ResizeOptions {
        channels: TextureChannels::ChromaOnly,
        ..ResizeOptions::default()
    };
    let masked = ResizeFilter::new(src.clone(), size(4, 4), chroma_only.clone());
    assert!(!masked.is_noop());

    let (_out, stats) = evaluate(&Filter::new(masked), &mut backend, &pool).unwrap();
    assert_eq!(stats.passes, 1);
    assert_eq!(backend.count("resample 4x4 -> 4x4"), 1);

    let up = ResizeFilter::new(src.clone(), size(8, 8), chroma_only);
    assert!(!up.set_size(size(4, 4)).same_node(&src));
}
