use super::*;
use crate::{
    chain::context::FrameParams,
    filter::eval::evaluate,
    shader::cache::ShaderCache,
    test_support::{MockBackend, host_source},
    texture::pool::TexturePool,
};

fn size(w: u32, h: u32) -> TextureSize {
    TextureSize::new(w, h)
}

fn build(
    nedi: &Nedi,
    backend: &mut MockBackend,
    source: TextureSize,
    target: TextureSize,
) -> Filter {
    let mut cache = ShaderCache::new();
    let params = FrameParams::rgb(source, target);
    let src = host_source(backend, source.width, source.height);
    let mut ctx = ChainContext::new(&params, &mut cache, backend);
    nedi.create_filter(&mut ctx, src).unwrap()
}

#[test]
fn doubling_sizes_follow_centering() {
    let centered = Nedi::default();
    assert_eq!(centered.double_width(size(2, 5)), size(3, 5));
    assert_eq!(centered.double_height(size(2, 5)), size(2, 9));

    let plain = Nedi {
        centered: false,
        ..Nedi::default()
    };
    assert_eq!(plain.double_width(size(2, 5)), size(4, 5));
    assert_eq!(plain.double_height(size(2, 5)), size(2, 10));
}

#[test]
fn upscaling_builds_the_four_pass_graph() {
    let mut backend = MockBackend::new();
    let nedi = Nedi {
        centered: false,
        ..Nedi::default()
    };
    let out = build(&nedi, &mut backend, size(2, 2), size(4, 4));
    assert_eq!(out.size(), size(4, 4));

    let pool = TexturePool::new();
    let (_tex, stats) = evaluate(&out, &mut backend, &pool).unwrap();
    assert_eq!(stats.passes, 4);
    assert_eq!(backend.count("run Nedi/NEDI-I.hlsl -> 2x2"), 1);
    assert_eq!(backend.count("run Nedi/NEDI-HInterleave.hlsl -> 4x2"), 1);
    assert_eq!(backend.count("run Nedi/NEDI-II.hlsl -> 4x2"), 1);
    assert_eq!(backend.count("run Nedi/NEDI-VInterleave.hlsl -> 4x4"), 1);
    // The horizontal result feeds both the second pass and the final interleave.
    assert_eq!(stats.memo_hits, 2);
}

#[test]
fn centered_output_is_one_short_of_double() {
    let mut backend = MockBackend::new();
    let out = build(&Nedi::default(), &mut backend, size(2, 2), size(4, 4));
    assert_eq!(out.size(), size(3, 3));
}

#[test]
fn no_upscale_passes_through_after_compiling() {
    let mut backend = MockBackend::new();
    let mut cache = ShaderCache::new();
    let params = FrameParams::rgb(size(4, 4), size(4, 4));
    let src = host_source(&mut backend, 4, 4);
    let out = {
        let mut ctx = ChainContext::new(&params, &mut cache, &mut backend);
        Nedi::default().create_filter(&mut ctx, src.clone()).unwrap()
    };
    assert!(out.same_node(&src));
    assert_eq!(backend.programs.len(), 4);
}

#[test]
fn always_double_ignores_the_target() {
    let mut backend = MockBackend::new();
    let nedi = Nedi {
        always_double_image: true,
        centered: false,
    };
    let out = build(&nedi, &mut backend, size(4, 4), size(2, 2));
    assert_eq!(out.size(), size(8, 8));
}

#[test]
fn passes_receive_luma_weights() {
    let mut backend = MockBackend::new();
    let out = build(&Nedi::default(), &mut backend, size(2, 2), size(4, 4));
    let pool = TexturePool::new();
    evaluate(&out, &mut backend, &pool).unwrap();
    let args = &backend.last_arguments[shaders::NEDI_I];
    assert_eq!(
        args.get("args0").map(|v| v.0),
        Some([0.2126, 0.7152, 0.0722, 0.0])
    );
}

#[test]
fn settings_round_trip_through_json() {
    let nedi: Nedi = serde_json::from_str(r#"{"centered": false}"#).unwrap();
    assert!(!nedi.centered);
    assert!(!nedi.always_double_image);
    let json = serde_json::to_string(&nedi).unwrap();
    assert_eq!(serde_json::from_str::<Nedi>(&json).unwrap(), nedi);
}

#[test]
fn doubling_saturates_huge_dimensions() {
    let big = size(u32::MAX / 2 + 1, 1);
    assert_eq!(Nedi::default().double_width(big).width, u32::MAX - 1);
    let plain = Nedi {
        centered: false,
        ..Nedi::default()
    };
    assert_eq!(plain.double_width(big).width, u32::MAX);
}
