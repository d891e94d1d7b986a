use super::*;
use crate::{
    chain::context::FrameParams,
    filter::eval::evaluate,
    foundation::core::TextureSize,
    shader::cache::ShaderCache,
    test_support::{MockBackend, host_source},
    texture::pool::TexturePool,
};

fn size(w: u32, h: u32) -> TextureSize {
    TextureSize::new(w, h)
}

#[test]
fn resamples_straight_to_the_target() {
    let mut backend = MockBackend::new();
    let mut cache = ShaderCache::new();
    let pool = TexturePool::new();
    let params = FrameParams::rgb(size(4, 4), size(8, 6));
    let src = host_source(&mut backend, 4, 4);
    let out = {
        let mut ctx = ChainContext::new(&params, &mut cache, &mut backend);
        Scale::default().create_filter(&mut ctx, src).unwrap()
    };

    assert_eq!(out.size(), size(8, 6));
    let (_tex, stats) = evaluate(&out, &mut backend, &pool).unwrap();
    assert_eq!(stats.passes, 1);
    assert_eq!(backend.count("resample 4x4 -> 8x6"), 1);
}

#[test]
fn same_size_input_passes_through() {
    let mut backend = MockBackend::new();
    let mut cache = ShaderCache::new();
    let params = FrameParams::rgb(size(4, 4), size(4, 4));
    let src = host_source(&mut backend, 4, 4);
    let mut ctx = ChainContext::new(&params, &mut cache, &mut backend);

    let out = Scale::default().create_filter(&mut ctx, src.clone()).unwrap();
    assert!(out.same_node(&src));
}
