use super::*;
use crate::{
    foundation::error::ChainError,
    shader::program::ShaderConfig,
    test_support::{MockBackend, compile, host_source},
};

#[test]
fn shared_node_is_computed_once() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let shared = compile(&mut backend, ShaderConfig::file("Test/Shared.hlsl"));
    let left = compile(&mut backend, ShaderConfig::file("Test/Left.hlsl"));
    let right = compile(&mut backend, ShaderConfig::file("Test/Right.hlsl"));
    let blend = compile(&mut backend, ShaderConfig::file("Test/Blend.hlsl"));

    let src = host_source(&mut backend, 4, 4);
    let a = src.apply(&shared);
    let root = blend.apply(&a.apply(&left), &[a.apply(&right)]);

    let (_out, stats) = evaluate(&root, &mut backend, &pool).unwrap();
    assert_eq!(backend.runs_of("Test/Shared.hlsl"), 1);
    assert_eq!(backend.runs_of("Test/Blend.hlsl"), 1);
    assert_eq!(stats.nodes_computed, 5);
    assert_eq!(stats.passes, 4);
    assert_eq!(stats.memo_hits, 1);
}

#[test]
fn same_input_twice_is_pulled_once() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let blend = compile(&mut backend, ShaderConfig::file("Test/Blend.hlsl"));
    let pre = compile(&mut backend, ShaderConfig::file("Test/Pre.hlsl"));
    let a = host_source(&mut backend, 4, 4).apply(&pre);

    let root = blend.apply(&a, &[a.clone()]);
    let (_out, stats) = evaluate(&root, &mut backend, &pool).unwrap();
    assert_eq!(backend.runs_of("Test/Pre.hlsl"), 1);
    assert_eq!(stats.memo_hits, 1);
}

#[test]
fn intermediates_are_released_as_soon_as_consumed() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let step = compile(&mut backend, ShaderConfig::file("Test/Step.hlsl"));
    let root = host_source(&mut backend, 4, 4)
        .apply(&step)
        .apply(&step)
        .apply(&step);

    let (out, _) = evaluate(&root, &mut backend, &pool).unwrap();
    assert_eq!(backend.runs_of("Test/Step.hlsl"), 3);
    assert_eq!(backend.created, 2);
    assert_eq!(pool.stats().reused, 1);
    assert_eq!(pool.stats().rented_textures, 1);

    drop(out);
    assert_eq!(pool.stats().rented_textures, 0);
    assert_eq!(pool.stats().idle_textures, 2);
}

#[test]
fn source_evaluates_to_host_texture_without_passes() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let host = backend.host_texture(4, 4);
    let src = std::rc::Rc::new(crate::texture::managed::ManagedTexture::host(host.clone()))
        .to_filter();

    let (out, stats) = evaluate(&src, &mut backend, &pool).unwrap();
    assert_eq!(out.id(), host.id());
    assert_eq!(stats.passes, 0);
    assert_eq!(backend.created, 0);
}

#[test]
fn failed_evaluation_returns_every_lease() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let step = compile(&mut backend, ShaderConfig::file("Test/Step.hlsl"));
    let root = host_source(&mut backend, 4, 4).apply(&step).apply(&step);
    backend.max_live = Some(2);

    let err = evaluate(&root, &mut backend, &pool).unwrap_err();
    assert!(matches!(err, ChainError::ResourceExhausted(_)));
    assert_eq!(pool.stats().rented_textures, 0);
    assert_eq!(pool.stats().idle_textures, 1);
}

#[test]
fn shader_receives_configured_arguments() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let shader = compile(
        &mut backend,
        ShaderConfig::file("Test/Args.hlsl").arguments([0.5f32, 2.0].into()),
    );
    let root = host_source(&mut backend, 2, 2).apply(&shader);
    evaluate(&root, &mut backend, &pool).unwrap();

    let args = &backend.last_arguments["Test/Args.hlsl"];
    assert_eq!(args.get("args0").map(|v| v.0), Some([0.5, 2.0, 0.0, 0.0]));
}
