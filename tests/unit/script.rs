use super::*;
use crate::{
    chain::{Identity, combinators::StaticChain, config::ChainConfig, nedi::Nedi},
    filter::text::TextFilter,
    foundation::core::TextureSize,
    shader::program::ShaderConfig,
    test_support::MockBackend,
};

fn size(w: u32, h: u32) -> TextureSize {
    TextureSize::new(w, h)
}

fn rgb_frame(backend: &mut MockBackend, source: TextureSize, target: TextureSize) -> HostFrame {
    HostFrame {
        source: backend.host_texture(source.width, source.height),
        chroma: None,
        output: backend.host_texture(target.width, target.height),
        params: FrameParams::rgb(source, target),
    }
}

fn two_steps() -> StaticChain<impl Fn(&mut ChainContext<'_>, Filter) -> ChainResult<Filter>> {
    StaticChain::new(|ctx: &mut ChainContext<'_>, input: Filter| {
        let step = ctx.compile(ShaderConfig::file("Test/Step.hlsl"))?;
        Ok(input.apply(&step).apply(&step))
    })
}

#[test]
fn identity_frame_is_blitted_into_the_output() {
    let mut backend = MockBackend::new();
    let frame = rgb_frame(&mut backend, size(4, 4), size(4, 4));
    let mut script = RenderChainScript::new(Identity);

    let stats = script.execute(&mut backend, &frame).unwrap();
    assert!(stats.final_blit);
    assert!(!stats.error_substituted);
    assert_eq!(stats.eval.passes, 0);
    assert_eq!(backend.count("resample 4x4 -> 4x4"), 1);
    assert_eq!(script.frames(), 1);
}

#[test]
fn nedi_doubles_a_small_frame() {
    let mut backend = MockBackend::new();
    let frame = rgb_frame(&mut backend, size(2, 2), size(4, 4));
    let nedi = Nedi {
        centered: false,
        ..Nedi::default()
    };
    let mut script = RenderChainScript::new(ChainConfig::Nedi(nedi));

    let stats = script.execute(&mut backend, &frame).unwrap();
    assert_eq!(stats.eval.passes, 4);
    assert_eq!(backend.count("run Nedi/NEDI-VInterleave.hlsl -> 4x4"), 1);
    assert_eq!(backend.count("resample 4x4 -> 4x4"), 1);
    assert_eq!(stats.pool.rented_textures, 0);
}

#[test]
fn compile_failure_renders_the_error_into_the_target() {
    let mut backend = MockBackend::failing_compile("Nedi/NEDI-I.hlsl");
    let frame = rgb_frame(&mut backend, size(2, 2), size(4, 4));
    let mut script = RenderChainScript::new(ChainConfig::Nedi(Nedi::default()));

    let stats = script.execute(&mut backend, &frame).unwrap();
    assert!(stats.error_substituted);
    assert_eq!(
        backend.count("text Error: shader compilation failed for 'Nedi/NEDI-I.hlsl'"),
        1
    );
    // The message is rendered straight into the lent output target.
    assert!(!stats.final_blit);
    assert_eq!(backend.created, 0);
    assert_eq!(backend.destroyed, 0);
}

#[test]
fn evaluation_failure_is_substituted_once() {
    let mut backend = MockBackend::new();
    let frame = rgb_frame(&mut backend, size(4, 4), size(4, 4));
    let chain = StaticChain::new(|ctx: &mut ChainContext<'_>, input: Filter| {
        let broken = TextFilter::new("never drawn", size(0, 0)).into_filter();
        let blend = ctx.compile(ShaderConfig::file("Test/Blend.hlsl"))?;
        Ok(blend.apply(&input, &[broken]))
    });
    let mut script = RenderChainScript::new(chain);

    let stats = script.execute(&mut backend, &frame).unwrap();
    assert!(stats.error_substituted);
    assert_eq!(backend.count("text Error: validation error"), 1);
    assert_eq!(backend.count("text never drawn"), 0);
}

#[test]
fn empty_target_is_an_error() {
    let mut backend = MockBackend::new();
    let mut frame = rgb_frame(&mut backend, size(4, 4), size(4, 4));
    frame.params.target_size = size(0, 4);
    let mut script = RenderChainScript::new(Identity);

    let err = script.execute(&mut backend, &frame).unwrap_err();
    assert!(matches!(err, ChainError::Validation(_)));
}

#[test]
fn pool_is_flushed_when_the_frame_fails() {
    let mut backend = MockBackend::new();
    let frame = rgb_frame(&mut backend, size(4, 4), size(4, 4));
    let mut script = RenderChainScript::new(two_steps());
    backend.max_live = Some(3);

    let err = script.execute(&mut backend, &frame).unwrap_err();
    assert!(matches!(err, ChainError::ResourceExhausted(_)));
    let stats = script.pool().stats();
    assert_eq!(stats.rented_textures, 0);
    // The first step's texture is idle; the host target has been forgotten.
    assert_eq!(stats.idle_textures, 1);
    assert_eq!(backend.destroyed, 0);
}

#[test]
fn textures_are_reused_across_frames() {
    let mut backend = MockBackend::new();
    let frame = rgb_frame(&mut backend, size(4, 4), size(4, 4));
    let mut script = RenderChainScript::new(two_steps());

    script.execute(&mut backend, &frame).unwrap();
    let created = backend.created;
    let stats = script.execute(&mut backend, &frame).unwrap();
    assert_eq!(backend.created, created);
    assert!(stats.pool.reused >= 2);
    assert_eq!(script.frames(), 2);
}

#[test]
fn descriptor_reports_planar_input_after_a_yuv_frame() {
    let mut backend = MockBackend::new();
    let mut script = RenderChainScript::new(Identity);
    let params = FrameParams::yuv420(size(4, 4), size(4, 4));

    let before = script.descriptor(&params);
    assert!(!before.want_yuv);
    assert_eq!(before.prescale_size, size(4, 4));

    let frame = HostFrame {
        source: backend.host_texture(4, 4),
        chroma: Some(backend.host_texture(2, 2)),
        output: backend.host_texture(4, 4),
        params: params.clone(),
    };
    let stats = script.execute(&mut backend, &frame).unwrap();
    assert_eq!(stats.eval.passes, 3);
    assert!(script.descriptor(&params).want_yuv);
}

#[test]
fn packed_yuv_is_converted_to_rgb() {
    let mut backend = MockBackend::new();
    let mut frame = rgb_frame(&mut backend, size(4, 4), size(4, 4));
    frame.params.input_is_yuv = true;
    let mut script = RenderChainScript::new(Identity);

    script.execute(&mut backend, &frame).unwrap();
    assert_eq!(backend.runs_of(builtin::YUV_TO_RGB), 1);
    assert!(!script.descriptor(&frame.params).want_yuv);
}

#[test]
fn teardown_releases_pool_and_shaders() {
    let mut backend = MockBackend::new();
    let frame = rgb_frame(&mut backend, size(4, 4), size(4, 4));
    let mut script = RenderChainScript::new(two_steps());
    script.execute(&mut backend, &frame).unwrap();
    assert!(!script.shaders().is_empty());

    script.teardown(&mut backend);
    assert_eq!(script.pool().stats().idle_textures, 0);
    assert!(script.shaders().is_empty());
    assert_eq!(backend.destroyed, backend.created);
}
