use super::*;
use crate::{
    chain::nedi,
    foundation::core::{TextureChannels, TextureFormat, TextureSize},
    shader::{builtin, scaler::Scaler},
};

fn desc(w: u32, h: u32) -> TextureDescriptor {
    TextureDescriptor::new(TextureSize::new(w, h), TextureFormat::Float32)
}

fn solid(w: u32, h: u32, p: [f32; 4]) -> Rgba32FImage {
    Rgba32FImage::from_pixel(w, h, Rgba(p))
}

fn run(backend: &mut CpuBackend, source: ShaderSource, inputs: &[&Texture], out: &Texture) {
    let handle = backend.compile(&source).unwrap();
    backend
        .run(handle, inputs, &ArgumentList::new(), out)
        .unwrap();
}

#[test]
fn textures_are_tracked_and_budgeted() {
    let opts = CpuBackendOpts::default().with_max_texture_bytes(Some(256));
    let mut backend = CpuBackend::new(opts);
    let a = backend.create_texture(&desc(2, 2)).unwrap();
    assert_eq!(backend.stats().live_bytes, 64);

    let err = backend.create_texture(&desc(4, 4)).unwrap_err();
    assert!(matches!(err, ChainError::ResourceExhausted(_)));

    backend.destroy_texture(a.clone());
    assert!(!backend.is_live(&a));
    let stats = backend.stats();
    assert_eq!((stats.created, stats.destroyed, stats.live_textures), (1, 1, 0));
}

#[test]
fn unknown_shader_fails_to_compile() {
    let mut backend = CpuBackend::default();
    let err = backend
        .compile(&ShaderSource::new("Missing/Nothing.hlsl"))
        .unwrap_err();
    assert!(
        matches!(err, ChainError::Compilation { ref path, .. } if path == "Missing/Nothing.hlsl")
    );
}

#[test]
fn upload_checks_dimensions() {
    let mut backend = CpuBackend::default();
    let err = backend.upload(desc(2, 2), solid(3, 2, [0.0; 4])).unwrap_err();
    assert!(matches!(err, ChainError::Validation(_)));
    assert_eq!(backend.stats().created, 0);
}

#[test]
fn merge_takes_luma_and_chroma_channels() {
    let mut backend = CpuBackend::default();
    let luma = backend.upload(desc(2, 2), solid(2, 2, [0.5, 9.0, 9.0, 9.0])).unwrap();
    let chroma = backend.upload(desc(2, 2), solid(2, 2, [9.0, 0.25, 0.75, 9.0])).unwrap();
    let out = backend.create_texture(&desc(2, 2)).unwrap();

    run(&mut backend, ShaderSource::new(builtin::MERGE_Y_UV), &[&luma, &chroma], &out);
    assert_eq!(backend.pixel(&out, 1, 1), Some([0.5, 0.25, 0.75, 1.0]));
    assert_eq!(backend.runs_of(builtin::MERGE_Y_UV), 1);
}

#[test]
fn yuv_round_trip_is_close() {
    let mut backend = CpuBackend::default();
    let rgb = backend.upload(desc(1, 1), solid(1, 1, [0.2, 0.6, 0.4, 1.0])).unwrap();
    let yuv = backend.create_texture(&desc(1, 1)).unwrap();
    let back = backend.create_texture(&desc(1, 1)).unwrap();

    run(&mut backend, ShaderSource::new(builtin::RGB_TO_YUV), &[&rgb], &yuv);
    run(&mut backend, ShaderSource::new(builtin::YUV_TO_RGB), &[&yuv], &back);
    let p = backend.pixel(&back, 0, 0).unwrap();
    for (got, want) in p.iter().zip([0.2f32, 0.6, 0.4]) {
        assert!((got - want).abs() < 1e-3, "{got} vs {want}");
    }
}

#[test]
fn horizontal_interleave_alternates_source_and_estimate() {
    let mut backend = CpuBackend::default();
    let src = backend
        .upload(
            desc(2, 1),
            Rgba32FImage::from_fn(2, 1, |x, _| Rgba([x as f32, 0.0, 0.0, 1.0])),
        )
        .unwrap();
    let est = backend.upload(desc(2, 1), solid(2, 1, [0.5, 0.0, 0.0, 1.0])).unwrap();
    let out = backend.create_texture(&desc(4, 1)).unwrap();

    run(&mut backend, ShaderSource::new(nedi::shaders::H_INTERLEAVE), &[&src, &est], &out);
    let row: Vec<f32> = (0..4)
        .map(|x| backend.pixel(&out, x, 0).unwrap()[0])
        .collect();
    assert_eq!(row, [0.0, 0.5, 1.0, 0.5]);
}

#[test]
fn downscale_requires_an_axis() {
    let mut backend = CpuBackend::default();
    let src = backend.upload(desc(4, 1), solid(4, 1, [1.0; 4])).unwrap();
    let out = backend.create_texture(&desc(2, 1)).unwrap();
    let handle = backend
        .compile(&ShaderSource::new("SuperRes/Downscale.hlsl"))
        .unwrap();
    let err = backend
        .run(handle, &[&src], &ArgumentList::new(), &out)
        .unwrap_err();
    assert!(matches!(err, ChainError::Configuration(_)));
    // The output survives a failed run.
    assert!(backend.is_live(&out));
}

#[test]
fn box_downscale_averages_columns() {
    let mut backend = CpuBackend::default();
    let src = backend
        .upload(
            desc(4, 1),
            Rgba32FImage::from_fn(4, 1, |x, _| Rgba([x as f32, 0.0, 0.0, 1.0])),
        )
        .unwrap();
    let out = backend.create_texture(&desc(2, 1)).unwrap();
    run(
        &mut backend,
        ShaderSource::new("SuperRes/Downscale.hlsl").define("axis", 0),
        &[&src],
        &out,
    );
    assert_eq!(backend.pixel(&out, 0, 0).map(|p| p[0]), Some(0.5));
    assert_eq!(backend.pixel(&out, 1, 0).map(|p| p[0]), Some(2.5));
}

#[test]
fn nearest_upscale_replicates_and_masks_channels() {
    let mut backend = CpuBackend::default();
    let src = backend.upload(desc(1, 1), solid(1, 1, [0.3, 0.4, 0.5, 1.0])).unwrap();
    let out = backend.create_texture(&desc(2, 2)).unwrap();
    let params = ResampleParams {
        channels: TextureChannels::ChromaOnly,
        ..ResampleParams::scale(Scaler::Nearest, Scaler::Nearest)
    };
    backend.resample(&src, &out, &params).unwrap();
    assert_eq!(backend.pixel(&out, 1, 1), Some([0.0, 0.4, 0.5, 1.0]));
    assert_eq!(backend.stats().resamples, 1);
}

#[test]
fn bilinear_same_size_is_exact() {
    let mut backend = CpuBackend::default();
    let img = Rgba32FImage::from_fn(3, 2, |x, y| Rgba([x as f32, y as f32, 0.0, 1.0]));
    let src = backend.upload(desc(3, 2), img.clone()).unwrap();
    let out = backend.create_texture(&desc(3, 2)).unwrap();
    backend
        .resample(&src, &out, &ResampleParams::default())
        .unwrap();
    assert_eq!(backend.pixels(&out), Some(&img));
}

#[test]
fn text_fills_the_target_and_is_recorded() {
    let mut backend = CpuBackend::default();
    let out = backend.create_texture(&desc(2, 2)).unwrap();
    backend.render_text("Error: boom", &out).unwrap();
    assert_eq!(backend.messages(), ["Error: boom".to_string()]);
    assert_eq!(backend.pixel(&out, 0, 0), Some(CpuBackendOpts::default().text_rgba));
}

#[test]
fn registered_kernels_resolve_by_path() {
    let mut backend = CpuBackend::default();
    backend.register_kernel("Test/Fill.hlsl", |args, out| {
        let v = args.arguments.get("args0").map(|v| v.0).unwrap_or([0.0; 4]);
        for p in out.pixels_mut() {
            *p = Rgba(v);
        }
        Ok(())
    });
    let out = backend.create_texture(&desc(1, 1)).unwrap();
    let handle = backend.compile(&ShaderSource::new("Test/Fill.hlsl")).unwrap();
    backend
        .run(handle, &[], &ArgumentList::from_floats(&[1.0, 2.0]), &out)
        .unwrap();
    assert_eq!(backend.pixel(&out, 0, 0), Some([1.0, 2.0, 0.0, 0.0]));
}
