use image::{DynamicImage, ImageFormat, Rgba, Rgba32FImage};
use renderchain::{
    ChainConfig, CpuBackend, FrameParams, HostFrame, Nedi, RenderChainScript, SuperRes,
    TextureDescriptor, TextureFormat, TextureSize,
};

fn parse_chain() -> anyhow::Result<ChainConfig> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("nedi") | None => Ok(ChainConfig::Nedi(Nedi::default())),
        Some("superres") => Ok(ChainConfig::SuperRes(SuperRes::default())),
        Some("identity") => Ok(ChainConfig::Identity),
        Some(path) if path.ends_with(".json") => {
            Ok(ChainConfig::from_json_str(&std::fs::read_to_string(path)?)?)
        }
        Some(other) => anyhow::bail!(
            "unknown chain '{other}', expected nedi, superres, identity or a .json file"
        ),
    }
}

fn checkerboard(size: TextureSize) -> Rgba32FImage {
    Rgba32FImage::from_fn(size.width, size.height, |x, y| {
        let on = ((x / 8) + (y / 8)) % 2 == 0;
        let fx = x as f32 / size.width as f32;
        let fy = y as f32 / size.height as f32;
        if on {
            Rgba([0.9, 0.85 * fx, 0.3 + 0.5 * fy, 1.0])
        } else {
            Rgba([0.1, 0.2 * fy, 0.15, 1.0])
        }
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let chain = parse_chain()?;
    let source_size = TextureSize::new(128, 96);
    let target_size = TextureSize::new(256, 192);

    let mut backend = CpuBackend::default();
    let source = backend.upload(
        TextureDescriptor::new(source_size, TextureFormat::Unorm8),
        checkerboard(source_size),
    )?;
    let output = backend.upload(
        TextureDescriptor::new(target_size, TextureFormat::Unorm8),
        Rgba32FImage::new(target_size.width, target_size.height),
    )?;
    let frame = HostFrame {
        source,
        chroma: None,
        output,
        params: FrameParams::rgb(source_size, target_size),
    };

    let mut script = RenderChainScript::new(chain);
    let stats = script.execute(&mut backend, &frame)?;
    eprintln!(
        "{} passes, {} memo hits, error substituted: {}",
        stats.eval.passes, stats.eval.memo_hits, stats.error_substituted
    );

    let Some(pixels) = backend.pixels(&frame.output) else {
        anyhow::bail!("output texture was destroyed");
    };
    let out_path = std::path::Path::new("target").join("render_one_frame.png");
    DynamicImage::ImageRgba32F(pixels.clone())
        .to_rgba8()
        .save_with_format(&out_path, ImageFormat::Png)?;

    script.teardown(&mut backend);
    eprintln!("wrote {}", out_path.display());
    Ok(())
}
