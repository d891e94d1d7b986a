//! Reference CPU implementations of the shaders the engine and built-in chains use.
//!
//! They reproduce the data flow of the GPU passes (sizes, channel layout, linear/gamma domains)
//! with simple filters, so graphs can be checked end-to-end without a GPU.

use image::{
    Rgba, Rgba32FImage,
    imageops::{self, FilterType},
};

use crate::{
    chain::{nedi, super_res},
    foundation::{
        core::TextureChannels,
        error::{ChainError, ChainResult},
    },
    shader::{backend::ResampleParams, builtin, scaler::Scaler},
};

use super::cpu::{CpuBackend, KernelArgs};

const GAMMA: f32 = 2.2;

/// Register every built-in kernel on `backend`.
pub(crate) fn register_builtin(backend: &mut CpuBackend) {
    backend.register_kernel(builtin::MERGE_Y_UV, merge_y_uv);
    backend.register_kernel(builtin::YUV_TO_RGB, |a, out| map_pixels(a, out, yuv_to_rgb));
    backend.register_kernel(builtin::RGB_TO_YUV, |a, out| map_pixels(a, out, rgb_to_yuv));
    backend.register_kernel(builtin::GAMMA_TO_LINEAR, |a, out| {
        map_pixels(a, out, |p| map_rgb(p, |c| c.max(0.0).powf(GAMMA)))
    });
    backend.register_kernel(builtin::LINEAR_TO_GAMMA, |a, out| {
        map_pixels(a, out, linear_to_gamma)
    });

    backend.register_kernel(nedi::shaders::NEDI_I, |a, out| {
        let src = input(a, 0)?;
        fill(out, |x, y| mean(at(src, x, y), at(src, x + 1, y)));
        Ok(())
    });
    backend.register_kernel(nedi::shaders::NEDI_II, |a, out| {
        let src = input(a, 0)?;
        fill(out, |x, y| mean(at(src, x, y), at(src, x, y + 1)));
        Ok(())
    });
    backend.register_kernel(nedi::shaders::H_INTERLEAVE, |a, out| {
        let (src, est) = (input(a, 0)?, input(a, 1)?);
        fill(out, |x, y| {
            if x % 2 == 0 {
                at(src, x / 2, y)
            } else {
                at(est, x / 2, y)
            }
        });
        Ok(())
    });
    backend.register_kernel(nedi::shaders::V_INTERLEAVE, |a, out| {
        let (src, est) = (input(a, 0)?, input(a, 1)?);
        fill(out, |x, y| {
            if y % 2 == 0 {
                at(src, x, y / 2)
            } else {
                at(est, x, y / 2)
            }
        });
        Ok(())
    });

    backend.register_kernel(super_res::shaders::DOWNSCALE, |a, out| {
        let src = input(a, 0)?;
        let axis = axis(a)?;
        let dims = out_dims(out);
        fill(out, |x, y| box_sample(src, dims, axis, x, y));
        Ok(())
    });
    backend.register_kernel(super_res::shaders::DOWNSCALE_AND_DIFF, |a, out| {
        let (src, original) = (input(a, 0)?, input(a, 1)?);
        let axis = axis(a)?;
        let dims = out_dims(out);
        fill(out, |x, y| {
            diff(box_sample(src, dims, axis, x, y), at(original, x, y))
        });
        Ok(())
    });
    backend.register_kernel(super_res::shaders::DIFF, |a, out| {
        let (low, original) = (input(a, 0)?, input(a, 1)?);
        fill(out, |x, y| diff(at(low, x, y), at(original, x, y)));
        Ok(())
    });
    backend.register_kernel(super_res::shaders::SUPER_RES, super_res_pass);
}

fn input<'a>(args: &KernelArgs<'a>, i: usize) -> ChainResult<&'a Rgba32FImage> {
    args.inputs.get(i).copied().ok_or_else(|| {
        ChainError::validation(format!(
            "{} expects at least {} inputs, got {}",
            args.source.path,
            i + 1,
            args.inputs.len()
        ))
    })
}

fn axis(args: &KernelArgs<'_>) -> ChainResult<u8> {
    match args.source.define_value("axis") {
        Some("0") => Ok(0),
        Some("1") => Ok(1),
        other => Err(ChainError::configuration(format!(
            "{} needs define axis = 0 or 1, got {other:?}",
            args.source.path
        ))),
    }
}

fn out_dims(out: &Rgba32FImage) -> (u32, u32) {
    (out.width(), out.height())
}

/// Pixel at `(x, y)` with coordinates clamped to the image.
fn at(img: &Rgba32FImage, x: u32, y: u32) -> [f32; 4] {
    let x = x.min(img.width().saturating_sub(1));
    let y = y.min(img.height().saturating_sub(1));
    img.get_pixel(x, y).0
}

fn fill(out: &mut Rgba32FImage, f: impl Fn(u32, u32) -> [f32; 4]) {
    for (x, y, p) in out.enumerate_pixels_mut() {
        *p = Rgba(f(x, y));
    }
}

fn map_pixels(
    args: &KernelArgs<'_>,
    out: &mut Rgba32FImage,
    f: impl Fn([f32; 4]) -> [f32; 4],
) -> ChainResult<()> {
    let src = input(args, 0)?;
    fill(out, |x, y| f(at(src, x, y)));
    Ok(())
}

fn map_rgb(p: [f32; 4], f: impl Fn(f32) -> f32) -> [f32; 4] {
    [f(p[0]), f(p[1]), f(p[2]), p[3]]
}

fn linear_to_gamma(p: [f32; 4]) -> [f32; 4] {
    map_rgb(p, |c| c.max(0.0).powf(1.0 / GAMMA))
}

fn mean(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [0, 1, 2, 3].map(|i| 0.5 * (a[i] + b[i]))
}

fn diff(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2], 1.0]
}

fn yuv_to_rgb(p: [f32; 4]) -> [f32; 4] {
    let (y, u, v) = (p[0], p[1] - 0.5, p[2] - 0.5);
    [
        y + 1.5748 * v,
        y - 0.1873 * u - 0.4681 * v,
        y + 1.8556 * u,
        1.0,
    ]
}

fn rgb_to_yuv(p: [f32; 4]) -> [f32; 4] {
    let y = 0.2126 * p[0] + 0.7152 * p[1] + 0.0722 * p[2];
    [y, (p[2] - y) / 1.8556 + 0.5, (p[0] - y) / 1.5748 + 0.5, 1.0]
}

fn merge_y_uv(args: &KernelArgs<'_>, out: &mut Rgba32FImage) -> ChainResult<()> {
    let (luma, chroma) = (input(args, 0)?, input(args, 1)?);
    fill(out, |x, y| {
        let (l, c) = (at(luma, x, y), at(chroma, x, y));
        [l[0], c[1], c[2], 1.0]
    });
    Ok(())
}

/// Average of the input texels covered by output texel `(x, y)` along `axis`.
fn box_sample(
    src: &Rgba32FImage,
    (out_w, out_h): (u32, u32),
    axis: u8,
    x: u32,
    y: u32,
) -> [f32; 4] {
    let (len_in, len_out, pos) = if axis == 0 {
        (src.width(), out_w, x)
    } else {
        (src.height(), out_h, y)
    };
    let (pos, len_in, len_out) = (u64::from(pos), u64::from(len_in), u64::from(len_out.max(1)));
    let lo = (pos * len_in / len_out) as u32;
    let hi = ((pos + 1) * len_in).div_ceil(len_out) as u32;
    let hi = hi.max(lo + 1);

    let mut acc = [0.0f32; 4];
    for i in lo..hi {
        let p = if axis == 0 { at(src, i, y) } else { at(src, x, i) };
        for (a, c) in acc.iter_mut().zip(p) {
            *a += c;
        }
    }
    let n = (hi - lo) as f32;
    acc.map(|c| c / n)
}

fn super_res_pass(args: &KernelArgs<'_>, out: &mut Rgba32FImage) -> ChainResult<()> {
    let (estimate, residual) = (input(args, 0)?, input(args, 1)?);
    let strength = args
        .arguments
        .get("args0")
        .map(|v| v.0[0])
        .unwrap_or(1.0);
    let final_pass = args.source.define_value("FinalPass") == Some("1");
    let (w, h) = out_dims(out);
    fill(out, |x, y| {
        let r = bilinear(
            residual,
            map_coord(x, w, residual.width()),
            map_coord(y, h, residual.height()),
        );
        let e = at(estimate, x, y);
        let p = [
            e[0] - strength * r[0],
            e[1] - strength * r[1],
            e[2] - strength * r[2],
            e[3],
        ];
        if final_pass { linear_to_gamma(p) } else { p }
    });
    Ok(())
}

/// Input coordinate of the center of output texel `i`, pixel-center aligned.
fn map_coord(i: u32, len_out: u32, len_in: u32) -> f32 {
    (i as f32 + 0.5) * len_in as f32 / len_out.max(1) as f32 - 0.5
}

/// Input coordinate of output texel `i` with the first and last texels aligned.
fn map_coord_corners(i: u32, len_out: u32, len_in: u32) -> f32 {
    if len_out <= 1 {
        return 0.0;
    }
    i as f32 * (len_in.saturating_sub(1)) as f32 / (len_out - 1) as f32
}

fn bilinear(img: &Rgba32FImage, fx: f32, fy: f32) -> [f32; 4] {
    let max_x = img.width().saturating_sub(1) as f32;
    let max_y = img.height().saturating_sub(1) as f32;
    let fx = fx.clamp(0.0, max_x);
    let fy = fy.clamp(0.0, max_y);
    let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
    let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);
    let p00 = at(img, x0, y0);
    let p10 = at(img, x0 + 1, y0);
    let p01 = at(img, x0, y0 + 1);
    let p11 = at(img, x0 + 1, y0 + 1);
    [0, 1, 2, 3].map(|c| {
        let top = p00[c] + (p10[c] - p00[c]) * tx;
        let bottom = p01[c] + (p11[c] - p01[c]) * tx;
        top + (bottom - top) * ty
    })
}

fn nearest(img: &Rgba32FImage, fx: f32, fy: f32) -> [f32; 4] {
    at(img, fx.round().max(0.0) as u32, fy.round().max(0.0) as u32)
}

fn pick_scaler(input: &Rgba32FImage, out: &Rgba32FImage, params: &ResampleParams) -> Scaler {
    let same = input.dimensions() == out.dimensions();
    let larger = out.width() > input.width() || out.height() > input.height();
    let chosen = if same {
        params.convolver
    } else if larger {
        params.upscaler
    } else {
        params.downscaler
    };
    chosen.unwrap_or(Scaler::Bilinear)
}

/// Resample `input` into `out` following `params`.
pub(crate) fn resample(input: &Rgba32FImage, out: &mut Rgba32FImage, params: &ResampleParams) {
    let (w, h) = out.dimensions();
    let scaler = pick_scaler(input, out, params);
    let filtered = match scaler {
        Scaler::Bicubic { .. } => Some(imageops::resize(input, w, h, FilterType::CatmullRom)),
        Scaler::Lanczos { .. } => Some(imageops::resize(input, w, h, FilterType::Lanczos3)),
        Scaler::Nearest | Scaler::Bilinear => None,
    };

    let (ox, oy) = (params.offset.x as f32, params.offset.y as f32);
    let coord = |i: u32, len_out: u32, len_in: u32| {
        if params.offset_correction {
            map_coord_corners(i, len_out, len_in)
        } else {
            map_coord(i, len_out, len_in)
        }
    };

    fill(out, |x, y| {
        let p = match &filtered {
            Some(img) => at(img, x, y),
            None => {
                let fx = coord(x, w, input.width()) + ox;
                let fy = coord(y, h, input.height()) + oy;
                if scaler == Scaler::Nearest {
                    nearest(input, fx, fy)
                } else {
                    bilinear(input, fx, fy)
                }
            }
        };
        match params.channels {
            TextureChannels::All => p,
            TextureChannels::LumaOnly => [p[0], 0.0, 0.0, 1.0],
            TextureChannels::ChromaOnly => [0.0, p[1], p[2], 1.0],
        }
    });
}
