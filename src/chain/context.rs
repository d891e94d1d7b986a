use crate::{
    foundation::{
        core::{TextureFormat, TextureSize, Vec2},
        error::ChainResult,
    },
    shader::{
        backend::ShaderBackend,
        cache::ShaderCache,
        program::{Shader, ShaderConfig},
        scaler::Scaler,
    },
};

/// Per-frame parameters supplied by the host.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameParams {
    /// Size of the output target.
    pub target_size: TextureSize,
    /// Format of the output target.
    pub target_format: TextureFormat,
    /// Size of the luma plane (or of the whole frame for packed input).
    pub luma_size: TextureSize,
    /// Size of the chroma plane.
    pub chroma_size: TextureSize,
    /// Whether the source holds YUV rather than RGB data.
    pub input_is_yuv: bool,
    /// Chroma siting correction in chroma texels.
    pub chroma_offset: Vec2,
    /// Kernel for enlarging luma / RGB data.
    pub luma_upscaler: Scaler,
    /// Kernel for shrinking luma / RGB data.
    pub luma_downscaler: Scaler,
    /// Kernel for enlarging chroma.
    pub chroma_upscaler: Scaler,
    /// Kernel for shrinking chroma.
    pub chroma_downscaler: Scaler,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            target_size: TextureSize::default(),
            target_format: TextureFormat::Unorm8,
            luma_size: TextureSize::default(),
            chroma_size: TextureSize::default(),
            input_is_yuv: false,
            chroma_offset: Vec2::ZERO,
            luma_upscaler: Scaler::bicubic(),
            luma_downscaler: Scaler::Bilinear,
            chroma_upscaler: Scaler::Bilinear,
            chroma_downscaler: Scaler::Bilinear,
        }
    }
}

impl FrameParams {
    /// Parameters for an RGB source of `source` pixels shown at `target`.
    pub fn rgb(source: TextureSize, target: TextureSize) -> Self {
        Self {
            target_size: target,
            luma_size: source,
            chroma_size: source,
            ..Self::default()
        }
    }

    /// Parameters for planar 4:2:0 YUV with luma of `luma` pixels shown at `target`.
    pub fn yuv420(luma: TextureSize, target: TextureSize) -> Self {
        Self {
            target_size: target,
            luma_size: luma,
            chroma_size: TextureSize::new(luma.width.div_ceil(2), luma.height.div_ceil(2)),
            input_is_yuv: true,
            ..Self::default()
        }
    }

    /// `true` when chroma is stored at a lower resolution than luma.
    pub fn is_chroma_subsampled(&self) -> bool {
        self.input_is_yuv && self.chroma_size.any_lt(self.luma_size)
    }
}

/// Everything a chain needs while building its graph: frame parameters, compiled shaders and the
/// backend to compile them with.
pub struct ChainContext<'a> {
    params: &'a FrameParams,
    shaders: &'a mut ShaderCache,
    backend: &'a mut dyn ShaderBackend,
}

impl<'a> ChainContext<'a> {
    /// Bundle the per-frame collaborators.
    pub fn new(
        params: &'a FrameParams,
        shaders: &'a mut ShaderCache,
        backend: &'a mut dyn ShaderBackend,
    ) -> Self {
        Self {
            params,
            shaders,
            backend,
        }
    }

    /// Frame parameters.
    pub fn params(&self) -> &'a FrameParams {
        self.params
    }

    /// Output target size.
    pub fn target_size(&self) -> TextureSize {
        self.params.target_size
    }

    /// Compile `config`, reusing an earlier compilation of the same source.
    pub fn compile(&mut self, config: ShaderConfig) -> ChainResult<Shader> {
        self.shaders.compile(&mut *self.backend, config)
    }

    /// The target is larger than `size` in some dimension.
    pub fn is_upscaling_from(&self, size: TextureSize) -> bool {
        size.any_lt(self.params.target_size)
    }

    /// The target differs from `size` without being larger in any dimension.
    pub fn is_downscaling_from(&self, size: TextureSize) -> bool {
        !self.is_not_scaling_from(size) && !self.is_upscaling_from(size)
    }

    /// The target equals `size`.
    pub fn is_not_scaling_from(&self, size: TextureSize) -> bool {
        size == self.params.target_size
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/context.rs"]
mod tests;
