use crate::{
    foundation::{
        core::{Texture, TextureChannels, TextureDescriptor, Vec2},
        error::ChainResult,
    },
    shader::{arguments::ArgumentList, program::ShaderSource, scaler::Scaler},
};

/// Backend-assigned handle of a compiled shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Everything a backend needs to resample one texture into another.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResampleParams {
    /// Channels written to the output.
    pub channels: TextureChannels,
    /// Sub-pixel offset applied to the sampling position, in input texels.
    pub offset: Vec2,
    /// Kernel used when the output is larger than the input in some dimension.
    pub upscaler: Option<Scaler>,
    /// Kernel used when the output is not larger than the input.
    pub downscaler: Option<Scaler>,
    /// Kernel applied when the output size equals the input size.
    pub convolver: Option<Scaler>,
    /// Compensate for the half-texel shift introduced by centered doubling.
    pub offset_correction: bool,
}

impl ResampleParams {
    /// Plain full-channel scale with the given kernels.
    pub fn scale(upscaler: Scaler, downscaler: Scaler) -> Self {
        Self {
            upscaler: Some(upscaler),
            downscaler: Some(downscaler),
            ..Self::default()
        }
    }
}

/// Creates and destroys textures. Implemented by every backend; the texture pool only needs this.
pub trait TextureAllocator {
    /// Allocate a texture matching `descriptor`.
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> ChainResult<Texture>;

    /// Release a texture previously returned by [`TextureAllocator::create_texture`].
    fn destroy_texture(&mut self, texture: Texture);
}

/// Backend primitive operations used by filters during evaluation.
///
/// Implementations only execute work; graph construction, memoization and texture lifetimes are
/// handled by the engine.
pub trait ShaderBackend: TextureAllocator {
    /// Compile the shader at `source.path` with the given preprocessor defines.
    fn compile(&mut self, source: &ShaderSource) -> ChainResult<ShaderHandle>;

    /// Run a compiled shader over `inputs`, writing every texel of `output`.
    fn run(
        &mut self,
        shader: ShaderHandle,
        inputs: &[&Texture],
        arguments: &ArgumentList,
        output: &Texture,
    ) -> ChainResult<()>;

    /// Resample `input` into `output`.
    fn resample(
        &mut self,
        input: &Texture,
        output: &Texture,
        params: &ResampleParams,
    ) -> ChainResult<()>;

    /// Scale `input` into the host output target.
    fn scale(
        &mut self,
        input: &Texture,
        output: &Texture,
        upscaler: Scaler,
        downscaler: Scaler,
    ) -> ChainResult<()> {
        self.resample(input, output, &ResampleParams::scale(upscaler, downscaler))
    }

    /// Render a text message into `output`.
    fn render_text(&mut self, text: &str, output: &Texture) -> ChainResult<()>;
}
