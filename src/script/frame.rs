use crate::{
    chain::context::FrameParams,
    filter::eval::EvalStats,
    foundation::core::{Texture, TextureSize},
    texture::pool::TexturePoolStats,
};

/// Textures and parameters the host supplies for one frame.
#[derive(Clone, Debug)]
pub struct HostFrame {
    /// Source texture: RGB, packed YUV, or the luma plane of planar YUV.
    pub source: Texture,
    /// Chroma plane of planar YUV input.
    pub chroma: Option<Texture>,
    /// Render target receiving the final image.
    pub output: Texture,
    /// Sizes, formats and kernels for this frame.
    pub params: FrameParams,
}

/// What the script asks from the host's video decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptDescriptor {
    /// Size the host should decode to.
    pub prescale_size: TextureSize,
    /// Whether the host may prescale before handing the frame over.
    pub prescale: bool,
    /// Whether the script consumes separate YUV planes.
    pub want_yuv: bool,
}

/// Outcome of one [`super::RenderChainScript::execute`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Graph evaluation counters.
    pub eval: EvalStats,
    /// The chain failed and an error message was rendered instead.
    pub error_substituted: bool,
    /// The result was scaled into the output target by a separate pass.
    pub final_blit: bool,
    /// Pool counters after the end-of-frame flush.
    pub pool: TexturePoolStats,
}
