//! Renderchain builds per-frame texture filter graphs for video rendering.
//!
//! A host hands each frame's textures to a [`RenderChainScript`]. The script builds a lazy graph
//! of [`Filter`]s through a [`RenderChain`] (NEDI doubling, SuperRes refinement, presets, plain
//! scaling), evaluates it on a [`ShaderBackend`] and writes the result into the host target.
//!
//! - Filters are immutable nodes. Sharing a node shares its output, computed once per frame.
//! - Intermediate textures come from a [`TexturePool`] and are recycled across frames.
//! - [`CpuBackend`] is a reference backend that runs every pass on the CPU.
//!
//! See [`guide`] for a walkthrough.
#![forbid(unsafe_code)]

pub mod chain;
pub mod filter;
pub mod foundation;
pub mod guide;
pub mod lending;
pub mod render;
pub mod script;
pub mod shader;
pub mod texture;

pub use crate::chain::{
    Identity, RenderChain,
    config::{ChainConfig, SettingsStore},
    context::{ChainContext, FrameParams},
    nedi::Nedi,
    presets::{Preset, PresetGroup, Selector},
    scale::Scale,
    super_res::SuperRes,
};
pub use crate::filter::{Filter, FilterNode, eval::EvalStats, resize::ResizeOptions};
pub use crate::foundation::core::{
    Texture, TextureChannels, TextureDescriptor, TextureFormat, TextureId, TextureSize, Vec2,
};
pub use crate::foundation::error::{ChainError, ChainResult};
pub use crate::lending::{Lease, Lend, Lendable};
pub use crate::render::cpu::{CpuBackend, CpuBackendOpts};
pub use crate::script::{FrameStats, HostFrame, RenderChainScript, ScriptDescriptor};
pub use crate::shader::{
    arguments::{ArgValue, ArgumentList},
    backend::{ResampleParams, ShaderBackend, ShaderHandle, TextureAllocator},
    cache::ShaderCache,
    program::{Shader, ShaderConfig, ShaderSource},
    scaler::Scaler,
};
pub use crate::texture::{SharedTexture, managed::ManagedTexture, pool::TexturePool};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
