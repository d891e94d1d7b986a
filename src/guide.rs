//! # Renderchain guide
//!
//! A walkthrough of how a frame is rendered, from the host's textures to the output target.
//!
//! If you are looking for a runnable program, start with `demos/render_one_frame.rs`.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Filter`](crate::Filter): a shared handle to an immutable graph node with a known output
//!   size and format
//! - [`RenderChain`](crate::RenderChain): turns an input filter into an output filter
//! - [`ChainContext`](crate::ChainContext): per-frame parameters and shader compilation while a
//!   chain builds its graph
//! - [`ShaderBackend`](crate::ShaderBackend): executes passes (shader runs, resamples, text)
//! - [`TexturePool`](crate::TexturePool): recycles intermediate textures across frames
//! - [`RenderChainScript`](crate::RenderChainScript): drives all of the above once per frame
//!
//! Rendering is staged:
//!
//! 1. Build: wrap the host textures in source filters, then let the chain build a graph.
//!    Nothing runs on the backend except shader compilation.
//! 2. Size: the graph is resized to the target with [`Filter::set_size`](crate::Filter::set_size).
//!    Resizeable nodes re-derive themselves at the new size instead of gaining a resample pass.
//! 3. Evaluate: [`evaluate`](crate::filter::eval::evaluate) computes the root. Every node runs at
//!    most once; its texture is released as soon as its last consumer has run.
//! 4. Present: the result is scaled into the host target when it is not already that target,
//!    and the pool is flushed.
//!
//! ---
//!
//! ## Texture ownership
//!
//! Textures flow through the graph as [`SharedTexture`](crate::SharedTexture) leases. Dropping
//! the last lease returns a pooled texture to the [`TexturePool`](crate::TexturePool). Host
//! textures are never destroyed by the engine; the output target is lent to the pool for the
//! duration of a frame so the last pass can render straight into it.
//!
//! A [`ManagedTexture`](crate::ManagedTexture) that has been disposed cannot be leased again.
//! Leasing it is a programming error and panics.
//!
//! ---
//!
//! ## Writing a chain
//!
//! A chain compiles its shaders through the context and applies them to the input:
//!
//! ```rust,no_run
//! use renderchain::{
//!     ChainContext, ChainResult, Filter, RenderChain, ShaderConfig, TextureFormat,
//! };
//!
//! struct Sharpen {
//!     amount: f32,
//! }
//!
//! impl RenderChain for Sharpen {
//!     fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
//!         let shader = ctx.compile(
//!             ShaderConfig::file("Common/Sharpen.hlsl")
//!                 .arguments([self.amount].into())
//!                 .format(TextureFormat::Float16),
//!         )?;
//!         Ok(input.apply(&shader))
//!     }
//! }
//! ```
//!
//! Shader outputs default to the input size. Pass a size transform with
//! [`ShaderConfig::transform`](crate::ShaderConfig::transform) for passes that change it.
//!
//! ---
//!
//! ## Running a frame
//!
//! ```rust,no_run
//! use renderchain::{
//!     ChainConfig, CpuBackend, FrameParams, HostFrame, Nedi, RenderChainScript,
//!     TextureAllocator, TextureDescriptor, TextureFormat, TextureSize,
//! };
//!
//! # fn main() -> renderchain::ChainResult<()> {
//! let mut backend = CpuBackend::default();
//! let source_size = TextureSize::new(320, 180);
//! let target_size = TextureSize::new(640, 360);
//!
//! let source = backend.create_texture(&TextureDescriptor::new(
//!     source_size,
//!     TextureFormat::Unorm8,
//! ))?;
//! let output = backend.create_texture(&TextureDescriptor::new(
//!     target_size,
//!     TextureFormat::Unorm8,
//! ))?;
//!
//! let mut script = RenderChainScript::new(ChainConfig::Nedi(Nedi::default()));
//! let frame = HostFrame {
//!     source,
//!     chroma: None,
//!     output,
//!     params: FrameParams::rgb(source_size, target_size),
//! };
//! let stats = script.execute(&mut backend, &frame)?;
//! assert!(!stats.error_substituted);
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Errors
//!
//! Configuration, compilation, validation and settings errors raised while building or
//! evaluating the graph do not abort the frame. The script renders the error message into the
//! target instead and reports it through
//! [`FrameStats::error_substituted`](crate::FrameStats::error_substituted). Resource exhaustion
//! and backend failures are returned to the host, after the pool has been flushed.
//!
//! ---
//!
//! ## Settings
//!
//! Every built-in chain serializes through [`ChainConfig`](crate::ChainConfig). A
//! [`SettingsStore`](crate::SettingsStore) keeps named settings in one JSON object and counts
//! revisions, so a host can rebuild the chain with
//! [`RenderChainScript::reconfigure`](crate::RenderChainScript::reconfigure) when they change.
