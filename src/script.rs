//! Per-frame driver: builds the graph for a frame, evaluates it and hands the result to the host.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::{
    chain::{
        RenderChain,
        context::{ChainContext, FrameParams},
    },
    filter::{Filter, composition::CompositionFilter, eval::evaluate, text::TextFilter},
    foundation::error::{ChainError, ChainResult, error_message},
    shader::{backend::ShaderBackend, builtin, cache::ShaderCache},
    texture::{managed::ManagedTexture, pool::TexturePool},
};

pub mod frame;

pub use self::frame::{FrameStats, HostFrame, ScriptDescriptor};

/// Runs a [`RenderChain`] once per frame.
///
/// Owns the texture pool and the shader cache, so both survive across frames.
pub struct RenderChainScript {
    chain: Box<dyn RenderChain>,
    shaders: ShaderCache,
    pool: TexturePool,
    sources: Vec<Rc<ManagedTexture>>,
    last_descriptor: Option<ScriptDescriptor>,
    frames: u64,
}

impl RenderChainScript {
    /// Script running `chain` with a fresh pool.
    pub fn new(chain: impl RenderChain + 'static) -> Self {
        Self::with_pool(chain, TexturePool::new())
    }

    /// Script running `chain` with a caller-provided pool.
    pub fn with_pool(chain: impl RenderChain + 'static, pool: TexturePool) -> Self {
        Self {
            chain: Box::new(chain),
            shaders: ShaderCache::new(),
            pool,
            sources: Vec::new(),
            last_descriptor: None,
            frames: 0,
        }
    }

    /// The texture pool.
    pub fn pool(&self) -> &TexturePool {
        &self.pool
    }

    /// The shader cache.
    pub fn shaders(&self) -> &ShaderCache {
        &self.shaders
    }

    /// Frames executed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Replace the chain, e.g. after its settings changed. Compiled shaders are kept.
    pub fn reconfigure(&mut self, chain: impl RenderChain + 'static) {
        self.chain = Box::new(chain);
        debug!("render chain reconfigured");
    }

    /// Input the script wants for frames described by `params`.
    pub fn descriptor(&self, params: &FrameParams) -> ScriptDescriptor {
        self.last_descriptor.unwrap_or(ScriptDescriptor {
            prescale_size: params.luma_size,
            prescale: true,
            want_yuv: false,
        })
    }

    /// Produce one frame into `frame.output`.
    ///
    /// Recoverable failures while building or evaluating the graph are replaced with an on-screen
    /// error message. The pool is flushed on every path.
    #[tracing::instrument(skip_all, fields(frame = self.frames, target = %frame.params.target_size))]
    pub fn execute(
        &mut self,
        backend: &mut dyn ShaderBackend,
        frame: &HostFrame,
    ) -> ChainResult<FrameStats> {
        self.frames += 1;
        if frame.output.id() != frame.source.id() {
            self.pool.lend_target(frame.output.clone());
        }

        let result = self.render(backend, frame);
        self.pool.flush(backend);
        result.map(|stats| FrameStats {
            pool: self.pool.stats(),
            ..stats
        })
    }

    fn render(
        &mut self,
        backend: &mut dyn ShaderBackend,
        frame: &HostFrame,
    ) -> ChainResult<FrameStats> {
        let mut error_substituted = false;
        let graph = match self.build_graph(backend, frame) {
            Ok(graph) => graph,
            Err(e) if e.is_recoverable() => {
                error_substituted = true;
                self.error_filter(&e, frame)
            }
            Err(e) => return Err(e),
        };

        let (texture, eval) = match evaluate(&graph, backend, &self.pool) {
            Ok(v) => v,
            Err(e) if e.is_recoverable() && !error_substituted => {
                error_substituted = true;
                let graph = self.error_filter(&e, frame);
                evaluate(&graph, backend, &self.pool)?
            }
            Err(e) => return Err(e),
        };

        let final_blit = texture.id() != frame.output.id();
        if final_blit {
            backend.scale(
                texture.value(),
                &frame.output,
                frame.params.luma_upscaler,
                frame.params.luma_downscaler,
            )?;
        }

        Ok(FrameStats {
            eval,
            error_substituted,
            final_blit,
            pool: Default::default(),
        })
    }

    fn build_graph(
        &mut self,
        backend: &mut dyn ShaderBackend,
        frame: &HostFrame,
    ) -> ChainResult<Filter> {
        let params = &frame.params;
        if params.target_size.is_empty() {
            return Err(ChainError::validation(format!(
                "target size {} is empty",
                params.target_size
            )));
        }

        for source in self.sources.drain(..) {
            source.dispose();
        }

        let mut ctx = ChainContext::new(params, &mut self.shaders, backend);
        let source = Rc::new(ManagedTexture::host(frame.source.clone()));
        self.sources.push(source.clone());
        let source = source.to_filter();

        let initial = match &frame.chroma {
            Some(chroma) if params.is_chroma_subsampled() => {
                let chroma = Rc::new(ManagedTexture::host(chroma.clone()));
                self.sources.push(chroma.clone());
                CompositionFilter::new(&mut ctx, source, chroma.to_filter())?.into_filter()
            }
            _ if params.input_is_yuv => source.apply(&ctx.compile(builtin::yuv_to_rgb())?),
            _ => source,
        };
        self.last_descriptor = Some(ScriptDescriptor {
            prescale_size: params.luma_size,
            prescale: true,
            want_yuv: initial.as_composition().is_some(),
        });

        let output = self.chain.create_filter(&mut ctx, initial)?;
        Ok(output.set_size(params.target_size, true))
    }

    fn error_filter(&self, err: &ChainError, frame: &HostFrame) -> Filter {
        let message = error_message(err);
        warn!(error = %message, "render chain failed; rendering error message instead");
        let target = frame.params.target_size;
        TextFilter::new(message, target)
            .into_filter()
            .set_size(target, true)
    }

    /// Release every texture the script owns. Call on device loss or shutdown.
    pub fn teardown(&mut self, backend: &mut dyn ShaderBackend) {
        for source in self.sources.drain(..) {
            source.dispose();
        }
        self.pool.clear(backend);
        self.shaders.clear();
        self.last_descriptor = None;
    }
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;
