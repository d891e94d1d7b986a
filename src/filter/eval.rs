use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;
use tracing::trace;

use crate::{
    filter::{Filter, NodeKey},
    foundation::{core::TextureDescriptor, error::ChainResult},
    shader::backend::ShaderBackend,
    texture::{SharedTexture, pool::TexturePool},
};

/// Per-evaluation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Nodes whose compute step ran.
    pub nodes_computed: u64,
    /// Backend passes issued (shader runs, resamples, text).
    pub passes: u64,
    /// Pulls answered from the memo table.
    pub memo_hits: u64,
}

struct MemoEntry {
    texture: SharedTexture,
    /// Consumers that have not read the texture yet.
    remaining: usize,
}

/// State threaded through one evaluation: backend, pool, memo table.
pub struct RenderContext<'a> {
    backend: &'a mut dyn ShaderBackend,
    pool: &'a TexturePool,
    consumers: HashMap<NodeKey, usize>,
    memo: HashMap<NodeKey, MemoEntry>,
    stats: EvalStats,
}

impl<'a> RenderContext<'a> {
    fn new(backend: &'a mut dyn ShaderBackend, pool: &'a TexturePool) -> Self {
        Self {
            backend,
            pool,
            consumers: HashMap::new(),
            memo: HashMap::new(),
            stats: EvalStats::default(),
        }
    }

    /// The backend executing passes.
    pub fn backend(&mut self) -> &mut (dyn ShaderBackend + 'a) {
        &mut *self.backend
    }

    /// Rent an output texture from the pool. It returns to the pool when the last lease drops.
    pub fn rent(&mut self, descriptor: TextureDescriptor) -> ChainResult<SharedTexture> {
        self.pool.lease(descriptor, &mut *self.backend)
    }

    /// Count one backend pass.
    pub fn record_pass(&mut self) {
        self.stats.passes += 1;
    }

    /// Counters so far.
    pub fn stats(&self) -> EvalStats {
        self.stats
    }

    fn count_consumers(&mut self, root: &Filter) {
        let mut seen = HashSet::new();
        let mut stack = vec![root.clone()];
        seen.insert(root.key());
        *self.consumers.entry(root.key()).or_default() += 1;

        while let Some(filter) = stack.pop() {
            for input in filter.inputs() {
                *self.consumers.entry(input.key()).or_default() += 1;
                if seen.insert(input.key()) {
                    stack.push(input);
                }
            }
        }
    }

    fn pull(&mut self, filter: &Filter) -> ChainResult<SharedTexture> {
        let key = filter.key();
        if let Some(entry) = self.memo.get_mut(&key) {
            self.stats.memo_hits += 1;
            entry.remaining = entry.remaining.saturating_sub(1);
            let texture = entry.texture.clone();
            if entry.remaining == 0 {
                self.memo.remove(&key);
            }
            return Ok(texture);
        }

        let upstream = filter.inputs();
        let mut inputs: SmallVec<[SharedTexture; 4]> = SmallVec::with_capacity(upstream.len());
        for input in &upstream {
            inputs.push(self.pull(input)?);
        }

        let output = filter.node().compute(self, &inputs)?;
        let expected = filter.output();
        debug_assert_eq!(
            output.descriptor(),
            expected,
            "contract violation: {} produced a texture that does not match its descriptor",
            filter.node().describe()
        );
        self.stats.nodes_computed += 1;
        trace!(node = %filter.node().describe(), output = %expected, "computed filter");
        drop(inputs);

        let consumers = self.consumers.get(&key).copied().unwrap_or(1);
        if consumers > 1 {
            self.memo.insert(
                key,
                MemoEntry {
                    texture: output.clone(),
                    remaining: consumers - 1,
                },
            );
        }
        Ok(output)
    }
}

/// Evaluate the graph rooted at `root` and return its output texture.
///
/// Every node reachable from `root` is computed at most once. Intermediate textures are returned
/// to `pool` as soon as their last consumer has been computed; the returned texture stays leased
/// until the caller drops it. On error every texture leased so far goes back to the pool.
pub fn evaluate(
    root: &Filter,
    backend: &mut dyn ShaderBackend,
    pool: &TexturePool,
) -> ChainResult<(SharedTexture, EvalStats)> {
    let mut ctx = RenderContext::new(backend, pool);
    ctx.count_consumers(root);
    let output = ctx.pull(root)?;
    debug_assert!(ctx.memo.is_empty(), "memo entries left after evaluation");
    Ok((output, ctx.stats))
}

#[cfg(test)]
#[path = "../../tests/unit/filter/eval.rs"]
mod tests;
