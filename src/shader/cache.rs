use std::collections::HashMap;

use tracing::debug;

use crate::{
    foundation::error::ChainResult,
    shader::{
        backend::{ShaderBackend, ShaderHandle},
        program::{Shader, ShaderConfig, ShaderSource},
    },
};

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShaderCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Successful backend compilations.
    pub compiled: u64,
}

/// Compiled programs keyed by shader path and defines.
///
/// Failed compilations are not cached, so a fixed shader is picked up on the next frame.
#[derive(Debug, Default)]
pub struct ShaderCache {
    compiled: HashMap<u64, (ShaderSource, ShaderHandle)>,
    stats: ShaderCacheStats,
}

impl ShaderCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `source`, compiling it on first use.
    pub fn get_or_compile<B: ShaderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        source: &ShaderSource,
    ) -> ChainResult<ShaderHandle> {
        let key = source.fingerprint();
        if let Some((cached, handle)) = self.compiled.get(&key)
            && cached == source
        {
            self.stats.hits += 1;
            return Ok(*handle);
        }

        let handle = backend.compile(source)?;
        debug!(shader = %source, handle = handle.0, "compiled shader");
        self.stats.compiled += 1;
        self.compiled.insert(key, (source.clone(), handle));
        Ok(handle)
    }

    /// Compile `config` into a [`Shader`].
    pub fn compile<B: ShaderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        config: ShaderConfig,
    ) -> ChainResult<Shader> {
        let handle = self.get_or_compile(backend, &config.source)?;
        Ok(Shader::new(handle, config))
    }

    /// Forget every compiled program, e.g. after the device was recreated.
    pub fn clear(&mut self) {
        self.compiled.clear();
    }

    /// Number of cached programs.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Counters since construction.
    pub fn stats(&self) -> ShaderCacheStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/cache.rs"]
mod tests;
