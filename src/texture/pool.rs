use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use tracing::{debug, warn};

use crate::{
    foundation::{
        core::{Texture, TextureDescriptor, TextureId},
        error::{ChainError, ChainResult},
    },
    lending::{Lend, Lendable},
    shader::backend::TextureAllocator,
    texture::SharedTexture,
};

/// Pool limits.
#[derive(Debug, Clone, Copy)]
pub struct TexturePoolOpts {
    /// Maximum bytes kept idle across all buckets. Textures returned beyond it are destroyed at
    /// the next flush.
    pub max_idle_bytes: u64,
    /// Maximum number of idle textures kept per descriptor.
    pub max_idle_per_bucket: usize,
}

impl Default for TexturePoolOpts {
    fn default() -> Self {
        Self {
            max_idle_bytes: 512 * 1024 * 1024,
            max_idle_per_bucket: 8,
        }
    }
}

/// Pool counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TexturePoolStats {
    /// Textures currently idle in the pool.
    pub idle_textures: usize,
    /// Bytes held by idle textures.
    pub idle_bytes: u64,
    /// Textures currently rented out.
    pub rented_textures: usize,
    /// Textures created through the allocator.
    pub allocated: u64,
    /// Rents answered from the idle set.
    pub reused: u64,
    /// Textures destroyed by flush or clear.
    pub destroyed: u64,
}

struct IdleTexture {
    texture: Texture,
    /// Set by a flush; an entry still idle at the following flush is destroyed.
    stale: bool,
}

struct Bucket {
    descriptor: TextureDescriptor,
    idle: Vec<IdleTexture>,
}

#[derive(Default)]
struct PoolState {
    opts: TexturePoolOpts,
    stats: TexturePoolStats,
    bucket_idx_by_desc: HashMap<TextureDescriptor, usize>,
    buckets: Vec<Bucket>,
    rented: HashSet<TextureId>,
    host_targets: HashSet<TextureId>,
    retired: Vec<Texture>,
}

impl PoolState {
    fn bucket_mut(&mut self, descriptor: TextureDescriptor) -> &mut Bucket {
        let bi = match self.bucket_idx_by_desc.get(&descriptor).copied() {
            Some(i) => i,
            None => {
                let i = self.buckets.len();
                self.buckets.push(Bucket {
                    descriptor,
                    idle: Vec::new(),
                });
                self.bucket_idx_by_desc.insert(descriptor, i);
                i
            }
        };
        &mut self.buckets[bi]
    }

    fn push_idle(&mut self, texture: Texture) {
        let descriptor = texture.descriptor();
        self.stats.idle_textures += 1;
        self.stats.idle_bytes = self.stats.idle_bytes.saturating_add(descriptor.byte_len());
        self.bucket_mut(descriptor).idle.push(IdleTexture {
            texture,
            stale: false,
        });
    }

    fn pop_idle(&mut self, descriptor: TextureDescriptor) -> Option<Texture> {
        let bi = *self.bucket_idx_by_desc.get(&descriptor)?;
        let entry = self.buckets[bi].idle.pop()?;
        self.stats.idle_textures = self.stats.idle_textures.saturating_sub(1);
        self.stats.idle_bytes = self.stats.idle_bytes.saturating_sub(descriptor.byte_len());
        Some(entry.texture)
    }

    /// Split idle entries into kept and expired, marking survivors stale.
    fn sweep_idle(&mut self) -> Vec<Texture> {
        let mut expired = Vec::new();
        let mut retained_bytes = 0u64;
        let mut retained = 0usize;
        let opts = self.opts;

        for bucket in &mut self.buckets {
            let bytes = bucket.descriptor.byte_len();
            let mut kept = Vec::with_capacity(bucket.idle.len());
            for mut entry in bucket.idle.drain(..) {
                let id = entry.texture.id();
                if self.host_targets.contains(&id) {
                    // Host targets are only borrowed for one frame.
                    self.host_targets.remove(&id);
                    continue;
                }
                let over_budget = kept.len() >= opts.max_idle_per_bucket
                    || retained_bytes.saturating_add(bytes) > opts.max_idle_bytes;
                if entry.stale || over_budget {
                    expired.push(entry.texture);
                } else {
                    entry.stale = true;
                    retained_bytes += bytes;
                    kept.push(entry);
                }
            }
            retained += kept.len();
            bucket.idle = kept;
        }

        self.stats.idle_textures = retained;
        self.stats.idle_bytes = retained_bytes;
        expired
    }
}

/// Descriptor-keyed pool of reusable textures.
///
/// The pool is a cheap clonable handle; clones share state. It never allocates by itself: every
/// operation that may create or destroy textures takes the backend's [`TextureAllocator`].
///
/// Lifecycle per frame:
/// - [`TexturePool::lend_target`] offers the host output target for reuse.
/// - [`TexturePool::rent`] / [`TexturePool::put`] move textures in and out while the graph runs.
/// - [`TexturePool::flush`] destroys what stayed idle for a whole frame, destroys retired textures
///   and forgets the host target.
#[derive(Clone, Default)]
pub struct TexturePool {
    state: Rc<RefCell<PoolState>>,
}

impl TexturePool {
    /// Empty pool with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty pool with explicit limits.
    pub fn with_opts(opts: TexturePoolOpts) -> Self {
        let pool = Self::default();
        pool.state.borrow_mut().opts = opts;
        pool
    }

    /// Counters.
    pub fn stats(&self) -> TexturePoolStats {
        let state = self.state.borrow();
        TexturePoolStats {
            rented_textures: state.rented.len(),
            ..state.stats
        }
    }

    /// Take an idle texture matching `descriptor`, or create one.
    pub fn rent<A: TextureAllocator + ?Sized>(
        &self,
        descriptor: TextureDescriptor,
        allocator: &mut A,
    ) -> ChainResult<Texture> {
        if descriptor.size.is_empty() {
            return Err(ChainError::validation(format!(
                "cannot rent a texture of size {}",
                descriptor.size
            )));
        }

        {
            let mut state = self.state.borrow_mut();
            if let Some(texture) = state.pop_idle(descriptor) {
                state.stats.reused += 1;
                state.rented.insert(texture.id());
                return Ok(texture);
            }
        }

        let texture = allocator.create_texture(&descriptor)?;
        debug_assert_eq!(
            texture.descriptor(),
            descriptor,
            "contract violation: allocator returned a texture with the wrong descriptor"
        );
        debug!(descriptor = %descriptor, id = texture.id().0, "allocated pooled texture");

        let mut state = self.state.borrow_mut();
        state.stats.allocated += 1;
        state.rented.insert(texture.id());
        Ok(texture)
    }

    /// Return a rented texture to the idle set.
    pub fn put(&self, texture: Texture) {
        let mut state = self.state.borrow_mut();
        state.rented.remove(&texture.id());
        state.push_idle(texture);
    }

    /// Offer a host-owned texture (the frame's output target) for reuse during this frame.
    ///
    /// The pool never destroys it and forgets it at the next [`TexturePool::flush`].
    pub fn lend_target(&self, texture: Texture) {
        let mut state = self.state.borrow_mut();
        state.host_targets.insert(texture.id());
        state.push_idle(texture);
    }

    /// Queue an owned texture for destruction at the next flush.
    pub fn retire(&self, texture: Texture) {
        self.state.borrow_mut().retired.push(texture);
    }

    /// End-of-frame maintenance.
    pub fn flush<A: TextureAllocator + ?Sized>(&self, allocator: &mut A) {
        let (expired, retired, leaked) = {
            let mut state = self.state.borrow_mut();
            let expired = state.sweep_idle();
            let retired = std::mem::take(&mut state.retired);
            let host_targets = std::mem::take(&mut state.host_targets);
            // A host target still rented stays known so it is forgotten once returned.
            state.host_targets = host_targets
                .into_iter()
                .filter(|id| state.rented.contains(id))
                .collect();
            (expired, retired, state.rented.len())
        };

        if leaked > 0 {
            warn!(
                rented = leaked,
                "textures still rented at end of frame; a lease was not returned"
            );
        }
        self.destroy_all(allocator, expired.into_iter().chain(retired));
    }

    /// Destroy every idle and retired texture and forget host targets. Used at teardown.
    pub fn clear<A: TextureAllocator + ?Sized>(&self, allocator: &mut A) {
        let doomed = {
            let mut state = self.state.borrow_mut();
            let mut doomed = std::mem::take(&mut state.retired);
            let host_targets = std::mem::take(&mut state.host_targets);
            for bucket in &mut state.buckets {
                for entry in bucket.idle.drain(..) {
                    if !host_targets.contains(&entry.texture.id()) {
                        doomed.push(entry.texture);
                    }
                }
            }
            state.buckets.clear();
            state.bucket_idx_by_desc.clear();
            state.stats.idle_textures = 0;
            state.stats.idle_bytes = 0;
            if !state.rented.is_empty() {
                warn!(
                    rented = state.rented.len(),
                    "clearing texture pool while textures are still rented"
                );
            }
            doomed
        };
        self.destroy_all(allocator, doomed);
    }

    fn destroy_all<A: TextureAllocator + ?Sized>(
        &self,
        allocator: &mut A,
        textures: impl IntoIterator<Item = Texture>,
    ) {
        let mut n = 0u64;
        for texture in textures {
            debug!(descriptor = %texture.descriptor(), id = texture.id().0, "destroying texture");
            allocator.destroy_texture(texture);
            n += 1;
        }
        self.state.borrow_mut().stats.destroyed += n;
    }

    /// Rent a texture wrapped in a lease that returns it to the pool when the last clone drops.
    pub fn lease<A: TextureAllocator + ?Sized>(
        &self,
        descriptor: TextureDescriptor,
        allocator: &mut A,
    ) -> ChainResult<SharedTexture> {
        let texture = self.rent(descriptor, allocator)?;
        let lendable = Lendable::transient(PooledTexture {
            pool: self.clone(),
            texture: Some(texture),
        });
        Ok(Rc::new(lendable.lease()?))
    }
}

/// A rented texture handed out through a transient lendable.
struct PooledTexture {
    pool: TexturePool,
    texture: Option<Texture>,
}

impl Lend for PooledTexture {
    type Value = Texture;

    fn allocate(&mut self) -> ChainResult<Texture> {
        self.texture
            .take()
            .ok_or_else(|| ChainError::resource("pooled texture already returned"))
    }

    fn deallocate(&mut self, texture: Texture) {
        self.pool.put(texture);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/pool.rs"]
mod tests;
