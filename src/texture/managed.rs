use std::{fmt, rc::Rc};

use crate::{
    filter::{Filter, source::SourceFilter},
    foundation::{
        core::{Texture, TextureDescriptor},
        error::ChainResult,
    },
    lending::{Lend, Lendable, Lease},
    texture::pool::TexturePool,
};

enum Owner {
    /// The host keeps the texture alive; releasing does nothing.
    Host,
    /// The engine owns the texture; releasing retires it to the pool for destruction.
    Pool(TexturePool),
}

struct HeldTexture {
    texture: Texture,
    owner: Owner,
}

impl Lend for HeldTexture {
    type Value = Texture;

    fn allocate(&mut self) -> ChainResult<Texture> {
        Ok(self.texture.clone())
    }

    fn deallocate(&mut self, texture: Texture) {
        match &self.owner {
            Owner::Host => {}
            Owner::Pool(pool) => pool.retire(texture),
        }
    }
}

/// A texture with an explicit owner and leased access.
///
/// The underlying texture is released exactly once: after [`ManagedTexture::dispose`] (or drop)
/// and once every lease has been returned.
pub struct ManagedTexture {
    descriptor: TextureDescriptor,
    lendable: Lendable<HeldTexture>,
}

impl ManagedTexture {
    /// Wrap a texture owned by the host. Releasing it is a no-op.
    pub fn host(texture: Texture) -> Self {
        Self::with_owner(texture, Owner::Host)
    }

    /// Take ownership of `texture`; it is destroyed at the pool's next flush after release.
    pub fn owned(texture: Texture, pool: &TexturePool) -> Self {
        Self::with_owner(texture, Owner::Pool(pool.clone()))
    }

    fn with_owner(texture: Texture, owner: Owner) -> Self {
        Self {
            descriptor: texture.descriptor(),
            lendable: Lendable::new(HeldTexture { texture, owner }),
        }
    }

    /// Size and format.
    pub fn descriptor(&self) -> TextureDescriptor {
        self.descriptor
    }

    /// `false` once disposed.
    pub fn is_valid(&self) -> bool {
        self.lendable.is_valid()
    }

    /// Give up ownership. Idempotent.
    pub fn dispose(&self) {
        self.lendable.dispose();
    }

    /// Borrow the texture.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation after [`ManagedTexture::dispose`].
    pub fn lease(&self) -> ChainResult<Lease<Texture>> {
        self.lendable.lease()
    }

    /// Number of leases currently held.
    pub fn outstanding_leases(&self) -> usize {
        self.lendable.outstanding_leases()
    }

    /// Source filter reading this texture.
    pub fn to_filter(self: &Rc<Self>) -> Filter {
        Filter::new(SourceFilter::new(self.clone()))
    }
}

impl fmt::Debug for ManagedTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedTexture")
            .field("descriptor", &self.descriptor)
            .field("lendable", &self.lendable)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/managed.rs"]
mod tests;
