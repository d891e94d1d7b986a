use std::rc::Rc;

use crate::{
    filter::{FilterInputs, FilterNode, eval::RenderContext},
    foundation::{core::TextureDescriptor, error::ChainResult},
    texture::{SharedTexture, managed::ManagedTexture},
};

/// Leaf node reading an existing texture.
pub struct SourceFilter {
    texture: Rc<ManagedTexture>,
}

impl SourceFilter {
    /// Read `texture`.
    pub fn new(texture: Rc<ManagedTexture>) -> Self {
        Self { texture }
    }

    /// The wrapped texture.
    pub fn texture(&self) -> &Rc<ManagedTexture> {
        &self.texture
    }
}

impl FilterNode for SourceFilter {
    fn output(&self) -> TextureDescriptor {
        self.texture.descriptor()
    }

    fn inputs(&self) -> FilterInputs {
        FilterInputs::new()
    }

    fn compute(
        &self,
        _ctx: &mut RenderContext<'_>,
        _inputs: &[SharedTexture],
    ) -> ChainResult<SharedTexture> {
        Ok(Rc::new(self.texture.lease()?))
    }

    fn describe(&self) -> String {
        "source".to_string()
    }
}
