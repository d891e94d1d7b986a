use std::rc::Rc;

use crate::{
    filter::{Filter, FilterInputs, FilterNode, Resizeable, Taggable, eval::RenderContext},
    foundation::{
        core::{TextureDescriptor, TextureSize},
        error::ChainResult,
    },
    texture::SharedTexture,
};

/// Rebuilds a downstream graph from an input.
pub type FilterTransform = Rc<dyn Fn(&Filter) -> Filter>;

/// A transform applied to a resizeable input that stays resizeable.
///
/// Resizing re-derives the input at the new size and re-applies the transform to it, so the
/// transform always runs at the final resolution.
pub struct TransformedResizeable {
    input: Filter,
    transform: FilterTransform,
    result: Filter,
}

impl TransformedResizeable {
    /// Apply `transform` to `input`.
    pub fn new(input: Filter, transform: FilterTransform) -> Self {
        let result = transform(&input);
        Self {
            input,
            transform,
            result,
        }
    }

    /// The transformed graph.
    pub fn result(&self) -> &Filter {
        &self.result
    }
}

impl FilterNode for TransformedResizeable {
    fn output(&self) -> TextureDescriptor {
        self.result.output()
    }

    fn inputs(&self) -> FilterInputs {
        let mut inputs = FilterInputs::new();
        inputs.push(self.result.clone());
        inputs
    }

    fn compute(
        &self,
        _ctx: &mut RenderContext<'_>,
        inputs: &[SharedTexture],
    ) -> ChainResult<SharedTexture> {
        Ok(inputs[0].clone())
    }

    fn describe(&self) -> String {
        "transformed".to_string()
    }

    fn as_resizeable(&self) -> Option<&dyn Resizeable> {
        Some(self)
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Some(self)
    }
}

impl Taggable for TransformedResizeable {
    fn enable_tag(&self) {
        self.input.enable_tag();
    }

    fn is_tagged(&self) -> bool {
        self.input.is_tagged()
    }
}

impl Resizeable for TransformedResizeable {
    fn set_size(&self, size: TextureSize) -> Filter {
        let input = self.input.set_size(size, false);
        Filter::new(Self::new(input, self.transform.clone()))
    }
}

impl Filter {
    /// Apply `transform` so that later resizes act on this filter before the transform.
    pub fn transform_resizeable(&self, transform: impl Fn(&Filter) -> Filter + 'static) -> Filter {
        Filter::new(TransformedResizeable::new(self.clone(), Rc::new(transform)))
    }
}
