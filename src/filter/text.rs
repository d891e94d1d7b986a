use crate::{
    filter::{Filter, FilterInputs, FilterNode, eval::RenderContext},
    foundation::{
        core::{TextureDescriptor, TextureFormat, TextureSize},
        error::ChainResult,
    },
    texture::SharedTexture,
};

/// Renders a text message into a fresh texture. Used to show chain errors on screen.
pub struct TextFilter {
    message: String,
    output: TextureDescriptor,
}

impl TextFilter {
    /// Message rendered at `size`.
    pub fn new(message: impl Into<String>, size: TextureSize) -> Self {
        Self {
            message: message.into(),
            output: TextureDescriptor::new(size, TextureFormat::Unorm8),
        }
    }

    /// Wrap into a [`Filter`].
    pub fn into_filter(self) -> Filter {
        Filter::new(self)
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl FilterNode for TextFilter {
    fn output(&self) -> TextureDescriptor {
        self.output
    }

    fn inputs(&self) -> FilterInputs {
        FilterInputs::new()
    }

    fn compute(
        &self,
        ctx: &mut RenderContext<'_>,
        _inputs: &[SharedTexture],
    ) -> ChainResult<SharedTexture> {
        let out = ctx.rent(self.output)?;
        ctx.backend().render_text(&self.message, out.value())?;
        ctx.record_pass();
        Ok(out)
    }

    fn describe(&self) -> String {
        "text".to_string()
    }
}
