use smallvec::SmallVec;

use crate::{
    filter::{Filter, FilterInputs, FilterNode, eval::RenderContext},
    foundation::{
        core::{Texture, TextureDescriptor},
        error::{ChainError, ChainResult},
    },
    shader::program::Shader,
    texture::SharedTexture,
};

/// Runs a compiled shader over one or more inputs.
///
/// The output size is the shader's size transform applied to the first input's size.
pub struct ShaderFilter {
    shader: Shader,
    inputs: FilterInputs,
    output: TextureDescriptor,
}

impl ShaderFilter {
    /// Bind `shader` to `first` followed by `rest`.
    pub fn new(shader: Shader, first: &Filter, rest: &[Filter]) -> Self {
        let mut inputs = FilterInputs::with_capacity(1 + rest.len());
        inputs.push(first.clone());
        inputs.extend(rest.iter().cloned());
        let output = shader.output_descriptor(first.size());
        Self {
            shader,
            inputs,
            output,
        }
    }

    /// The bound shader.
    pub fn shader(&self) -> &Shader {
        &self.shader
    }
}

impl FilterNode for ShaderFilter {
    fn output(&self) -> TextureDescriptor {
        self.output
    }

    fn inputs(&self) -> FilterInputs {
        self.inputs.clone()
    }

    fn compute(
        &self,
        ctx: &mut RenderContext<'_>,
        inputs: &[SharedTexture],
    ) -> ChainResult<SharedTexture> {
        let out = ctx.rent(self.output)?;
        let textures: SmallVec<[&Texture; 4]> = inputs.iter().map(|t| t.value()).collect();
        ctx.backend().run(
            self.shader.handle(),
            &textures,
            &self.shader.config().arguments,
            out.value(),
        )?;
        ctx.record_pass();
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("shader {}", self.shader.config().display_name())
    }
}

impl Shader {
    /// Filter running this shader over `first` followed by `rest`.
    pub fn apply(&self, first: &Filter, rest: &[Filter]) -> Filter {
        Filter::new(ShaderFilter::new(self.clone(), first, rest))
    }

    /// Filter running this shader over `inputs`. At least one input is required.
    pub fn apply_to(&self, inputs: &[Filter]) -> ChainResult<Filter> {
        match inputs.split_first() {
            Some((first, rest)) => Ok(self.apply(first, rest)),
            None => Err(ChainError::validation(format!(
                "shader {} needs at least one input",
                self.config().display_name()
            ))),
        }
    }
}

impl Filter {
    /// Run `shader` over this filter.
    pub fn apply(&self, shader: &Shader) -> Filter {
        shader.apply(self, &[])
    }
}
