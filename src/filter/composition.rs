use std::{cell::OnceCell, rc::Rc};

use crate::{
    chain::context::ChainContext,
    filter::{
        Filter, FilterInputs, FilterNode, Resizeable, Taggable,
        eval::RenderContext,
        resize::{ResizeFilter, ResizeOptions},
    },
    foundation::{
        core::{TextureChannels, TextureDescriptor, TextureSize, Vec2},
        error::ChainResult,
    },
    shader::{builtin, program::Shader, scaler::Scaler},
    texture::SharedTexture,
};

/// Compiled passes and kernels used to merge planes back into RGB.
#[derive(Clone, Debug)]
pub struct ChromaProcesses {
    /// Combines luma and full-size chroma into one YUV texture.
    pub merge: Shader,
    /// Converts the merged texture to RGB.
    pub to_rgb: Shader,
    /// Kernel for enlarging chroma.
    pub upscaler: Scaler,
    /// Kernel for shrinking chroma.
    pub downscaler: Scaler,
}

impl ChromaProcesses {
    /// Compile the merge passes with the frame's chroma kernels.
    pub fn compile(ctx: &mut ChainContext<'_>) -> ChainResult<Self> {
        Ok(Self {
            merge: ctx.compile(builtin::merge_y_uv())?,
            to_rgb: ctx.compile(builtin::yuv_to_rgb())?,
            upscaler: ctx.params().chroma_upscaler,
            downscaler: ctx.params().chroma_downscaler,
        })
    }
}

/// Luma and chroma planes kept apart until a consumer needs pixels.
///
/// Chains that understand YUV can work on the planes directly ([`CompositionFilter::map_luma`],
/// [`ChromaScaler`]); everything else sees an RGB filter of the target size.
pub struct CompositionFilter {
    luma: Filter,
    chroma: Filter,
    target: TextureSize,
    chroma_offset: Vec2,
    processes: Rc<ChromaProcesses>,
    merged: OnceCell<Filter>,
}

impl CompositionFilter {
    /// Compose `luma` and `chroma` at luma size, with the frame's chroma offset.
    pub fn new(ctx: &mut ChainContext<'_>, luma: Filter, chroma: Filter) -> ChainResult<Self> {
        let processes = Rc::new(ChromaProcesses::compile(ctx)?);
        Ok(Self::from_parts(
            luma.clone(),
            chroma,
            luma.size(),
            ctx.params().chroma_offset,
            processes,
        ))
    }

    /// Compose with already compiled processes.
    pub fn from_parts(
        luma: Filter,
        chroma: Filter,
        target: TextureSize,
        chroma_offset: Vec2,
        processes: Rc<ChromaProcesses>,
    ) -> Self {
        Self {
            luma,
            chroma,
            target,
            chroma_offset,
            processes,
            merged: OnceCell::new(),
        }
    }

    /// Same planes with `fallback` standing in for the merge, e.g. a merge a chroma chain has
    /// already built. The target becomes the fallback's size.
    ///
    /// Re-deriving the composition (resize, new offset, new luma) drops the fallback.
    pub fn with_fallback(&self, fallback: Filter) -> Self {
        let composition = Self::from_parts(
            self.luma.clone(),
            self.chroma.clone(),
            fallback.size(),
            self.chroma_offset,
            self.processes.clone(),
        );
        let _ = composition.merged.set(fallback);
        composition
    }

    /// Luma plane.
    pub fn luma(&self) -> &Filter {
        &self.luma
    }

    /// Chroma plane.
    pub fn chroma(&self) -> &Filter {
        &self.chroma
    }

    /// Size of the merged output.
    pub fn target_size(&self) -> TextureSize {
        self.target
    }

    /// Chroma siting correction.
    pub fn chroma_offset(&self) -> Vec2 {
        self.chroma_offset
    }

    /// Compiled merge passes.
    pub fn processes(&self) -> &ChromaProcesses {
        &self.processes
    }

    /// Same composition with a different chroma offset.
    pub fn with_chroma_offset(&self, offset: Vec2) -> Self {
        Self::from_parts(
            self.luma.clone(),
            self.chroma.clone(),
            self.target,
            offset,
            self.processes.clone(),
        )
    }

    /// Same composition with `f` applied to the luma plane. The target size follows the new
    /// luma size.
    pub fn map_luma(&self, f: impl FnOnce(&Filter) -> ChainResult<Filter>) -> ChainResult<Self> {
        let luma = f(&self.luma)?;
        let target = luma.size();
        Ok(Self::from_parts(
            luma,
            self.chroma.clone(),
            target,
            self.chroma_offset,
            self.processes.clone(),
        ))
    }

    /// The merged RGB filter, built on first use.
    pub fn merged(&self) -> Filter {
        self.merged
            .get_or_init(|| DefaultChromaScaler::merge(self))
            .clone()
    }

    /// Wrap into a [`Filter`].
    pub fn into_filter(self) -> Filter {
        Filter::new(self)
    }
}

impl FilterNode for CompositionFilter {
    fn output(&self) -> TextureDescriptor {
        let format = match self.merged.get() {
            Some(merged) => merged.format(),
            None => self.processes.to_rgb.config().output_format(),
        };
        TextureDescriptor::new(self.target, format)
    }

    fn inputs(&self) -> FilterInputs {
        let mut inputs = FilterInputs::new();
        inputs.push(self.merged());
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
        format!(
            "composition luma {} chroma {} -> {}",
            self.luma.size(),
            self.chroma.size(),
            self.target
        )
    }

    fn as_resizeable(&self) -> Option<&dyn Resizeable> {
        Some(self)
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Some(self)
    }

    fn as_composition(&self) -> Option<&CompositionFilter> {
        Some(self)
    }
}

impl Taggable for CompositionFilter {
    fn enable_tag(&self) {}

    fn is_tagged(&self) -> bool {
        false
    }
}

impl Resizeable for CompositionFilter {
    fn set_size(&self, size: TextureSize) -> Filter {
        Filter::new(Self::from_parts(
            self.luma.clone(),
            self.chroma.clone(),
            size,
            self.chroma_offset,
            self.processes.clone(),
        ))
    }
}

/// Turns a composition into a single RGB filter.
pub trait ChromaScaler {
    /// Merge `composition` into one filter of its target size.
    fn scale_chroma(
        &self,
        ctx: &mut ChainContext<'_>,
        composition: &CompositionFilter,
    ) -> ChainResult<Filter>;
}

/// Resamples chroma to the target with the frame's chroma kernels and merges it with luma.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultChromaScaler;

impl DefaultChromaScaler {
    fn merge(composition: &CompositionFilter) -> Filter {
        let target = composition.target;
        let processes = &composition.processes;
        let chroma = Filter::new(ResizeFilter::new(
            composition.chroma.clone(),
            target,
            ResizeOptions {
                channels: TextureChannels::ChromaOnly,
                offset: composition.chroma_offset,
                upscaler: Some(processes.upscaler),
                downscaler: Some(processes.downscaler),
                ..ResizeOptions::default()
            },
        ));
        let luma = composition.luma.set_size(target, true);
        let yuv = processes.merge.apply(&luma, &[chroma]);
        yuv.apply(&processes.to_rgb)
    }
}

impl ChromaScaler for DefaultChromaScaler {
    fn scale_chroma(
        &self,
        _ctx: &mut ChainContext<'_>,
        composition: &CompositionFilter,
    ) -> ChainResult<Filter> {
        Ok(composition.merged())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/composition.rs"]
mod tests;
