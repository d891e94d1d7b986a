use std::{cell::Cell, rc::Rc};

use crate::{
    filter::{
        Filter, FilterInputs, FilterNode, OffsetCorrectable, Resizeable, Taggable,
        eval::RenderContext,
    },
    foundation::{
        core::{TextureChannels, TextureDescriptor, TextureFormat, TextureSize, Vec2},
        error::ChainResult,
    },
    shader::{backend::ResampleParams, scaler::Scaler},
    texture::SharedTexture,
};

/// How a [`ResizeFilter`] samples its input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResizeOptions {
    /// Channels written.
    pub channels: TextureChannels,
    /// Sampling offset in input texels.
    pub offset: Vec2,
    /// Kernel for enlarging. Backend default when absent.
    pub upscaler: Option<Scaler>,
    /// Kernel for shrinking. Backend default when absent.
    pub downscaler: Option<Scaler>,
    /// Kernel applied at unchanged size.
    pub convolver: Option<Scaler>,
    /// Output format. Input format when absent.
    pub format: Option<TextureFormat>,
}

impl ResizeOptions {
    /// Options with explicit up- and downscalers.
    pub fn scalers(upscaler: Scaler, downscaler: Scaler) -> Self {
        Self {
            upscaler: Some(upscaler),
            downscaler: Some(downscaler),
            ..Self::default()
        }
    }
}

/// Resamples its input to a target size.
///
/// An untagged resize whose target equals the input descriptor is a no-op and passes the input
/// texture through, unless it masks channels, shifts, convolves or corrects the offset.
pub struct ResizeFilter {
    input: Filter,
    target: TextureSize,
    options: Rc<ResizeOptions>,
    tagged: Cell<bool>,
    offset_correction: bool,
}

impl ResizeFilter {
    /// Resample `input` to `target`.
    pub fn new(input: Filter, target: TextureSize, options: ResizeOptions) -> Self {
        Self {
            input,
            target,
            options: Rc::new(options),
            tagged: Cell::new(false),
            offset_correction: false,
        }
    }

    fn derive(&self, target: TextureSize, offset_correction: bool) -> Self {
        Self {
            input: self.input.clone(),
            target,
            options: self.options.clone(),
            tagged: Cell::new(self.tagged.get()),
            offset_correction,
        }
    }

    /// The resampled filter.
    pub fn input(&self) -> &Filter {
        &self.input
    }

    /// Sampling options.
    pub fn options(&self) -> &ResizeOptions {
        &self.options
    }

    /// Whether the resample reproduces its input unchanged.
    pub fn is_noop(&self) -> bool {
        self.output() == self.input.output() && self.changes_nothing_at_same_size()
    }

    fn changes_nothing_at_same_size(&self) -> bool {
        self.options.convolver.is_none()
            && self.options.channels == TextureChannels::All
            && self.options.offset == Vec2::ZERO
            && !self.offset_correction
    }

    fn params(&self) -> ResampleParams {
        ResampleParams {
            channels: self.options.channels,
            offset: self.options.offset,
            upscaler: self.options.upscaler,
            downscaler: self.options.downscaler,
            convolver: self.options.convolver,
            offset_correction: self.offset_correction,
        }
    }
}

impl FilterNode for ResizeFilter {
    fn output(&self) -> TextureDescriptor {
        TextureDescriptor::new(
            self.target,
            self.options.format.unwrap_or(self.input.format()),
        )
    }

    fn inputs(&self) -> FilterInputs {
        let mut inputs = FilterInputs::new();
        inputs.push(self.input.clone());
        inputs
    }

    fn compute(
        &self,
        ctx: &mut RenderContext<'_>,
        inputs: &[SharedTexture],
    ) -> ChainResult<SharedTexture> {
        let input = &inputs[0];
        if !self.is_tagged() && self.is_noop() {
            return Ok(input.clone());
        }
        let out = ctx.rent(self.output())?;
        ctx.backend()
            .resample(input.value(), out.value(), &self.params())?;
        ctx.record_pass();
        Ok(out)
    }

    fn describe(&self) -> String {
        let mut s = format!("resize {} -> {}", self.input.size(), self.target);
        if self.options.channels != TextureChannels::All {
            s.push_str(&format!(" {:?}", self.options.channels));
        }
        if self.tagged.get() {
            s.push_str(" tagged");
        }
        s
    }

    fn as_resizeable(&self) -> Option<&dyn Resizeable> {
        Some(self)
    }

    fn as_offset_correctable(&self) -> Option<&dyn OffsetCorrectable> {
        Some(self)
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Some(self)
    }
}

impl Taggable for ResizeFilter {
    fn enable_tag(&self) {
        self.tagged.set(true);
    }

    fn is_tagged(&self) -> bool {
        self.tagged.get()
    }
}

impl Resizeable for ResizeFilter {
    fn set_size(&self, size: TextureSize) -> Filter {
        let elide = !self.is_tagged()
            && size == self.input.size()
            && self.options.format.is_none_or(|f| f == self.input.format())
            && self.changes_nothing_at_same_size();
        if elide {
            return self.input.clone();
        }
        Filter::new(self.derive(size, self.offset_correction))
    }
}

impl OffsetCorrectable for ResizeFilter {
    fn force_offset_correction(&self) -> Filter {
        Filter::new(self.derive(self.target, true))
    }
}

impl Filter {
    /// Same-size resample through `convolver`.
    pub fn convolve(&self, convolver: Scaler) -> Filter {
        self.resize(
            self.size(),
            ResizeOptions {
                convolver: Some(convolver),
                ..ResizeOptions::default()
            },
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/resize.rs"]
mod tests;
