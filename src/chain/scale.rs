use crate::{
    chain::{RenderChain, context::ChainContext},
    filter::{Filter, resize::ResizeOptions},
    foundation::error::ChainResult,
    shader::scaler::Scaler,
};

/// Resamples straight to the target size with fixed kernels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Scale {
    /// Kernel for enlarging.
    pub upscaler: Scaler,
    /// Kernel for shrinking.
    pub downscaler: Scaler,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            upscaler: Scaler::bicubic(),
            downscaler: Scaler::Bilinear,
        }
    }
}

impl RenderChain for Scale {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        if ctx.is_not_scaling_from(input.size()) {
            return Ok(input);
        }
        Ok(input.resize(
            ctx.target_size(),
            ResizeOptions::scalers(self.upscaler, self.downscaler),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/scale.rs"]
mod tests;
