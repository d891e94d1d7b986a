use crate::{
    chain::{RenderChain, context::ChainContext},
    filter::Filter,
    foundation::{core::TextureSize, error::ChainResult},
    shader::{arguments::ArgumentList, program::ShaderConfig},
};

/// Rec. 709 luma weights passed to the interpolation passes.
pub const LUMA_CONSTANTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Shader paths.
pub mod shaders {
    /// First diagonal interpolation pass.
    pub const NEDI_I: &str = "Nedi/NEDI-I.hlsl";
    /// Second diagonal interpolation pass.
    pub const NEDI_II: &str = "Nedi/NEDI-II.hlsl";
    /// Interleaves source and interpolated columns.
    pub const H_INTERLEAVE: &str = "Nedi/NEDI-HInterleave.hlsl";
    /// Interleaves source and interpolated rows.
    pub const V_INTERLEAVE: &str = "Nedi/NEDI-VInterleave.hlsl";
}

/// New edge-directed interpolation: doubles the image in both dimensions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Nedi {
    /// Double even when the target is not larger than the input.
    pub always_double_image: bool,
    /// Keep source pixels centered, producing `2n - 1` instead of `2n` samples per axis.
    pub centered: bool,
}

impl Default for Nedi {
    fn default() -> Self {
        Self {
            always_double_image: false,
            centered: true,
        }
    }
}

impl Nedi {
    /// Output size after interleaving columns.
    pub fn double_width(&self, s: TextureSize) -> TextureSize {
        TextureSize::new(double(s.width, self.centered), s.height)
    }

    /// Output size after interleaving rows.
    pub fn double_height(&self, s: TextureSize) -> TextureSize {
        TextureSize::new(s.width, double(s.height, self.centered))
    }

    fn use_nedi(&self, ctx: &ChainContext<'_>, size: TextureSize) -> bool {
        if size.is_empty() {
            return false;
        }
        self.always_double_image || ctx.is_upscaling_from(size)
    }
}

fn double(n: u32, centered: bool) -> u32 {
    if centered {
        n.saturating_mul(2).saturating_sub(1)
    } else {
        n.saturating_mul(2)
    }
}

impl RenderChain for Nedi {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        let luma = ArgumentList::from_floats(&LUMA_CONSTANTS);
        let (wide, tall) = (self.clone(), self.clone());

        let nedi1 = ctx.compile(
            ShaderConfig::file(shaders::NEDI_I)
                .arguments(luma.clone())
                .label("nedi-I"),
        )?;
        let nedi2 = ctx.compile(
            ShaderConfig::file(shaders::NEDI_II)
                .arguments(luma)
                .label("nedi-II"),
        )?;
        let h_interleave = ctx.compile(
            ShaderConfig::file(shaders::H_INTERLEAVE)
                .transform(move |s| wide.double_width(s))
                .label("nedi-h-interleave"),
        )?;
        let v_interleave = ctx.compile(
            ShaderConfig::file(shaders::V_INTERLEAVE)
                .transform(move |s| tall.double_height(s))
                .label("nedi-v-interleave"),
        )?;

        if !self.use_nedi(ctx, input.size()) {
            return Ok(input);
        }

        let nedi1 = nedi1.apply(&input, &[]);
        let h = h_interleave.apply(&input, &[nedi1]);
        let nedi2 = nedi2.apply(&h, &[]);
        Ok(v_interleave.apply(&h, &[nedi2]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/nedi.rs"]
mod tests;
