use crate::{
    chain::{
        RenderChain,
        config::ChainConfig,
        context::ChainContext,
        nedi::Nedi,
        presets::{Preset, PresetGroup},
        scale::Scale,
    },
    filter::{Filter, resize::ResizeOptions},
    foundation::{
        core::{TextureFormat, TextureSize},
        error::ChainResult,
    },
    shader::{
        arguments::ArgumentList,
        builtin,
        program::{Shader, ShaderConfig},
        scaler::Scaler,
    },
};

/// Shader paths.
pub mod shaders {
    /// Difference between a downscaled estimate and the source.
    pub const DIFF: &str = "SuperRes/Diff.hlsl";
    /// Separable box downscale along `axis`.
    pub const DOWNSCALE: &str = "SuperRes/Downscale.hlsl";
    /// Separable downscale along `axis` fused with the difference to the source.
    pub const DOWNSCALE_AND_DIFF: &str = "SuperRes/DownscaleAndDiff.hlsl";
    /// Applies a residual to the estimate.
    pub const SUPER_RES: &str = "SuperRes/SuperRes.hlsl";
}

/// Iterative back-projection super-resolution.
///
/// A prescaler produces a first high-resolution estimate. Each pass downscales the estimate to
/// the source size, compares it with the source and pushes the difference back into the
/// estimate. Work happens in linear light; the last pass re-encodes to display gamma.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SuperRes {
    /// Chain producing the initial estimate.
    pub prescaler: PresetGroup,
    /// Number of refinement passes.
    pub passes: u32,
    /// Weight of the back-projected residual. `0` disables refinement.
    pub strength: f32,
    /// Residual smoothing. `0` compiles the smoothing out.
    pub softness: f32,
    /// Downscale through a generic bicubic resample plus a separate difference pass.
    pub legacy_downscaling: bool,
    /// Output size override. Frame target when absent.
    #[serde(skip)]
    pub target_size: Option<TextureSize>,
}

impl Default for SuperRes {
    fn default() -> Self {
        Self {
            prescaler: PresetGroup::new(
                "SuperRes Prescaler",
                vec![
                    Preset::new("NEDI", ChainConfig::Nedi(Nedi::default())),
                    Preset::new("Bicubic", ChainConfig::Scale(Scale::default())),
                ],
            ),
            passes: 2,
            strength: 1.0,
            softness: 0.0,
            legacy_downscaling: false,
            target_size: None,
        }
    }
}

struct Passes {
    diff: Shader,
    refine: Shader,
    final_refine: Shader,
    gamma_to_linear: Shader,
    linear_to_gamma: Shader,
    h_downscale: Shader,
    v_downscale_diff: Shader,
}

impl SuperRes {
    fn refine_config(&self, final_pass: bool) -> ShaderConfig {
        let mut config = ShaderConfig::file(shaders::SUPER_RES);
        if self.softness == 0.0 {
            config = config.define("SkipSoftening", 1);
        }
        if final_pass {
            config
                .define("FinalPass", 1)
                .arguments(ArgumentList::from_floats(&[self.strength]))
                .label("superres-final")
        } else {
            config
                .arguments(ArgumentList::from_floats(&[self.strength, self.softness]))
                .label("superres")
        }
    }

    fn compile(&self, ctx: &mut ChainContext<'_>, source: TextureSize) -> ChainResult<Passes> {
        Ok(Passes {
            diff: ctx.compile(
                ShaderConfig::file(shaders::DIFF)
                    .format(TextureFormat::Float16)
                    .label("superres-diff"),
            )?,
            refine: ctx.compile(self.refine_config(false))?,
            final_refine: ctx.compile(self.refine_config(true))?,
            gamma_to_linear: ctx.compile(builtin::gamma_to_linear())?,
            linear_to_gamma: ctx.compile(builtin::linear_to_gamma())?,
            h_downscale: ctx.compile(
                ShaderConfig::file(shaders::DOWNSCALE)
                    .define("axis", 0)
                    .transform(move |s| TextureSize::new(source.width, s.height))
                    .label("superres-h-downscale"),
            )?,
            v_downscale_diff: ctx.compile(
                ShaderConfig::file(shaders::DOWNSCALE_AND_DIFF)
                    .define("axis", 1)
                    .transform(move |s| TextureSize::new(s.width, source.height))
                    .format(TextureFormat::Float16)
                    .label("superres-v-downscale-diff"),
            )?,
        })
    }

    /// Refine `initial`, an upscaled version of `original`, against `original`.
    pub fn create_filter_from(
        &self,
        ctx: &mut ChainContext<'_>,
        original: Filter,
        initial: Filter,
    ) -> ChainResult<Filter> {
        let source = original.size();
        let target = self.target_size.unwrap_or(ctx.target_size());

        if self.strength == 0.0 {
            return Ok(initial);
        }

        let p = self.compile(ctx, source)?;

        if target.any_le(source) {
            return Ok(original);
        }

        let original_linear = original.apply(&p.gamma_to_linear);
        let mut estimate = if initial.same_node(&original) {
            original_linear.set_size(target, true)
        } else {
            initial
                .force_offset_correction()
                .set_size(target, false)
                .apply(&p.gamma_to_linear)
        };

        for i in 1..=self.passes {
            let residual = if self.legacy_downscaling {
                let low = estimate.resize(
                    source,
                    ResizeOptions {
                        downscaler: Some(Scaler::bicubic()),
                        ..ResizeOptions::default()
                    },
                );
                p.diff.apply(&low, &[original_linear.clone()])
            } else {
                let h_mean = estimate.apply(&p.h_downscale);
                p.v_downscale_diff
                    .apply(&h_mean, &[original_linear.clone()])
            };
            let refine = if i == self.passes {
                &p.final_refine
            } else {
                &p.refine
            };
            estimate = refine.apply(&estimate, &[residual]);
        }

        if self.passes == 0 {
            estimate = estimate.apply(&p.linear_to_gamma);
        }
        Ok(estimate)
    }
}

impl RenderChain for SuperRes {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        match self.prescaler.selected() {
            None => Ok(input),
            Some(prescaler) => {
                let initial = prescaler.create_filter(ctx, input.clone())?;
                self.create_filter_from(ctx, input, initial)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/super_res.rs"]
mod tests;
