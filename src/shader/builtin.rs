//! Logical paths and configurations of the shaders the engine itself relies on.
//!
//! Every backend is expected to provide these.

use crate::shader::program::ShaderConfig;

/// Merges a luma texture (first channel) with a chroma texture (second and third channel).
pub const MERGE_Y_UV: &str = "Common/MergeY_UV.hlsl";
/// Converts YUV to RGB.
pub const YUV_TO_RGB: &str = "Common/YuvToRgb.hlsl";
/// Converts RGB to YUV.
pub const RGB_TO_YUV: &str = "Common/RgbToYuv.hlsl";
/// Decodes display gamma to linear light.
pub const GAMMA_TO_LINEAR: &str = "Common/GammaToLinear.hlsl";
/// Encodes linear light to display gamma.
pub const LINEAR_TO_GAMMA: &str = "Common/LinearToGamma.hlsl";

/// Luma/chroma merge pass.
pub fn merge_y_uv() -> ShaderConfig {
    ShaderConfig::file(MERGE_Y_UV).label("merge-y-uv")
}

/// YUV to RGB conversion pass.
pub fn yuv_to_rgb() -> ShaderConfig {
    ShaderConfig::file(YUV_TO_RGB).label("yuv-to-rgb")
}

/// RGB to YUV conversion pass.
pub fn rgb_to_yuv() -> ShaderConfig {
    ShaderConfig::file(RGB_TO_YUV).label("rgb-to-yuv")
}

/// Gamma decode pass.
pub fn gamma_to_linear() -> ShaderConfig {
    ShaderConfig::file(GAMMA_TO_LINEAR).label("gamma-to-linear")
}

/// Gamma encode pass.
pub fn linear_to_gamma() -> ShaderConfig {
    ShaderConfig::file(LINEAR_TO_GAMMA).label("linear-to-gamma")
}
