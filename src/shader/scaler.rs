use std::fmt;

/// Resampling kernel used by resize filters and the final blit.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// Point sampling.
    Nearest,
    /// Linear interpolation between the two nearest texels per axis.
    Bilinear,
    /// Cubic convolution.
    Bicubic {
        /// Sharpness of the cubic, `0.0` is B-spline soft, `1.0` is Catmull-Rom sharp.
        sharpness: f32,
        /// Clamp overshoot near hard edges.
        #[serde(default)]
        anti_ringing: bool,
    },
    /// Windowed sinc.
    Lanczos {
        /// Kernel radius in taps.
        taps: u8,
        /// Clamp overshoot near hard edges.
        #[serde(default)]
        anti_ringing: bool,
    },
}

impl Scaler {
    /// Default luma upscaler.
    pub const fn bicubic() -> Self {
        Self::Bicubic {
            sharpness: 0.75,
            anti_ringing: false,
        }
    }

    /// Short label used in graph descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic { .. } => "bicubic",
            Self::Lanczos { .. } => "lanczos",
        }
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self::bicubic()
    }
}

impl fmt::Display for Scaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest | Self::Bilinear => f.write_str(self.label()),
            Self::Bicubic { sharpness, .. } => write!(f, "bicubic({sharpness})"),
            Self::Lanczos { taps, .. } => write!(f, "lanczos{taps}"),
        }
    }
}
