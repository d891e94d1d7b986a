use std::fmt;

pub use kurbo::Vec2;

/// Texture dimensions in pixels.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TextureSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextureSize {
    /// Create a size from `width` and `height`.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Return `true` when `self` is strictly smaller than `other` in at least one dimension.
    pub fn any_lt(self, other: Self) -> bool {
        self.width < other.width || self.height < other.height
    }

    /// Return `true` when `self` is smaller than or equal to `other` in at least one dimension.
    pub fn any_le(self, other: Self) -> bool {
        self.width <= other.width || self.height <= other.height
    }

    /// Return `true` when `self` fits inside `other` in both dimensions.
    pub fn all_le(self, other: Self) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Number of pixels covered by this size.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for TextureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for TextureSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Storage format of a texture.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    /// 8 bits per channel, normalized.
    Unorm8,
    /// 16 bits per channel, normalized.
    Unorm16,
    /// 16-bit floating point per channel. Default for intermediates.
    #[default]
    Float16,
    /// 32-bit floating point per channel.
    Float32,
}

impl TextureFormat {
    /// Bytes used by one RGBA pixel in this format.
    pub fn bytes_per_pixel(self) -> u64 {
        match self {
            Self::Unorm8 => 4,
            Self::Unorm16 | Self::Float16 => 8,
            Self::Float32 => 16,
        }
    }
}

/// Immutable `(size, format)` pair describing a texture without holding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TextureDescriptor {
    /// Dimensions in pixels.
    pub size: TextureSize,
    /// Pixel format.
    pub format: TextureFormat,
}

impl TextureDescriptor {
    /// Create a descriptor.
    pub const fn new(size: TextureSize, format: TextureFormat) -> Self {
        Self { size, format }
    }

    /// Same format, different size.
    pub fn with_size(self, size: TextureSize) -> Self {
        Self { size, ..self }
    }

    /// Same size, different format.
    pub fn with_format(self, format: TextureFormat) -> Self {
        Self { format, ..self }
    }

    /// Approximate storage footprint in bytes.
    pub fn byte_len(self) -> u64 {
        self.size.area().saturating_mul(self.format.bytes_per_pixel())
    }
}

impl fmt::Display for TextureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.size, self.format)
    }
}

/// Which channels a resample touches.
///
/// YUV data keeps luma in the first channel and chroma in the second and third.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TextureChannels {
    /// Every channel.
    #[default]
    All,
    /// First channel only.
    LumaOnly,
    /// Second and third channel only.
    ChromaOnly,
}

/// Backend-assigned identifier of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u64);

/// Opaque handle to a backend-owned texture.
///
/// Cloning the handle never copies pixels. Who may *use* the texture is governed by leases, not by
/// handle ownership.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Texture {
    id: TextureId,
    descriptor: TextureDescriptor,
}

impl Texture {
    /// Wrap a backend texture id. Only backends should call this.
    pub fn new(id: TextureId, descriptor: TextureDescriptor) -> Self {
        Self { id, descriptor }
    }

    /// Backend identifier.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Size and format of the texture.
    pub fn descriptor(&self) -> TextureDescriptor {
        self.descriptor
    }

    /// Texture dimensions.
    pub fn size(&self) -> TextureSize {
        self.descriptor.size
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
