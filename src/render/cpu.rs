use std::{collections::HashMap, rc::Rc};

use image::{Rgba, Rgba32FImage};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    foundation::{
        core::{Texture, TextureDescriptor, TextureId},
        error::{ChainError, ChainResult},
    },
    render::kernels,
    shader::{
        arguments::ArgumentList,
        backend::{ResampleParams, ShaderBackend, ShaderHandle, TextureAllocator},
        program::ShaderSource,
    },
};

/// Options for the CPU reference backend.
#[derive(Debug, Clone, Copy)]
pub struct CpuBackendOpts {
    /// Upper bound on the bytes of all live textures. Unbounded when `None`.
    pub max_texture_bytes: Option<u64>,
    /// Color used to fill text targets.
    pub text_rgba: [f32; 4],
}

impl Default for CpuBackendOpts {
    fn default() -> Self {
        Self {
            max_texture_bytes: None,
            text_rgba: [0.8, 0.1, 0.1, 1.0],
        }
    }
}

impl CpuBackendOpts {
    /// Return options with a byte budget for live textures.
    pub fn with_max_texture_bytes(mut self, max: Option<u64>) -> Self {
        self.max_texture_bytes = max;
        self
    }
}

/// Counters reported by [`CpuBackend::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuBackendStats {
    /// Textures currently allocated.
    pub live_textures: usize,
    /// Bytes of the allocated textures, by descriptor.
    pub live_bytes: u64,
    /// Textures created since construction.
    pub created: u64,
    /// Textures destroyed since construction.
    pub destroyed: u64,
    /// Programs compiled.
    pub compiled: u64,
    /// Shader runs.
    pub runs: u64,
    /// Resample and scale passes.
    pub resamples: u64,
}

/// What a kernel sees when its shader runs.
pub struct KernelArgs<'a> {
    /// Input images in binding order.
    pub inputs: &'a [&'a Rgba32FImage],
    /// Arguments bound for this run.
    pub arguments: &'a ArgumentList,
    /// Path and defines the shader was compiled with.
    pub source: &'a ShaderSource,
}

/// CPU implementation of a shader: fills every texel of the output.
pub type CpuKernel = Rc<dyn Fn(&KernelArgs<'_>, &mut Rgba32FImage) -> ChainResult<()>>;

struct CpuTexture {
    descriptor: TextureDescriptor,
    pixels: Rgba32FImage,
}

/// Backend that executes every pass on the CPU with `f32` RGBA images.
///
/// Shaders are resolved by path against a kernel registry that ships with reference kernels for
/// the built-in chains. Hosts and tests can register more with [`CpuBackend::register_kernel`].
pub struct CpuBackend {
    opts: CpuBackendOpts,
    textures: HashMap<TextureId, CpuTexture>,
    next_id: u64,
    kernels: HashMap<String, CpuKernel>,
    programs: Vec<(ShaderSource, CpuKernel)>,
    runs_by_path: HashMap<String, u64>,
    messages: Vec<String>,
    stats: CpuBackendStats,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new(CpuBackendOpts::default())
    }
}

impl CpuBackend {
    /// Backend with the built-in kernels registered.
    pub fn new(opts: CpuBackendOpts) -> Self {
        let mut backend = Self {
            opts,
            textures: HashMap::new(),
            next_id: 1,
            kernels: HashMap::new(),
            programs: Vec::new(),
            runs_by_path: HashMap::new(),
            messages: Vec::new(),
            stats: CpuBackendStats::default(),
        };
        kernels::register_builtin(&mut backend);
        backend
    }

    /// Register (or replace) the kernel executed for shaders at `path`.
    ///
    /// Programs compiled before the call keep their kernel.
    pub fn register_kernel(
        &mut self,
        path: impl Into<String>,
        kernel: impl Fn(&KernelArgs<'_>, &mut Rgba32FImage) -> ChainResult<()> + 'static,
    ) {
        self.kernels.insert(path.into(), Rc::new(kernel));
    }

    /// Create a texture holding `pixels`. Its size must match `descriptor`.
    pub fn upload(
        &mut self,
        descriptor: TextureDescriptor,
        pixels: Rgba32FImage,
    ) -> ChainResult<Texture> {
        if pixels.dimensions() != (descriptor.size.width, descriptor.size.height) {
            return Err(ChainError::validation(format!(
                "uploaded image is {}x{} but the texture is {}",
                pixels.width(),
                pixels.height(),
                descriptor.size
            )));
        }
        let texture = self.create_texture(&descriptor)?;
        if let Some(slot) = self.textures.get_mut(&texture.id()) {
            slot.pixels = pixels;
        }
        Ok(texture)
    }

    /// Contents of a live texture.
    pub fn pixels(&self, texture: &Texture) -> Option<&Rgba32FImage> {
        self.textures.get(&texture.id()).map(|t| &t.pixels)
    }

    /// Texel at `(x, y)` of a live texture.
    pub fn pixel(&self, texture: &Texture, x: u32, y: u32) -> Option<[f32; 4]> {
        self.pixels(texture)
            .filter(|p| x < p.width() && y < p.height())
            .map(|p| p.get_pixel(x, y).0)
    }

    /// Whether `texture` is currently allocated on this backend.
    pub fn is_live(&self, texture: &Texture) -> bool {
        self.textures.contains_key(&texture.id())
    }

    /// Messages rendered by [`ShaderBackend::render_text`], oldest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Number of runs of shaders compiled from `path`.
    pub fn runs_of(&self, path: &str) -> u64 {
        self.runs_by_path.get(path).copied().unwrap_or(0)
    }

    /// Current counters.
    pub fn stats(&self) -> CpuBackendStats {
        CpuBackendStats {
            live_textures: self.textures.len(),
            live_bytes: self.live_bytes(),
            ..self.stats
        }
    }

    fn live_bytes(&self) -> u64 {
        self.textures.values().map(|t| t.descriptor.byte_len()).sum()
    }

    fn take_output(&mut self, output: &Texture) -> ChainResult<CpuTexture> {
        self.textures
            .remove(&output.id())
            .ok_or_else(|| missing(output))
    }
}

fn missing(texture: &Texture) -> ChainError {
    ChainError::validation(format!(
        "texture {} ({}) is not allocated on this backend",
        texture.id().0,
        texture.descriptor()
    ))
}

fn gather<'t>(
    textures: &'t HashMap<TextureId, CpuTexture>,
    inputs: &[&Texture],
) -> ChainResult<SmallVec<[&'t Rgba32FImage; 4]>> {
    inputs
        .iter()
        .map(|t| {
            textures
                .get(&t.id())
                .map(|c| &c.pixels)
                .ok_or_else(|| missing(t))
        })
        .collect()
}

impl TextureAllocator for CpuBackend {
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> ChainResult<Texture> {
        if descriptor.size.is_empty() {
            return Err(ChainError::validation(format!(
                "cannot allocate empty texture {descriptor}"
            )));
        }
        if let Some(max) = self.opts.max_texture_bytes {
            let needed = self.live_bytes() + descriptor.byte_len();
            if needed > max {
                return Err(ChainError::resource(format!(
                    "allocating {descriptor} needs {needed} bytes, budget is {max}"
                )));
            }
        }

        let id = TextureId(self.next_id);
        self.next_id += 1;
        let pixels = Rgba32FImage::new(descriptor.size.width, descriptor.size.height);
        self.textures.insert(
            id,
            CpuTexture {
                descriptor: *descriptor,
                pixels,
            },
        );
        self.stats.created += 1;
        Ok(Texture::new(id, *descriptor))
    }

    fn destroy_texture(&mut self, texture: Texture) {
        if self.textures.remove(&texture.id()).is_some() {
            self.stats.destroyed += 1;
        } else {
            warn!(texture = texture.id().0, "destroying unknown texture");
        }
    }
}

impl ShaderBackend for CpuBackend {
    fn compile(&mut self, source: &ShaderSource) -> ChainResult<ShaderHandle> {
        let kernel = self.kernels.get(&source.path).cloned().ok_or_else(|| {
            ChainError::compilation(&source.path, "no CPU kernel registered for this shader")
        })?;
        let handle = ShaderHandle(self.programs.len() as u64);
        self.programs.push((source.clone(), kernel));
        self.stats.compiled += 1;
        debug!(shader = %source, handle = handle.0, "compiled cpu kernel");
        Ok(handle)
    }

    fn run(
        &mut self,
        shader: ShaderHandle,
        inputs: &[&Texture],
        arguments: &ArgumentList,
        output: &Texture,
    ) -> ChainResult<()> {
        let (source, kernel) = usize::try_from(shader.0)
            .ok()
            .and_then(|i| self.programs.get(i))
            .cloned()
            .ok_or_else(|| ChainError::validation(format!("unknown shader handle {}", shader.0)))?;

        let mut out = self.take_output(output)?;
        let result = gather(&self.textures, inputs).and_then(|images| {
            kernel(
                &KernelArgs {
                    inputs: &images,
                    arguments,
                    source: &source,
                },
                &mut out.pixels,
            )
        });
        self.textures.insert(output.id(), out);
        result?;

        self.stats.runs += 1;
        *self.runs_by_path.entry(source.path).or_default() += 1;
        Ok(())
    }

    fn resample(
        &mut self,
        input: &Texture,
        output: &Texture,
        params: &ResampleParams,
    ) -> ChainResult<()> {
        let mut out = self.take_output(output)?;
        let result = gather(&self.textures, &[input])
            .map(|images| kernels::resample(images[0], &mut out.pixels, params));
        self.textures.insert(output.id(), out);
        result?;
        self.stats.resamples += 1;
        Ok(())
    }

    fn render_text(&mut self, text: &str, output: &Texture) -> ChainResult<()> {
        let color = Rgba(self.opts.text_rgba);
        let slot = self
            .textures
            .get_mut(&output.id())
            .ok_or_else(|| missing(output))?;
        for p in slot.pixels.pixels_mut() {
            *p = color;
        }
        self.messages.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
