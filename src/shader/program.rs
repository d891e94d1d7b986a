use std::{collections::BTreeMap, fmt, rc::Rc};

use xxhash_rust::xxh3::Xxh3;

use crate::{
    foundation::core::{TextureDescriptor, TextureFormat, TextureSize},
    shader::{arguments::ArgumentList, backend::ShaderHandle},
};

const XXH3_SEED: u64 = 0x5f3c_9d21_7e4b_a806;

/// A shader file plus the preprocessor defines it is compiled with.
///
/// Paths are logical (`"SuperRes/Diff.hlsl"`); locating the file is up to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShaderSource {
    /// Logical shader path.
    pub path: String,
    /// Preprocessor defines, ordered by name.
    pub defines: BTreeMap<String, String>,
}

impl ShaderSource {
    /// Source without defines.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            defines: BTreeMap::new(),
        }
    }

    /// Add a preprocessor define.
    pub fn define(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.defines.insert(name.into(), value.to_string());
        self
    }

    /// Value of a define, if set.
    pub fn define_value(&self, name: &str) -> Option<&str> {
        self.defines.get(name).map(String::as_str)
    }

    /// Stable 64-bit identity of path and defines.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        h.update(self.path.as_bytes());
        for (k, v) in &self.defines {
            h.update(&[0]);
            h.update(k.as_bytes());
            h.update(&[b'=']);
            h.update(v.as_bytes());
        }
        h.digest()
    }
}

impl fmt::Display for ShaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (k, v) in &self.defines {
            write!(f, " {k}={v}")?;
        }
        Ok(())
    }
}

/// Maps the first input's size to the shader output size.
pub type SizeTransform = Rc<dyn Fn(TextureSize) -> TextureSize>;

/// How to compile and run one shader pass.
#[derive(Clone)]
pub struct ShaderConfig {
    /// File and defines.
    pub source: ShaderSource,
    /// Parameters bound on every run.
    pub arguments: ArgumentList,
    /// Output size as a function of the first input size. Identity when absent.
    pub transform: Option<SizeTransform>,
    /// Output format. Intermediate default when absent.
    pub format: Option<TextureFormat>,
    /// Name used in graph descriptions.
    pub label: Option<String>,
}

impl ShaderConfig {
    /// Configuration for the shader at `path`.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            source: ShaderSource::new(path),
            arguments: ArgumentList::new(),
            transform: None,
            format: None,
            label: None,
        }
    }

    /// Add a preprocessor define.
    pub fn define(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.source = self.source.define(name, value);
        self
    }

    /// Replace the argument list.
    pub fn arguments(mut self, arguments: ArgumentList) -> Self {
        self.arguments = arguments;
        self
    }

    /// Set the output size transform.
    pub fn transform(mut self, transform: impl Fn(TextureSize) -> TextureSize + 'static) -> Self {
        self.transform = Some(Rc::new(transform));
        self
    }

    /// Set the output format.
    pub fn format(mut self, format: TextureFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the description label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Output size for a first input of size `input`.
    pub fn output_size(&self, input: TextureSize) -> TextureSize {
        match &self.transform {
            Some(t) => t(input),
            None => input,
        }
    }

    /// Output format.
    pub fn output_format(&self) -> TextureFormat {
        self.format.unwrap_or_default()
    }

    /// Label, falling back to the shader path.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.source.path)
    }
}

impl fmt::Debug for ShaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderConfig")
            .field("source", &self.source)
            .field("arguments", &self.arguments)
            .field("transform", &self.transform.is_some())
            .field("format", &self.format)
            .field("label", &self.label)
            .finish()
    }
}

/// A compiled shader ready to be applied to filters.
#[derive(Clone, Debug)]
pub struct Shader {
    handle: ShaderHandle,
    config: Rc<ShaderConfig>,
}

impl Shader {
    pub(crate) fn new(handle: ShaderHandle, config: ShaderConfig) -> Self {
        Self {
            handle,
            config: Rc::new(config),
        }
    }

    /// Backend handle.
    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    /// Configuration it was compiled from.
    pub fn config(&self) -> &ShaderConfig {
        &self.config
    }

    /// Same program with `arguments` layered over the configured ones.
    pub fn with_arguments(&self, arguments: &ArgumentList) -> Shader {
        let mut config = (*self.config).clone();
        config.arguments = config.arguments.merge(arguments);
        Shader::new(self.handle, config)
    }

    /// Same program with a different output size transform.
    pub fn with_transform(
        &self,
        transform: impl Fn(TextureSize) -> TextureSize + 'static,
    ) -> Shader {
        let config = (*self.config).clone().transform(transform);
        Shader::new(self.handle, config)
    }

    /// Output descriptor when the first input has size `input`.
    pub fn output_descriptor(&self, input: TextureSize) -> TextureDescriptor {
        TextureDescriptor::new(self.config.output_size(input), self.config.output_format())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/program.rs"]
mod tests;
