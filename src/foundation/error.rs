/// Convenience result type used across renderchain.
pub type ChainResult<T> = Result<T, ChainError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Programming errors (a lease taken on a disposed managed texture, a compute step producing a
/// texture that does not match its declared descriptor) are not represented here: they panic with
/// a `contract violation:` message.
#[derive(thiserror::Error, Debug)]
pub enum ChainError {
    /// Malformed chain settings or a missing shader source.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backend rejected a shader source.
    #[error("shader compilation failed for '{path}': {message}")]
    Compilation {
        /// Shader path as requested by the chain.
        path: String,
        /// Backend diagnostic.
        message: String,
    },

    /// Invalid sizes, descriptors or other caller-provided values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing settings documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The pool or backend cannot provide a required texture.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Wrapped lower-level error from the backend or dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChainError {
    /// Build a [`ChainError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`ChainError::Compilation`] value.
    pub fn compilation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compilation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Build a [`ChainError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChainError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`ChainError::ResourceExhausted`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Whether the per-frame driver may replace the failed graph with an on-screen message.
    ///
    /// Resource exhaustion and opaque backend failures propagate to the host instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Compilation { .. } | Self::Validation(_) | Self::Serde(_)
        )
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

/// Render an error and its source chain as a single message suitable for display.
pub fn error_message(err: &ChainError) -> String {
    let mut msg = format!("Error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.ends_with(&text) {
            msg.push_str("\n  caused by: ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
