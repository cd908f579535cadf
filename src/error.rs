//! Error types for configuration building and reads.

use thiserror::Error;

/// Errors surfaced while building a configuration tree or reading from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source document could not be parsed into a tree.
    #[error("malformed document: {0}")]
    Parse(String),

    /// A subtree reference could not be resolved during graft expansion.
    #[error("could not find {token:?} to graft at {key:?}[{index}]")]
    UnresolvedReference {
        token: String,
        key: String,
        index: usize,
    },

    /// A stored scalar could not be converted to the requested type.
    #[error("cannot convert {value:?} at {path:?} to {target}: {message}")]
    Conversion {
        path: String,
        value: String,
        target: &'static str,
        message: String,
    },

    /// Logging setup failed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}
