//! Error types for membership-inference audits.

use std::path::PathBuf;

/// Errors that can occur while configuring, loading, or evaluating an audit.
#[derive(Debug, thiserror::Error)]
pub enum MiaError {
    /// A required configuration section is absent or malformed.
    #[error("configuration error: {msg}")]
    Configuration {
        /// Human-readable error description.
        msg: String,
    },

    /// A required input dataset file does not exist.
    #[error("missing file: {}", path.display())]
    MissingFile {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// Scores, labels, or weights violate their invariants.
    #[error("invalid input: {msg}")]
    InvalidInput {
        /// Human-readable error description.
        msg: String,
    },

    /// A score vector contains NaN or an infinity.
    #[error("non-finite score {value} at index {index} for method '{method}'")]
    NonFiniteScore {
        /// Method whose score vector is defective.
        method: String,
        /// Position of the first offending score.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// A delimited file could not be interpreted.
    #[error("parse error in {}: {msg}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Human-readable error description.
        msg: String,
    },

    /// Underlying filesystem failure.
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, MiaError>;

impl MiaError {
    /// Create a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Configuration { msg: msg.into() }
    }

    /// Create an invalid input error.
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput { msg: msg.into() }
    }

    /// Create a missing file error.
    pub fn missing<P: Into<PathBuf>>(path: P) -> Self {
        Self::MissingFile { path: path.into() }
    }

    /// Create a parse error for `path`.
    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Parse {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Wrap an I/O error with the path it occurred at.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the fatal configuration variant.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// True for the missing-file variant.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::MissingFile { .. })
    }
}
