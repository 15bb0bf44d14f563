use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the diag-xml library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Source file does not exist.
    #[error("Input file '{path}' not found")]
    InputNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A line that does not split into the expected tab-separated fields.
    #[error("Malformed record at line {line}: expected 2 tab-separated fields, found {fields}: {content:?}")]
    MalformedRecord {
        /// 1-based line number
        line: usize,
        /// Raw line content without its terminator
        content: String,
        /// Number of fields the line split into
        fields: usize,
    },

    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Invalid UTF-8 encountered in the input file.
    #[error("Invalid UTF-8 encoding in file '{path}'. The input must be UTF-8 text.")]
    InvalidUtf8 {
        /// Path to file with encoding issues
        path: PathBuf,
    },

    /// XML serialization or parsing error.
    #[error("XML error: {message}")]
    Xml {
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Written document does not read back to the expected records.
    #[error("Verification failed: {message}")]
    Verification {
        /// What did not match
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    ///
    /// A `NotFound` error becomes [`Error::InputNotFound`] and an `InvalidData`
    /// error becomes [`Error::InvalidUtf8`]; use [`Error::io_write`] for the
    /// output side where those mappings do not apply.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::InputNotFound { path: path.into() },
            std::io::ErrorKind::InvalidData => Self::InvalidUtf8 { path: path.into() },
            _ => Self::io_write(path, source),
        }
    }

    /// Creates a plain IO error with path context.
    #[must_use]
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a malformed record error.
    #[must_use]
    pub fn malformed(line: usize, content: impl Into<String>, fields: usize) -> Self {
        Self::MalformedRecord {
            line,
            content: content.into(),
            fields,
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an XML error.
    #[must_use]
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Creates a verification error.
    #[must_use]
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }

    /// Returns true if the input file was missing.
    #[must_use]
    pub const fn is_input_not_found(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }

    /// Returns true if this is a malformed record error.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::xml(e.to_string())
    }
}
