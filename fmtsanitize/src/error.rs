//! All error types for the fmtsanitize crate.
//!
//! Returned from fallible operations: document parsing, serialization and
//! configuration loading. Normalizing plain text never fails.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates a new malformed document error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedDocument(message.into())
    }

    /// Whether this error came from reading the markup, as opposed to writing it.
    ///
    /// Parse-side errors are recoverable for a rewrite: the document is passed
    /// through untouched.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::XmlParse(_) | Error::MalformedDocument(_))
    }
}
