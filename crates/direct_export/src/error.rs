//! Error types for the direct_export crate

use thiserror::Error;

/// Errors that can occur while decoding a settings fragment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The fragment is not well-formed XML
    #[error("Malformed settings XML: {0}")]
    MalformedXml(String),

    /// A required element is absent (or empty where a value is required)
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The fragment does not start with the `<DirectExport>` marker
    #[error("Not a DirectExport fragment: {0}")]
    UnexpectedRoot(String),
}

impl From<quick_xml::Error> for CodecError {
    fn from(err: quick_xml::Error) -> Self {
        CodecError::MalformedXml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for CodecError {
    fn from(err: std::str::Utf8Error) -> Self {
        CodecError::MalformedXml(format!("UTF-8 error: {}", err))
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while rewriting the document-info metadata
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocInfoError {
    /// The document info has no `<abstract>` element to hold the fragment
    #[error("Document info has no <abstract> element")]
    AbstractNotFound,

    /// The fragment would terminate the surrounding CDATA section early
    #[error("Fragment contains a CDATA terminator")]
    UnsafeFragment,
}
