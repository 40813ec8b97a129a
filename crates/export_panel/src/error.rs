//! Error types for the export panel

use direct_export::DocInfoError;
use thiserror::Error;

/// Errors reported by the host application
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host exporter refused or failed to write the image
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// The document could not be saved
    #[error("Save failed: {0}")]
    SaveFailed(String),
}

/// Result type for host calls
pub type HostResult<T> = Result<T, HostError>;

/// Errors that can occur in panel operations
#[derive(Error, Debug)]
pub enum PanelError {
    /// The settings could not be written into the document metadata
    #[error("Document info error: {0}")]
    DocInfo(#[from] DocInfoError),

    /// A host call failed
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// The panel configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for panel operations
pub type PanelResult<T> = Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PanelError::from(HostError::SaveFailed("read-only".to_string()));
        assert_eq!(err.to_string(), "Host error: Save failed: read-only");

        let err = PanelError::from(DocInfoError::AbstractNotFound);
        assert!(matches!(err, PanelError::DocInfo(DocInfoError::AbstractNotFound)));
    }
}
