//! Panel configuration
//!
//! The host may hand the panel a JSON object to override the defaults;
//! any field left out keeps its default value.

use crate::error::PanelResult;
use direct_export::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Configuration for an [`crate::ExportPanel`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PanelConfig {
    /// Version tag written with new settings and compared on load
    pub schema_version: String,
    /// File extensions of the host's native container format
    pub native_extensions: Vec<String>,
    /// Save the document right after a new export path is stored
    pub save_after_select: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            native_extensions: vec!["kra".to_string()],
            save_after_select: true,
        }
    }
}

impl PanelConfig {
    /// Parse a configuration from JSON, filling gaps with defaults
    pub fn from_json(json: &str) -> PanelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether `extension` belongs to the native format (case-insensitive)
    pub fn is_native_extension(&self, extension: &str) -> bool {
        self.native_extensions
            .iter()
            .any(|native| native.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PanelConfig::default();
        assert_eq!(config.schema_version, "1.01");
        assert_eq!(config.native_extensions, vec!["kra".to_string()]);
        assert!(config.save_after_select);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PanelConfig::from_json(r#"{"save_after_select": false}"#).unwrap();
        assert!(!config.save_after_select);
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert!(config.is_native_extension("kra"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(PanelConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_native_extension_ignores_case() {
        let config = PanelConfig::default();
        assert!(config.is_native_extension("KRA"));
        assert!(!config.is_native_extension("png"));
    }
}
