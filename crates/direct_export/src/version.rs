//! Schema version tagging

use crate::settings::ExportSettings;

/// Version tag written into every fragment this crate produces
pub const SCHEMA_VERSION: &str = "1.01";

/// Result of comparing a stored schema version with the running one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// Written by this version
    Current,
    /// Written by a different (older or newer) version
    Mismatch { found: String, expected: String },
}

impl VersionCheck {
    /// Compare by exact string equality
    pub fn compare(found: &str, expected: &str) -> Self {
        if found == expected {
            VersionCheck::Current
        } else {
            VersionCheck::Mismatch {
                found: found.to_string(),
                expected: expected.to_string(),
            }
        }
    }

    /// Whether the user should be told the stored settings are outdated
    pub fn needs_warning(&self) -> bool {
        matches!(self, VersionCheck::Mismatch { .. })
    }
}

impl ExportSettings {
    /// Compare the stored version with `SCHEMA_VERSION`
    pub fn version_check(&self) -> VersionCheck {
        VersionCheck::compare(&self.schema_version, SCHEMA_VERSION)
    }
}
