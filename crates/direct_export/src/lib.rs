//! Direct Export - persisted export settings for one-click re-export
//!
//! This crate provides:
//! - The `ExportSettings` record (schema version, last export path, format options)
//! - The XML codec that stores it as a `<DirectExport>` fragment
//! - Schema version comparison
//! - Reading and writing the fragment inside a document's `<abstract>` metadata
//!
//! Nothing here talks to the host application; callers hand in strings
//! and get strings back.

pub mod codec;
pub mod doc_info;
pub mod error;
pub mod escape;
pub mod settings;
pub mod version;

pub use codec::{decode, encode, is_valid_element_name};
pub use doc_info::{embed_fragment, extract_fragment};
pub use error::*;
pub use escape::FILL_COLOR_KEY;
pub use settings::{ExportSettings, ExportTarget, FormatOptions, NEVER_EXPORTED, UNSUPPORTED_SOURCE};
pub use version::{VersionCheck, SCHEMA_VERSION};
