//! Export Panel - headless controller for one-click image re-export
//!
//! This crate drives the docking panel of the Direct Export extension:
//! - Loading a document's stored export settings when it becomes active
//! - Picking a new export path and storing it in the document metadata
//! - Re-exporting to the stored path with the stored format options
//!
//! The host application is reached only through the [`HostDocument`] and
//! [`PathPicker`] traits.

pub mod config;
pub mod error;
pub mod filters;
pub mod host;
pub mod panel;

pub use config::PanelConfig;
pub use error::*;
pub use filters::{complete_path, filter_extension, filter_for_extension, NAME_FILTERS};
pub use host::{HostDocument, PathPicker, PathRequest, PathSelection};
pub use panel::{ExportOutcome, ExportPanel, LoadOutcome, PanelState, PathStyle};
