//! Host application seams
//!
//! The panel never reaches for a global application object. Whoever owns
//! the active document passes it in, together with something that can ask
//! the user for a file path.

use crate::error::HostResult;
use direct_export::FormatOptions;

/// The host-side document the panel works on
pub trait HostDocument {
    /// Full file name on disk, `None` when the document was never saved
    fn file_name(&self) -> Option<String>;

    /// Display name, used as the suggested file name for unsaved documents
    fn name(&self) -> String;

    /// The document-info metadata XML
    fn document_info(&self) -> String;

    /// Replace the document-info metadata XML
    fn set_document_info(&mut self, info: String);

    /// Export the image to `path`
    ///
    /// Returns the options the exporter actually used, which may include
    /// defaults it filled in.
    fn export_image(&mut self, path: &str, options: &FormatOptions) -> HostResult<FormatOptions>;

    /// Save the document to its current file name
    fn save(&mut self) -> HostResult<()>;

    /// Suppress (or restore) the host's interactive export dialogs
    fn set_batch_mode(&mut self, _enabled: bool) {}
}

/// What the panel asks the path picker to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    /// Dialog title
    pub title: &'static str,
    /// Directory to open in
    pub directory: Option<String>,
    /// File name or path to preselect
    pub suggested_file: String,
    /// Name filters to offer
    pub filters: &'static [&'static str],
    /// Filter to preselect
    pub selected_filter: Option<&'static str>,
}

/// The user's answer to a [`PathRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSelection {
    /// Chosen path, possibly without an extension
    pub path: String,
    /// Name filter that was active when the path was chosen
    pub filter: String,
}

/// Asks the user where to export
pub trait PathPicker {
    /// Show the picker; `None` when the user cancels
    fn pick_export_path(&mut self, request: &PathRequest) -> Option<PathSelection>;
}
