//! Export panel controller
//!
//! Holds the export settings of the active document and implements what
//! the panel's two buttons do: pick a new export path, and re-export to
//! the stored one. Presentation is left to the caller, which reads
//! [`PanelState`] after each operation.

use crate::config::PanelConfig;
use crate::error::PanelResult;
use crate::filters::{complete_path, extension_of, filter_for_extension, NAME_FILTERS};
use crate::host::{HostDocument, PathPicker, PathRequest};
use direct_export::{
    decode, embed_fragment, encode, extract_fragment, CodecError, ExportSettings, ExportTarget,
    VersionCheck,
};
use std::path::Path;

const PICKER_TITLE: &str = "Export Image As";

/// What happened when a document was loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Settings were read from the document
    Loaded { version: VersionCheck },
    /// The document carries no settings
    NoConfiguration,
    /// The stored settings could not be read; defaults are in use
    Unreadable(CodecError),
    /// The document is not in the native format and cannot hold settings
    UnsupportedSource,
}

/// What happened when an export was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Re-exported to the stored path
    Exported { path: String },
    /// Exported to a newly chosen path, which is now stored
    PathSelected { path: String, saved: bool },
    /// The user closed the picker
    Cancelled,
    /// Exporting is not possible for this document
    Refused,
    /// The host exporter failed
    Failed { reason: String },
}

/// How the path field should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// Greyed-out "not exported yet" placeholder
    Placeholder,
    /// "Not a native file" notice
    Invalid,
    /// A real path
    Normal,
}

/// Everything the UI needs to draw the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub path_text: String,
    pub path_style: PathStyle,
    pub pick_visible: bool,
    pub export_visible: bool,
    pub version_warning: bool,
}

/// Headless controller behind the export panel
#[derive(Debug, Clone)]
pub struct ExportPanel {
    config: PanelConfig,
    settings: ExportSettings,
    version_warning: bool,
}

impl Default for ExportPanel {
    fn default() -> Self {
        Self::new(PanelConfig::default())
    }
}

impl ExportPanel {
    /// Create a panel with no document loaded
    pub fn new(config: PanelConfig) -> Self {
        let settings = fresh_settings(&config);
        Self {
            config,
            settings,
            version_warning: false,
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Settings of the active document
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Whether the stored settings came from a different version
    pub fn version_warning(&self) -> bool {
        self.version_warning
    }

    /// Current display state
    pub fn state(&self) -> PanelState {
        let (path_style, pick_visible, export_visible) = match self.settings.target() {
            ExportTarget::NeverExported => (PathStyle::Placeholder, true, false),
            ExportTarget::UnsupportedSource => (PathStyle::Invalid, false, false),
            ExportTarget::Path(_) => (PathStyle::Normal, true, true),
        };

        PanelState {
            path_text: self.settings.export_path.clone(),
            path_style,
            pick_visible,
            export_visible,
            version_warning: self.version_warning,
        }
    }

    /// Read the settings of a newly activated document
    pub fn load_document(&mut self, doc: &dyn HostDocument) -> LoadOutcome {
        self.version_warning = false;

        let file_name = doc.file_name().filter(|name| !name.is_empty());
        if !self.is_native_source(file_name.as_deref()) {
            tracing::info!("Not a native file, export settings unavailable");
            self.settings = ExportSettings::unsupported_source();
            self.settings.schema_version = self.config.schema_version.clone();
            return LoadOutcome::UnsupportedSource;
        }

        let doc_info = doc.document_info();
        let Some(fragment) = extract_fragment(&doc_info) else {
            tracing::debug!("Document info has no abstract section");
            self.settings = fresh_settings(&self.config);
            return LoadOutcome::NoConfiguration;
        };

        match decode(fragment) {
            Ok(settings) => {
                let version =
                    VersionCheck::compare(&settings.schema_version, &self.config.schema_version);
                if let VersionCheck::Mismatch { found, expected } = &version {
                    tracing::warn!(
                        "Config version mismatch. File: {}, Current: {}",
                        found,
                        expected
                    );
                }
                self.version_warning = version.needs_warning();
                self.settings = settings;

                tracing::info!(
                    "Loaded export settings (version {}): {}",
                    self.settings.schema_version,
                    self.settings.export_path
                );
                LoadOutcome::Loaded { version }
            }
            Err(CodecError::UnexpectedRoot(_)) => {
                tracing::debug!("File does not contain Direct Export configuration");
                self.settings = fresh_settings(&self.config);
                LoadOutcome::NoConfiguration
            }
            Err(e) => {
                tracing::warn!("Failed to read export settings, using defaults: {}", e);
                self.settings = fresh_settings(&self.config);
                LoadOutcome::Unreadable(e)
            }
        }
    }

    /// One-click export to the stored path
    ///
    /// Asks for a path first when the document was never exported.
    pub fn trigger_export(
        &mut self,
        doc: &mut dyn HostDocument,
        picker: &mut dyn PathPicker,
    ) -> PanelResult<ExportOutcome> {
        let path = match self.settings.target() {
            ExportTarget::NeverExported => return self.select_export_path(doc, picker),
            ExportTarget::UnsupportedSource => {
                tracing::warn!("Not a valid exporting format, the document must be native");
                return Ok(ExportOutcome::Refused);
            }
            ExportTarget::Path(path) => path.to_string(),
        };

        doc.set_batch_mode(true);
        let result = doc.export_image(&path, &self.settings.format_options);
        doc.set_batch_mode(false);

        match result {
            Ok(_) => {
                tracing::info!("Export successful: {}", path);
                Ok(ExportOutcome::Exported { path })
            }
            Err(e) => {
                tracing::warn!("Export to {} failed: {}", path, e);
                Ok(ExportOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Ask for a new export path, export there and store it in the document
    pub fn select_export_path(
        &mut self,
        doc: &mut dyn HostDocument,
        picker: &mut dyn PathPicker,
    ) -> PanelResult<ExportOutcome> {
        if self.settings.target() == ExportTarget::UnsupportedSource {
            return Ok(ExportOutcome::Refused);
        }

        let request = self.path_request(doc);
        let Some(selection) = picker.pick_export_path(&request) else {
            return Ok(ExportOutcome::Cancelled);
        };
        let path = complete_path(&selection.path, &selection.filter);

        let used_options = match doc.export_image(&path, &self.settings.format_options) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!("Export to {} failed: {}", path, e);
                return Ok(ExportOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };
        tracing::info!("Exported file: {}", path);

        self.settings.export_path = path.clone();
        self.settings.format_options = used_options;
        self.settings.schema_version = self.config.schema_version.clone();
        self.version_warning = false;

        let fragment = encode(&self.settings);
        let doc_info = embed_fragment(&doc.document_info(), &fragment)?;
        doc.set_document_info(doc_info);

        let has_file = doc.file_name().is_some_and(|name| !name.is_empty());
        let saved = if self.config.save_after_select && has_file {
            doc.save()?;
            tracing::info!("Document saved");
            true
        } else {
            tracing::info!("Document needs to be saved to keep the export settings");
            false
        };

        Ok(ExportOutcome::PathSelected { path, saved })
    }

    fn is_native_source(&self, file_name: Option<&str>) -> bool {
        match file_name.and_then(extension_of) {
            Some(ext) => self.config.is_native_extension(ext),
            // Unsaved documents and extensionless names may still become native files
            None => true,
        }
    }

    fn path_request(&self, doc: &dyn HostDocument) -> PathRequest {
        match self.settings.target() {
            ExportTarget::Path(last) => PathRequest {
                title: PICKER_TITLE,
                directory: Path::new(last)
                    .parent()
                    .map(|dir| dir.to_string_lossy().into_owned())
                    .filter(|dir| !dir.is_empty()),
                suggested_file: last.to_string(),
                filters: NAME_FILTERS,
                selected_filter: extension_of(last).and_then(filter_for_extension),
            },
            _ => PathRequest {
                title: PICKER_TITLE,
                directory: None,
                suggested_file: doc
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| doc.name()),
                filters: NAME_FILTERS,
                selected_filter: None,
            },
        }
    }
}

fn fresh_settings(config: &PanelConfig) -> ExportSettings {
    ExportSettings {
        schema_version: config.schema_version.clone(),
        ..ExportSettings::default()
    }
}
