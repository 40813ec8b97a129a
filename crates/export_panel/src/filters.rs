//! Export name filters
//!
//! The filters offered by the export path picker, and the helpers that
//! map between file extensions and filters.

use regex_lite::Regex;
use std::sync::OnceLock;

/// Name filters in the order the picker shows them
pub const NAME_FILTERS: &[&str] = &[
    "All Files (*.*)",
    "PNG image (*.png)",
    "TGA image (*.tga *.icb *.tpic *.vda *.vst)",
    "Windows BMP image (*.bmp *.dib)",
    "JPEG image (*.jpg *.jpeg *.jpe)",
    "OpenRaster Image (*.ora)",
    "OpenEXR (Extended) (*.exr)",
    "AVIF Image (*.avif)",
    "CSV Document (*.csv)",
    "EXR image (*.exr)",
    "GIF image (*.gif)",
    "Gimp Brush (*.gbr *.vbr)",
    "Gimp Image Hose Brush (*.gih)",
    "HEIC/HEIF Image (*.heic *.heif)",
    "JPEG-XL Image (*.jxl)",
    "Krita Archival Image Format (*.krz)",
    "Krita Brush Preset (*.kpp)",
    "PBM image (*.pbm)",
    "PGM image (*.pgm)",
    "PPM image (*.ppm)",
    "Photoshop image (*.psd)",
    "Qt Markup Language file (*.qml *.qmltypes *.qmlproject)",
    "R16 Heightmap (*.r16)",
    "R32 Heightmap (*.r32)",
    "R8 Heightmap (*.r8)",
    "RAW Spriter SCML (*.scml)",
    "TIFF image (*.tif *.tiff)",
    "WebP image (*.webp)",
    "Windows icon (*.ico)",
    "XBM image (*.xbm)",
];

fn extension_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\*\.(\w+)").ok())
        .as_ref()
}

/// All extensions a filter lists, in order
pub fn filter_extensions(filter: &str) -> Vec<&str> {
    match extension_pattern() {
        Some(re) => re
            .captures_iter(filter)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect(),
        None => Vec::new(),
    }
}

/// The extension appended when the user types a name without one
pub fn filter_extension(filter: &str) -> Option<&str> {
    filter_extensions(filter).into_iter().next()
}

/// The first filter that lists `extension` (case-insensitive)
pub fn filter_for_extension(extension: &str) -> Option<&'static str> {
    NAME_FILTERS.iter().copied().find(|filter| {
        filter_extensions(filter)
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    })
}

/// Final path component, for either separator style
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Extension of the final path component, if it has one
pub fn extension_of(path: &str) -> Option<&str> {
    file_name_of(path).rsplit_once('.').map(|(_, ext)| ext)
}

/// Append the filter's extension to `path` when its file name has none
pub fn complete_path(path: &str, filter: &str) -> String {
    if file_name_of(path).contains('.') {
        return path.to_string();
    }
    match filter_extension(filter) {
        Some(ext) => format!("{}.{}", path, ext),
        None => path.to_string(),
    }
}
