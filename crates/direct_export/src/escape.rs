//! Escaping rules for option values
//!
//! Every text node is escaped with quick-xml's escaper on write. Older
//! plugin releases escaped only the `transparencyFillcolor` option, by
//! hand, so its value gets one extra reverse pass on read.

use std::borrow::Cow;

/// Option key whose value carries a serialized colour document
pub const FILL_COLOR_KEY: &str = "transparencyFillcolor";

/// Escape a text node
pub fn escape_text(value: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(value)
}

/// The hand-written escape older releases applied to the fill colour
pub fn legacy_escape(value: &str) -> String {
    value
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Reverse of `legacy_escape`
pub fn legacy_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
}

/// Restore an option value after the XML reader has unescaped it
pub fn restore_option_value(key: &str, value: String) -> String {
    if key == FILL_COLOR_KEY && value.contains('&') {
        legacy_unescape(&value)
    } else {
        value
    }
}
