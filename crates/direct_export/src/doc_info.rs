//! Document-info metadata wrapper
//!
//! The host stores free-text document metadata as a small XML document.
//! The settings fragment lives in the CDATA section of its `<abstract>`
//! element, which keeps it out of the way of the other fields.

use crate::error::DocInfoError;
use regex_lite::Regex;
use std::sync::OnceLock;

fn cdata_abstract() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)<abstract(?:\s[^>]*)?>\s*<!\[CDATA\[(.*?)\]\]>\s*</abstract>").ok())
        .as_ref()
}

fn any_abstract() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)<abstract(?:\s[^>]*?)?(?:/>|>.*?</abstract>)").ok())
        .as_ref()
}

/// Return the CDATA content of the `<abstract>` element, if there is one
///
/// The content is returned as-is; whether it is a settings fragment is for
/// [`crate::decode`] to decide.
pub fn extract_fragment(doc_info: &str) -> Option<&str> {
    cdata_abstract()?
        .captures(doc_info)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replace the first `<abstract>` element with one holding `fragment` as CDATA
pub fn embed_fragment(doc_info: &str, fragment: &str) -> Result<String, DocInfoError> {
    if fragment.contains("]]>") {
        return Err(DocInfoError::UnsafeFragment);
    }

    let found = any_abstract()
        .and_then(|re| re.find(doc_info))
        .ok_or(DocInfoError::AbstractNotFound)?;

    let mut updated = String::with_capacity(doc_info.len() + fragment.len() + 32);
    updated.push_str(&doc_info[..found.start()]);
    updated.push_str("<abstract><![CDATA[");
    updated.push_str(fragment);
    updated.push_str("]]></abstract>");
    updated.push_str(&doc_info[found.end()..]);
    Ok(updated)
}
