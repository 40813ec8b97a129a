//! Settings codec - ExportSettings to and from the `<DirectExport>` fragment
//!
//! The fragment is a small XML document stored inside the CDATA section of
//! a document's `<abstract>` metadata:
//!
//! ```text
//! <DirectExport>
//!     <DirectExport_Version>1.01</DirectExport_Version>
//!     <deeExportPath>/tmp/out.png</deeExportPath>
//!     <exportSettings>
//!         <compression>9</compression>
//!     </exportSettings>
//! </DirectExport>
//! ```

use crate::error::{CodecError, CodecResult};
use crate::escape::{escape_text, restore_option_value};
use crate::settings::{ExportSettings, FormatOptions};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

/// Root element name
pub const ROOT_TAG: &str = "DirectExport";
/// Schema version element name
pub const VERSION_TAG: &str = "DirectExport_Version";
/// Export path element name
pub const PATH_TAG: &str = "deeExportPath";
/// Format options container element name
pub const OPTIONS_TAG: &str = "exportSettings";

/// Literal every fragment has to start with
const ROOT_MARKER: &str = "<DirectExport>";
const INDENT: &str = "    ";

/// Encode settings into a `<DirectExport>` fragment
///
/// Options whose key is not a valid XML element name are left out, since
/// they cannot be represented as an element.
pub fn encode(settings: &ExportSettings) -> String {
    let mut xml = String::new();
    xml.push_str(ROOT_MARKER);
    xml.push('\n');
    push_leaf(&mut xml, 1, VERSION_TAG, &settings.schema_version);
    push_leaf(&mut xml, 1, PATH_TAG, &settings.export_path);

    xml.push_str(INDENT);
    xml.push_str(&format!("<{}>\n", OPTIONS_TAG));
    for (key, value) in settings.format_options.iter() {
        if !is_valid_element_name(key) {
            tracing::warn!("Skipping export option with invalid name: {:?}", key);
            continue;
        }
        push_leaf(&mut xml, 2, key, value);
    }
    xml.push_str(INDENT);
    xml.push_str(&format!("</{}>\n", OPTIONS_TAG));

    xml.push_str(&format!("</{}>", ROOT_TAG));
    xml
}

/// Decode a `<DirectExport>` fragment
///
/// The stored version is not checked here; see
/// [`ExportSettings::version_check`].
pub fn decode(fragment: &str) -> CodecResult<ExportSettings> {
    if !fragment.starts_with(ROOT_MARKER) {
        return Err(CodecError::UnexpectedRoot(preview(fragment)));
    }
    FragmentParser::new(fragment).parse()
}

fn push_leaf(xml: &mut String, depth: usize, name: &str, value: &str) {
    for _ in 0..depth {
        xml.push_str(INDENT);
    }
    xml.push_str(&format!("<{}>{}</{}>\n", name, escape_text(value), name));
}

/// Check that `name` can be written as an element name without a namespace
pub fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn preview(fragment: &str) -> String {
    fragment.chars().take(32).collect()
}

/// Parser for the settings fragment
struct FragmentParser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> FragmentParser<'a> {
    fn new(xml: &'a str) -> Self {
        // Text is not trimmed: paths and option values keep their whitespace
        let reader = Reader::from_str(xml);
        Self { reader }
    }

    fn parse(&mut self) -> CodecResult<ExportSettings> {
        match self.reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == ROOT_TAG.as_bytes() => {}
            _ => return Err(CodecError::UnexpectedRoot(ROOT_TAG.to_string())),
        }

        let mut version = None;
        let mut path = None;
        let mut options = None;

        loop {
            match self.reader.read_event()? {
                Event::Start(ref e) => {
                    let name = element_name(e)?;
                    match name {
                        VERSION_TAG => version = Some(self.read_text()?),
                        PATH_TAG => path = Some(self.read_text()?),
                        OPTIONS_TAG => options = Some(self.read_options()?),
                        _ => {
                            tracing::debug!("Ignoring unknown settings element <{}>", name);
                            self.reader.read_to_end(e.name())?;
                        }
                    }
                }
                Event::Empty(ref e) => match element_name(e)? {
                    VERSION_TAG => version = Some(String::new()),
                    PATH_TAG => path = Some(String::new()),
                    OPTIONS_TAG => options = Some(FormatOptions::new()),
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {}
            }
        }

        self.expect_end_of_input()?;

        let schema_version =
            version.ok_or_else(|| CodecError::MissingField(VERSION_TAG.to_string()))?;
        let export_path = path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CodecError::MissingField(PATH_TAG.to_string()))?;

        Ok(ExportSettings {
            schema_version,
            export_path,
            format_options: options.unwrap_or_default(),
        })
    }

    /// Read the children of `<exportSettings>` up to its end tag
    fn read_options(&mut self) -> CodecResult<FormatOptions> {
        let mut options = FormatOptions::new();

        loop {
            match self.reader.read_event()? {
                Event::Start(ref e) => {
                    let key = element_name(e)?.to_string();
                    let value = self.read_text()?;
                    let value = restore_option_value(&key, value);
                    options.insert(key, value);
                }
                Event::Empty(ref e) => {
                    options.insert(element_name(e)?, "");
                }
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {}
            }
        }

        Ok(options)
    }

    /// Collect the text of the current element up to its end tag
    fn read_text(&mut self) -> CodecResult<String> {
        let mut value = String::new();

        loop {
            match self.reader.read_event()? {
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| CodecError::MalformedXml(e.to_string()))?;
                    value.push_str(&text);
                }
                Event::CData(ref e) => {
                    value.push_str(std::str::from_utf8(e.as_ref())?);
                }
                Event::Start(ref e) => {
                    // Nested markup is not part of a setting value
                    self.reader.read_to_end(e.name())?;
                }
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof()),
                _ => {}
            }
        }

        Ok(value)
    }

    /// Only whitespace, comments and processing instructions may follow the root
    fn expect_end_of_input(&mut self) -> CodecResult<()> {
        loop {
            match self.reader.read_event()? {
                Event::Eof => return Ok(()),
                Event::Text(ref e) if is_blank(e) => {}
                Event::Comment(_) | Event::PI(_) => {}
                _ => {
                    return Err(CodecError::MalformedXml(format!(
                        "content after </{}>",
                        ROOT_TAG
                    )))
                }
            }
        }
    }
}

fn element_name<'e>(e: &'e BytesStart<'_>) -> CodecResult<&'e str> {
    let name = std::str::from_utf8(e.name().into_inner())?;
    Ok(name)
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(|b| b.is_ascii_whitespace())
}

fn unexpected_eof() -> CodecError {
    CodecError::MalformedXml(format!("fragment ends before </{}>", ROOT_TAG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::FILL_COLOR_KEY;
    use crate::settings::NEVER_EXPORTED;
    use crate::version::SCHEMA_VERSION;
    use proptest::prelude::*;

    fn sample_settings() -> ExportSettings {
        let mut settings = ExportSettings::with_path("/tmp/out.png");
        settings.schema_version = "1.01".to_string();
        settings.format_options.insert("compression", "9");
        settings
    }

    #[test]
    fn test_encode_layout() {
        let xml = encode(&sample_settings());
        let expected = "<DirectExport>\n\
            \x20   <DirectExport_Version>1.01</DirectExport_Version>\n\
            \x20   <deeExportPath>/tmp/out.png</deeExportPath>\n\
            \x20   <exportSettings>\n\
            \x20       <compression>9</compression>\n\
            \x20   </exportSettings>\n\
            </DirectExport>";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_end_to_end_example() {
        let settings = sample_settings();
        let xml = encode(&settings);

        assert!(xml.contains("<DirectExport_Version>1.01</DirectExport_Version>"));
        assert!(xml.contains("<deeExportPath>/tmp/out.png</deeExportPath>"));
        let options_start = xml.find("<exportSettings>").unwrap();
        let options_end = xml.find("</exportSettings>").unwrap();
        let compression = xml.find("<compression>9</compression>").unwrap();
        assert!(options_start < compression && compression < options_end);

        assert_eq!(decode(&xml).unwrap(), settings);
    }

    #[test]
    fn test_fill_color_survives_roundtrip() {
        let mut settings = sample_settings();
        settings.format_options.insert(FILL_COLOR_KEY, r#"a<b>c"d"#);

        let xml = encode(&settings);
        assert!(xml.contains("<transparencyFillcolor>a&lt;b&gt;c&quot;d</transparencyFillcolor>"));

        let decoded = decode(&xml).unwrap();
        assert_eq!(decoded.format_options.get(FILL_COLOR_KEY), Some(r#"a<b>c"d"#));
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_other_values_are_escaped_too() {
        let mut settings = sample_settings();
        settings.format_options.insert("title", r#"Tom & "Jerry" <3"#);

        let xml = encode(&settings);
        assert!(!xml.contains("<3"));
        assert_eq!(decode(&xml).unwrap(), settings);
    }

    #[test]
    fn test_encoded_fragment_is_cdata_safe() {
        let mut settings = sample_settings();
        settings.format_options.insert("odd", "]]>");
        assert!(!encode(&settings).contains("]]>"));
    }

    #[test]
    fn test_order_preserved() {
        let mut settings = sample_settings();
        settings.format_options = FormatOptions::new();
        settings.format_options.insert("b", "2");
        settings.format_options.insert("a", "1");

        let xml = encode(&settings);
        assert!(xml.find("<b>").unwrap() < xml.find("<a>").unwrap());

        let decoded = decode(&xml).unwrap();
        assert_eq!(decoded.format_options.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_invalid_option_names_are_skipped() {
        let mut settings = sample_settings();
        settings.format_options.insert("has space", "1");
        settings.format_options.insert("1leading", "1");

        let decoded = decode(&encode(&settings)).unwrap();
        assert_eq!(decoded, sample_settings());
    }

    #[test]
    fn test_valid_element_names() {
        assert!(is_valid_element_name("compression"));
        assert!(is_valid_element_name("_private"));
        assert!(is_valid_element_name("forceSRGB"));
        assert!(is_valid_element_name("a.b-c_d"));
        assert!(!is_valid_element_name(""));
        assert!(!is_valid_element_name("9lives"));
        assert!(!is_valid_element_name("ns:tag"));
        assert!(!is_valid_element_name("a<b"));
    }

    #[test]
    fn test_rejects_other_root() {
        let result = decode("<NotDirectExport><deeExportPath>x</deeExportPath></NotDirectExport>");
        assert!(matches!(result, Err(CodecError::UnexpectedRoot(_))));

        let result = decode("  <DirectExport></DirectExport>");
        assert!(matches!(result, Err(CodecError::UnexpectedRoot(_))));

        assert!(matches!(decode(""), Err(CodecError::UnexpectedRoot(_))));
    }

    #[test]
    fn test_missing_path() {
        let xml = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>\
                   <exportSettings></exportSettings></DirectExport>";
        assert_eq!(
            decode(xml),
            Err(CodecError::MissingField(PATH_TAG.to_string()))
        );
    }

    #[test]
    fn test_empty_path_counts_as_missing() {
        let xml = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>\
                   <deeExportPath></deeExportPath></DirectExport>";
        assert_eq!(
            decode(xml),
            Err(CodecError::MissingField(PATH_TAG.to_string()))
        );

        let xml = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>\
                   <deeExportPath/></DirectExport>";
        assert_eq!(
            decode(xml),
            Err(CodecError::MissingField(PATH_TAG.to_string()))
        );
    }

    #[test]
    fn test_missing_version() {
        let xml = "<DirectExport><deeExportPath>/tmp/a.png</deeExportPath></DirectExport>";
        assert_eq!(
            decode(xml),
            Err(CodecError::MissingField(VERSION_TAG.to_string()))
        );
    }

    #[test]
    fn test_malformed_xml() {
        let unclosed = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>";
        assert!(matches!(decode(unclosed), Err(CodecError::MalformedXml(_))));

        let mismatched = "<DirectExport><deeExportPath>/a.png</wrong></DirectExport>";
        assert!(matches!(decode(mismatched), Err(CodecError::MalformedXml(_))));

        let raw_markup = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>\
                          <deeExportPath>/a.png</deeExportPath>\
                          <exportSettings><title>a<b</title></exportSettings></DirectExport>";
        assert!(matches!(decode(raw_markup), Err(CodecError::MalformedXml(_))));

        let trailing = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>\
                        <deeExportPath>/a.png</deeExportPath></DirectExport><extra/>";
        assert!(matches!(decode(trailing), Err(CodecError::MalformedXml(_))));
    }

    #[test]
    fn test_version_mismatch_is_not_an_error() {
        let xml = "<DirectExport>\n\
                   <DirectExport_Version>0.9</DirectExport_Version>\n\
                   <deeExportPath>/tmp/old.jpg</deeExportPath>\n\
                   <exportSettings><quality>80</quality></exportSettings>\n\
                   </DirectExport>";
        let settings = decode(xml).unwrap();

        assert_eq!(settings.schema_version, "0.9");
        assert_eq!(settings.export_path, "/tmp/old.jpg");
        assert_eq!(settings.format_options.get("quality"), Some("80"));
        assert!(settings.version_check().needs_warning());
    }

    #[test]
    fn test_missing_options_container_is_empty() {
        let xml = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>\
                   <deeExportPath>/tmp/a.png</deeExportPath></DirectExport>";
        let settings = decode(xml).unwrap();
        assert!(settings.format_options.is_empty());
    }

    #[test]
    fn test_legacy_fill_color_fragment() {
        // Written by 1.0, which escaped this value by hand
        let xml = "<DirectExport>\n\
        <DirectExport_Version>1.0</DirectExport_Version>\n\
        <deeExportPath>/home/user/out.png</deeExportPath>\n\
        <exportSettings>\n\
        <alpha>true</alpha>\n\
        <transparencyFillcolor>&lt;!DOCTYPE Color&gt;&lt;Color&gt;&lt;RGB g=&quot;1&quot; r=&quot;1&quot; b=&quot;1&quot;/&gt;&lt;/Color&gt;</transparencyFillcolor>\n\
    </exportSettings>\n\
</DirectExport>";

        let settings = decode(xml).unwrap();
        assert_eq!(
            settings.format_options.get(FILL_COLOR_KEY),
            Some(r#"<!DOCTYPE Color><Color><RGB g="1" r="1" b="1"/></Color>"#)
        );
        assert_eq!(settings.format_options.get("alpha"), Some("true"));
    }

    #[test]
    fn test_leaf_details() {
        let xml = "<DirectExport><DirectExport_Version>1.01</DirectExport_Version>\
                   <deeExportPath> /tmp/spaced name.png </deeExportPath>\
                   <unknown><deep>x</deep></unknown>\
                   <exportSettings>\
                   <empty/><blank></blank><cdata><![CDATA[<raw>]]></cdata>\
                   <nested>keep<inner>drop</inner></nested>\
                   <dup>1</dup><dup>2</dup>\
                   </exportSettings></DirectExport>";
        let settings = decode(xml).unwrap();

        assert_eq!(settings.export_path, " /tmp/spaced name.png ");
        let options = &settings.format_options;
        assert_eq!(options.get("empty"), Some(""));
        assert_eq!(options.get("blank"), Some(""));
        assert_eq!(options.get("cdata"), Some("<raw>"));
        assert_eq!(options.get("nested"), Some("keep"));
        assert_eq!(options.get("dup"), Some("2"));
        assert_eq!(
            options.keys().collect::<Vec<_>>(),
            vec!["empty", "blank", "cdata", "nested", "dup"]
        );
    }

    #[test]
    fn test_default_settings_roundtrip() {
        let settings = ExportSettings::default();
        let decoded = decode(&encode(&settings)).unwrap();
        assert_eq!(decoded.export_path, NEVER_EXPORTED);
        assert_eq!(decoded.schema_version, SCHEMA_VERSION);
        assert_eq!(decoded, settings);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            version in "[0-9]\\.[0-9]{1,2}",
            path in "[^\\x00-\\x1f]{1,40}",
            entries in proptest::collection::vec(
                ("[a-z][a-zA-Z0-9_]{0,12}", "[^\\x00-\\x1f]{0,24}"),
                0..6,
            ),
        ) {
            let settings = ExportSettings {
                schema_version: version,
                export_path: path,
                format_options: entries.into_iter().collect(),
            };
            prop_assert_eq!(decode(&encode(&settings)).unwrap(), settings);
        }
    }
}
