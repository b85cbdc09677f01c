//! Character decoding of raw feed documents.
//!
//! Feeds arrive as bytes in whatever encoding the publisher chose. The
//! encoding is taken from, in order of precedence:
//!
//! 1. A byte order mark
//! 2. The `charset` parameter of the HTTP `Content-Type`
//! 3. The `encoding` attribute of the XML declaration
//! 4. UTF-8
//!
//! Labels follow the WHATWG Encoding Standard, so `ISO-8859-1` decodes as
//! windows-1252.

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Decodes `bytes` to text, using `charset` (a `Content-Type` parameter) when
/// it names a known encoding.
///
/// Malformed sequences become U+FFFD rather than failing the decode.
pub fn decode_document(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| known_encoding(label.as_bytes(), "Content-Type charset"))
        .or_else(|| declared_encoding(bytes))
        .unwrap_or(UTF_8);

    // BOM sniffing here overrides `encoding`
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(
            encoding = used.name(),
            "Feed contains malformed byte sequences, replaced"
        );
    }
    text.into_owned()
}

/// Encoding named by the XML declaration, if the document starts with one.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    match reader.read_event() {
        Ok(Event::Decl(decl)) => {
            let label = decl.encoding()?.ok()?;
            known_encoding(&label, "XML declaration")
        }
        _ => None,
    }
}

fn known_encoding(label: &[u8], origin: &str) -> Option<&'static Encoding> {
    let encoding = Encoding::for_label(label);
    if encoding.is_none() {
        tracing::debug!(
            label = %String::from_utf8_lossy(label),
            origin,
            "Unknown encoding label, ignoring"
        );
    }
    encoding
}

/// Extracts the `charset` parameter from a `Content-Type` value.
pub(crate) fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_owned())
            .filter(|v| !v.is_empty())
    })
}
