//! Input decoding helpers.

use std::borrow::Cow;

/// Decode clipboard or file bytes to a string.
///
/// UTF-8 is tried first (a BOM is handled by encoding_rs). Malformed input
/// is retried with `hint_encoding` when it names a known label, and finally
/// with Windows-1252, which is what legacy Windows clipboards produce.
///
/// ```
/// use blockpaste::util::decode_text;
///
/// assert_eq!(decode_text("caf\u{e9}".as_bytes(), None), "caf\u{e9}");
/// assert_eq!(decode_text(b"caf\xe9", None), "caf\u{e9}");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}
