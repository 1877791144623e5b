//! Percent-encoding rules for package URL components.
//!
//! Every component is encoded with the same policy: ASCII alphanumerics and
//! `-`, `.`, `_`, `~` are written verbatim and everything else is escaped.
//! Path-like components (namespace and subpath) are split on `/` before
//! encoding so that the separators themselves are never escaped.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::EscapeError;

/// Bytes that are escaped inside a single component or path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single segment.
///
/// ```
/// # use packageurl::codec::encode_segment;
/// assert_eq!(encode_segment("lodash"), "lodash");
/// assert_eq!(encode_segment("@angular"), "%40angular");
/// assert_eq!(encode_segment("ab/c"), "ab%2Fc");
/// ```
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    utf8_percent_encode(segment, SEGMENT).into()
}

/// Percent-encode each `/`-separated segment of `path`, keeping the separators.
///
/// ```
/// # use packageurl::codec::encode_path;
/// assert_eq!(encode_path("com/example/Util.class"), "com/example/Util.class");
/// assert_eq!(encode_path("a b/c"), "a%20b/c");
/// ```
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-decode a segment.
///
/// Unlike form decoding, `+` is kept as a literal plus sign.
/// A `%` that is not followed by two hex digits is an error,
/// as is a decoded byte sequence that is not UTF-8.
///
/// ```
/// # use packageurl::codec::decode_segment;
/// assert_eq!(decode_segment("%40angular").unwrap(), "@angular");
/// assert_eq!(decode_segment("1.0+build").unwrap(), "1.0+build");
/// assert!(decode_segment("100%").is_err());
/// ```
pub fn decode_segment(segment: &str) -> Result<Cow<'_, str>, EscapeError> {
    let bytes = segment.as_bytes();
    for (position, _) in segment.match_indices('%') {
        let well_formed = bytes
            .get(position + 1..position + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(EscapeError::Sequence {
                text: segment.to_string(),
                position,
            });
        }
    }

    percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| EscapeError::Utf8 {
            text: segment.to_string(),
        })
}
