//! Conversion between UTF-8 and the forum's legacy GBK encoding.
//!
//! Pages are decoded as GB18030 (a strict superset of GBK) and form values are
//! encoded as GBK, matching what a browser on the site does.

use encoding_rs::{GB18030, GBK};

/// Decode a response body.
///
/// Returns `None` if the bytes contain a sequence that is not valid GB18030.
/// Malformed input is rejected instead of being replaced with U+FFFD.
#[must_use]
pub fn decode_legacy(bytes: &[u8]) -> Option<String> {
    GB18030
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
}

/// Encode text as GBK bytes.
///
/// Characters outside GBK become decimal numeric character references
/// (`&#128512;`), the same substitution browsers make for form submissions.
#[must_use]
pub fn encode_legacy(text: &str) -> Vec<u8> {
    let (bytes, _, _) = GBK.encode(text);
    bytes.into_owned()
}

/// Percent-encode text for an `application/x-www-form-urlencoded` body the
/// forum will read as GBK.
#[must_use]
pub fn percent_encode_legacy(text: &str) -> String {
    urlencoding::encode_binary(&encode_legacy(text)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_gbk_bytes() {
        // "你好" in GBK
        let bytes = [0xC4, 0xE3, 0xBA, 0xC3];
        assert_eq!(decode_legacy(&bytes).as_deref(), Some("你好"));
    }

    #[test]
    fn test_decode_ascii_passthrough() {
        assert_eq!(
            decode_legacy(b"<html>plain</html>").as_deref(),
            Some("<html>plain</html>")
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        // Lead byte followed by an invalid trail byte
        let bytes = [0x81, 0x20, 0xFF];
        assert!(decode_legacy(&bytes).is_none());
    }

    #[test]
    fn test_encode_and_percent_encode() {
        assert_eq!(encode_legacy("你好"), vec![0xC4, 0xE3, 0xBA, 0xC3]);
        assert_eq!(percent_encode_legacy("你好"), "%C4%E3%BA%C3");
        assert_eq!(percent_encode_legacy("a b&c"), "a%20b%26c");
    }

    #[test]
    fn test_encode_unmappable_becomes_ncr() {
        let bytes = encode_legacy("😀");
        assert_eq!(bytes, b"&#128512;".to_vec());
    }
}
