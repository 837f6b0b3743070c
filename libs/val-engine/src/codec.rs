//! Payload text decoding and JSON parsing.

use std::borrow::Cow;

use serde_json::Value;
use val_api::error::DecodeError;

/// Decode payload bytes as UTF-8.
///
/// Invalid sequences are replaced with U+FFFD and a warning is emitted; the
/// call itself never fails.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            let err = DecodeError::from(e);
            tracing::warn!(error = %err, len = bytes.len(), "payload is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(bytes)
        }
    }
}

/// Parse decoded text into a JSON tree.
pub fn parse(text: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(text).map_err(DecodeError::from)
}

/// `decode` + `parse`.
pub fn decode_payload(bytes: &[u8]) -> Result<Value, DecodeError> {
    parse(&decode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use val_api::error::DecodeErrorKind;

    #[test]
    fn test_decode_valid_is_borrowed() {
        let text = decode(b"{\"a\":1}");
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, "{\"a\":1}");
    }

    #[test]
    fn test_decode_invalid_substitutes_replacement_char() {
        let text = decode(b"{\"name\":\"a\xffb\"}");
        assert_eq!(text, "{\"name\":\"a\u{FFFD}b\"}");
    }

    #[test]
    fn test_decode_payload_repaired_text_still_parses() {
        let tree = decode_payload(b"{\"name\":\"\xc3(\"}").unwrap();
        assert_eq!(tree["name"], "\u{FFFD}(");
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse("{not json").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedSyntax);

        let err = parse("").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedSyntax);
    }
}
