use std::fmt;

/// Error kind for decode/extract failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// Payload bytes were not valid UTF-8. Recoverable: the codec substitutes
    /// replacement characters and carries on.
    BadEncoding,
    /// Text is not parseable key/value data.
    MalformedSyntax,
    /// The schema's required root key is absent from the payload.
    MissingRootKey,
    /// Payload shape or value types do not fit the target record.
    SchemaMismatch,
    Unexpected,
}

/// Decode error returned by every codec and extractor operation.
///
/// Always travels as a value. The dispatch loop is the only place that turns
/// it into a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub message: String,
}

impl DecodeError {
    pub fn bad_encoding(msg: impl Into<String>) -> Self {
        Self { kind: DecodeErrorKind::BadEncoding, message: msg.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self { kind: DecodeErrorKind::MalformedSyntax, message: msg.into() }
    }

    pub fn missing_root(key: &str) -> Self {
        Self {
            kind: DecodeErrorKind::MissingRootKey,
            message: format!("key '{key}' not found"),
        }
    }

    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self { kind: DecodeErrorKind::SchemaMismatch, message: msg.into() }
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self { kind: DecodeErrorKind::Unexpected, message: msg.into() }
    }

    /// Add context to the error, preserving the original kind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }

    /// Payload-fatal errors drop the whole payload; `BadEncoding` does not.
    pub fn is_payload_fatal(&self) -> bool {
        self.kind != DecodeErrorKind::BadEncoding
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → DecodeError with the matching kind
// ---------------------------------------------------------------------------

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Syntax | Category::Eof => Self::malformed(e.to_string()),
            Category::Data => Self::mismatch(e.to_string()),
            Category::Io => Self::unexpected(e.to_string()),
        }
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::bad_encoding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_keeps_kind() {
        let err = DecodeError::mismatch("expected object").with_context("alerts[2]");
        assert_eq!(err.kind, DecodeErrorKind::SchemaMismatch);
        assert_eq!(err.message, "alerts[2]: expected object");
    }

    #[test]
    fn test_from_serde_json_classifies() {
        let syntax = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(DecodeError::from(syntax).kind, DecodeErrorKind::MalformedSyntax);

        let data = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        assert_eq!(DecodeError::from(data).kind, DecodeErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_bad_encoding_is_recoverable() {
        assert!(!DecodeError::bad_encoding("x").is_payload_fatal());
        assert!(DecodeError::missing_root("vessel").is_payload_fatal());
    }
}
