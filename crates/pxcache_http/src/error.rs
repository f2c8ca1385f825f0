use thiserror::Error;

/// Failures while parsing client requests, URIs or origin responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed request line: expected 3 tokens, got {0}")]
    MalformedRequest(usize),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("malformed origin response: {0}")]
    MalformedResponse(&'static str),
}

impl CodecError {
    pub(crate) fn invalid_uri(uri: &str, reason: impl Into<String>) -> Self {
        CodecError::InvalidUri {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}
