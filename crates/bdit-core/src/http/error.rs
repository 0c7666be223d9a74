//! Request error type, classified for retry decisions.

use crate::retry::{classify_curl_error, Classify, Failure};

/// Longest response-body excerpt kept in an [`RequestError::UnexpectedStatus`].
pub(crate) const BODY_EXCERPT_CHARS: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Curl reported an error (timeout, connection, etc.).
    #[error("[{method} {url}] {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: curl::Error,
    },

    /// Server answered with a status other than the one the caller expected.
    #[error("[{method} {url}] expected {expected}, got {status}: {body}")]
    UnexpectedStatus {
        method: String,
        url: String,
        expected: u16,
        status: u16,
        body: String,
    },

    #[error("[{method} {url}] request body could not be encoded: {source}")]
    Encode {
        method: String,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("[{url}] response is not the expected JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Classify for RequestError {
    fn failure(&self) -> Failure {
        match self {
            RequestError::Transport { source, .. } => Failure::of_kind(classify_curl_error(source)),
            RequestError::UnexpectedStatus { status, .. } => Failure::http(*status),
            RequestError::InvalidUrl { .. }
            | RequestError::Encode { .. }
            | RequestError::Decode { .. } => Failure::other(),
        }
    }
}

pub(crate) fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
