//! HTTP error types.

use std::sync::Arc;

/// Errors carried by a [`Response`](crate::Response) or returned while
/// building a [`Client`](crate::Client).
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("invalid request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// The round trip succeeded but the status was not exactly 200.
    #[error("not 200 ok")]
    NotOk,

    #[error("failed to serialize JSON body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to encode form body: {0}")]
    FormEncode(#[source] serde_urlencoded::ser::Error),

    #[error("failed to decode JSON body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Decoding failed on a response that already carried an error.
    #[error("{prior}|{decode}")]
    Compound {
        #[source]
        prior: Arc<HttpError>,
        decode: serde_json::Error,
    },
}

impl HttpError {
    /// True for the not-200 sentinel.
    pub fn is_not_ok(&self) -> bool {
        matches!(self, HttpError::NotOk)
    }

    /// True if a timeout caused this error, including the prior error of a
    /// compound.
    pub fn is_timeout(&self) -> bool {
        match self {
            HttpError::Transport(e) | HttpError::Body(e) => e.is_timeout(),
            HttpError::Compound { prior, .. } => prior.is_timeout(),
            _ => false,
        }
    }

    /// True if the request never reached the network.
    pub fn is_request_construction(&self) -> bool {
        matches!(
            self,
            HttpError::Request(_)
                | HttpError::InvalidHeader(_)
                | HttpError::Serialize(_)
                | HttpError::FormEncode(_)
        )
    }

    /// The error stored on the response before decoding, for compounds.
    pub fn prior(&self) -> Option<&HttpError> {
        match self {
            HttpError::Compound { prior, .. } => Some(prior),
            _ => None,
        }
    }

    /// The JSON decode failure, for `Decode` and `Compound`.
    pub fn decode_error(&self) -> Option<&serde_json::Error> {
        match self {
            HttpError::Decode(e) | HttpError::Compound { decode: e, .. } => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_not_ok_display() {
        assert_eq!(HttpError::NotOk.to_string(), "not 200 ok");
        assert!(HttpError::NotOk.is_not_ok());
        assert!(!HttpError::NotOk.is_timeout());
    }

    #[test]
    fn test_compound_keeps_both_causes() {
        let decode = json_error();
        let decode_text = decode.to_string();
        let error = HttpError::Compound {
            prior: Arc::new(HttpError::NotOk),
            decode,
        };

        assert_eq!(error.to_string(), format!("not 200 ok|{}", decode_text));
        assert!(error.prior().is_some_and(HttpError::is_not_ok));
        assert!(error.decode_error().is_some());
        assert_eq!(
            error.source().map(|s| s.to_string()),
            Some("not 200 ok".to_string())
        );
    }

    #[test]
    fn test_decode_error_accessors() {
        let error = HttpError::Decode(json_error());
        assert!(error.to_string().starts_with("failed to decode JSON body"));
        assert!(error.decode_error().is_some());
        assert!(error.prior().is_none());
        assert!(!error.is_request_construction());
    }

    #[test]
    fn test_request_construction_kinds() {
        assert!(HttpError::InvalidHeader("bad".into()).is_request_construction());
        assert!(HttpError::Serialize(json_error()).is_request_construction());
        assert!(!HttpError::NotOk.is_request_construction());
    }
}
