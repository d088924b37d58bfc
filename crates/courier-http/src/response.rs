//! Deferred-error response wrapper.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url, Version};
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Status line and headers of a response, captured before its body is read.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: Url,
}

impl ResponseMeta {
    pub(crate) fn from_response(response: &reqwest::Response) -> Self {
        Self {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Result of one request: body, metadata and error, all optional.
///
/// Nothing is raised at call time. Every accessor returns the stored error,
/// so callers must inspect it on each read. A non-200 response keeps its
/// body and metadata alongside [`HttpError::NotOk`].
#[derive(Debug, Clone)]
pub struct Response {
    body: Bytes,
    meta: Option<ResponseMeta>,
    error: Option<Arc<HttpError>>,
}

impl Response {
    pub(crate) fn new(body: Bytes, meta: Option<ResponseMeta>, error: Option<HttpError>) -> Self {
        Self {
            body,
            meta,
            error: error.map(Arc::new),
        }
    }

    /// A response for a request that never produced one.
    pub(crate) fn failed(error: HttpError) -> Self {
        Self::new(Bytes::new(), None, Some(error))
    }

    /// Raw body, metadata and error.
    pub fn bytes(&self) -> (&Bytes, Option<&ResponseMeta>, Option<Arc<HttpError>>) {
        (&self.body, self.meta.as_ref(), self.error.clone())
    }

    /// Body as text (invalid UTF-8 replaced), metadata and error.
    pub fn string(&self) -> (Cow<'_, str>, Option<&ResponseMeta>, Option<Arc<HttpError>>) {
        (self.text(), self.meta.as_ref(), self.error.clone())
    }

    /// Decode the body as JSON into `target`.
    ///
    /// On success `target` is overwritten and the stored error, if any, is
    /// returned unchanged. On failure `target` is left as it was and the
    /// error is [`HttpError::Decode`], or [`HttpError::Compound`] when the
    /// response already carried an error.
    pub fn json_object<T: DeserializeOwned>(
        &self,
        target: &mut T,
    ) -> (Cow<'_, str>, Option<&ResponseMeta>, Option<Arc<HttpError>>) {
        let error = match serde_json::from_slice::<T>(&self.body) {
            Ok(value) => {
                *target = value;
                self.error.clone()
            }
            Err(decode) => Some(Arc::new(match &self.error {
                Some(prior) => HttpError::Compound {
                    prior: Arc::clone(prior),
                    decode,
                },
                None => HttpError::Decode(decode),
            })),
        };

        (self.text(), self.meta.as_ref(), error)
    }

    /// Stored error, if any.
    pub fn error(&self) -> Option<&HttpError> {
        self.error.as_deref()
    }

    pub fn meta(&self) -> Option<&ResponseMeta> {
        self.meta.as_ref()
    }

    /// Status code, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        self.meta.as_ref().map(ResponseMeta::status)
    }

    /// True when no error is stored.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
