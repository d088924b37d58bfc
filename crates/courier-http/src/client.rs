//! HTTP client configuration and request helpers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use courier_common_config::ClientSettings;
use courier_common_log::spans::{instrument_future, record_error, record_status, request_span, Timer};
use once_cell::sync::OnceCell;
use reqwest::header::HeaderMap;
use reqwest::{Body, Method, StatusCode};
use serde::Serialize;

use crate::error::HttpError;
use crate::request::{append_headers, content_types, encode_form, with_content_type};
use crate::response::{Response, ResponseMeta};

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// TCP connect timeout. reqwest bounds TCP connect and TLS handshake
    /// with one timer, which is set to `connect_timeout +
    /// tls_handshake_timeout` (11s with the defaults, for plain HTTP too).
    /// The `request_timeout` still caps the whole exchange.
    pub connect_timeout: Duration,
    /// TCP keep-alive interval.
    pub keep_alive: Duration,
    /// How long an idle pooled connection is kept open.
    pub idle_conn_timeout: Duration,
    /// TLS handshake timeout, added to `connect_timeout`.
    pub tls_handshake_timeout: Duration,
    /// Expect-continue timeout. reqwest never sends `Expect: 100-continue`,
    /// so this has no effect on the built client.
    pub expect_continue_timeout: Duration,
    /// Whole-request timeout, body read included.
    pub request_timeout: Duration,
    /// Maximum idle connections kept per host.
    pub max_idle_conns: usize,
    /// Skip TLS certificate verification.
    pub insecure_skip_verify: bool,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip decompression.
    pub gzip: bool,
}

fn default_user_agent() -> String {
    format!("courier/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(1),
            keep_alive: Duration::from_secs(30),
            idle_conn_timeout: Duration::from_secs(90),
            tls_handshake_timeout: Duration::from_secs(10),
            expect_continue_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            max_idle_conns: 8,
            insecure_skip_verify: false,
            user_agent: default_user_agent(),
            gzip: true,
        }
    }
}

impl From<&ClientSettings> for ClientConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms),
            keep_alive: Duration::from_secs(settings.keep_alive_secs),
            idle_conn_timeout: Duration::from_secs(settings.idle_conn_timeout_secs),
            tls_handshake_timeout: Duration::from_secs(settings.tls_handshake_timeout_secs),
            expect_continue_timeout: Duration::from_millis(settings.expect_continue_timeout_ms),
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            max_idle_conns: settings.max_idle_conns,
            insecure_skip_verify: settings.insecure_skip_verify,
            user_agent: settings
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
            gzip: settings.gzip,
        }
    }
}

impl ClientConfig {
    /// Connect-phase limit handed to reqwest, TLS handshake included.
    pub fn connect_budget(&self) -> Duration {
        self.connect_timeout + self.tls_handshake_timeout
    }
}

/// Build a configured reqwest client.
///
/// Proxies come from the standard `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY`
/// variables.
pub fn build_client(config: &ClientConfig) -> Result<reqwest::Client, HttpError> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_budget())
        .tcp_keepalive(config.keep_alive)
        .pool_idle_timeout(config.idle_conn_timeout)
        .pool_max_idle_per_host(config.max_idle_conns)
        .timeout(config.request_timeout)
        .danger_accept_invalid_certs(config.insecure_skip_verify)
        .user_agent(config.user_agent.as_str())
        .gzip(config.gzip)
        .build()
        .map_err(HttpError::ClientBuild)
}

/// HTTP client with fixed timeouts and a shared connection pool.
///
/// Cloning is cheap and clones share the pool.
#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Create a client with the default config.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client from `config`, or from the defaults when `None`.
    pub fn with_config(config: impl Into<Option<ClientConfig>>) -> Result<Self, HttpError> {
        let config = config.into().unwrap_or_default();
        let inner = build_client(&config)?;
        tracing::debug!(
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            max_idle_conns = config.max_idle_conns,
            insecure = config.insecure_skip_verify,
            "built HTTP client"
        );
        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Create a client from the `client` section of a config file.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpError> {
        Self::with_config(ClientConfig::from(settings))
    }

    /// Get the inner reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Config this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET with no body and no extra headers.
    pub async fn get(&self, url: &str) -> Response {
        self.execute(Method::GET, url, HeaderMap::new(), None).await
    }

    /// POST `body` with `content_type`, which replaces any `Content-Type`
    /// in `headers`.
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        headers: Option<&HeaderMap>,
        body: impl Into<Body>,
    ) -> Response {
        match with_content_type(headers, content_type) {
            Ok(headers) => {
                self.execute(Method::POST, url, headers, Some(body.into()))
                    .await
            }
            Err(e) => Response::failed(e),
        }
    }

    /// POST URL-encoded `form` values; `None` sends an empty form.
    pub async fn post_form<F: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        form: Option<&F>,
    ) -> Response {
        match encode_form(form) {
            Ok(encoded) => {
                self.post(url, content_types::FORM_URLENCODED, headers, encoded)
                    .await
            }
            Err(e) => Response::failed(e),
        }
    }

    /// POST pre-serialized JSON.
    pub async fn post_json_bytes(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        json: impl Into<Bytes>,
    ) -> Response {
        self.post(url, content_types::JSON, headers, json.into())
            .await
    }

    /// Serialize `object` and POST it as JSON.
    ///
    /// Serialization failure returns without touching the network.
    pub async fn post_json_object<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        object: &T,
    ) -> Response {
        match serde_json::to_vec(object) {
            Ok(json) => self.post_json_bytes(url, headers, json).await,
            Err(e) => Response::failed(HttpError::Serialize(e)),
        }
    }

    /// POST a literal string as a form body.
    pub async fn post_body_string(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        data: impl Into<String>,
    ) -> Response {
        self.post(url, content_types::FORM_URLENCODED, headers, data.into())
            .await
    }

    /// POST literal bytes as a form body.
    pub async fn post_body_bytes(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        data: impl Into<Bytes>,
    ) -> Response {
        self.post(url, content_types::FORM_URLENCODED, headers, data.into())
            .await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Body>,
    ) -> Response {
        let span = request_span(method.as_str(), url);
        instrument_future(self.send(method, url, headers, body), span).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Body>,
    ) -> Response {
        let timer = Timer::start("http_request");

        let mut request = match self.inner.request(method, url).build() {
            Ok(request) => request,
            Err(e) => {
                record_error(&e);
                tracing::debug!(error = %e, "invalid request");
                return Response::failed(HttpError::Request(e));
            }
        };
        append_headers(request.headers_mut(), &headers);
        *request.body_mut() = body;

        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                record_error(&e);
                tracing::warn!(error = %e, timeout = e.is_timeout(), "request failed");
                return Response::failed(HttpError::Transport(e));
            }
        };

        let meta = ResponseMeta::from_response(&response);
        record_status(meta.status().as_u16());

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                record_error(&e);
                tracing::warn!(error = %e, "failed to read response body");
                return Response::new(Bytes::new(), Some(meta), Some(HttpError::Body(e)));
            }
        };

        let elapsed = timer.finish();
        tracing::debug!(
            status = meta.status().as_u16(),
            bytes = body.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "response received"
        );

        let error = (meta.status() != StatusCode::OK).then_some(HttpError::NotOk);
        Response::new(body, Some(meta), error)
    }
}

static DEFAULT_CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client built from the default config on first use.
///
/// A build failure is returned and retried on the next call.
pub fn default_client() -> Result<&'static Client, HttpError> {
    DEFAULT_CLIENT.get_or_try_init(Client::new)
}

async fn on_default_client<F, Fut>(call: F) -> Response
where
    F: FnOnce(&'static Client) -> Fut,
    Fut: Future<Output = Response>,
{
    match default_client() {
        Ok(client) => call(client).await,
        Err(e) => Response::failed(e),
    }
}

/// [`Client::get`] on the default client.
pub async fn get(url: &str) -> Response {
    on_default_client(|client| client.get(url)).await
}

/// [`Client::post`] on the default client.
pub async fn post(
    url: &str,
    content_type: &str,
    headers: Option<&HeaderMap>,
    body: impl Into<Body>,
) -> Response {
    on_default_client(|client| client.post(url, content_type, headers, body)).await
}

/// [`Client::post_form`] on the default client.
pub async fn post_form<F: Serialize + ?Sized>(
    url: &str,
    headers: Option<&HeaderMap>,
    form: Option<&F>,
) -> Response {
    on_default_client(|client| client.post_form(url, headers, form)).await
}

/// [`Client::post_json_bytes`] on the default client.
pub async fn post_json_bytes(
    url: &str,
    headers: Option<&HeaderMap>,
    json: impl Into<Bytes>,
) -> Response {
    on_default_client(|client| client.post_json_bytes(url, headers, json)).await
}

/// [`Client::post_json_object`] on the default client.
pub async fn post_json_object<T: Serialize + ?Sized>(
    url: &str,
    headers: Option<&HeaderMap>,
    object: &T,
) -> Response {
    on_default_client(|client| client.post_json_object(url, headers, object)).await
}
