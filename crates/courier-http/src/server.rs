//! Recommended server timeouts.
//!
//! No routes or handlers live here. Callers bring their own `axum::Router`
//! and either pass it to [`serve`] or wrap it with [`ServerConfig::apply`].

use std::future::Future;
use std::time::Duration;

use axum::Router;
use courier_common_config::ServerSettings;
use tokio::net::TcpListener;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tower_http::trace::TraceLayer;

/// Server timeout defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Limit on reading the request body.
    pub read_timeout: Duration,
    /// Limit on reading request headers. Not enforced by [`serve`], which
    /// does not expose hyper's connection builder.
    pub read_header_timeout: Duration,
    /// Limit on producing the whole response.
    pub write_timeout: Duration,
    /// Keep-alive idle limit. Not enforced by [`serve`], same as
    /// `read_header_timeout`.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            read_header_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(10 * 60),
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            read_timeout: Duration::from_secs(settings.read_timeout_secs),
            read_header_timeout: Duration::from_secs(settings.read_header_timeout_secs),
            write_timeout: Duration::from_secs(settings.write_timeout_secs),
            idle_timeout: Duration::from_secs(settings.idle_timeout_secs),
        }
    }
}

impl ServerConfig {
    /// Wrap `router` with body-read and whole-request timeouts plus request
    /// tracing. A request exceeding `write_timeout` gets `408`.
    pub fn apply(&self, router: Router) -> Router {
        router
            .layer(RequestBodyTimeoutLayer::new(self.read_timeout))
            .layer(TimeoutLayer::new(self.write_timeout))
            .layer(TraceLayer::new_for_http())
    }
}

/// Serve `router` on `listener` with `config` applied until `shutdown`
/// resolves.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    config: &ServerConfig,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        read_timeout_ms = config.read_timeout.as_millis() as u64,
        write_timeout_ms = config.write_timeout.as_millis() as u64,
        "HTTP server listening"
    );

    axum::serve(listener, config.apply(router))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!(%addr, "HTTP server stopped");
    Ok(())
}
