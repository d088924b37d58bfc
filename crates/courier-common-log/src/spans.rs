//! Request spans and timing helpers.

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{field, info_span, Instrument, Span};

/// Span wrapping one outbound HTTP request.
///
/// `status` and `error` start empty and are filled in with [`record_status`]
/// and [`record_error`].
pub fn request_span(method: &str, url: &str) -> Span {
    info_span!(
        "http_request",
        method = %method,
        url = %url,
        status = field::Empty,
        error = field::Empty,
    )
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Record a response status on the current span.
pub fn record_status(status: u16) {
    Span::current().record("status", status);
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", field::display(error));
}

/// Measures one operation and logs its duration on completion.
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Time elapsed so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Log the duration and return it.
    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}

/// Time a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}
