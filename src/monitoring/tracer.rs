/*!
 * Tracing
 * Structured tracing for native calls using the tracing crate
 *
 * Features:
 * - Trace IDs for correlating a native call with the operations it runs
 * - JSON-formatted logs for structured parsing
 * - Slow-call warnings embedded in span close events
 */

use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Native calls slower than this are reported at warn level
const SLOW_NATIVE_MS: u128 = 10;
/// Bridge operations slower than this are reported at warn level
const SLOW_OPERATION_MS: u128 = 50;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SYSTEM_NATIVES_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SYSTEM_NATIVES_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique trace ID for call correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one dispatched native method call
pub struct NativeSpan {
    span: tracing::Span,
    start: Instant,
    method: String,
    trace_id: String,
}

impl NativeSpan {
    pub fn new(class: &str, method: &str) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "native",
            trace_id = %trace_id,
            class = class,
            method = method,
            args_count = tracing::field::Empty,
            duration_us = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            method: method.to_string(),
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn record_args_count(&self, count: usize) {
        self.span.record("args_count", count);
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "success" } else { "error" });
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for NativeSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_NATIVE_MS {
            self.span.record("duration_ms", duration.as_millis());
            warn!(
                trace_id = %self.trace_id,
                method = %self.method,
                duration_ms = duration.as_millis(),
                slow = true,
                "slow native call"
            );
        } else {
            self.span.record("duration_us", duration.as_micros());
        }
    }
}

/// Span for a single bridge operation with structured fields
pub struct OperationSpan {
    span: tracing::Span,
    start: Instant,
    trace_id: String,
}

impl OperationSpan {
    pub fn new(operation: &str) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "operation",
            trace_id = %trace_id,
            operation = operation,
            key = tracing::field::Empty,
            index = tracing::field::Empty,
            duration_us = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            result = tracing::field::Empty,
            items_processed = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Record a string field declared on the span
    pub fn record(&self, key: &str, value: &str) {
        self.span.record(key, value);
    }

    /// Record a field with any Debug-compatible type
    pub fn record_debug<V: std::fmt::Debug>(&self, key: &str, value: V) {
        self.span.record(key, format!("{:?}", value).as_str());
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "success" } else { "error" });
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }

    pub fn record_items_processed(&self, count: usize) {
        self.span.record("items_processed", count);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_OPERATION_MS {
            self.span.record("duration_ms", duration.as_millis());
            warn!(
                trace_id = %self.trace_id,
                duration_ms = duration.as_millis(),
                slow = true,
                "slow operation detected"
            );
        } else {
            self.span.record("duration_us", duration.as_micros());
            debug!(
                trace_id = %self.trace_id,
                duration_us = duration.as_micros(),
                "operation completed"
            );
        }
    }
}

#[inline]
pub fn span_native(class: &str, method: &str) -> NativeSpan {
    NativeSpan::new(class, method)
}

#[inline]
pub fn span_operation(name: &str) -> OperationSpan {
    OperationSpan::new(name)
}
