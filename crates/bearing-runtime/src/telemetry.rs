//! Logging and trace export for bearing binaries.
//!
//! Call [`init_tracing`] once at process startup, before any sensor is
//! subscribed.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `BEARING_LOG_FORMAT=json` | Emit newline-delimited JSON logs instead of compact text. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL. When set, spans are also exported over OTLP/HTTP. |
//!
//! # Example
//!
//! ```rust,no_run
//! let _guard = bearing_runtime::telemetry::init_tracing("bearing");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// ─────────────────────────────────────────────────────────────────────────────
// Log format
// ─────────────────────────────────────────────────────────────────────────────

/// Console output format, selected by `BEARING_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (case-insensitive) is compact text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }

    pub fn from_env() -> Self {
        std::env::var("BEARING_LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Install the global `tracing` subscriber.
///
/// The returned [`TracerProviderGuard`] must live until the process exits;
/// dropping it flushes pending spans.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::from_env();
    let provider = build_provider(service_name);

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("bearing")));

    let registry = tracing_subscriber::registry().with(env_filter).with(otel_layer);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }

    TracerProviderGuard(provider)
}

// ─────────────────────────────────────────────────────────────────────────────
// RAII guard
// ─────────────────────────────────────────────────────────────────────────────

/// Shuts down the OTel [`SdkTracerProvider`] on drop.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl TracerProviderGuard {
    /// Whether spans are being exported to a collector.
    pub fn is_exporting(&self) -> bool {
        self.0.is_some()
    }
}

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("[bearing] OpenTelemetry provider shutdown error: {e}");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// `None` when no endpoint is configured or the exporter fails to build.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[bearing] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            // Tracing is initialised before the tokio runtime exists, so the
            // batch exporter cannot be used.
            .with_simple_exporter(exporter)
            .build(),
    )
}
