//! Tracing and OpenTelemetry setup for the northwind CLI
//!
//! Usage:
//!   northwind --debug ...               # Debug logging to console
//!   northwind --otel ...                # Export traces to OTLP endpoint (telemetry feature)
//!   RUST_LOG=northwind_server=debug ... # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                            # Log filter (default: info)
//!   OTEL_EXPORTER_OTLP_ENDPOINT         # OTLP endpoint (default: http://localhost:4317)
//!   OTEL_SERVICE_NAME                   # Service name (default: northwind)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    pub debug: bool,
    /// Enable OpenTelemetry OTLP export
    #[cfg(feature = "telemetry")]
    pub otel: bool,
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    let default = if config.debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize tracing with console output only (no OTEL)
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Initialize tracing with OpenTelemetry OTLP export
#[cfg(feature = "telemetry")]
pub fn init_tracing_with_otel(config: &TracingConfig) -> Result<()> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "northwind".to_string());

    let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .map_err(|e| anyhow!("Failed to create OTLP exporter: {}", e))?;

    let resource = opentelemetry_sdk::Resource::new(vec![KeyValue::new(
        "service.name",
        service_name.clone(),
    )]);

    let provider = TracerProvider::builder()
        .with_batch_exporter(otlp_exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(resource)
        .build();

    let tracer = provider.tracer("northwind");
    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    // Keep the provider alive globally; dropping it stops export
    let _ = opentelemetry::global::set_tracer_provider(provider);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(config.debug)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .with(telemetry_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    tracing::info!(
        endpoint = %endpoint,
        service = %service_name,
        "OpenTelemetry tracing initialized"
    );

    Ok(())
}

/// Shutdown OpenTelemetry (flush pending spans)
#[cfg(feature = "telemetry")]
pub fn shutdown_otel() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// No-op shutdown when telemetry is disabled
#[cfg(not(feature = "telemetry"))]
pub fn shutdown_otel() {}

/// Initialize tracing based on configuration
///
/// Chooses between console-only and OTEL based on config.otel flag
pub fn init(config: &TracingConfig) -> Result<()> {
    #[cfg(feature = "telemetry")]
    if config.otel {
        return init_tracing_with_otel(config);
    }

    init_tracing(config)
}
