use std::time::Duration;

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::{
	metrics::{
		reader::{DefaultAggregationSelector, DefaultTemporalitySelector},
		Aggregation, Instrument, MeterProviderBuilder, PeriodicReader, SdkMeterProvider, Stream,
	},
	runtime,
	trace::{BatchConfig, Sampler, Tracer},
	Resource,
};
use opentelemetry_semantic_conventions::{
	resource::{DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION},
	SCHEMA_URL,
};
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Name of the histogram fed by the `histogram.latency_ms` field of the
/// request trace layer.
const LATENCY_METRIC: &str = "latency_ms";
const EXPORT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to build metrics exporter: {0}")]
	Metrics(#[from] opentelemetry::metrics::MetricsError),
	#[error("failed to install tracer: {0}")]
	Trace(#[from] opentelemetry::trace::TraceError),
}

fn environment() -> &'static str {
	if cfg!(debug_assertions) {
		"development"
	} else {
		"production"
	}
}

/// Describes this service to the collector.
fn resource() -> Resource {
	Resource::from_schema_url(
		[
			KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
			KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
			KeyValue::new(DEPLOYMENT_ENVIRONMENT, environment()),
		],
		SCHEMA_URL,
	)
}

fn latency_view(instrument: &Instrument) -> Option<Stream> {
	(instrument.name == LATENCY_METRIC).then(|| {
		Stream::new()
			.name(LATENCY_METRIC)
			.aggregation(Aggregation::Default)
	})
}

/// Exports metrics over OTLP every [`EXPORT_INTERVAL`] and registers the
/// provider globally.
fn meter_provider() -> Result<SdkMeterProvider, Error> {
	let exporter = opentelemetry_otlp::new_exporter()
		.tonic()
		.build_metrics_exporter(
			Box::new(DefaultAggregationSelector::new()),
			Box::new(DefaultTemporalitySelector::new()),
		)?;

	let provider = MeterProviderBuilder::default()
		.with_resource(resource())
		.with_reader(
			PeriodicReader::builder(exporter, runtime::Tokio)
				.with_interval(EXPORT_INTERVAL)
				.build(),
		)
		.with_view(latency_view)
		.build();

	global::set_meter_provider(provider.clone());

	Ok(provider)
}

/// Exports every span over OTLP in batches.
fn tracer() -> Result<Tracer, Error> {
	let config = opentelemetry_sdk::trace::Config::default()
		.with_sampler(Sampler::AlwaysOn)
		.with_resource(resource());

	let tracer = opentelemetry_otlp::new_pipeline()
		.tracing()
		.with_trace_config(config)
		.with_batch_config(BatchConfig::default())
		.with_exporter(opentelemetry_otlp::new_exporter().tonic())
		.install_batch(runtime::Tokio)?;

	Ok(tracer)
}

/// Installs the global subscriber: formatted logs at the configured level,
/// plus OTLP spans and metrics when `OTLP_ENABLED` is set.
///
/// Hold on to the returned guard until shutdown so pending telemetry is
/// flushed.
pub fn init_tracing_subscriber(config: &Config) -> Result<Option<OtelGuard>, Error> {
	let registry = tracing_subscriber::registry()
		.with(config.log_level)
		.with(tracing_subscriber::fmt::layer().with_ansi(true));

	if !config.otlp_enabled {
		registry.init();
		return Ok(None);
	}

	let meter_provider = meter_provider()?;

	registry
		.with(MetricsLayer::new(meter_provider.clone()))
		.with(tracing_opentelemetry::layer().with_tracer(tracer()?))
		.init();

	Ok(Some(OtelGuard { meter_provider }))
}

/// Flushes and shuts down the OTLP exporters when dropped.
pub struct OtelGuard {
	meter_provider: SdkMeterProvider,
}

impl Drop for OtelGuard {
	fn drop(&mut self) {
		// The subscriber may already be gone, so report on stderr
		if let Err(error) = self.meter_provider.force_flush() {
			eprintln!("failed to flush metrics: {error}");
		}

		if let Err(error) = self.meter_provider.shutdown() {
			eprintln!("failed to shut down meter provider: {error}");
		}

		global::shutdown_tracer_provider();
	}
}
