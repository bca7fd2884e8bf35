use std::time::Duration;

use axum::{body::Body, http::Response, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::Span;

use crate::{error::AppError, AppState};

pub mod auth;
pub mod category;
pub mod index;
pub mod model;
pub mod recipe;

/// Builds the application router with all pages and middleware.
pub fn app(state: AppState) -> Router {
	Router::new()
		.merge(index::routes())
		.merge(recipe::routes())
		.merge(category::routes())
		.nest("/accounts", auth::routes())
		.fallback(|| async { AppError::NotFound })
		.layer(
			TraceLayer::new_for_http().on_response(
				|response: &Response<Body>, latency: Duration, _span: &Span| {
					tracing::info!(
						histogram.latency_ms = latency.as_secs_f64() * 1_000.0,
						status = response.status().as_u16(),
						"finished request"
					);
				},
			),
		)
		.layer(CompressionLayer::new())
		.with_state(state)
}
