#![warn(clippy::pedantic)]

mod clock;
mod config;
mod error;
mod extract;
mod route;
mod session;
mod template;
mod trace;


use std::net::SocketAddr;

use argon2::Argon2;
use axum::{extract::Request, ServiceExt};
use sqlx::sqlite::SqlitePoolOptions;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

use crate::clock::Clock;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool, a hash configuration (if it's expensive to create),
/// or the clock handlers read the current time from.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub clock: Clock,
	pub cookie: session::CookieOptions,
}

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
enum StartupError {
	#[error(transparent)]
	Config(#[from] config::Error),
	#[error(transparent)]
	Trace(#[from] trace::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
	dotenvy::dotenv().ok();

	let config = config::Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let database = SqlitePoolOptions::new()
		.max_connections(config.max_connections)
		.connect(&config.database_url)
		.await?;

	sqlx::migrate!().run(&database).await?;

	let state = State {
		database,
		hasher: Argon2::default(),
		clock: Clock::System,
		cookie: session::CookieOptions {
			secure: config.secure_cookies,
		},
	};

	let app = NormalizePathLayer::trim_trailing_slash().layer(route::app(state));
	let address = SocketAddr::new(config.host, config.port);
	let listener = tokio::net::TcpListener::bind(address).await?;

	tracing::info!("listening on {}", address);

	axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

	Ok(())
}
