use std::{net::IpAddr, str::FromStr};

use tracing::level_filters::LevelFilter;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";

/// An error that occurs while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{key} has an invalid value {value:?}")]
	Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub max_connections: u32,
	pub host: IpAddr,
	pub port: u16,
	pub log_level: LevelFilter,
	pub otlp_enabled: bool,
	pub secure_cookies: bool,
}

impl Config {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the configuration through `lookup`, which returns the raw value
	/// of a variable if it is set.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
	where
		F: Fn(&str) -> Option<String>,
	{
		Ok(Self {
			database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
			max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
			host: parse(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse(&lookup, "PORT", 3000)?,
			log_level: parse(&lookup, "LOG_LEVEL", LevelFilter::INFO)?,
			otlp_enabled: parse(&lookup, "OTLP_ENABLED", false)?,
			secure_cookies: parse(&lookup, "SECURE_COOKIES", false)?,
		})
	}
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, Error>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
{
	match lookup(key) {
		Some(value) if !value.trim().is_empty() => value
			.trim()
			.parse()
			.map_err(|_| Error::Invalid { key, value }),
		_ => Ok(default),
	}
}
