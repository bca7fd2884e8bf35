mod session;

pub use session::Session;

use std::convert::Infallible;

use axum::{
	extract::{FromRef, FromRequest, FromRequestParts, Request},
	http::request,
};
use chrono::{DateTime, Utc};
use serde::de;

use crate::{clock::Clock, error::AppError};

/// Extractor that deserializes an urlencoded form body.
///
/// Unlike [`Query<T>`], this does not validate the value: a form that fails
/// validation is rendered again with its errors, so the handler needs the
/// submitted values either way. Repeated keys (`categories=1&categories=2`)
/// deserialize into a `Vec`.
///
/// ```rust
/// async fn route(Form(input): Form<RecipeInput>) {
///   if let Err(errors) = input.validate() {
///     // ...
///   }
/// }
/// ```
pub struct Form<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Form<T>
where
	T: de::DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let result = axum_extra::extract::Form::<T>::from_request(req, state)
			.await?
			.0;

		Ok(Self(result))
	}
}

/// Extractor that deserializes a query string and validates it.
///
/// ```rust
/// async fn route(Query(params): Query<Params>) {
///   // ...
/// }
/// ```
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: de::DeserializeOwned + validator::Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let result = axum::extract::Query::<T>::from_request_parts(parts, state)
			.await?
			.0;

		result.validate().map_err(Self::Rejection::Validation)?;
		Ok(Self(result))
	}
}

/// Extractor that deserializes a path parameter.
///
/// A parameter that does not deserialize (such as `/recipes/abc`) is
/// treated as an unknown route and answered with a 404.
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: de::DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let result = axum::extract::Path::<T>::from_request_parts(parts, state)
			.await?
			.0;

		Ok(Self(result))
	}
}

/// The time at which the request is handled, read from the [`Clock`].
#[derive(Debug, Clone, Copy)]
pub struct Now(pub DateTime<Utc>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Now
where
	Clock: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(
		_parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(Self(Clock::from_ref(state).now()))
	}
}
