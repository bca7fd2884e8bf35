use std::{borrow::Cow, fmt};

use axum::{
	body::Body,
	extract::rejection::{PathRejection, QueryRejection},
	http::{Response, StatusCode},
	response::{IntoResponse, Redirect},
};
use axum_extra::extract::FormRejection;
use serde::Serialize;

use crate::template;

/// A single user-facing message, optionally tied to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
	pub field: Option<Cow<'a, str>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

impl fmt::Display for Message<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.field {
			Some(field) => write!(f, "{}: {}", field, self.content),
			None => f.write_str(&self.content),
		}
	}
}

/// Converts validation errors into field messages, sorted by field so
/// that a re-rendered form lists them in a stable order.
pub fn field_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	let mut messages = errors
		.field_errors()
		.into_iter()
		.flat_map(|(field, errors)| {
			errors
				.iter()
				.map(move |error| Message::new(error.to_string()).field(field.to_string()))
		})
		.collect::<Vec<_>>();

	messages.sort_by(|a, b| a.field.cmp(&b.field));
	messages
}

/// Describes how an error is presented to the client.
///
/// The [`std::fmt::Display`] output is only logged, so it may contain
/// internal details. Anything returned from [`ErrorShape::errors`] is
/// rendered on the error page.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>>;

	/// Where to send the client instead of rendering an error page.
	fn location(&self) -> Option<String> {
		None
	}
}

/// Errors shared by every route.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("template error: {0}")]
	Template(#[from] tera::Error),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error("query error: {0}")]
	Query(#[from] QueryRejection),
	#[error("form error: {0}")]
	Form(#[from] FormRejection),
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("no route matched")]
	NotFound,
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Database(..) | Self::Template(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Path(..) | Self::NotFound => StatusCode::NOT_FOUND,
			Self::Query(..) | Self::Form(..) | Self::Validation(..) => StatusCode::BAD_REQUEST,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Database(..) | Self::Template(..) => {
				Message::new("Noe gikk galt hos oss. Prøv igjen senere.").into_vec()
			}
			Self::Path(..) | Self::NotFound => Message::new("Siden finnes ikke.").into_vec(),
			Self::Query(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Form(rejection) => Message::new(rejection.to_string()).into_vec(),
			Self::Validation(errors) => field_messages(errors),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		shape_response(&self)
	}
}

/// Error type returned from route handlers, generic over the route's own
/// error enum.
#[derive(Debug)]
pub enum RouteError<T> {
	Route(T),
	App(AppError),
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<tera::Error> for RouteError<T> {
	fn from(error: tera::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Route(error) => shape_response(&error),
			Self::App(error) => shape_response(&error),
		}
	}
}

#[derive(Serialize)]
struct ErrorPage<'a> {
	status: u16,
	reason: &'static str,
	errors: Vec<Message<'a>>,
}

fn shape_response<E: ErrorShape>(error: &E) -> Response<Body> {
	if let Some(location) = error.location() {
		return Redirect::to(&location).into_response();
	}

	let status = error.status();

	if status.is_server_error() {
		tracing::error!(%error, "request failed");
	} else {
		tracing::debug!(%error, "request rejected");
	}

	let reason = status.canonical_reason().unwrap_or("Error");
	let page = ErrorPage {
		status: status.as_u16(),
		reason,
		errors: error.errors(),
	};

	match template::render("error.html", &page) {
		Ok(html) => (status, html).into_response(),
		Err(error) => {
			tracing::error!(%error, "failed to render error page");
			(status, reason).into_response()
		}
	}
}
