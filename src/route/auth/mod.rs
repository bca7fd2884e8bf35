use axum::{
	http::StatusCode,
	routing::{get, post},
	Router,
};

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("ugyldig brukernavn eller passord")]
	InvalidUsernameOrPassword,
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("login required for {0}")]
	LoginRequired(String),
	#[error("brukernavnet er allerede i bruk")]
	UsernameTaken,
	#[error("e-postadressen er allerede i bruk")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> Router<AppState> {
	use route::*;

	Router::new()
		.route("/login", get(login_form).post(login))
		.route("/logout", post(logout))
		.route("/register", get(register_form).post(register))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword | Self::LoginRequired(..) => {
				StatusCode::UNAUTHORIZED
			}
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::Argon(..) => {
				error::Message::new("Noe gikk galt hos oss. Prøv igjen senere.").into_vec()
			}
			_ => error::Message::new(self.to_string()).into_vec(),
		}
	}

	fn location(&self) -> Option<String> {
		let Self::LoginRequired(next) = self else {
			return None;
		};

		let query =
			serde_urlencoded::to_string([("next", next.as_str())].as_slice()).unwrap_or_default();

		Some(format!("/accounts/login?{query}"))
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_signup_flow() {
		let pool = database().await;
		let app = app(pool.clone());

		let response = app
			.post("/accounts/register")
			.form(&[
				("email", "john@smith.com"),
				("username", "john"),
				("password", "hunter2hunter"),
			])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("session="));

		let response = app
			.post("/accounts/login")
			.form(&[
				("username", "john"),
				("password", "hunter2hunter"),
				("next", "/recipes/new"),
			])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/recipes/new");

		let cookie = response.header("set-cookie");
		let cookie = cookie.to_str().unwrap().split(';').next().unwrap();

		let response = app
			.get("/recipes/new")
			.add_header(header::COOKIE, HeaderValue::from_str(cookie).unwrap())
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
	}

	#[tokio::test]
	async fn test_login_rejects_wrong_password() {
		let pool = database().await;
		let app = app(pool);

		app.post("/accounts/register")
			.form(&[
				("email", "kari@example.com"),
				("username", "kari"),
				("password", "hunter2hunter"),
			])
			.await;

		let response = app
			.post("/accounts/login")
			.form(&[("username", "kari"), ("password", "wrongpassword")])
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.text().contains("ugyldig brukernavn eller passord"));
		assert!(response.headers().get(header::SET_COOKIE).is_none());
	}

	#[tokio::test]
	async fn test_register_rejects_taken_username() {
		let pool = database().await;
		let app = app(pool.clone());

		user(&pool, "ola").await;

		let response = app
			.post("/accounts/register")
			.form(&[
				("email", "another@example.com"),
				("username", "ola"),
				("password", "hunter2hunter"),
			])
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.text().contains("brukernavnet er allerede i bruk"));
	}

	#[tokio::test]
	async fn test_protected_route_redirects_to_login() {
		let app = app(database().await);

		let response = app.get("/recipes/new").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(
			response.header("location"),
			"/accounts/login?next=%2Frecipes%2Fnew"
		);
	}

	#[tokio::test]
	async fn test_logout_clears_session() {
		let pool = database().await;
		let app = app(pool.clone());
		let (_, cookie) = user(&pool, "ola").await;

		let response = app
			.post("/accounts/logout")
			.add_header(header::COOKIE, cookie.clone())
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("Max-Age=0"));

		let response = app
			.get("/recipes/new")
			.add_header(header::COOKIE, cookie)
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
	}
}
