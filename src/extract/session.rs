use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{route::auth, session, Database};

/// Extracts the session and related user from the request.
///
/// If the session cookie is missing or does not belong to a session, an
/// [`auth::Error::LoginRequired`] is returned, which redirects the client to
/// the login page and back to the requested path afterwards. Wrap it in an
/// [`Option`] where authentication is optional.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = auth::RouteError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let login_required = || {
			let next = parts
				.uri
				.path_and_query()
				.map_or_else(|| parts.uri.path(), |path| path.as_str());

			auth::Error::LoginRequired(next.to_owned())
		};

		let session_id = parts
			.headers
			.get_all(header::COOKIE)
			.into_iter()
			.filter_map(|value| value.to_str().ok())
			.flat_map(cookie::Cookie::split_parse)
			.filter_map(Result::ok)
			.find(|cookie| cookie.name() == session::COOKIE_NAME)
			.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
			.ok_or_else(login_required)?;

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, auth::model::User>(
			r#"
				SELECT "user".* FROM "user"
				JOIN session ON session.user_id = "user".id
				WHERE session.id = ?
			"#,
		)
		.bind(session_id)
		.fetch_optional(&database)
		.await?;

		let user = user.ok_or_else(login_required)?;

		Ok(Self {
			user,
			id: session_id,
		})
	}
}
