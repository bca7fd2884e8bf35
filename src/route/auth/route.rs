use argon2::Argon2;
use axum::{
	extract::State,
	http::header,
	response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
	error::{self, Message},
	extract::{Form, Now, Query, Session},
	session, template, AppState, Database,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Returns `next` if it is a path on this site, or the landing page otherwise.
fn local_path(next: Option<&str>) -> &str {
	match next {
		Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") => {
			path
		}
		_ => "/",
	}
}

async fn open_session<'c, E>(
	executor: E,
	user_id: Uuid,
	now: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error>
where
	E: sqlx::SqliteExecutor<'c>,
{
	let session_id = Uuid::new_v4();

	sqlx::query("INSERT INTO session (id, user_id, created_at) VALUES (?, ?, ?)")
		.bind(session_id)
		.bind(user_id)
		.bind(now)
		.execute(executor)
		.await?;

	Ok(session_id)
}

#[derive(Serialize)]
struct LoginPage<'a> {
	username: &'a str,
	next: &'a str,
	errors: Vec<Message<'a>>,
}

fn render_login(
	username: &str,
	next: &str,
	errors: Vec<Message<'_>>,
) -> Result<Response, tera::Error> {
	let page = LoginPage {
		username,
		next,
		errors,
	};

	Ok(template::render("login.html", &page)?.into_response())
}

#[derive(Serialize)]
struct RegisterPage<'a> {
	username: &'a str,
	email: &'a str,
	errors: Vec<Message<'a>>,
}

fn render_register(
	input: &model::RegisterInput,
	errors: Vec<Message<'_>>,
) -> Result<Response, tera::Error> {
	let page = RegisterPage {
		username: &input.username,
		email: &input.email,
		errors,
	};

	Ok(template::render("register.html", &page)?.into_response())
}

/// Renders the login form.
pub async fn login_form(Query(query): Query<model::LoginQuery>) -> Result<Response, RouteError> {
	Ok(render_login("", local_path(query.next.as_deref()), Vec::new())?)
}

/// Logs in to an account, setting the session cookie and redirecting to
/// the page that required the login.
pub async fn login(
	State(state): State<AppState>,
	Now(now): Now,
	Form(input): Form<model::LoginInput>,
) -> Result<Response, RouteError> {
	let next = local_path(input.next.as_deref());

	if let Err(errors) = input.validate() {
		return Ok(render_login(
			&input.username,
			next,
			error::field_messages(&errors),
		)?);
	}

	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(&input.username)
		.fetch_optional(&state.database)
		.await?;

	let invalid = || Message::new(Error::InvalidUsernameOrPassword.to_string()).into_vec();

	let Some(user) = user else {
		return Ok(render_login(&input.username, next, invalid())?);
	};

	let hashed = hash_password(&state.hasher, &input.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Ok(render_login(&input.username, next, invalid())?);
	}

	let session_id = open_session(&state.database, user.id, now).await?;
	let cookie = session::create_cookie(session_id, state.cookie);

	tracing::info!(username = %user.username, "logged in");

	Ok(([(header::SET_COOKIE, cookie.to_string())], Redirect::to(next)).into_response())
}

/// Logs out of the current session, if there is one.
pub async fn logout(
	State(database): State<Database>,
	session: Option<Session>,
) -> Result<Response, RouteError> {
	if let Some(session) = session {
		sqlx::query("DELETE FROM session WHERE id = ?")
			.bind(session.id)
			.execute(&database)
			.await?;

		tracing::info!(username = %session.user.username, "logged out");
	}

	// Clear the session cookie
	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		Redirect::to("/"),
	)
		.into_response())
}

/// Renders the registration form.
pub async fn register_form() -> Result<Response, RouteError> {
	let page = RegisterPage {
		username: "",
		email: "",
		errors: Vec::new(),
	};

	Ok(template::render("register.html", &page)?.into_response())
}

/// Registers a new account, logging it in right away.
pub async fn register(
	State(state): State<AppState>,
	Now(now): Now,
	Form(input): Form<model::RegisterInput>,
) -> Result<Response, RouteError> {
	if let Err(errors) = input.validate() {
		return Ok(render_register(&input, error::field_messages(&errors))?);
	}

	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &input.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	let inserted = sqlx::query(
		r#"
			INSERT INTO "user" (id, email, username, password, created_at)
			VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(user_id)
	.bind(&input.email)
	.bind(&input.username)
	.bind(&hashed[..])
	.bind(now)
	.execute(&mut *tx)
	.await;

	if let Err(sqlx::Error::Database(ref error)) = inserted {
		if error.is_unique_violation() {
			let message = if error.message().contains("user.email") {
				Message::new(Error::EmailTaken.to_string()).field("email")
			} else {
				Message::new(Error::UsernameTaken.to_string()).field("username")
			};

			return Ok(render_register(&input, message.into_vec())?);
		}
	}

	inserted?;

	let session_id = open_session(&mut *tx, user_id, now).await?;

	tx.commit().await?;

	tracing::info!(username = %input.username, "registered user");

	let cookie = session::create_cookie(session_id, state.cookie);

	Ok(([(header::SET_COOKIE, cookie.to_string())], Redirect::to("/")).into_response())
}
