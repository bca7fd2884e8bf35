use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("alphanumeric")
			.with_message("kan bare inneholde bokstaver og tall".into()));
	}

	Ok(())
}

/// A single user.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user, also used to salt the password.
	pub id: Uuid,
	/// The user's email address.
	#[serde(skip_serializing)]
	#[allow(dead_code)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The username that is displayed to the public.
	pub username: String,
	/// The creation time of the user.
	#[allow(dead_code)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate)]
pub struct LoginQuery {
	pub next: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct LoginInput {
	#[serde(default)]
	#[validate(length(min = 1, message = "må fylles ut"))]
	pub username: String,
	#[serde(default)]
	#[validate(length(min = 1, message = "må fylles ut"))]
	pub password: String,
	pub next: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct RegisterInput {
	#[serde(default)]
	#[validate(email(message = "må være en gyldig e-postadresse"))]
	pub email: String,
	#[serde(default)]
	#[validate(length(min = 8, max = 128, message = "må være mellom 8 og 128 tegn"))]
	pub password: String,
	/// The username that is displayed to the public.
	#[serde(default)]
	#[validate(
		length(min = 3, max = 16, message = "må være mellom 3 og 16 tegn"),
		custom(function = "validate_username")
	)]
	pub username: String,
}
