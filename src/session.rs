use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";

/// Options applied to every session cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieOptions {
	pub secure: bool,
}

/// Creates a session cookie with no expiry
pub fn create_cookie(session_id: Uuid, options: CookieOptions) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(options.secure)
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}
