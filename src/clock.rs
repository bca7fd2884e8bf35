use chrono::{DateTime, Utc};

/// Source of the current time for handlers.
///
/// Handlers never call [`Utc::now`] directly; they receive the time through
/// [`crate::extract::Now`], which reads it from here.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
	#[default]
	System,
	/// Always returns the same instant. Used in tests.
	#[allow(dead_code)]
	Fixed(DateTime<Utc>),
}

impl Clock {
	pub fn now(&self) -> DateTime<Utc> {
		match self {
			Self::System => Utc::now(),
			Self::Fixed(instant) => *instant,
		}
	}
}
