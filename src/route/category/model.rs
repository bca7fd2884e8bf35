use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of suggestions returned per autocomplete page.
pub const AUTOCOMPLETE_PAGE_SIZE: usize = 10;

/// A single category that recipes can be filed under.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
	pub id: i64,
	pub name: String,
}

#[derive(Default, Deserialize, Serialize, Validate)]
pub struct CategoryInput {
	#[serde(default)]
	#[validate(length(min = 1, max = 64, message = "må være mellom 1 og 64 tegn"))]
	pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct AutocompleteInput {
	/// The fragment typed so far.
	pub q: Option<String>,
	#[serde(default = "first_page")]
	#[validate(range(min = 1, message = "må være minst 1"))]
	pub page: i64,
}

fn first_page() -> i64 {
	1
}

impl AutocompleteInput {
	/// The lowercased fragment, or `None` if it is blank.
	fn fragment(&self) -> Option<String> {
		self.q
			.as_deref()
			.filter(|q| !q.trim().is_empty())
			.map(str::to_lowercase)
	}

	/// Number of matches skipped before the requested page.
	pub fn offset(&self) -> usize {
		usize::try_from(self.page.saturating_sub(1))
			.unwrap_or(usize::MAX)
			.saturating_mul(AUTOCOMPLETE_PAGE_SIZE)
	}

	/// Picks the requested page of categories whose name starts with the
	/// fragment, ignoring case. `categories` must be sorted by name.
	pub fn suggest(&self, categories: Vec<Category>) -> Suggestions {
		let fragment = self.fragment();
		let mut matches = categories
			.into_iter()
			.filter(|category| {
				fragment
					.as_deref()
					.map_or(true, |fragment| category.name.to_lowercase().starts_with(fragment))
			})
			.skip(self.offset());

		let results = matches
			.by_ref()
			.take(AUTOCOMPLETE_PAGE_SIZE)
			.map(Into::into)
			.collect();

		Suggestions {
			results,
			pagination: Pagination {
				more: matches.next().is_some(),
			},
		}
	}
}

/// A suggestion in the shape the select widget expects.
#[derive(Debug, Serialize, Deserialize)]
pub struct Suggestion {
	pub id: String,
	pub text: String,
	pub selected_text: String,
}

impl From<Category> for Suggestion {
	fn from(category: Category) -> Self {
		Self {
			id: category.id.to_string(),
			text: category.name.clone(),
			selected_text: category.name,
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pagination {
	pub more: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Suggestions {
	pub results: Vec<Suggestion>,
	pub pagination: Pagination,
}

impl Suggestions {
	pub fn empty() -> Self {
		Self {
			results: Vec::new(),
			pagination: Pagination { more: false },
		}
	}
}
