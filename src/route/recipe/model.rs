use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::route::category::model::Category;

/// Number of recipes on each page of the listing.
pub const PAGE_SIZE: i64 = 6;

/// A single recipe.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Recipe {
	pub id: i64,
	pub title: String,
	/// The body of the recipe: ingredients and steps.
	pub text: String,
	pub author_id: Uuid,
	pub created_date: DateTime<Utc>,
	/// The time from which the recipe is listed, if it has been published.
	pub published_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Comment {
	pub id: i64,
	pub recipe_id: i64,
	pub author: String,
	pub content: String,
	pub created_date: DateTime<Utc>,
}

/// A recipe with everything its detail page shows.
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
	pub recipe: Recipe,
	pub author: Option<String>,
	pub categories: Vec<Category>,
	pub comments: Vec<Comment>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct RecipeInput {
	#[serde(default)]
	#[validate(length(min = 1, max = 200, message = "må være mellom 1 og 200 tegn"))]
	pub title: String,
	#[serde(default)]
	#[validate(length(min = 1, message = "kan ikke være tom"))]
	pub text: String,
	/// Ids of the selected categories.
	#[serde(default)]
	pub categories: Vec<i64>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct CommentInput {
	#[serde(default)]
	#[validate(length(min = 1, max = 64, message = "må være mellom 1 og 64 tegn"))]
	pub author: String,
	#[serde(default)]
	#[validate(length(min = 1, message = "kan ikke være tom"))]
	pub content: String,
}

/// A category in the recipe form's select box.
#[derive(Debug, Serialize)]
pub struct CategoryOption {
	pub id: i64,
	pub name: String,
	pub selected: bool,
}
