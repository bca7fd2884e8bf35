use axum::{extract::State, http::Method, response::Html, routing::get, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
	error::AppError,
	extract::{Now, Query},
	route::recipe::{model::Recipe, query},
	template, AppState, Database,
};

/// Number of recently published recipes shown when not searching.
const LATEST_COUNT: i64 = 5;

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/", get(index))
		.route("/search", get(search).post(search))
}

#[derive(Deserialize, Validate)]
pub struct SearchInput {
	#[validate(length(max = 128, message = "kan ikke være lengre enn 128 tegn"))]
	pub recipe_search: Option<String>,
}

#[derive(Default, Serialize)]
struct IndexPage {
	landing: bool,
	random_recipe: Option<Recipe>,
	recipes: Vec<Recipe>,
	count: i64,
	message: Option<String>,
}

fn search_message(matches: usize) -> String {
	if matches == 0 {
		"Ingen resultater passet søket :(".into()
	} else {
		format!("Søket ga {matches} treff")
	}
}

/// Shows a random recipe from the whole catalog.
pub async fn index(State(database): State<Database>) -> Result<Html<String>, AppError> {
	let page = IndexPage {
		landing: true,
		random_recipe: query::random(&database).await?,
		..Default::default()
	};

	Ok(template::render("index.html", &page)?)
}

/// Searches recipe titles and category names.
///
/// Without a term, or for anything but `GET`, this lists the latest
/// published recipes instead.
pub async fn search(
	method: Method,
	State(database): State<Database>,
	Now(now): Now,
	Query(input): Query<SearchInput>,
) -> Result<Html<String>, AppError> {
	let count = query::count_published(&database, now).await?;
	let term = input
		.recipe_search
		.as_deref()
		.filter(|term| method == Method::GET && !term.trim().is_empty());

	let page = if let Some(term) = term {
		let recipes = query::search(&database, term).await?;

		tracing::debug!(term, matches = recipes.len(), "searched recipes");

		IndexPage {
			message: Some(search_message(recipes.len())),
			recipes,
			count,
			..Default::default()
		}
	} else {
		IndexPage {
			recipes: query::latest_published(&database, now, LATEST_COUNT).await?,
			count,
			..Default::default()
		}
	};

	Ok(template::render("index.html", &page)?)
}
