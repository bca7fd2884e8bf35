use axum::{
	extract::State,
	response::{Html, IntoResponse, Redirect, Response},
	Json,
};
use serde::Serialize;
use validator::Validate;

use crate::{
	error::{self, AppError, Message, RouteError},
	extract::{Form, Query, Session},
	route::auth,
	template, Database,
};

use super::model;

/// Returns every category, sorted by name.
pub async fn all_categories(database: &Database) -> Result<Vec<model::Category>, sqlx::Error> {
	sqlx::query_as::<_, model::Category>("SELECT * FROM category ORDER BY name, id")
		.fetch_all(database)
		.await
}

#[derive(Serialize)]
struct ListPage {
	categories: Vec<model::Category>,
}

/// Lists all categories.
pub async fn list_categories(State(database): State<Database>) -> Result<Html<String>, AppError> {
	let categories = all_categories(&database).await?;

	Ok(template::render("category_list.html", &ListPage { categories })?)
}

#[derive(Serialize)]
struct NewPage<'a> {
	form: &'a model::CategoryInput,
	errors: Vec<Message<'a>>,
}

/// Renders the blank category form.
pub async fn new_category_form() -> Result<Html<String>, AppError> {
	let page = NewPage {
		form: &model::CategoryInput::default(),
		errors: Vec::new(),
	};

	Ok(template::render("category_new.html", &page)?)
}

/// Creates a category and returns to the category list.
pub async fn create_category(
	State(database): State<Database>,
	Form(input): Form<model::CategoryInput>,
) -> Result<Response, AppError> {
	if let Err(errors) = input.validate() {
		let page = NewPage {
			form: &input,
			errors: error::field_messages(&errors),
		};

		return Ok(template::render("category_new.html", &page)?.into_response());
	}

	let category_id: i64 = sqlx::query_scalar("INSERT INTO category (name) VALUES (?) RETURNING id")
		.bind(&input.name)
		.fetch_one(&database)
		.await?;

	tracing::info!(category_id, name = %input.name, "created category");

	Ok(Redirect::to("/categories").into_response())
}

/// Suggests categories whose name starts with the typed fragment.
///
/// Anonymous callers always get an empty list. Case is folded for all of
/// Unicode, so `ø` finds `Ørret`.
pub async fn autocomplete(
	State(database): State<Database>,
	session: Result<Session, auth::RouteError>,
	Query(input): Query<model::AutocompleteInput>,
) -> Result<Json<model::Suggestions>, auth::RouteError> {
	match session {
		Ok(..) => {}
		Err(RouteError::Route(auth::Error::LoginRequired(..))) => {
			return Ok(Json(model::Suggestions::empty()));
		}
		Err(error) => return Err(error),
	}

	let categories = all_categories(&database).await?;

	Ok(Json(input.suggest(categories)))
}
