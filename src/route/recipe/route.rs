use axum::{
	extract::State,
	response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use validator::Validate;

use crate::{
	error::{self, Message},
	extract::{Form, Now, Path, Session},
	route::{
		category::route::all_categories,
		model::{Page, Paginator},
	},
	template, Database,
};

use super::{model, query, Error, RouteError};

const PAGINATOR: Paginator = Paginator::new(model::PAGE_SIZE);

async fn find_or_404(database: &Database, recipe_id: i64) -> Result<model::Recipe, RouteError> {
	query::find(database, recipe_id)
		.await?
		.ok_or_else(|| Error::UnknownRecipe(recipe_id).into())
}

#[derive(Serialize)]
struct ListPage {
	page: Page<model::Recipe>,
}

async fn render_list(
	database: &Database,
	now: chrono::DateTime<chrono::Utc>,
	page: Option<&str>,
) -> Result<Html<String>, RouteError> {
	let count = query::count_published(database, now).await?;
	let request = PAGINATOR.resolve(count, page);
	let recipes =
		query::published_by_title(database, now, request.limit(), request.offset()).await?;

	Ok(template::render(
		"recipe_list.html",
		&ListPage {
			page: request.page(recipes),
		},
	)?)
}

/// Lists the first page of published recipes.
pub async fn list_recipes(
	State(database): State<Database>,
	Now(now): Now,
) -> Result<Html<String>, RouteError> {
	render_list(&database, now, None).await
}

/// Lists a page of published recipes. Bad page numbers fall back to the
/// nearest valid page.
pub async fn list_recipes_page(
	State(database): State<Database>,
	Now(now): Now,
	Path(page): Path<String>,
) -> Result<Html<String>, RouteError> {
	render_list(&database, now, Some(&page)).await
}

/// Shows a single recipe, published or not.
pub async fn get_recipe(
	State(database): State<Database>,
	Path(recipe_id): Path<i64>,
) -> Result<Html<String>, RouteError> {
	let recipe = find_or_404(&database, recipe_id).await?;
	let detail = query::detail(&database, recipe).await?;

	Ok(template::render("recipe_detail.html", &detail)?)
}

#[derive(Serialize)]
struct EditPage<'a> {
	recipe_id: Option<i64>,
	form: &'a model::RecipeInput,
	options: Vec<model::CategoryOption>,
	errors: Vec<Message<'a>>,
}

async fn render_edit(
	database: &Database,
	recipe_id: Option<i64>,
	form: &model::RecipeInput,
	errors: Vec<Message<'_>>,
) -> Result<Response, RouteError> {
	let options = all_categories(database)
		.await?
		.into_iter()
		.map(|category| model::CategoryOption {
			selected: form.categories.contains(&category.id),
			id: category.id,
			name: category.name,
		})
		.collect();

	let page = EditPage {
		recipe_id,
		form,
		options,
		errors,
	};

	Ok(template::render("recipe_edit.html", &page)?.into_response())
}

/// Validates the form, including that every selected category exists.
async fn validate_recipe(
	database: &Database,
	input: &model::RecipeInput,
) -> Result<Vec<Message<'static>>, RouteError> {
	let mut errors = match input.validate() {
		Ok(()) => Vec::new(),
		Err(errors) => error::field_messages(&errors),
	};

	for id in query::unknown_categories(database, &input.categories).await? {
		errors.push(Message::new(format!("ugyldig valg {id}")).field("categories"));
	}

	Ok(errors)
}

/// Renders the blank recipe form.
pub async fn new_recipe_form(
	State(database): State<Database>,
	_session: Session,
) -> Result<Response, RouteError> {
	render_edit(&database, None, &model::RecipeInput::default(), Vec::new()).await
}

/// Creates a recipe, published right away under the current user.
pub async fn create_recipe(
	State(database): State<Database>,
	session: Session,
	Now(now): Now,
	Form(input): Form<model::RecipeInput>,
) -> Result<Response, RouteError> {
	let errors = validate_recipe(&database, &input).await?;

	if !errors.is_empty() {
		return render_edit(&database, None, &input, errors).await;
	}

	let mut tx = database.begin().await?;

	let recipe_id: i64 = sqlx::query_scalar(
		r#"
			INSERT INTO recipe (title, text, author_id, created_date, published_date)
			VALUES (?, ?, ?, ?, ?)
			RETURNING id
		"#,
	)
	.bind(&input.title)
	.bind(&input.text)
	.bind(session.user.id)
	.bind(now)
	.bind(now)
	.fetch_one(&mut *tx)
	.await?;

	query::link_categories(&mut tx, recipe_id, &input.categories).await?;
	tx.commit().await?;

	tracing::info!(recipe_id, username = %session.user.username, "created recipe");

	Ok(Redirect::to(&format!("/recipes/{recipe_id}")).into_response())
}

/// Renders the recipe form filled in with the current recipe.
pub async fn edit_recipe_form(
	State(database): State<Database>,
	_session: Session,
	Path(recipe_id): Path<i64>,
) -> Result<Response, RouteError> {
	let recipe = find_or_404(&database, recipe_id).await?;
	let form = model::RecipeInput {
		title: recipe.title,
		text: recipe.text,
		categories: query::category_ids(&database, recipe_id).await?,
	};

	render_edit(&database, Some(recipe_id), &form, Vec::new()).await
}

/// Updates a recipe. The current user becomes its author, and it is
/// published again as of now.
pub async fn update_recipe(
	State(database): State<Database>,
	session: Session,
	Now(now): Now,
	Path(recipe_id): Path<i64>,
	Form(input): Form<model::RecipeInput>,
) -> Result<Response, RouteError> {
	find_or_404(&database, recipe_id).await?;

	let errors = validate_recipe(&database, &input).await?;

	if !errors.is_empty() {
		return render_edit(&database, Some(recipe_id), &input, errors).await;
	}

	let mut tx = database.begin().await?;

	sqlx::query(
		r#"
			UPDATE recipe
			SET title = ?, text = ?, author_id = ?, published_date = ?
			WHERE id = ?
		"#,
	)
	.bind(&input.title)
	.bind(&input.text)
	.bind(session.user.id)
	.bind(now)
	.bind(recipe_id)
	.execute(&mut *tx)
	.await?;

	query::link_categories(&mut tx, recipe_id, &input.categories).await?;
	tx.commit().await?;

	tracing::info!(recipe_id, username = %session.user.username, "updated recipe");

	Ok(Redirect::to(&format!("/recipes/{recipe_id}")).into_response())
}

#[derive(Serialize)]
struct RemovePage {
	recipe: model::Recipe,
}

/// Asks for confirmation before removing a recipe.
pub async fn remove_recipe_form(
	State(database): State<Database>,
	_session: Session,
	Path(recipe_id): Path<i64>,
) -> Result<Html<String>, RouteError> {
	let recipe = find_or_404(&database, recipe_id).await?;

	Ok(template::render("recipe_remove.html", &RemovePage { recipe })?)
}

/// Removes a recipe along with its comments and category links.
pub async fn remove_recipe(
	State(database): State<Database>,
	session: Session,
	Path(recipe_id): Path<i64>,
) -> Result<Redirect, RouteError> {
	let result = sqlx::query("DELETE FROM recipe WHERE id = ?")
		.bind(recipe_id)
		.execute(&database)
		.await?;

	if result.rows_affected() == 0 {
		return Err(Error::UnknownRecipe(recipe_id).into());
	}

	tracing::info!(recipe_id, username = %session.user.username, "removed recipe");

	Ok(Redirect::to("/recipes"))
}

#[derive(Serialize)]
struct CommentPage<'a> {
	recipe: &'a model::Recipe,
	form: &'a model::CommentInput,
	errors: Vec<Message<'a>>,
}

/// Renders the blank comment form.
pub async fn comment_form(
	State(database): State<Database>,
	Path(recipe_id): Path<i64>,
) -> Result<Html<String>, RouteError> {
	let recipe = find_or_404(&database, recipe_id).await?;
	let page = CommentPage {
		recipe: &recipe,
		form: &model::CommentInput::default(),
		errors: Vec::new(),
	};

	Ok(template::render("comment_to_recipe.html", &page)?)
}

/// Adds a comment to a recipe.
pub async fn create_comment(
	State(database): State<Database>,
	Now(now): Now,
	Path(recipe_id): Path<i64>,
	Form(input): Form<model::CommentInput>,
) -> Result<Response, RouteError> {
	let recipe = find_or_404(&database, recipe_id).await?;

	if let Err(errors) = input.validate() {
		let page = CommentPage {
			recipe: &recipe,
			form: &input,
			errors: error::field_messages(&errors),
		};

		return Ok(template::render("comment_to_recipe.html", &page)?.into_response());
	}

	sqlx::query(
		r#"
			INSERT INTO comment (recipe_id, author, content, created_date)
			VALUES (?, ?, ?, ?)
		"#,
	)
	.bind(recipe_id)
	.bind(&input.author)
	.bind(&input.content)
	.bind(now)
	.execute(&database)
	.await?;

	tracing::debug!(recipe_id, author = %input.author, "added comment");

	Ok(Redirect::to(&format!("/recipes/{recipe_id}")).into_response())
}
