//! Queries shared by the recipe pages and the landing page.
//!
//! A recipe is listed once it is *published*: its `published_date` is set
//! and not in the future. Lookups by id ignore that.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{route::category::model::Category, Database};

use super::model;

pub async fn find(database: &Database, id: i64) -> Result<Option<model::Recipe>, sqlx::Error> {
	sqlx::query_as::<_, model::Recipe>("SELECT * FROM recipe WHERE id = ?")
		.bind(id)
		.fetch_optional(database)
		.await
}

pub async fn count_published(database: &Database, now: DateTime<Utc>) -> Result<i64, sqlx::Error> {
	sqlx::query_scalar(
		r#"
			SELECT COUNT(*) FROM recipe
			WHERE published_date IS NOT NULL AND published_date <= ?
		"#,
	)
	.bind(now)
	.fetch_one(database)
	.await
}

/// Returns the `limit` most recently published recipes, newest first.
pub async fn latest_published(
	database: &Database,
	now: DateTime<Utc>,
	limit: i64,
) -> Result<Vec<model::Recipe>, sqlx::Error> {
	sqlx::query_as::<_, model::Recipe>(
		r#"
			SELECT * FROM recipe
			WHERE published_date IS NOT NULL AND published_date <= ?
			ORDER BY published_date DESC, id DESC
			LIMIT ?
		"#,
	)
	.bind(now)
	.bind(limit)
	.fetch_all(database)
	.await
}

/// Returns a slice of the published recipes sorted by title.
pub async fn published_by_title(
	database: &Database,
	now: DateTime<Utc>,
	limit: i64,
	offset: i64,
) -> Result<Vec<model::Recipe>, sqlx::Error> {
	sqlx::query_as::<_, model::Recipe>(
		r#"
			SELECT * FROM recipe
			WHERE published_date IS NOT NULL AND published_date <= ?
			ORDER BY title, id
			LIMIT ? OFFSET ?
		"#,
	)
	.bind(now)
	.bind(limit)
	.bind(offset)
	.fetch_all(database)
	.await
}

/// Picks one recipe uniformly at random, published or not.
pub async fn random(database: &Database) -> Result<Option<model::Recipe>, sqlx::Error> {
	let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe")
		.fetch_one(database)
		.await?;

	if count == 0 {
		return Ok(None);
	}

	let offset = rand::thread_rng().gen_range(0..count);

	sqlx::query_as::<_, model::Recipe>("SELECT * FROM recipe ORDER BY id LIMIT 1 OFFSET ?")
		.bind(offset)
		.fetch_optional(database)
		.await
}

/// Returns every recipe whose title, or the name of one of its categories,
/// contains `term`. The match is case-sensitive and covers unpublished
/// recipes too.
pub async fn search(database: &Database, term: &str) -> Result<Vec<model::Recipe>, sqlx::Error> {
	sqlx::query_as::<_, model::Recipe>(
		r#"
			SELECT DISTINCT recipe.* FROM recipe
			LEFT JOIN recipe_category ON recipe_category.recipe_id = recipe.id
			LEFT JOIN category ON category.id = recipe_category.category_id
			WHERE instr(recipe.title, ?1) > 0 OR instr(category.name, ?1) > 0
			ORDER BY recipe.title, recipe.id
		"#,
	)
	.bind(term)
	.fetch_all(database)
	.await
}

pub async fn detail(
	database: &Database,
	recipe: model::Recipe,
) -> Result<model::RecipeDetail, sqlx::Error> {
	let author: Option<String> = sqlx::query_scalar(r#"SELECT username FROM "user" WHERE id = ?"#)
		.bind(recipe.author_id)
		.fetch_optional(database)
		.await?;

	let categories = sqlx::query_as::<_, Category>(
		r#"
			SELECT category.* FROM category
			JOIN recipe_category ON recipe_category.category_id = category.id
			WHERE recipe_category.recipe_id = ?
			ORDER BY category.name, category.id
		"#,
	)
	.bind(recipe.id)
	.fetch_all(database)
	.await?;

	let comments = sqlx::query_as::<_, model::Comment>(
		r#"
			SELECT * FROM comment
			WHERE recipe_id = ?
			ORDER BY created_date, id
		"#,
	)
	.bind(recipe.id)
	.fetch_all(database)
	.await?;

	Ok(model::RecipeDetail {
		recipe,
		author,
		categories,
		comments,
	})
}

pub async fn category_ids(database: &Database, recipe_id: i64) -> Result<Vec<i64>, sqlx::Error> {
	sqlx::query_scalar("SELECT category_id FROM recipe_category WHERE recipe_id = ?")
		.bind(recipe_id)
		.fetch_all(database)
		.await
}

/// Returns the ids in `ids` that do not belong to a category.
pub async fn unknown_categories(database: &Database, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM category WHERE id IN (");
	let mut separated = builder.separated(", ");

	for id in ids {
		separated.push_bind(*id);
	}

	separated.push_unseparated(")");

	let known = builder
		.build_query_scalar::<i64>()
		.fetch_all(database)
		.await?;

	Ok(ids.iter().copied().filter(|id| !known.contains(id)).collect())
}

/// Replaces the categories of a recipe.
pub async fn link_categories(
	connection: &mut SqliteConnection,
	recipe_id: i64,
	ids: &[i64],
) -> Result<(), sqlx::Error> {
	sqlx::query("DELETE FROM recipe_category WHERE recipe_id = ?")
		.bind(recipe_id)
		.execute(&mut *connection)
		.await?;

	if ids.is_empty() {
		return Ok(());
	}

	let mut builder =
		QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO recipe_category (recipe_id, category_id) ");

	builder.push_values(ids, |mut row, id| {
		row.push_bind(recipe_id).push_bind(*id);
	});

	builder.build().execute(&mut *connection).await?;

	Ok(())
}
