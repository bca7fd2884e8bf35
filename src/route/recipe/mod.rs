use axum::{http::StatusCode, routing::get, Router};

use crate::{error, AppState};

pub mod model;
pub mod query;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown recipe {0}")]
	UnknownRecipe(i64),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> Router<AppState> {
	use route::*;

	Router::new()
		.route("/recipes", get(list_recipes))
		.route("/recipes/page/:page", get(list_recipes_page))
		.route("/recipes/new", get(new_recipe_form).post(create_recipe))
		.route("/recipes/:id", get(get_recipe))
		.route("/recipes/:id/edit", get(edit_recipe_form).post(update_recipe))
		.route(
			"/recipes/:id/remove",
			get(remove_recipe_form).post(remove_recipe),
		)
		.route("/recipes/:id/comment", get(comment_form).post(create_comment))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownRecipe(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownRecipe(..) => error::Message::new("Oppskriften finnes ikke.").into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn recipe_count(pool: &Database) -> i64 {
		sqlx::query_scalar("SELECT COUNT(*) FROM recipe")
			.fetch_one(pool)
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn test_listing_hides_unpublished_recipes() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, _) = user(&pool, "ola").await;

		insert_recipe(&pool, author, "Lapskaus", Some(now() - chrono::Duration::days(1))).await;
		let future =
			insert_recipe(&pool, author, "Fremtidskake", Some(now() + chrono::Duration::days(1)))
				.await;
		let draft = insert_recipe(&pool, author, "Kladdesuppe", None).await;

		let text = app.get("/recipes").await.text();

		assert!(text.contains("Lapskaus"));
		assert!(!text.contains("Fremtidskake"));
		assert!(!text.contains("Kladdesuppe"));

		for id in [future, draft] {
			let response = app.get(&format!("/recipes/{id}")).await;
			assert_eq!(response.status_code(), StatusCode::OK);
		}
	}

	#[tokio::test]
	async fn test_listing_resolves_bad_pages() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, _) = user(&pool, "ola").await;

		for i in 0..14 {
			insert_recipe(&pool, author, &format!("Oppskrift {i:02}"), Some(now())).await;
		}

		let text = app.get("/recipes/page/0").await.text();
		assert!(text.contains("Side 1 av 3"));
		assert!(text.contains("Oppskrift 00"));

		let text = app.get("/recipes/page/abc").await.text();
		assert!(text.contains("Side 1 av 3"));

		let response = app.get("/recipes/page/999").await;
		assert_eq!(response.status_code(), StatusCode::OK);

		let text = response.text();
		assert!(text.contains("Side 3 av 3"));
		assert!(text.contains("Oppskrift 13"));
		assert!(!text.contains("Oppskrift 11"));

		let text = app.get("/recipes/page/99999999999999999999").await.text();
		assert!(text.contains("Side 3 av 3"));
	}

	#[tokio::test]
	async fn test_empty_listing_has_one_page() {
		let app = app(database().await);

		let response = app.get("/recipes/page/2").await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.text().contains("Side 1 av 1"));
	}

	#[tokio::test]
	async fn test_detail_shows_author_categories_and_comments() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, _) = user(&pool, "ola").await;

		let recipe = insert_recipe(&pool, author, "Fiskesuppe", Some(now())).await;
		let category = insert_category(&pool, "Sjømat").await;
		link(&pool, recipe, category).await;

		let response = app
			.post(&format!("/recipes/{recipe}/comment"))
			.form(&[("author", "Kari"), ("content", "Nydelig!")])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), format!("/recipes/{recipe}").as_str());

		let text = app.get(&format!("/recipes/{recipe}")).await.text();

		assert!(text.contains("Fiskesuppe"));
		assert!(text.contains("av ola"));
		assert!(text.contains("Sjømat"));
		assert!(text.contains("Kari"));
		assert!(text.contains("Nydelig!"));
	}

	#[tokio::test]
	async fn test_unknown_recipe_is_not_found() {
		let app = app(database().await);

		assert_eq!(app.get("/recipes/42").await.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(app.get("/recipes/abc").await.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(
			app.get("/recipes/42/comment").await.status_code(),
			StatusCode::NOT_FOUND
		);
	}

	#[tokio::test]
	async fn test_invalid_comment_is_not_saved() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, _) = user(&pool, "ola").await;
		let recipe = insert_recipe(&pool, author, "Fiskesuppe", Some(now())).await;

		let response = app
			.post(&format!("/recipes/{recipe}/comment"))
			.form(&[("author", "Kari"), ("content", "")])
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.text().contains("content: kan ikke være tom"));

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 0);
	}

	#[tokio::test]
	async fn test_create_recipe_stamps_author_and_time() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, cookie) = user(&pool, "ola").await;
		let dinner = insert_category(&pool, "Middag").await.to_string();
		let fish = insert_category(&pool, "Fisk").await.to_string();

		let response = app
			.post("/recipes/new")
			.add_header(header::COOKIE, cookie)
			.form(&[
				("title", "Torsk"),
				("text", "Kok torsken."),
				("categories", dinner.as_str()),
				("categories", fish.as_str()),
			])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

		let (id, author_id, published): (i64, Uuid, Option<chrono::DateTime<chrono::Utc>>) =
			sqlx::query_as("SELECT id, author_id, published_date FROM recipe")
				.fetch_one(&pool)
				.await
				.unwrap();

		assert_eq!(response.header("location"), format!("/recipes/{id}").as_str());
		assert_eq!(author_id, author);
		assert_eq!(published, Some(now()));

		let categories: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM recipe_category WHERE recipe_id = ?")
				.bind(id)
				.fetch_one(&pool)
				.await
				.unwrap();

		assert_eq!(categories, 2);
	}

	#[tokio::test]
	async fn test_create_recipe_rejects_missing_fields() {
		let pool = database().await;
		let app = app(pool.clone());
		let (_, cookie) = user(&pool, "ola").await;

		let response = app
			.post("/recipes/new")
			.add_header(header::COOKIE, cookie)
			.form(&[("title", "Uten fremgangsmåte"), ("text", "")])
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let text = response.text();
		assert!(text.contains("text: kan ikke være tom"));
		assert!(text.contains("Uten fremgangsmåte"));
		assert_eq!(recipe_count(&pool).await, 0);
	}

	#[tokio::test]
	async fn test_create_recipe_rejects_unknown_category() {
		let pool = database().await;
		let app = app(pool.clone());
		let (_, cookie) = user(&pool, "ola").await;

		let response = app
			.post("/recipes/new")
			.add_header(header::COOKIE, cookie)
			.form(&[("title", "Torsk"), ("text", "Kok torsken."), ("categories", "99")])
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.text().contains("categories: ugyldig valg 99"));
		assert_eq!(recipe_count(&pool).await, 0);
	}

	#[tokio::test]
	async fn test_edit_recipe_restamps_author() {
		let pool = database().await;
		let app = app(pool.clone());
		let (original, _) = user(&pool, "ola").await;
		let (editor, cookie) = user(&pool, "kari").await;

		let recipe = insert_recipe(&pool, original, "Vafler", None).await;
		let category = insert_category(&pool, "Dessert").await;
		link(&pool, recipe, category).await;

		let response = app
			.get(&format!("/recipes/{recipe}/edit"))
			.add_header(header::COOKIE, cookie.clone())
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.text().contains("Vafler"));

		let response = app
			.post(&format!("/recipes/{recipe}/edit"))
			.add_header(header::COOKIE, cookie)
			.form(&[("title", "Sprø vafler"), ("text", "Stek dem lenge.")])
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

		let (title, author_id, published): (String, Uuid, Option<chrono::DateTime<chrono::Utc>>) =
			sqlx::query_as("SELECT title, author_id, published_date FROM recipe WHERE id = ?")
				.bind(recipe)
				.fetch_one(&pool)
				.await
				.unwrap();

		assert_eq!(title, "Sprø vafler");
		assert_eq!(author_id, editor);
		assert_eq!(published, Some(now()));

		let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_category")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(links, 0);
	}

	#[tokio::test]
	async fn test_remove_recipe() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, cookie) = user(&pool, "ola").await;
		let recipe = insert_recipe(&pool, author, "Pinnekjøtt", Some(now())).await;

		let response = app
			.get(&format!("/recipes/{recipe}/remove"))
			.add_header(header::COOKIE, cookie.clone())
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(recipe_count(&pool).await, 1);

		let response = app
			.post(&format!("/recipes/{recipe}/remove"))
			.add_header(header::COOKIE, cookie.clone())
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/recipes");
		assert_eq!(
			app.get(&format!("/recipes/{recipe}")).await.status_code(),
			StatusCode::NOT_FOUND
		);
	}

	#[tokio::test]
	async fn test_remove_unknown_recipe_is_not_found() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, cookie) = user(&pool, "ola").await;
		insert_recipe(&pool, author, "Pinnekjøtt", Some(now())).await;

		let response = app
			.post("/recipes/999/remove")
			.add_header(header::COOKIE, cookie)
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(recipe_count(&pool).await, 1);
	}

	#[tokio::test]
	async fn test_recipe_changes_require_login() {
		let pool = database().await;
		let app = app(pool.clone());
		let (author, _) = user(&pool, "ola").await;
		let recipe = insert_recipe(&pool, author, "Pinnekjøtt", Some(now())).await;

		let response = app.post(&format!("/recipes/{recipe}/remove")).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(
			response.header("location"),
			format!("/accounts/login?next=%2Frecipes%2F{recipe}%2Fremove").as_str()
		);
		assert_eq!(recipe_count(&pool).await, 1);
	}
}
