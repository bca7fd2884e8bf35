use axum::{routing::get, Router};

use crate::AppState;

pub mod model;
pub mod route;

pub fn routes() -> Router<AppState> {
	use route::*;

	Router::new()
		.route("/categories", get(list_categories))
		.route("/categories/new", get(new_category_form).post(create_category))
		.route("/categories/autocomplete", get(autocomplete))
}
