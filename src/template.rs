use axum::response::Html;
use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};

/// Templates compiled into the binary, in inheritance order.
const TEMPLATES: &[(&str, &str)] = &[
	("base.html", include_str!("../templates/base.html")),
	("error.html", include_str!("../templates/error.html")),
	("index.html", include_str!("../templates/index.html")),
	("recipe_list.html", include_str!("../templates/recipe_list.html")),
	("recipe_detail.html", include_str!("../templates/recipe_detail.html")),
	("recipe_edit.html", include_str!("../templates/recipe_edit.html")),
	("recipe_remove.html", include_str!("../templates/recipe_remove.html")),
	("comment_to_recipe.html", include_str!("../templates/comment_to_recipe.html")),
	("category_list.html", include_str!("../templates/category_list.html")),
	("category_new.html", include_str!("../templates/category_new.html")),
	("login.html", include_str!("../templates/login.html")),
	("register.html", include_str!("../templates/register.html")),
];

static ENGINE: Lazy<Tera> =
	Lazy::new(|| engine().expect("embedded templates must compile"));

fn engine() -> Result<Tera, tera::Error> {
	let mut tera = Tera::default();

	tera.add_raw_templates(TEMPLATES.iter().copied())?;
	Ok(tera)
}

/// Renders the named template with a serializable context.
pub fn render<C: Serialize>(name: &str, context: &C) -> Result<Html<String>, tera::Error> {
	let context = Context::from_serialize(context)?;

	ENGINE.render(name, &context).map(Html)
}

#[cfg(test)]
mod test {
	use serde_json::json;

	#[test]
	fn test_templates_compile() {
		assert!(super::engine().is_ok());
	}

	#[test]
	fn test_render_escapes_html() {
		let html = super::render(
			"error.html",
			&json!({
				"status": 404,
				"reason": "Not Found",
				"errors": [{ "content": "<script>", "field": null }],
			}),
		)
		.unwrap();

		assert!(html.0.contains("&lt;script&gt;"));
		assert!(!html.0.contains("<script>"));
	}
}
