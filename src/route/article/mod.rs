use aide::axum::{
	routing::{get_with, patch_with},
	ApiRouter,
};

use crate::{error, AppState};

pub mod model;
pub mod route;

pub use crate::service::article::Error;

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_articles, get_articles_docs).post_with(create_article, create_article_docs),
		)
		.api_route(
			"/published",
			get_with(get_published_articles, get_published_articles_docs),
		)
		.api_route(
			"/:id",
			get_with(get_article, get_article_docs)
				.put_with(update_article, update_article_docs)
				.delete_with(delete_article, delete_article_docs),
		)
		.api_route(
			"/:id/with-comments",
			get_with(get_article_with_comments, get_article_with_comments_docs),
		)
		.api_route(
			"/:id/comments",
			get_with(get_article_comments, get_article_comments_docs),
		)
		.api_route("/:id/publish", patch_with(toggle_publish, toggle_publish_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn create(app: &TestServer, token: &str, title: &str) -> String {
		let response = app
			.post("/api/articles")
			.bearer(token)
			.json(&json!({
				"title": title,
				"content": "Some content",
				"category": "Tech",
			}))
			.await;

		assert_eq!(response.status_code(), 201);

		response.json::<Value>()["data"]["id"]
			.as_str()
			.unwrap()
			.to_owned()
	}

	#[tokio::test]
	async fn test_create_requires_token() {
		let app = app();

		let response = app
			.post("/api/articles")
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = app.get("/api/articles").await;

		assert_eq!(response.json::<Value>()["total"], 0);
	}

	#[tokio::test]
	async fn test_publish_toggle_scenario() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let id = create(&app, &alice.token, "Hello").await;

		let response = app.get(&format!("/api/articles/{id}")).await;

		assert_eq!(response.json::<Value>()["data"]["published"], false);

		let response = app
			.patch(&format!("/api/articles/{id}/publish"))
			.bearer(&alice.token)
			.await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["data"]["published"], true);
		assert_eq!(body["message"], "Article published");

		let published = app.get("/api/articles/published").await.json::<Value>();

		assert_eq!(published["count"], 1);
		assert_eq!(published["data"][0]["author"]["name"], "Alice");

		let response = app
			.patch(&format!("/api/articles/{id}/publish"))
			.bearer(&alice.token)
			.await;

		let body = response.json::<Value>();

		assert_eq!(body["data"]["published"], false);
		assert_eq!(body["message"], "Article moved back to drafts");
	}

	#[tokio::test]
	async fn test_non_owner_is_forbidden() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let bob = register(&app, "Bob", "bob@x.com").await;
		let id = create(&app, &alice.token, "Original").await;
		let path = format!("/api/articles/{id}");

		let response = app
			.put(&path)
			.bearer(&bob.token)
			.json(&json!({ "title": "Hijacked" }))
			.await;

		assert_eq!(response.status_code(), 403);
		assert_eq!(response.json::<Value>()["success"], false);

		let response = app
			.patch(&format!("{path}/publish"))
			.bearer(&bob.token)
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app.delete(&path).bearer(&bob.token).await;

		assert_eq!(response.status_code(), 403);

		let article = app.get(&path).await.json::<Value>();

		assert_eq!(article["data"]["title"], "Original");
		assert_eq!(article["data"]["published"], false);
	}

	#[tokio::test]
	async fn test_owner_update_and_delete() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let id = create(&app, &alice.token, "Original").await;
		let path = format!("/api/articles/{id}");

		let response = app
			.put(&path)
			.bearer(&alice.token)
			.json(&json!({ "title": "Renamed", "category": "Health" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["data"]["title"], "Renamed");
		assert_eq!(body["data"]["content"], "Some content");
		assert_eq!(body["data"]["category"], "Health");

		let response = app
			.put(&path)
			.bearer(&alice.token)
			.json(&json!({ "title": "   " }))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app.delete(&path).bearer(&alice.token).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["data"]["title"], "Renamed");
		assert_eq!(app.get(&path).await.status_code(), 404);
	}

	#[tokio::test]
	async fn test_view_count_increments_once_per_fetch() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let id = create(&app, &alice.token, "Hello").await;
		let path = format!("/api/articles/{id}");

		for expected in 1..=3 {
			let body = app.get(&path).await.json::<Value>();

			assert_eq!(body["data"]["viewCount"], expected);
		}

		let body = app
			.get(&format!("{path}/with-comments"))
			.await
			.json::<Value>();

		assert_eq!(body["data"]["viewCount"], 4);
		assert_eq!(body["data"]["comments"], json!([]));
	}

	#[tokio::test]
	async fn test_pagination_remainder() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;

		for i in 0..25 {
			create(&app, &alice.token, &format!("Article {i}")).await;
		}

		let body = app
			.get("/api/articles?page=3&limit=10")
			.await
			.json::<Value>();

		assert_eq!(body["count"], 5);
		assert_eq!(body["total"], 25);
		assert_eq!(body["totalPages"], 3);
		assert_eq!(body["hasNextPage"], false);
		assert_eq!(body["hasPrevPage"], true);

		let body = app.get("/api/articles?page=1&limit=10").await.json::<Value>();

		assert_eq!(body["hasNextPage"], true);
		assert_eq!(body["data"][0]["title"], "Article 24");
	}

	#[tokio::test]
	async fn test_page_past_the_end_is_empty() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;

		create(&app, &alice.token, "Only").await;

		let response = app
			.get("/api/articles")
			.add_query_param("page", i64::MAX)
			.add_query_param("limit", 10)
			.await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["count"], 0);
		assert_eq!(body["total"], 1);
		assert_eq!(body["page"], i64::MAX);
		assert_eq!(body["hasNextPage"], false);
		assert_eq!(body["hasPrevPage"], true);
	}

	#[tokio::test]
	async fn test_filter_search_and_sort() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;

		create(&app, &alice.token, "Beta about Rust").await;
		create(&app, &alice.token, "Alpha").await;

		let body = app
			.get("/api/articles?search=rust")
			.await
			.json::<Value>();

		assert_eq!(body["total"], 1);
		assert_eq!(body["data"][0]["title"], "Beta about Rust");

		let body = app.get("/api/articles?sort=title").await.json::<Value>();

		assert_eq!(body["data"][0]["title"], "Alpha");

		let body = app
			.get("/api/articles?published=true")
			.await
			.json::<Value>();

		assert_eq!(body["total"], 0);

		let body = app
			.get("/api/articles?category=Health")
			.await
			.json::<Value>();

		assert_eq!(body["total"], 0);
	}

	#[tokio::test]
	async fn test_bad_listing_parameters() {
		let app = app();

		assert_eq!(app.get("/api/articles?limit=0").await.status_code(), 400);
		assert_eq!(app.get("/api/articles?limit=101").await.status_code(), 400);
		assert_eq!(app.get("/api/articles?page=0").await.status_code(), 400);
		assert_eq!(app.get("/api/articles?sort=-nope").await.status_code(), 400);
		assert_eq!(
			app.get("/api/articles?category=Gardening").await.status_code(),
			400
		);
	}

	#[tokio::test]
	async fn test_unknown_and_malformed_ids() {
		let app = app();

		let response = app.get("/api/articles/not-an-id").await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["success"], false);

		let response = app
			.get(&format!("/api/articles/{}", Uuid::new_v4()))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[tokio::test]
	async fn test_invalid_article() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;

		let response = app
			.post("/api/articles")
			.bearer(&alice.token)
			.json(&json!({ "title": "", "content": "", "category": "Tech" }))
			.await;

		assert_eq!(response.status_code(), 400);

		let body = response.json::<Value>();

		assert_eq!(body["errors"][0]["field"], "content");
		assert_eq!(body["errors"][1]["field"], "title");
	}
}
