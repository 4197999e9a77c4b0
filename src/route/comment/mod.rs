use aide::axum::{
	routing::{get_with, patch_with},
	ApiRouter,
};

use crate::{error, AppState};

pub mod model;
pub mod route;

pub use crate::service::comment::Error;

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_comments, get_comments_docs).post_with(create_comment, create_comment_docs),
		)
		.api_route(
			"/:id",
			get_with(get_comment, get_comment_docs)
				.put_with(update_comment, update_comment_docs)
				.delete_with(delete_comment, delete_comment_docs),
		)
		.api_route("/:id/like", patch_with(like_comment, like_comment_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn article(app: &TestServer, token: &str) -> String {
		app.post("/api/articles")
			.bearer(token)
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await
			.json::<Value>()["data"]["id"]
			.as_str()
			.unwrap()
			.to_owned()
	}

	async fn comment(app: &TestServer, token: &str, article: &str, content: &str) -> String {
		let response = app
			.post("/api/comments")
			.bearer(token)
			.json(&json!({ "content": content, "article": article }))
			.await;

		assert_eq!(response.status_code(), 201);

		response.json::<Value>()["data"]["id"]
			.as_str()
			.unwrap()
			.to_owned()
	}

	#[tokio::test]
	async fn test_comment_on_missing_article() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;

		let response = app
			.post("/api/comments")
			.bearer(&alice.token)
			.json(&json!({ "content": "Hi", "article": Uuid::new_v4() }))
			.await;

		assert_eq!(response.status_code(), 404);

		let body = app.get("/api/comments").await.json::<Value>();

		assert_eq!(body["count"], 0);
	}

	#[tokio::test]
	async fn test_comment_lifecycle() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let bob = register(&app, "Bob", "bob@x.com").await;
		let article = article(&app, &alice.token).await;

		comment(&app, &bob.token, &article, "First").await;

		let id = comment(&app, &bob.token, &article, "Second").await;
		let path = format!("/api/comments/{id}");

		let body = app
			.get(&format!("/api/articles/{article}/comments"))
			.await
			.json::<Value>();

		assert_eq!(body["count"], 2);
		assert_eq!(body["data"][0]["content"], "Second");

		let response = app
			.put(&path)
			.bearer(&alice.token)
			.json(&json!({ "content": "Edited by someone else" }))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.put(&path)
			.bearer(&bob.token)
			.json(&json!({ "content": "Edited" }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["data"]["content"], "Edited");

		assert_eq!(app.delete(&path).bearer(&alice.token).await.status_code(), 403);
		assert_eq!(app.delete(&path).bearer(&bob.token).await.status_code(), 200);
		assert_eq!(app.get(&path).await.status_code(), 404);
	}

	#[tokio::test]
	async fn test_likes_are_anonymous_and_unlimited() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let article = article(&app, &alice.token).await;
		let id = comment(&app, &alice.token, &article, "Hi").await;
		let path = format!("/api/comments/{id}/like");

		app.patch(&path).await;

		let body = app.patch(&path).await.json::<Value>();

		assert_eq!(body["data"]["likeCount"], 2);
		assert_eq!(app.patch("/api/comments/nope/like").await.status_code(), 404);
	}

	#[tokio::test]
	async fn test_comments_survive_article_deletion() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let article = article(&app, &alice.token).await;
		let id = comment(&app, &alice.token, &article, "Hi").await;

		let response = app
			.delete(&format!("/api/articles/{article}"))
			.bearer(&alice.token)
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app.get(&format!("/api/comments/{id}")).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["data"]["article"], Value::Null);
		assert_eq!(
			app.get(&format!("/api/articles/{article}/comments"))
				.await
				.status_code(),
			404
		);
	}

	#[tokio::test]
	async fn test_comment_requires_token() {
		let app = app();

		let response = app
			.post("/api/comments")
			.json(&json!({ "content": "Hi", "article": Uuid::new_v4() }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_comments_show_their_article() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;
		let article = article(&app, &alice.token).await;
		let id = comment(&app, &alice.token, &article, "Hi").await;

		let body = app.get("/api/comments").await.json::<Value>();

		assert_eq!(body["count"], 1);
		assert_eq!(body["data"][0]["content"], "Hi");
		assert_eq!(body["data"][0]["articleId"], article);
		assert_eq!(body["data"][0]["article"]["id"], article);
		assert_eq!(body["data"][0]["article"]["title"], "Hello");

		let body = app
			.get(&format!("/api/comments/{id}"))
			.await
			.json::<Value>();

		assert_eq!(body["data"]["article"]["title"], "Hello");
		assert_eq!(body["data"]["article"]["authorId"], alice.id.to_string());
	}
}
