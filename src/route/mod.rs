use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{
	extract::DefaultBodyLimit,
	http::{HeaderName, Uri},
	Extension, Router,
};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{
	error::{AppError, RouteError},
	openapi, ratelimit, AppState,
};

pub mod article;
pub mod auth;
pub mod comment;
pub mod docs;
pub mod health;
pub mod model;

/// Request bodies larger than this are rejected.
pub const BODY_LIMIT: usize = 10 * 1024;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Builds the whole application: API routes, the generated OpenAPI
/// document and the middleware stack.
///
/// Rate limiting keys on the peer address, so it needs the router to be
/// served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app(state: AppState, rate_limit: bool) -> Router {
	let mut api = OpenApi::default();
	let mut auth = auth::routes();
	let mut global_limit = None;

	if rate_limit {
		let default = ratelimit::default();
		let secure = ratelimit::secure();

		ratelimit::spawn_cleanup(&[&default, &secure]);

		auth = auth.layer(GovernorLayer { config: secure });
		global_limit = Some(default);
	}

	let router = ApiRouter::new()
		.nest("/api/auth", auth)
		.nest("/api/articles", article::routes())
		.nest("/api/comments", comment::routes())
		.nest("/api/health", health::routes())
		.finish_api_with(&mut api, openapi::docs)
		.with_state(state)
		.nest("/docs", docs::routes())
		.layer(Extension(Arc::new(api)))
		.fallback(unknown_route)
		.layer(DefaultBodyLimit::max(BODY_LIMIT));

	let router = match global_limit {
		Some(config) => router.layer(GovernorLayer { config }),
		None => router,
	};

	router.layer(
		ServiceBuilder::new()
			.layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
			.layer(TraceLayer::new_for_http())
			.layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
			.layer(CorsLayer::permissive())
			.layer(CompressionLayer::new()),
	)
}

async fn unknown_route(uri: Uri) -> RouteError<AppError> {
	RouteError(AppError::UnknownRoute(uri.path().to_owned()))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_unknown_route() {
		let response = app().get("/api/nope").await;

		assert_eq!(response.status_code(), 404);

		let body = response.json::<Value>();

		assert_eq!(body["success"], false);
		assert_eq!(body["message"], "route not found: /api/nope");
	}

	#[tokio::test]
	async fn test_malformed_json_body() {
		let app = app();
		let alice = register(&app, "Alice", "alice@x.com").await;

		let response = app
			.post("/api/articles")
			.bearer(&alice.token)
			.content_type("application/json")
			.bytes("{ not json".into())
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["success"], false);
	}

	#[tokio::test]
	async fn test_request_id_is_echoed() {
		let response = app().get("/api/health").await;

		assert!(!response.header("x-request-id").is_empty());
	}
}
