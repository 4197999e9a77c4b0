use std::sync::Arc;

use aide::{
	axum::{routing::get_with, ApiRouter},
	transform::TransformOperation,
};
use axum::extract::State;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{extract::Json, openapi::tag, store::Ping, AppState};

#[derive(Debug, Serialize, JsonSchema)]
pub struct Health {
	/// `OK` whenever the server is able to answer.
	pub status: &'static str,
	/// `Connected` or `Disconnected`.
	pub database: &'static str,
	/// The kind of store behind the server.
	pub backend: &'static str,
}

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().api_route("/", get_with(get_health, get_health_docs))
}

fn get_health_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Health check")
		.description("Reports whether the server is up and can reach its store.")
		.tag(tag::HEALTH)
}

async fn get_health(State(store): State<Arc<dyn Ping>>) -> Json<Health> {
	let database = match store.ping().await {
		Ok(()) => "Connected",
		Err(error) => {
			tracing::warn!(%error, "health check could not reach the store");
			"Disconnected"
		}
	};

	Json(Health {
		status: "OK",
		database,
		backend: store.backend(),
	})
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_health() {
		let response = app().get("/api/health").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(
			response.json::<Value>(),
			json!({ "status": "OK", "database": "Connected", "backend": "memory" })
		);
	}
}
