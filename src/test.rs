//! Helpers shared by the HTTP tests.

pub use axum::http::{header, HeaderValue};
pub use axum_test::{TestRequest, TestServer};
pub use chrono::{Duration, Utc};
pub use serde_json::{json, Value};
pub use uuid::Uuid;

use std::sync::Arc;

use crate::{route, service::TokenService, store::MemoryStore, State};

const SECRET: &[u8] = b"a-secret-used-only-in-tests";

pub fn tokens() -> TokenService {
	TokenService::new(SECRET, Duration::days(30))
}

/// A server over a fresh in-memory store, without rate limiting.
pub fn app() -> TestServer {
	let state = State::new(Arc::new(MemoryStore::default()), tokens());

	TestServer::new(route::app(state, false)).unwrap()
}

/// A registered user and a token for it.
pub struct Account {
	pub id: Uuid,
	pub token: String,
}

pub async fn register(app: &TestServer, name: &str, email: &str) -> Account {
	let response = app
		.post("/api/auth/register")
		.json(&json!({
			"name": name,
			"email": email,
			"password": "secret1",
		}))
		.await;

	assert_eq!(response.status_code(), 201);

	let body = response.json::<Value>();

	Account {
		id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
		token: body["token"].as_str().unwrap().to_owned(),
	}
}

pub trait Bearer {
	fn bearer(self, token: &str) -> Self;
}

impl Bearer for TestRequest {
	fn bearer(self, token: &str) -> Self {
		self.add_header(
			header::AUTHORIZATION,
			HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
		)
	}
}
