#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod policy;
mod ratelimit;
mod route;
mod service;
mod store;
#[cfg(test)]
mod test;

use std::{net::SocketAddr, sync::Arc};

use argon2::Argon2;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
	config::Config,
	service::{Articles, Comments, Credentials, TokenService},
	store::{MemoryStore, PgStore, Ping, Store},
};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// Connections kept open to PostgreSQL.
const MAX_CONNECTIONS: u32 = 10;

/// The shared application state.
///
/// Every service holds its ports behind an [`Arc`], so cloning the state
/// into each handler is cheap. Handlers pull out only the service they need
/// with `State<Articles>`, `State<Credentials>` and so on.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub credentials: Credentials,
	pub tokens: TokenService,
	pub articles: Articles,
	pub comments: Comments,
	pub health: Arc<dyn Ping>,
}

impl State {
	/// Wires every service to the same store.
	pub fn new<S: Store + 'static>(store: Arc<S>, tokens: TokenService) -> Self {
		Self {
			credentials: Credentials::new(store.clone(), Argon2::default()),
			tokens,
			articles: Articles::new(store.clone(), store.clone(), store.clone()),
			comments: Comments::new(store.clone(), store.clone()),
			health: store,
		}
	}
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer().with_ansi(true))
		.init();

	let config = Config::from_env().expect("invalid configuration");
	let tokens = TokenService::new(
		config.jwt_secret.as_bytes(),
		chrono::Duration::days(config.jwt_expires_in_days),
	);

	let state = if let Some(url) = &config.database_url {
		let store = PgStore::connect(url, MAX_CONNECTIONS)
			.await
			.expect("failed to connect to database");

		State::new(Arc::new(store), tokens)
	} else {
		tracing::warn!("DATABASE_URL is not set, data is kept in memory and lost on restart");

		State::new(Arc::new(MemoryStore::default()), tokens)
	};

	tracing::info!(backend = state.health.backend(), "store ready");

	let app = route::app(state, config.rate_limit);
	let listener = tokio::net::TcpListener::bind((config.host, config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on {}:{}", config.host, config.port);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await
	.expect("server error");
}
