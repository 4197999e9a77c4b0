use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::middleware::StateInformationMiddleware;
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::PeerIpKeyExtractor,
	GovernorError,
};

use crate::error::{AppError, RouteError};

pub type Config = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Bursts of up to `burst` requests per client address, with one request
/// replenished every `period`.
fn limiter(burst: u32, period: Duration) -> Config {
	Arc::new(
		GovernorConfigBuilder::default()
			.period(period)
			.burst_size(burst)
			.use_headers()
			.error_handler(error_handler)
			.finish()
			.expect("burst size and period are non-zero"),
	)
}

/// Applied to every route: 100 requests per 15 minutes.
pub fn default() -> Config {
	limiter(100, Duration::from_secs(9))
}

/// Applied on top of [`default`] to authentication routes: 5 attempts per
/// 15 minutes.
pub fn secure() -> Config {
	limiter(5, Duration::from_secs(180))
}

fn error_handler(error: GovernorError) -> Response<Body> {
	RouteError(AppError::from(error)).into_response()
}

/// Prunes per-address bookkeeping every minute on a background thread so
/// clients that stopped sending requests are forgotten.
pub fn spawn_cleanup(configs: &[&Config]) {
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();

	std::thread::spawn(move || loop {
		std::thread::sleep(CLEANUP_INTERVAL);

		for limiter in &limiters {
			tracing::debug!(tracked = limiter.len(), "pruning rate limiter state");

			limiter.retain_recent();
		}
	});
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;
	use tower_governor::GovernorError;

	use super::error_handler;

	#[test]
	fn test_too_many_requests_uses_the_error_envelope() {
		let response = error_handler(GovernorError::TooManyRequests {
			wait_time: 12,
			headers: None,
		});

		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
	}
}
