use std::borrow::Cow;

use aide::{gen::GenContext, openapi::Operation, OperationOutput};
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// Sent instead of the real message for 5xx errors.
pub const INTERNAL_MESSAGE: &str = "An internal error occurred.";

/// A single error entry, usually tied to a request field.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// Machine-readable error code.
	pub code: Cow<'a, str>,
	/// Human-readable description.
	pub content: Cow<'a, str>,
	/// The request field the error relates to, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Map>,
}

impl<'a> Message<'a> {
	pub fn new(code: impl Into<Cow<'a, str>>) -> Self {
		let code = code.into();

		Self {
			content: code.clone(),
			code,
			field: None,
			details: None,
		}
	}

	pub fn content(mut self, content: impl Into<Cow<'a, str>>) -> Self {
		self.content = content.into();
		self
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(Map::new)
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	/// Always `false`.
	pub success: bool,
	pub message: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub errors: Vec<Message<'static>>,
	/// Internal error text, only present in development builds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
}

/// Describes how an error is presented to the client.
///
/// The [`Display`](std::fmt::Display) output becomes the response message,
/// so it must not leak anything sensitive for 4xx statuses. For 5xx
/// statuses it is logged and replaced with [`INTERNAL_MESSAGE`].
pub trait ErrorShape: std::error::Error + Sized {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>> {
		Vec::new()
	}
}

/// Wraps an [`ErrorShape`] so it can be returned from a handler.
#[derive(Debug)]
pub struct RouteError<E>(pub E);

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self(error)
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		let status = self.0.status();

		let body = if status.is_server_error() {
			tracing::error!(error = %self.0, "request failed");

			ErrorResponse {
				success: false,
				message: INTERNAL_MESSAGE.into(),
				errors: Vec::new(),
				detail: cfg!(debug_assertions).then(|| format!("{:?}", self.0)),
			}
		} else {
			ErrorResponse {
				success: false,
				message: self.0.to_string(),
				errors: self.0.into_errors(),
				detail: None,
			}
		};

		(status, Json(body)).into_response()
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = ErrorResponse;

	fn operation_response(
		ctx: &mut GenContext,
		operation: &mut Operation,
	) -> Option<aide::openapi::Response> {
		Json::<ErrorResponse>::operation_response(ctx, operation)
	}
}

/// Flattens validator output into one [`Message`] per violated rule,
/// ordered by field name.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();

	fields.sort_by(|(a, _), (b, _)| a.cmp(b));
	fields
		.into_iter()
		.flat_map(|(field, errors)| {
			let field = field.to_string();

			errors.iter().map(move |error| {
				Message::new(error.code.to_string())
					.content(error.to_string())
					.field(field.clone())
			})
		})
		.collect()
}

/// Errors raised outside of any route: extractor rejections, rate limiting
/// and unknown paths.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("invalid request data")]
	Validation(#[from] validator::ValidationErrors),
	#[error("{0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("{0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("{0}")]
	Path(#[from] rejection::PathRejection),
	#[error("too many requests, try again in {0} seconds")]
	RateLimited(u64),
	#[error("rate limiter failure: {0}")]
	RateLimiter(String),
	#[error("route not found: {0}")]
	UnknownRoute(String),
}

impl From<GovernorError> for AppError {
	fn from(error: GovernorError) -> Self {
		match error {
			GovernorError::TooManyRequests { wait_time, .. } => Self::RateLimited(wait_time),
			error => Self::RateLimiter(format!("{error:?}")),
		}
	}
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Query(..) | Self::Path(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::RateLimited(..) => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimiter(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UnknownRoute(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => validation_messages(&errors),
			Self::RateLimited(wait) => Message::new("rate_limited")
				.content("Too many requests from this address.")
				.detail("retry_after", wait)
				.into_vec(),
			_ => Vec::new(),
		}
	}
}
