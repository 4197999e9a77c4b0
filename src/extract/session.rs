use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use crate::{
	error::RouteError,
	model::User,
	openapi::SECURITY_SCHEME_BEARER,
	route::auth,
	service::{Credentials, TokenService},
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Extracts the bearer token from the request and resolves the user it was
/// issued to.
///
/// If the header is missing or is not a bearer credential, a
/// [`auth::Error::MissingToken`] is returned. Invalid and expired tokens are
/// rejected with distinct errors, as is a token whose user has since been
/// removed.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub user: User,
}

fn bearer_token(parts: &request::Parts) -> Option<&str> {
	let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
	let token = value.strip_prefix(AUTHORIZATION_PREFIX)?.trim();

	(!token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	TokenService: FromRef<S>,
	Credentials: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let token = bearer_token(parts).ok_or(auth::Error::MissingToken)?;
		let user_id = TokenService::from_ref(state)
			.verify(token)
			.map_err(auth::Error::from)?;

		let user = Credentials::from_ref(state)
			.find_by_id(user_id)
			.await
			.map_err(auth::Error::from)?
			.ok_or(auth::Error::UnknownUser)?;

		Ok(Session { user })
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}
