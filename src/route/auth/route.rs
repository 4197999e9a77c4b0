use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	extract::{Created, Json, Session},
	model::User,
	openapi::tag,
	service::{Credentials, TokenService},
};

use super::{model, Error, RouteError};

pub fn register_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Register account")
		.description("Creates a new account and returns a bearer token for it.")
		.tag(tag::AUTH)
		.response_with::<201, axum::Json<model::AuthResponse>, _>(|res| {
			res.description("Registered successfully.")
		})
}

/// Emails are compared case-insensitively, so `A@x.com` and `a@x.com`
/// cannot both register.
pub async fn register(
	State(credentials): State<Credentials>,
	State(tokens): State<TokenService>,
	Json(input): Json<model::RegisterInput>,
) -> Result<Created<model::AuthResponse>, RouteError> {
	let user = credentials.register(input).await.map_err(Error::from)?;
	let token = tokens.issue(user.id).map_err(Error::from)?;

	Ok(Created(model::AuthResponse::new(
		"User registered successfully",
		token,
		user,
	)))
}

pub fn login_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Log in")
		.description("Exchanges an email and password for a bearer token.")
		.tag(tag::AUTH)
}

pub async fn login(
	State(credentials): State<Credentials>,
	State(tokens): State<TokenService>,
	Json(input): Json<model::LoginInput>,
) -> Result<Json<model::AuthResponse>, RouteError> {
	let user = credentials.login(input).await.map_err(Error::from)?;
	let token = tokens.issue(user.id).map_err(Error::from)?;

	Ok(Json(model::AuthResponse::new("Login successful", token, user)))
}

pub fn get_me_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get user")
		.description("Returns the authenticated user.")
		.tag(tag::AUTH)
}

pub async fn get_me(session: Session) -> Json<model::Envelope<User>> {
	Json(model::Envelope::data(session.user))
}
