use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{
	error::{self, ErrorShape},
	service::{credential, token},
	AppState,
};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("not authorized, no token")]
	MissingToken,
	#[error("not authorized, invalid token")]
	InvalidToken,
	#[error("not authorized, token expired")]
	ExpiredToken,
	#[error("not authorized, user no longer exists")]
	UnknownUser,
	#[error(transparent)]
	Credentials(#[from] credential::Error),
	#[error("token signing failed: {0}")]
	Sign(#[source] token::Error),
}

impl From<token::Error> for Error {
	fn from(error: token::Error) -> Self {
		match error {
			token::Error::Invalid => Self::InvalidToken,
			token::Error::Expired => Self::ExpiredToken,
			error @ token::Error::Sign(..) => Self::Sign(error),
		}
	}
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/register", post_with(register, register_docs))
		.api_route("/login", post_with(login, login_docs))
		.api_route("/me", get_with(get_me, get_me_docs))
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::MissingToken | Self::InvalidToken | Self::ExpiredToken | Self::UnknownUser => {
				StatusCode::UNAUTHORIZED
			}
			Self::Credentials(error) => error.status(),
			Self::Sign(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::Credentials(error) => error.into_errors(),
			_ => Vec::new(),
		}
	}
}
