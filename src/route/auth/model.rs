pub use crate::{
	route::model::Envelope,
	service::credential::{LoginInput, RegisterInput},
};

use schemars::JsonSchema;
use serde::Serialize;

use crate::model::User;

/// Returned by registration and login.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AuthResponse {
	pub success: bool,
	pub message: String,
	/// A bearer token to send in the `Authorization` header.
	pub token: String,
	pub user: User,
}

impl AuthResponse {
	pub fn new(message: impl Into<String>, token: String, user: User) -> Self {
		Self {
			success: true,
			message: message.into(),
			token,
			user,
		}
	}
}
