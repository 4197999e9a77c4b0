use std::sync::Arc;

use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use axum::http::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::{
	error::{self, ErrorShape},
	model::User,
	store::{self, NewUser, UserStore},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidEmailOrPassword,
	#[error("this email is already registered")]
	EmailTaken,
	#[error("invalid registration data")]
	Validation(#[from] validator::ValidationErrors),
	#[error("password hashing failed: {0}")]
	Hash(argon2::password_hash::Error),
	#[error(transparent)]
	Store(#[from] store::Error),
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidEmailOrPassword => StatusCode::UNAUTHORIZED,
			Self::EmailTaken | Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::Hash(..) | Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::EmailTaken => error::Message::new("email_taken")
				.content("This email is already registered.")
				.field("email")
				.into_vec(),
			Self::Validation(errors) => error::validation_messages(&errors),
			_ => Vec::new(),
		}
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	/// The name displayed next to the user's articles.
	#[validate(length(min = 1, max = 64, message = "name must be between 1 and 64 characters"))]
	pub name: String,
	#[validate(email(message = "email must be a valid email address"))]
	#[serde(deserialize_with = "trimmed")]
	pub email: String,
	#[validate(length(
		min = 6,
		max = 128,
		message = "password must be between 6 and 128 characters"
	))]
	pub password: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(length(min = 1, message = "email is required"))]
	#[serde(deserialize_with = "trimmed")]
	pub email: String,
	#[validate(length(min = 1, message = "password is required"))]
	pub password: String,
}

/// Strips surrounding whitespace before the body is validated.
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	String::deserialize(deserializer).map(|value| value.trim().to_owned())
}

/// Emails are unique regardless of case or surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Registration, login and identity lookup.
#[derive(Clone)]
pub struct Credentials {
	users: Arc<dyn UserStore>,
	hasher: Argon2<'static>,
}

impl Credentials {
	pub fn new(users: Arc<dyn UserStore>, hasher: Argon2<'static>) -> Self {
		Self { users, hasher }
	}

	/// Creates a new account. The returned user never carries the
	/// plaintext password.
	pub async fn register(&self, input: RegisterInput) -> Result<User, Error> {
		let input = RegisterInput {
			name: input.name.trim().to_owned(),
			email: normalize_email(&input.email),
			password: input.password,
		};

		input.validate()?;

		let password_hash = self.hash_password(&input.password)?;
		let user = self
			.users
			.insert_user(NewUser {
				id: Uuid::new_v4(),
				name: input.name,
				email: input.email,
				password_hash,
			})
			.await
			.map_err(|e| match e {
				store::Error::Duplicate("email") => Error::EmailTaken,
				e => Error::Store(e),
			})?;

		tracing::info!(user = %user.id, "registered user");

		Ok(user)
	}

	/// Checks the credentials, failing with the same error whether the
	/// email is unknown or the password is wrong.
	pub async fn login(&self, input: LoginInput) -> Result<User, Error> {
		let user = self
			.find_by_email(&input.email)
			.await?
			.ok_or(Error::InvalidEmailOrPassword)?;

		if !self.verify_password(&input.password, &user.password_hash) {
			return Err(Error::InvalidEmailOrPassword);
		}

		Ok(user)
	}

	pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
		Ok(self.users.find_user_by_email(&normalize_email(email)).await?)
	}

	pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, Error> {
		Ok(self.users.find_user(id).await?)
	}

	/// Salted Argon2 hash in PHC string format.
	pub fn hash_password(&self, password: &str) -> Result<String, Error> {
		let salt = SaltString::generate(&mut OsRng);

		self.hasher
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(Error::Hash)
	}

	/// Constant-time comparison of the candidate against a stored hash.
	/// Unparseable hashes never match.
	pub fn verify_password(&self, candidate: &str, hash: &str) -> bool {
		PasswordHash::new(hash).is_ok_and(|parsed| {
			self.hasher
				.verify_password(candidate.as_bytes(), &parsed)
				.is_ok()
		})
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use argon2::Argon2;
	use validator::Validate;

	use super::{Credentials, Error, LoginInput, RegisterInput};
	use crate::store::MemoryStore;

	fn credentials() -> Credentials {
		Credentials::new(Arc::new(MemoryStore::default()), Argon2::default())
	}

	fn register_input(email: &str) -> RegisterInput {
		RegisterInput {
			name: "Alice".into(),
			email: email.into(),
			password: "secret1".into(),
		}
	}

	#[test]
	fn test_email_is_trimmed_when_read() {
		let input = serde_json::from_value::<RegisterInput>(serde_json::json!({
			"name": "Alice",
			"email": "  alice@x.com ",
			"password": "secret1",
		}))
		.unwrap();

		assert_eq!(input.email, "alice@x.com");
		assert!(input.validate().is_ok());
	}

	#[tokio::test]
	async fn test_register_then_login() {
		let credentials = credentials();
		let user = credentials
			.register(register_input(" Alice@X.com "))
			.await
			.unwrap();

		assert_eq!(user.email, "alice@x.com");
		assert_ne!(user.password_hash, "secret1");

		let logged_in = credentials
			.login(LoginInput {
				email: "ALICE@x.com".into(),
				password: "secret1".into(),
			})
			.await
			.unwrap();

		assert_eq!(logged_in.id, user.id);
	}

	#[tokio::test]
	async fn test_duplicate_email_is_case_insensitive() {
		let credentials = credentials();

		credentials.register(register_input("a@x.com")).await.unwrap();

		let result = credentials.register(register_input("A@X.COM")).await;

		assert!(matches!(result, Err(Error::EmailTaken)));
	}

	#[tokio::test]
	async fn test_wrong_password_and_unknown_email_look_the_same() {
		let credentials = credentials();

		credentials.register(register_input("a@x.com")).await.unwrap();

		let wrong_password = credentials
			.login(LoginInput {
				email: "a@x.com".into(),
				password: "secret2".into(),
			})
			.await;
		let unknown_email = credentials
			.login(LoginInput {
				email: "b@x.com".into(),
				password: "secret1".into(),
			})
			.await;

		assert!(matches!(wrong_password, Err(Error::InvalidEmailOrPassword)));
		assert!(matches!(unknown_email, Err(Error::InvalidEmailOrPassword)));
	}

	#[tokio::test]
	async fn test_short_password_is_rejected() {
		let result = credentials()
			.register(RegisterInput {
				password: "12345".into(),
				..register_input("a@x.com")
			})
			.await;

		assert!(matches!(result, Err(Error::Validation(..))));
	}

	#[test]
	fn test_verify_password_rejects_garbage_hash() {
		assert!(!credentials().verify_password("secret1", "not-a-hash"));
	}
}
