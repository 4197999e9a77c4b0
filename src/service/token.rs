use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid token")]
	Invalid,
	#[error("token expired")]
	Expired,
	#[error("failed to sign token: {0}")]
	Sign(#[source] jsonwebtoken::errors::Error),
}

/// The claims carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
	/// The user the token was issued to.
	pub sub: Uuid,
	pub iat: i64,
	pub exp: i64,
}

struct Keys {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
}

/// Issues and verifies HS256 bearer tokens.
///
/// The signing secret is handed in once at startup; clones share the same
/// key material.
#[derive(Clone)]
pub struct TokenService {
	keys: Arc<Keys>,
	ttl: Duration,
}

impl TokenService {
	pub fn new(secret: &[u8], ttl: Duration) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);

		validation.leeway = 0;

		Self {
			keys: Arc::new(Keys {
				encoding: EncodingKey::from_secret(secret),
				decoding: DecodingKey::from_secret(secret),
				validation,
			}),
			ttl,
		}
	}

	/// Issues a token for the user that expires after the configured ttl.
	pub fn issue(&self, user_id: Uuid) -> Result<String, Error> {
		self.issue_at(user_id, Utc::now())
	}

	/// Issues a token as if it were created at `issued_at`.
	pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, Error> {
		let claims = Claims {
			sub: user_id,
			iat: issued_at.timestamp(),
			exp: (issued_at + self.ttl).timestamp(),
		};

		jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
			.map_err(Error::Sign)
	}

	/// Checks the signature and expiry, returning the user id the token
	/// was issued to.
	pub fn verify(&self, token: &str) -> Result<Uuid, Error> {
		jsonwebtoken::decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
			.map(|data| data.claims.sub)
			.map_err(|e| match e.kind() {
				ErrorKind::ExpiredSignature => Error::Expired,
				_ => Error::Invalid,
			})
	}
}

impl std::fmt::Debug for TokenService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenService")
			.field("ttl", &self.ttl)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};
	use uuid::Uuid;

	use super::{Error, TokenService};

	fn service() -> TokenService {
		TokenService::new(b"a-test-secret-of-some-length", Duration::days(30))
	}

	#[test]
	fn test_issue_then_verify() {
		let tokens = service();
		let user = Uuid::new_v4();
		let token = tokens.issue(user).unwrap();

		assert_eq!(tokens.verify(&token).unwrap(), user);
	}

	#[test]
	fn test_expired_token() {
		let tokens = service();
		let token = tokens
			.issue_at(Uuid::new_v4(), Utc::now() - Duration::days(31))
			.unwrap();

		assert!(matches!(tokens.verify(&token), Err(Error::Expired)));
	}

	#[test]
	fn test_wrong_secret_is_invalid() {
		let token = service().issue(Uuid::new_v4()).unwrap();
		let other = TokenService::new(b"another-secret-entirely", Duration::days(30));

		assert!(matches!(other.verify(&token), Err(Error::Invalid)));
	}

	#[test]
	fn test_garbage_is_invalid() {
		assert!(matches!(service().verify("not.a.token"), Err(Error::Invalid)));
		assert!(matches!(service().verify(""), Err(Error::Invalid)));
	}
}
