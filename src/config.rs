use std::net::IpAddr;

/// Secrets shorter than this are rejected at startup.
pub const MIN_SECRET_LENGTH: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} is invalid: {reason}")]
	Invalid { name: &'static str, reason: String },
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
	/// PostgreSQL connection string. Without it the server keeps everything
	/// in memory.
	pub database_url: Option<String>,
	pub jwt_secret: String,
	pub jwt_expires_in_days: i64,
	pub host: IpAddr,
	pub port: u16,
	pub rate_limit: bool,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the config from any variable source. Empty values count as
	/// unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

		let jwt_secret = var("JWT_SECRET").ok_or(Error::Missing("JWT_SECRET"))?;

		if jwt_secret.len() < MIN_SECRET_LENGTH {
			return Err(Error::Invalid {
				name: "JWT_SECRET",
				reason: format!("must be at least {MIN_SECRET_LENGTH} bytes"),
			});
		}

		let jwt_expires_in_days = parse(&var, "JWT_EXPIRES_IN_DAYS")?.unwrap_or(30);

		if jwt_expires_in_days <= 0 {
			return Err(Error::Invalid {
				name: "JWT_EXPIRES_IN_DAYS",
				reason: "must be positive".into(),
			});
		}

		Ok(Self {
			database_url: var("DATABASE_URL"),
			jwt_secret,
			jwt_expires_in_days,
			host: parse(&var, "HOST")?.unwrap_or(IpAddr::from([127, 0, 0, 1])),
			port: parse(&var, "PORT")?.unwrap_or(3000),
			rate_limit: parse(&var, "RATE_LIMIT")?.unwrap_or(true),
		})
	}
}

fn parse<T>(var: impl Fn(&str) -> Option<String>, name: &'static str) -> Result<Option<T>, Error>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	var(name)
		.map(|value| {
			value.trim().parse().map_err(|e: T::Err| Error::Invalid {
				name,
				reason: e.to_string(),
			})
		})
		.transpose()
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::{Config, Error};

	fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
		let vars = vars
			.iter()
			.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
			.collect::<HashMap<_, _>>();

		Config::from_lookup(|name| vars.get(name).cloned())
	}

	#[test]
	fn test_defaults() {
		let config = config(&[("JWT_SECRET", "0123456789abcdef")]).unwrap();

		assert!(config.database_url.is_none());
		assert_eq!(config.jwt_expires_in_days, 30);
		assert_eq!(config.port, 3000);
		assert_eq!(config.host.to_string(), "127.0.0.1");
		assert!(config.rate_limit);
	}

	#[test]
	fn test_secret_is_required() {
		assert!(matches!(config(&[]), Err(Error::Missing("JWT_SECRET"))));
		assert!(matches!(
			config(&[("JWT_SECRET", "short")]),
			Err(Error::Invalid { name: "JWT_SECRET", .. })
		));
	}

	#[test]
	fn test_overrides() {
		let config = config(&[
			("JWT_SECRET", "0123456789abcdef"),
			("DATABASE_URL", "postgres://localhost/blog"),
			("JWT_EXPIRES_IN_DAYS", "7"),
			("HOST", "0.0.0.0"),
			("PORT", "8080"),
			("RATE_LIMIT", "false"),
		])
		.unwrap();

		assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/blog"));
		assert_eq!(config.jwt_expires_in_days, 7);
		assert_eq!(config.port, 8080);
		assert!(!config.rate_limit);
	}

	#[test]
	fn test_invalid_values() {
		assert!(matches!(
			config(&[("JWT_SECRET", "0123456789abcdef"), ("PORT", "http")]),
			Err(Error::Invalid { name: "PORT", .. })
		));
		assert!(matches!(
			config(&[("JWT_SECRET", "0123456789abcdef"), ("JWT_EXPIRES_IN_DAYS", "0")]),
			Err(Error::Invalid { name: "JWT_EXPIRES_IN_DAYS", .. })
		));
	}
}
