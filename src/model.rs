use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// The password hash never leaves the server; it is skipped when
/// serializing to the client.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The name displayed next to the user's articles.
	pub name: String,
	/// The login email, stored trimmed and lower-cased.
	pub email: String,
	/// Argon2 hash in PHC string format.
	#[serde(skip)]
	pub password_hash: String,
	/// The creation time of the user.
	pub created_at: DateTime<Utc>,
}

/// The public subset of a [`User`] embedded in article responses.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Author {
	pub id: Uuid,
	pub name: String,
	pub email: String,
}

impl From<&User> for Author {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			name: user.name.clone(),
			email: user.email.clone(),
		}
	}
}

/// The fixed set of article categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum Category {
	Tech,
	Health,
	Sports,
	Entertainment,
	Business,
	Other,
}

impl Category {
	pub const ALL: [Self; 6] = [
		Self::Tech,
		Self::Health,
		Self::Sports,
		Self::Entertainment,
		Self::Business,
		Self::Other,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Tech => "Tech",
			Self::Health => "Health",
			Self::Sports => "Sports",
			Self::Entertainment => "Entertainment",
			Self::Business => "Business",
			Self::Other => "Other",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
	type Err = UnknownCategory;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|category| category.as_str() == value)
			.ok_or_else(|| UnknownCategory(value.to_owned()))
	}
}

/// A single article, written by a user.
///
/// New articles start as drafts (`published = false`) with no views.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
	/// The unique identifier of the article.
	pub id: Uuid,
	pub title: String,
	pub content: String,
	/// The user that wrote the article. Only this user may modify it.
	pub author_id: Uuid,
	pub published: bool,
	pub category: Option<Category>,
	/// Number of successful fetches by id.
	pub view_count: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// An article with its author resolved.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ArticleView {
	#[serde(flatten)]
	pub article: Article,
	/// `None` only if the author's account no longer exists.
	pub author: Option<Author>,
}

/// An article together with its comments, newest first.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ArticleWithComments {
	#[serde(flatten)]
	pub article: ArticleView,
	pub comments: Vec<Comment>,
}

/// A comment left on an article.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
	/// The unique identifier of the comment.
	pub id: Uuid,
	pub content: String,
	/// The user that wrote the comment. Only this user may modify it.
	pub author_id: Uuid,
	pub article_id: Uuid,
	/// Anonymous like counter, incremented without de-duplication.
	pub like_count: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// The public subset of an [`Article`] embedded in comment responses.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
	pub id: Uuid,
	pub title: String,
	pub author_id: Uuid,
}

impl From<&Article> for ArticleSummary {
	fn from(article: &Article) -> Self {
		Self {
			id: article.id,
			title: article.title.clone(),
			author_id: article.author_id,
		}
	}
}

/// A comment with the article it was left on.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CommentView {
	#[serde(flatten)]
	pub comment: Comment,
	/// `None` once the article has been deleted.
	pub article: Option<ArticleSummary>,
}
