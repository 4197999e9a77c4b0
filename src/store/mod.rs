//! Persistence ports for users, articles and comments.
//!
//! Two adapters implement every trait here: [`postgres::PgStore`] for
//! deployments and [`memory::MemoryStore`] for tests and local runs without
//! a database. All operations are single atomic statements; counters are
//! incremented by the store itself rather than read, modified and written
//! back by the caller.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Article, Category, Comment, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by a persistence adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	/// A unique constraint rejected the write.
	#[error("duplicate value for unique field {0}")]
	Duplicate(&'static str),
	/// A stored value could not be mapped back into the model.
	#[error("corrupt row: {0}")]
	Corrupt(String),
	#[error("in-memory store lock poisoned")]
	Poisoned,
}

/// The fields needed to persist a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub password_hash: String,
}

/// The validated fields of a new article.
#[derive(Debug, Clone)]
pub struct NewArticle {
	pub author_id: Uuid,
	pub title: String,
	pub content: String,
	pub category: Option<Category>,
}

/// A partial article update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
	pub title: Option<String>,
	pub content: Option<String>,
	pub category: Option<Category>,
}

/// Conjunction of optional article predicates.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
	pub category: Option<Category>,
	pub published: Option<bool>,
	/// Case-insensitive substring matched against title or content.
	pub search: Option<String>,
}

impl ArticleFilter {
	/// Whether the article satisfies every set predicate.
	pub fn matches(&self, article: &Article) -> bool {
		if self.category.is_some_and(|category| article.category != Some(category)) {
			return false;
		}

		if self.published.is_some_and(|published| article.published != published) {
			return false;
		}

		match &self.search {
			Some(search) => {
				let needle = search.to_lowercase();

				article.title.to_lowercase().contains(&needle)
					|| article.content.to_lowercase().contains(&needle)
			}
			None => true,
		}
	}
}

/// Article fields that listings may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
	#[default]
	CreatedAt,
	UpdatedAt,
	Title,
	ViewCount,
}

/// Listing order: a field and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
	pub field: SortField,
	pub descending: bool,
}

impl Default for Sort {
	/// Newest first.
	fn default() -> Self {
		Self {
			field: SortField::CreatedAt,
			descending: true,
		}
	}
}

/// A filtered, ordered window over the article collection.
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
	pub filter: ArticleFilter,
	pub sort: Sort,
	pub offset: i64,
	pub limit: i64,
}

#[async_trait]
pub trait UserStore: Send + Sync {
	/// Fails with [`Error::Duplicate`] when the email is already registered.
	async fn insert_user(&self, user: NewUser) -> Result<User, Error>;

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;

	async fn find_user(&self, id: Uuid) -> Result<Option<User>, Error>;

	async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, Error>;
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
	async fn insert_article(&self, article: NewArticle) -> Result<Article, Error>;

	async fn find_article(&self, id: Uuid) -> Result<Option<Article>, Error>;

	/// The articles among `ids` that exist, in no particular order.
	async fn find_articles(&self, ids: &[Uuid]) -> Result<Vec<Article>, Error>;

	/// Returns one page of matching articles and the total number of matches.
	async fn list_articles(&self, query: &ArticleQuery) -> Result<(Vec<Article>, i64), Error>;

	/// Every published article, newest first.
	async fn list_published_articles(&self) -> Result<Vec<Article>, Error>;

	async fn update_article(
		&self,
		id: Uuid,
		changes: ArticleChanges,
	) -> Result<Option<Article>, Error>;

	/// Flips the publish flag in place.
	async fn toggle_published(&self, id: Uuid) -> Result<Option<Article>, Error>;

	/// Adds one view and returns the updated article.
	async fn increment_views(&self, id: Uuid) -> Result<Option<Article>, Error>;

	/// Hard-deletes the article, returning its last state.
	/// Comments on the article are left in place.
	async fn delete_article(&self, id: Uuid) -> Result<Option<Article>, Error>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
	/// Inserts the comment only if the article exists; `None` otherwise.
	async fn insert_comment(
		&self,
		author_id: Uuid,
		article_id: Uuid,
		content: String,
	) -> Result<Option<Comment>, Error>;

	async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, Error>;

	/// All comments, newest first.
	async fn list_comments(&self) -> Result<Vec<Comment>, Error>;

	/// Comments of a single article, newest first.
	async fn list_article_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, Error>;

	async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<Comment>, Error>;

	async fn increment_likes(&self, id: Uuid) -> Result<Option<Comment>, Error>;

	async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, Error>;
}

/// Connectivity check used by the health endpoint.
#[async_trait]
pub trait Ping: Send + Sync {
	/// Short name of the backing store.
	fn backend(&self) -> &'static str;

	async fn ping(&self) -> Result<(), Error>;
}

/// A store that backs every collection.
pub trait Store: UserStore + ArticleStore + CommentStore + Ping {}

impl<T> Store for T where T: UserStore + ArticleStore + CommentStore + Ping {}
