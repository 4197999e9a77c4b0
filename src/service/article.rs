use std::{collections::HashMap, sync::Arc};

use axum::http::StatusCode;
use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{parse_id, Page, Window};
use crate::{
	error::{self, ErrorShape},
	model::{Article, ArticleView, ArticleWithComments, Author, Category},
	policy::{ensure_owner, NotOwner},
	store::{
		self, ArticleChanges, ArticleFilter, ArticleQuery, ArticleStore, CommentStore, NewArticle,
		Sort, UserStore,
	},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("article not found")]
	UnknownArticle(String),
	#[error("you are not the author of this article")]
	NotAuthor,
	#[error("invalid article data")]
	Validation(#[from] validator::ValidationErrors),
	#[error(transparent)]
	Store(#[from] store::Error),
}

impl From<NotOwner> for Error {
	fn from(_: NotOwner) -> Self {
		Self::NotAuthor
	}
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownArticle(..) => StatusCode::NOT_FOUND,
			Self::NotAuthor => StatusCode::FORBIDDEN,
			Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownArticle(id) => error::Message::new("unknown_article")
				.content("No article exists with this id.")
				.detail("article", id)
				.into_vec(),
			Self::Validation(errors) => error::validation_messages(&errors),
			_ => Vec::new(),
		}
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateArticleInput {
	#[validate(length(min = 1, max = 200, message = "title must be between 1 and 200 characters"))]
	pub title: String,
	/// The body of the article.
	#[validate(length(min = 1, message = "content is required"))]
	pub content: String,
	pub category: Option<Category>,
}

/// A partial update. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct UpdateArticleInput {
	#[validate(length(min = 1, max = 200, message = "title must be between 1 and 200 characters"))]
	pub title: Option<String>,
	#[validate(length(min = 1, message = "content cannot be empty"))]
	pub content: Option<String>,
	pub category: Option<Category>,
}

fn trimmed(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_owned())
}

/// Article lifecycle: drafting, listing, ownership-gated edits and
/// publishing.
#[derive(Clone)]
pub struct Articles {
	articles: Arc<dyn ArticleStore>,
	comments: Arc<dyn CommentStore>,
	users: Arc<dyn UserStore>,
}

impl Articles {
	pub fn new(
		articles: Arc<dyn ArticleStore>,
		comments: Arc<dyn CommentStore>,
		users: Arc<dyn UserStore>,
	) -> Self {
		Self {
			articles,
			comments,
			users,
		}
	}

	/// Stores a new draft written by `author_id`.
	pub async fn create(&self, author_id: Uuid, input: CreateArticleInput) -> Result<Article, Error> {
		let input = CreateArticleInput {
			title: input.title.trim().to_owned(),
			content: input.content.trim().to_owned(),
			category: input.category,
		};

		input.validate()?;

		let article = self
			.articles
			.insert_article(NewArticle {
				author_id,
				title: input.title,
				content: input.content,
				category: input.category,
			})
			.await?;

		tracing::info!(article = %article.id, author = %author_id, "created article");

		Ok(article)
	}

	/// One page of the articles matching `filter`, authors resolved.
	pub async fn list(
		&self,
		mut filter: ArticleFilter,
		sort: Sort,
		window: Window,
	) -> Result<Page<ArticleView>, Error> {
		filter.search = filter
			.search
			.map(|search| search.trim().to_owned())
			.filter(|search| !search.is_empty());

		let (articles, total) = self
			.articles
			.list_articles(&ArticleQuery {
				filter,
				sort,
				offset: window.offset(),
				limit: window.limit,
			})
			.await?;

		Ok(Page {
			items: self.resolve(articles).await?,
			total,
			page: window.page,
			limit: window.limit,
		})
	}

	pub async fn list_published(&self) -> Result<Vec<ArticleView>, Error> {
		let articles = self.articles.list_published_articles().await?;

		self.resolve(articles).await
	}

	/// Fetches an article, counting the fetch as a view.
	pub async fn get(&self, id: &str) -> Result<ArticleView, Error> {
		let article = match parse_id(id) {
			Some(uuid) => self.articles.increment_views(uuid).await?,
			None => None,
		}
		.ok_or_else(|| Error::UnknownArticle(id.to_owned()))?;

		let author = self
			.users
			.find_user(article.author_id)
			.await?
			.as_ref()
			.map(Author::from);

		Ok(ArticleView { article, author })
	}

	pub async fn get_with_comments(&self, id: &str) -> Result<ArticleWithComments, Error> {
		let article = self.get(id).await?;
		let comments = self
			.comments
			.list_article_comments(article.article.id)
			.await?;

		Ok(ArticleWithComments { article, comments })
	}

	pub async fn update(
		&self,
		id: &str,
		requester: Uuid,
		input: UpdateArticleInput,
	) -> Result<Article, Error> {
		let uuid = self.owned(id, requester).await?;
		let input = UpdateArticleInput {
			title: trimmed(input.title),
			content: trimmed(input.content),
			category: input.category,
		};

		input.validate()?;

		self.articles
			.update_article(
				uuid,
				ArticleChanges {
					title: input.title,
					content: input.content,
					category: input.category,
				},
			)
			.await?
			.ok_or_else(|| Error::UnknownArticle(id.to_owned()))
	}

	/// Moves a draft to published or back.
	pub async fn toggle_publish(&self, id: &str, requester: Uuid) -> Result<Article, Error> {
		let uuid = self.owned(id, requester).await?;
		let article = self
			.articles
			.toggle_published(uuid)
			.await?
			.ok_or_else(|| Error::UnknownArticle(id.to_owned()))?;

		tracing::info!(article = %article.id, published = article.published, "toggled article");

		Ok(article)
	}

	/// Removes the article. Its comments are kept.
	pub async fn delete(&self, id: &str, requester: Uuid) -> Result<Article, Error> {
		let uuid = self.owned(id, requester).await?;
		let article = self
			.articles
			.delete_article(uuid)
			.await?
			.ok_or_else(|| Error::UnknownArticle(id.to_owned()))?;

		tracing::info!(article = %article.id, "deleted article");

		Ok(article)
	}

	async fn owned(&self, id: &str, requester: Uuid) -> Result<Uuid, Error> {
		let article = match parse_id(id) {
			Some(uuid) => self.articles.find_article(uuid).await?,
			None => None,
		}
		.ok_or_else(|| Error::UnknownArticle(id.to_owned()))?;

		ensure_owner(&article, requester, |a| a.author_id)?;

		Ok(article.id)
	}

	async fn resolve(&self, articles: Vec<Article>) -> Result<Vec<ArticleView>, Error> {
		let mut ids = articles.iter().map(|a| a.author_id).collect::<Vec<_>>();

		ids.sort_unstable();
		ids.dedup();

		let authors = self
			.users
			.find_users(&ids)
			.await?
			.iter()
			.map(|user| (user.id, Author::from(user)))
			.collect::<HashMap<_, _>>();

		Ok(articles
			.into_iter()
			.map(|article| ArticleView {
				author: authors.get(&article.author_id).cloned(),
				article,
			})
			.collect())
	}
}
