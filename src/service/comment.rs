use std::{collections::HashMap, sync::Arc};

use axum::http::StatusCode;
use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::parse_id;
use crate::{
	error::{self, ErrorShape},
	model::{ArticleSummary, Comment, CommentView},
	policy::{ensure_owner, NotOwner},
	store::{self, ArticleStore, CommentStore},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("comment not found")]
	UnknownComment(String),
	#[error("article not found")]
	UnknownArticle(String),
	#[error("you are not the author of this comment")]
	NotAuthor,
	#[error("invalid comment data")]
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
			Self::UnknownComment(..) | Self::UnknownArticle(..) => StatusCode::NOT_FOUND,
			Self::NotAuthor => StatusCode::FORBIDDEN,
			Self::Validation(..) => StatusCode::BAD_REQUEST,
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownComment(id) => error::Message::new("unknown_comment")
				.content("No comment exists with this id.")
				.detail("comment", id)
				.into_vec(),
			Self::UnknownArticle(id) => error::Message::new("unknown_article")
				.content("No article exists with this id.")
				.field("article")
				.detail("article", id)
				.into_vec(),
			Self::Validation(errors) => error::validation_messages(&errors),
			_ => Vec::new(),
		}
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateCommentInput {
	#[validate(length(min = 1, max = 500, message = "content must be between 1 and 500 characters"))]
	pub content: String,
	/// The id of the article being commented on.
	pub article: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateCommentInput {
	#[validate(length(min = 1, max = 500, message = "content must be between 1 and 500 characters"))]
	pub content: String,
}

#[derive(Clone)]
pub struct Comments {
	comments: Arc<dyn CommentStore>,
	articles: Arc<dyn ArticleStore>,
}

impl Comments {
	pub fn new(comments: Arc<dyn CommentStore>, articles: Arc<dyn ArticleStore>) -> Self {
		Self { comments, articles }
	}

	/// Leaves a comment on an existing article.
	pub async fn create(&self, author_id: Uuid, input: CreateCommentInput) -> Result<Comment, Error> {
		let article_id = self.article(&input.article).await?;
		let input = CreateCommentInput {
			content: input.content.trim().to_owned(),
			article: input.article,
		};

		input.validate()?;

		let comment = self
			.comments
			.insert_comment(author_id, article_id, input.content)
			.await?
			.ok_or(Error::UnknownArticle(input.article))?;

		tracing::info!(comment = %comment.id, article = %article_id, "created comment");

		Ok(comment)
	}

	/// Every comment, newest first, each with its article.
	pub async fn list(&self) -> Result<Vec<CommentView>, Error> {
		let comments = self.comments.list_comments().await?;

		self.resolve(comments).await
	}

	pub async fn list_by_article(&self, article: &str) -> Result<Vec<Comment>, Error> {
		let article_id = self.article(article).await?;

		Ok(self.comments.list_article_comments(article_id).await?)
	}

	pub async fn get(&self, id: &str) -> Result<CommentView, Error> {
		let comment = self.find(id).await?;
		let article = self
			.articles
			.find_article(comment.article_id)
			.await?
			.as_ref()
			.map(ArticleSummary::from);

		Ok(CommentView { comment, article })
	}

	async fn find(&self, id: &str) -> Result<Comment, Error> {
		match parse_id(id) {
			Some(uuid) => self.comments.find_comment(uuid).await?,
			None => None,
		}
		.ok_or_else(|| Error::UnknownComment(id.to_owned()))
	}

	pub async fn update(
		&self,
		id: &str,
		requester: Uuid,
		input: UpdateCommentInput,
	) -> Result<Comment, Error> {
		let comment = self.find(id).await?;

		ensure_owner(&comment, requester, |c| c.author_id)?;

		let input = UpdateCommentInput {
			content: input.content.trim().to_owned(),
		};

		input.validate()?;

		self.comments
			.update_comment(comment.id, input.content)
			.await?
			.ok_or_else(|| Error::UnknownComment(id.to_owned()))
	}

	pub async fn delete(&self, id: &str, requester: Uuid) -> Result<Comment, Error> {
		let comment = self.find(id).await?;

		ensure_owner(&comment, requester, |c| c.author_id)?;

		self.comments
			.delete_comment(comment.id)
			.await?
			.ok_or_else(|| Error::UnknownComment(id.to_owned()))
	}

	/// Adds an anonymous like. The same client may like any number of times.
	pub async fn like(&self, id: &str) -> Result<Comment, Error> {
		match parse_id(id) {
			Some(uuid) => self.comments.increment_likes(uuid).await?,
			None => None,
		}
		.ok_or_else(|| Error::UnknownComment(id.to_owned()))
	}

	async fn article(&self, id: &str) -> Result<Uuid, Error> {
		match parse_id(id) {
			Some(uuid) => self.articles.find_article(uuid).await?,
			None => None,
		}
		.map(|article| article.id)
		.ok_or_else(|| Error::UnknownArticle(id.to_owned()))
	}

	async fn resolve(&self, comments: Vec<Comment>) -> Result<Vec<CommentView>, Error> {
		let mut ids = comments.iter().map(|c| c.article_id).collect::<Vec<_>>();

		ids.sort_unstable();
		ids.dedup();

		let articles = self
			.articles
			.find_articles(&ids)
			.await?
			.iter()
			.map(|article| (article.id, ArticleSummary::from(article)))
			.collect::<HashMap<_, _>>();

		Ok(comments
			.into_iter()
			.map(|comment| CommentView {
				article: articles.get(&comment.article_id).cloned(),
				comment,
			})
			.collect())
	}
}
