use std::{
	cmp::Ordering,
	sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
	ArticleChanges, ArticleQuery, ArticleStore, CommentStore, Error, NewArticle, NewUser, Ping,
	Sort, SortField, UserStore,
};
use crate::model::{Article, Comment, User};

/// In-process store backed by vectors behind a single mutex.
///
/// Records are kept in insertion order, so walking a vector backwards
/// yields newest-first even when two timestamps compare equal.
#[derive(Debug, Default)]
pub struct MemoryStore {
	tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
	users: Vec<User>,
	articles: Vec<Article>,
	comments: Vec<Comment>,
}

impl MemoryStore {
	fn tables(&self) -> Result<MutexGuard<'_, Tables>, Error> {
		self.tables.lock().map_err(|_| Error::Poisoned)
	}
}

fn compare(sort: Sort, a: &Article, b: &Article) -> Ordering {
	let ordering = match sort.field {
		SortField::CreatedAt => a.created_at.cmp(&b.created_at),
		SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
		SortField::Title => a.title.cmp(&b.title),
		SortField::ViewCount => a.view_count.cmp(&b.view_count),
	};

	if sort.descending {
		ordering.reverse()
	} else {
		ordering
	}
}

/// Newest-first copy of the records that satisfy `keep`.
fn newest_first<T: Clone>(records: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
	records.iter().rev().filter(|r| keep(r)).cloned().collect()
}

#[async_trait]
impl UserStore for MemoryStore {
	async fn insert_user(&self, user: NewUser) -> Result<User, Error> {
		let mut tables = self.tables()?;

		if tables.users.iter().any(|u| u.email == user.email) {
			return Err(Error::Duplicate("email"));
		}

		let user = User {
			id: user.id,
			name: user.name,
			email: user.email,
			password_hash: user.password_hash,
			created_at: Utc::now(),
		};

		tables.users.push(user.clone());
		Ok(user)
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
		let tables = self.tables()?;

		Ok(tables.users.iter().find(|u| u.email == email).cloned())
	}

	async fn find_user(&self, id: Uuid) -> Result<Option<User>, Error> {
		let tables = self.tables()?;

		Ok(tables.users.iter().find(|u| u.id == id).cloned())
	}

	async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, Error> {
		let tables = self.tables()?;

		Ok(tables
			.users
			.iter()
			.filter(|u| ids.contains(&u.id))
			.cloned()
			.collect())
	}
}

#[async_trait]
impl ArticleStore for MemoryStore {
	async fn insert_article(&self, article: NewArticle) -> Result<Article, Error> {
		let mut tables = self.tables()?;
		let now = Utc::now();

		let article = Article {
			id: Uuid::new_v4(),
			title: article.title,
			content: article.content,
			author_id: article.author_id,
			published: false,
			category: article.category,
			view_count: 0,
			created_at: now,
			updated_at: now,
		};

		tables.articles.push(article.clone());
		Ok(article)
	}

	async fn find_article(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let tables = self.tables()?;

		Ok(tables.articles.iter().find(|a| a.id == id).cloned())
	}

	async fn find_articles(&self, ids: &[Uuid]) -> Result<Vec<Article>, Error> {
		let tables = self.tables()?;

		Ok(tables
			.articles
			.iter()
			.filter(|a| ids.contains(&a.id))
			.cloned()
			.collect())
	}

	async fn list_articles(&self, query: &ArticleQuery) -> Result<(Vec<Article>, i64), Error> {
		let tables = self.tables()?;

		let mut matches = if query.sort.descending {
			newest_first(&tables.articles, |a| query.filter.matches(a))
		} else {
			tables
				.articles
				.iter()
				.filter(|a| query.filter.matches(a))
				.cloned()
				.collect()
		};

		// stable, so ties keep the iteration order chosen above
		matches.sort_by(|a, b| compare(query.sort, a, b));

		let total = i64::try_from(matches.len()).map_err(|e| Error::Corrupt(e.to_string()))?;
		let offset = usize::try_from(query.offset).unwrap_or(0);
		let limit = usize::try_from(query.limit).unwrap_or(0);

		let page = matches.into_iter().skip(offset).take(limit).collect();

		Ok((page, total))
	}

	async fn list_published_articles(&self) -> Result<Vec<Article>, Error> {
		let tables = self.tables()?;
		let mut published = newest_first(&tables.articles, |a| a.published);

		published.sort_by(|a, b| compare(Sort::default(), a, b));
		Ok(published)
	}

	async fn update_article(
		&self,
		id: Uuid,
		changes: ArticleChanges,
	) -> Result<Option<Article>, Error> {
		let mut tables = self.tables()?;
		let Some(article) = tables.articles.iter_mut().find(|a| a.id == id) else {
			return Ok(None);
		};

		if let Some(title) = changes.title {
			article.title = title;
		}

		if let Some(content) = changes.content {
			article.content = content;
		}

		if let Some(category) = changes.category {
			article.category = Some(category);
		}

		article.updated_at = Utc::now();
		Ok(Some(article.clone()))
	}

	async fn toggle_published(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let mut tables = self.tables()?;
		let Some(article) = tables.articles.iter_mut().find(|a| a.id == id) else {
			return Ok(None);
		};

		article.published = !article.published;
		article.updated_at = Utc::now();
		Ok(Some(article.clone()))
	}

	async fn increment_views(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let mut tables = self.tables()?;
		let Some(article) = tables.articles.iter_mut().find(|a| a.id == id) else {
			return Ok(None);
		};

		article.view_count += 1;
		Ok(Some(article.clone()))
	}

	async fn delete_article(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let mut tables = self.tables()?;
		let Some(index) = tables.articles.iter().position(|a| a.id == id) else {
			return Ok(None);
		};

		Ok(Some(tables.articles.remove(index)))
	}
}

#[async_trait]
impl CommentStore for MemoryStore {
	async fn insert_comment(
		&self,
		author_id: Uuid,
		article_id: Uuid,
		content: String,
	) -> Result<Option<Comment>, Error> {
		let mut tables = self.tables()?;

		if !tables.articles.iter().any(|a| a.id == article_id) {
			return Ok(None);
		}

		let now = Utc::now();
		let comment = Comment {
			id: Uuid::new_v4(),
			content,
			author_id,
			article_id,
			like_count: 0,
			created_at: now,
			updated_at: now,
		};

		tables.comments.push(comment.clone());
		Ok(Some(comment))
	}

	async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, Error> {
		let tables = self.tables()?;

		Ok(tables.comments.iter().find(|c| c.id == id).cloned())
	}

	async fn list_comments(&self) -> Result<Vec<Comment>, Error> {
		let tables = self.tables()?;

		Ok(newest_first(&tables.comments, |_| true))
	}

	async fn list_article_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, Error> {
		let tables = self.tables()?;

		Ok(newest_first(&tables.comments, |c| c.article_id == article_id))
	}

	async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<Comment>, Error> {
		let mut tables = self.tables()?;
		let Some(comment) = tables.comments.iter_mut().find(|c| c.id == id) else {
			return Ok(None);
		};

		comment.content = content;
		comment.updated_at = Utc::now();
		Ok(Some(comment.clone()))
	}

	async fn increment_likes(&self, id: Uuid) -> Result<Option<Comment>, Error> {
		let mut tables = self.tables()?;
		let Some(comment) = tables.comments.iter_mut().find(|c| c.id == id) else {
			return Ok(None);
		};

		comment.like_count += 1;
		Ok(Some(comment.clone()))
	}

	async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, Error> {
		let mut tables = self.tables()?;
		let Some(index) = tables.comments.iter().position(|c| c.id == id) else {
			return Ok(None);
		};

		Ok(Some(tables.comments.remove(index)))
	}
}

#[async_trait]
impl Ping for MemoryStore {
	fn backend(&self) -> &'static str {
		"memory"
	}

	async fn ping(&self) -> Result<(), Error> {
		self.tables().map(drop)
	}
}
