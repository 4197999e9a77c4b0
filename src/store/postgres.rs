use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
	ArticleChanges, ArticleFilter, ArticleQuery, ArticleStore, CommentStore, Error, NewArticle,
	NewUser, Ping, Sort, SortField, UserStore,
};
use crate::{
	model::{Article, Category, Comment, User},
	Database,
};

const EMAIL_CONSTRAINT: &str = "user_email_key";
const ARTICLE_COLUMNS: &str =
	"id, title, content, author_id, published, category, view_count, created_at, updated_at";

/// PostgreSQL adapter.
#[derive(Debug, Clone)]
pub struct PgStore {
	database: Database,
}

impl PgStore {
	/// Connects to the database and applies pending migrations.
	pub async fn connect(url: &str, max_connections: u32) -> Result<Self, Error> {
		let database = PgPoolOptions::new()
			.max_connections(max_connections)
			.connect(url)
			.await?;

		sqlx::migrate!("./migrations").run(&database).await?;

		Ok(Self { database })
	}
}

#[derive(FromRow)]
struct UserRow {
	id: Uuid,
	name: String,
	email: String,
	password_hash: String,
	created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
	fn from(row: UserRow) -> Self {
		Self {
			id: row.id,
			name: row.name,
			email: row.email,
			password_hash: row.password_hash,
			created_at: row.created_at,
		}
	}
}

#[derive(FromRow)]
struct ArticleRow {
	id: Uuid,
	title: String,
	content: String,
	author_id: Uuid,
	published: bool,
	category: Option<String>,
	view_count: i64,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for Article {
	type Error = Error;

	fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
		let category = row
			.category
			.as_deref()
			.map(str::parse::<Category>)
			.transpose()
			.map_err(|e| Error::Corrupt(e.to_string()))?;

		Ok(Self {
			id: row.id,
			title: row.title,
			content: row.content,
			author_id: row.author_id,
			published: row.published,
			category,
			view_count: row.view_count,
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

fn into_article(row: Option<ArticleRow>) -> Result<Option<Article>, Error> {
	row.map(Article::try_from).transpose()
}

fn into_articles(rows: Vec<ArticleRow>) -> Result<Vec<Article>, Error> {
	rows.into_iter().map(Article::try_from).collect()
}

#[derive(FromRow)]
struct CommentRow {
	id: Uuid,
	content: String,
	author_id: Uuid,
	article_id: Uuid,
	like_count: i64,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
	fn from(row: CommentRow) -> Self {
		Self {
			id: row.id,
			content: row.content,
			author_id: row.author_id,
			article_id: row.article_id,
			like_count: row.like_count,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

/// Escapes `LIKE` wildcards so the search term matches literally.
fn like_pattern(search: &str) -> String {
	let mut pattern = String::with_capacity(search.len() + 2);

	pattern.push('%');
	for c in search.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
		}
		pattern.push(c);
	}
	pattern.push('%');

	pattern
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
	builder.push(" WHERE TRUE");

	if let Some(category) = filter.category {
		builder.push(" AND category = ").push_bind(category.as_str());
	}

	if let Some(published) = filter.published {
		builder.push(" AND published = ").push_bind(published);
	}

	if let Some(search) = &filter.search {
		let pattern = like_pattern(search);

		builder
			.push(" AND (title ILIKE ")
			.push_bind(pattern.clone())
			.push(" OR content ILIKE ")
			.push_bind(pattern)
			.push(")");
	}
}

fn order_by(sort: Sort) -> &'static str {
	match (sort.field, sort.descending) {
		(SortField::CreatedAt, true) => " ORDER BY created_at DESC, id DESC",
		(SortField::CreatedAt, false) => " ORDER BY created_at ASC, id ASC",
		(SortField::UpdatedAt, true) => " ORDER BY updated_at DESC, id DESC",
		(SortField::UpdatedAt, false) => " ORDER BY updated_at ASC, id ASC",
		(SortField::Title, true) => " ORDER BY title DESC, id DESC",
		(SortField::Title, false) => " ORDER BY title ASC, id ASC",
		(SortField::ViewCount, true) => " ORDER BY view_count DESC, id DESC",
		(SortField::ViewCount, false) => " ORDER BY view_count ASC, id ASC",
	}
}

#[async_trait]
impl UserStore for PgStore {
	async fn insert_user(&self, user: NewUser) -> Result<User, Error> {
		sqlx::query_as::<_, UserRow>(
			r#"
				INSERT INTO "user" (id, name, email, password_hash)
				VALUES ($1, $2, $3, $4)
				RETURNING *
			"#,
		)
		.bind(user.id)
		.bind(user.name)
		.bind(user.email)
		.bind(user.password_hash)
		.fetch_one(&self.database)
		.await
		.map(User::from)
		.map_err(|e| match e {
			sqlx::Error::Database(ref d) if d.constraint() == Some(EMAIL_CONSTRAINT) => {
				Error::Duplicate("email")
			}
			e => Error::from(e),
		})
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
		let user = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM "user" WHERE email = $1"#)
			.bind(email)
			.fetch_optional(&self.database)
			.await?;

		Ok(user.map(User::from))
	}

	async fn find_user(&self, id: Uuid) -> Result<Option<User>, Error> {
		let user = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM "user" WHERE id = $1"#)
			.bind(id)
			.fetch_optional(&self.database)
			.await?;

		Ok(user.map(User::from))
	}

	async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, Error> {
		let users = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM "user" WHERE id = ANY($1)"#)
			.bind(ids)
			.fetch_all(&self.database)
			.await?;

		Ok(users.into_iter().map(User::from).collect())
	}
}

#[async_trait]
impl ArticleStore for PgStore {
	async fn insert_article(&self, article: NewArticle) -> Result<Article, Error> {
		let row = sqlx::query_as::<_, ArticleRow>(
			r#"
				INSERT INTO article (id, title, content, author_id, category)
				VALUES ($1, $2, $3, $4, $5)
				RETURNING *
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(article.title)
		.bind(article.content)
		.bind(article.author_id)
		.bind(article.category.map(Category::as_str))
		.fetch_one(&self.database)
		.await?;

		Article::try_from(row)
	}

	async fn find_article(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let row = sqlx::query_as::<_, ArticleRow>("SELECT * FROM article WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.database)
			.await?;

		into_article(row)
	}

	async fn find_articles(&self, ids: &[Uuid]) -> Result<Vec<Article>, Error> {
		let rows = sqlx::query_as::<_, ArticleRow>("SELECT * FROM article WHERE id = ANY($1)")
			.bind(ids)
			.fetch_all(&self.database)
			.await?;

		into_articles(rows)
	}

	async fn list_articles(&self, query: &ArticleQuery) -> Result<(Vec<Article>, i64), Error> {
		let mut select = QueryBuilder::new(format!("SELECT {ARTICLE_COLUMNS} FROM article"));

		push_filter(&mut select, &query.filter);
		select
			.push(order_by(query.sort))
			.push(" LIMIT ")
			.push_bind(query.limit)
			.push(" OFFSET ")
			.push_bind(query.offset);

		let rows = select
			.build_query_as::<ArticleRow>()
			.fetch_all(&self.database)
			.await?;

		let mut count = QueryBuilder::new("SELECT COUNT(*) FROM article");

		push_filter(&mut count, &query.filter);

		let (total,) = count
			.build_query_as::<(i64,)>()
			.fetch_one(&self.database)
			.await?;

		Ok((into_articles(rows)?, total))
	}

	async fn list_published_articles(&self) -> Result<Vec<Article>, Error> {
		let rows = sqlx::query_as::<_, ArticleRow>(
			r#"
				SELECT * FROM article
				WHERE published
				ORDER BY created_at DESC, id DESC
			"#,
		)
		.fetch_all(&self.database)
		.await?;

		into_articles(rows)
	}

	async fn update_article(
		&self,
		id: Uuid,
		changes: ArticleChanges,
	) -> Result<Option<Article>, Error> {
		let row = sqlx::query_as::<_, ArticleRow>(
			r#"
				UPDATE article
				SET title = COALESCE($1, title),
					content = COALESCE($2, content),
					category = COALESCE($3, category),
					updated_at = now()
				WHERE id = $4
				RETURNING *
			"#,
		)
		.bind(changes.title)
		.bind(changes.content)
		.bind(changes.category.map(Category::as_str))
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		into_article(row)
	}

	async fn toggle_published(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let row = sqlx::query_as::<_, ArticleRow>(
			r#"
				UPDATE article
				SET published = NOT published, updated_at = now()
				WHERE id = $1
				RETURNING *
			"#,
		)
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		into_article(row)
	}

	async fn increment_views(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let row = sqlx::query_as::<_, ArticleRow>(
			r#"
				UPDATE article
				SET view_count = view_count + 1
				WHERE id = $1
				RETURNING *
			"#,
		)
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		into_article(row)
	}

	async fn delete_article(&self, id: Uuid) -> Result<Option<Article>, Error> {
		let row = sqlx::query_as::<_, ArticleRow>("DELETE FROM article WHERE id = $1 RETURNING *")
			.bind(id)
			.fetch_optional(&self.database)
			.await?;

		into_article(row)
	}
}

#[async_trait]
impl CommentStore for PgStore {
	async fn insert_comment(
		&self,
		author_id: Uuid,
		article_id: Uuid,
		content: String,
	) -> Result<Option<Comment>, Error> {
		let row = sqlx::query_as::<_, CommentRow>(
			r#"
				INSERT INTO comment (id, content, author_id, article_id)
				SELECT $1, $2, $3, $4
				WHERE EXISTS (SELECT 1 FROM article WHERE id = $4)
				RETURNING *
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(content)
		.bind(author_id)
		.bind(article_id)
		.fetch_optional(&self.database)
		.await?;

		Ok(row.map(Comment::from))
	}

	async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, Error> {
		let row = sqlx::query_as::<_, CommentRow>("SELECT * FROM comment WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.database)
			.await?;

		Ok(row.map(Comment::from))
	}

	async fn list_comments(&self) -> Result<Vec<Comment>, Error> {
		let rows = sqlx::query_as::<_, CommentRow>(
			"SELECT * FROM comment ORDER BY created_at DESC, id DESC",
		)
		.fetch_all(&self.database)
		.await?;

		Ok(rows.into_iter().map(Comment::from).collect())
	}

	async fn list_article_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, Error> {
		let rows = sqlx::query_as::<_, CommentRow>(
			r#"
				SELECT * FROM comment
				WHERE article_id = $1
				ORDER BY created_at DESC, id DESC
			"#,
		)
		.bind(article_id)
		.fetch_all(&self.database)
		.await?;

		Ok(rows.into_iter().map(Comment::from).collect())
	}

	async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<Comment>, Error> {
		let row = sqlx::query_as::<_, CommentRow>(
			r#"
				UPDATE comment
				SET content = $1, updated_at = now()
				WHERE id = $2
				RETURNING *
			"#,
		)
		.bind(content)
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		Ok(row.map(Comment::from))
	}

	async fn increment_likes(&self, id: Uuid) -> Result<Option<Comment>, Error> {
		let row = sqlx::query_as::<_, CommentRow>(
			r#"
				UPDATE comment
				SET like_count = like_count + 1
				WHERE id = $1
				RETURNING *
			"#,
		)
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		Ok(row.map(Comment::from))
	}

	async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, Error> {
		let row = sqlx::query_as::<_, CommentRow>("DELETE FROM comment WHERE id = $1 RETURNING *")
			.bind(id)
			.fetch_optional(&self.database)
			.await?;

		Ok(row.map(Comment::from))
	}
}

#[async_trait]
impl Ping for PgStore {
	fn backend(&self) -> &'static str {
		"postgres"
	}

	async fn ping(&self) -> Result<(), Error> {
		sqlx::query("SELECT 1").execute(&self.database).await?;

		Ok(())
	}
}
