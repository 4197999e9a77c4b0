use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	extract::{Created, Json, Path, Query, Session},
	openapi::tag,
	route::comment,
	service::{Articles, Comments},
};

use super::{model, RouteError};

pub fn get_articles_docs(op: TransformOperation) -> TransformOperation {
	op.summary("List articles")
		.description(
			"Returns a page of articles matching the filters, newest first unless `sort` says \
			 otherwise.",
		)
		.tag(tag::ARTICLE)
}

pub async fn get_articles(
	State(articles): State<Articles>,
	Query(paginate): Query<model::Paginate>,
	Query(input): Query<model::ListArticlesInput>,
) -> Result<Json<model::PageResponse<model::ArticleView>>, RouteError> {
	let page = articles
		.list(input.filter(), input.sort(), paginate.window())
		.await?;

	Ok(Json(page.into()))
}

pub fn get_published_articles_docs(op: TransformOperation) -> TransformOperation {
	op.summary("List published articles")
		.description("Returns every published article, newest first.")
		.tag(tag::ARTICLE)
}

pub async fn get_published_articles(
	State(articles): State<Articles>,
) -> Result<Json<model::Listing<model::ArticleView>>, RouteError> {
	Ok(Json(articles.list_published().await?.into()))
}

pub fn get_article_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get single article")
		.description("Returns a single article by its unique id and counts the view.")
		.tag(tag::ARTICLE)
}

pub async fn get_article(
	State(articles): State<Articles>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Envelope<model::ArticleView>>, RouteError> {
	Ok(Json(model::Envelope::data(articles.get(&path.id).await?)))
}

pub fn get_article_with_comments_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get article with comments")
		.description("Returns a single article and its comments, newest first. Counts as a view.")
		.tag(tag::ARTICLE)
}

pub async fn get_article_with_comments(
	State(articles): State<Articles>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Envelope<model::ArticleWithComments>>, RouteError> {
	let article = articles.get_with_comments(&path.id).await?;

	Ok(Json(model::Envelope::data(article)))
}

pub fn get_article_comments_docs(op: TransformOperation) -> TransformOperation {
	op.summary("List article comments")
		.description("Returns the comments of a single article, newest first.")
		.tag(tag::ARTICLE)
}

pub async fn get_article_comments(
	State(comments): State<Comments>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Listing<model::Comment>>, comment::RouteError> {
	Ok(Json(comments.list_by_article(&path.id).await?.into()))
}

pub fn create_article_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Create article")
		.description("Creates a new draft owned by the authenticated user.")
		.tag(tag::ARTICLE)
		.response_with::<201, axum::Json<model::Envelope<model::Article>>, _>(|res| {
			res.description("Created successfully.")
		})
}

pub async fn create_article(
	State(articles): State<Articles>,
	session: Session,
	Json(input): Json<model::CreateArticleInput>,
) -> Result<Created<model::Envelope<model::Article>>, RouteError> {
	let article = articles.create(session.user.id, input).await?;

	Ok(Created(model::Envelope::message(
		"Article created successfully",
		article,
	)))
}

pub fn update_article_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Update article")
		.description("Updates the given fields of an article. Only its author may do this.")
		.tag(tag::ARTICLE)
}

pub async fn update_article(
	State(articles): State<Articles>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdateArticleInput>,
) -> Result<Json<model::Envelope<model::Article>>, RouteError> {
	let article = articles.update(&path.id, session.user.id, input).await?;

	Ok(Json(model::Envelope::message(
		"Article updated successfully",
		article,
	)))
}

pub fn toggle_publish_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Publish or unpublish article")
		.description("Publishes a draft, or moves a published article back to drafts.")
		.tag(tag::ARTICLE)
}

pub async fn toggle_publish(
	State(articles): State<Articles>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Envelope<model::Article>>, RouteError> {
	let article = articles.toggle_publish(&path.id, session.user.id).await?;
	let message = if article.published {
		"Article published"
	} else {
		"Article moved back to drafts"
	};

	Ok(Json(model::Envelope::message(message, article)))
}

pub fn delete_article_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Delete article")
		.description(
			"Deletes an article and returns its last state. Its comments are not removed.",
		)
		.tag(tag::ARTICLE)
}

pub async fn delete_article(
	State(articles): State<Articles>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Envelope<model::Article>>, RouteError> {
	let article = articles.delete(&path.id, session.user.id).await?;

	Ok(Json(model::Envelope::message(
		"Article deleted successfully",
		article,
	)))
}
