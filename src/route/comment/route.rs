use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	extract::{Created, Json, Path, Session},
	openapi::tag,
	service::Comments,
};

use super::{model, RouteError};

pub fn get_comments_docs(op: TransformOperation) -> TransformOperation {
	op.summary("List comments")
		.description("Returns every comment, newest first, with the title of the article it belongs to.")
		.tag(tag::COMMENT)
}

pub async fn get_comments(
	State(comments): State<Comments>,
) -> Result<Json<model::Listing<model::CommentView>>, RouteError> {
	Ok(Json(comments.list().await?.into()))
}

pub fn create_comment_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Create comment")
		.description("Leaves a comment on an existing article.")
		.tag(tag::COMMENT)
		.response_with::<201, axum::Json<model::Envelope<model::Comment>>, _>(|res| {
			res.description("Created successfully.")
		})
}

pub async fn create_comment(
	State(comments): State<Comments>,
	session: Session,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<Created<model::Envelope<model::Comment>>, RouteError> {
	let comment = comments.create(session.user.id, input).await?;

	Ok(Created(model::Envelope::message(
		"Comment created successfully",
		comment,
	)))
}

pub fn get_comment_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get single comment")
		.description("Returns a single comment by its unique id, with the article it belongs to.")
		.tag(tag::COMMENT)
}

pub async fn get_comment(
	State(comments): State<Comments>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Envelope<model::CommentView>>, RouteError> {
	Ok(Json(model::Envelope::data(comments.get(&path.id).await?)))
}

pub fn update_comment_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Update comment")
		.description("Replaces the content of a comment. Only its author may do this.")
		.tag(tag::COMMENT)
}

pub async fn update_comment(
	State(comments): State<Comments>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdateCommentInput>,
) -> Result<Json<model::Envelope<model::Comment>>, RouteError> {
	let comment = comments.update(&path.id, session.user.id, input).await?;

	Ok(Json(model::Envelope::message(
		"Comment updated successfully",
		comment,
	)))
}

pub fn delete_comment_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Delete comment")
		.description("Deletes a comment and returns its last state. Only its author may do this.")
		.tag(tag::COMMENT)
}

pub async fn delete_comment(
	State(comments): State<Comments>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Envelope<model::Comment>>, RouteError> {
	let comment = comments.delete(&path.id, session.user.id).await?;

	Ok(Json(model::Envelope::message(
		"Comment deleted successfully",
		comment,
	)))
}

pub fn like_comment_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Like comment")
		.description("Adds one like. No account is needed and repeated likes all count.")
		.tag(tag::COMMENT)
}

pub async fn like_comment(
	State(comments): State<Comments>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Envelope<model::Comment>>, RouteError> {
	Ok(Json(model::Envelope::message(
		"Comment liked",
		comments.like(&path.id).await?,
	)))
}
