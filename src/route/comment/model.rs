pub use crate::{
	model::{Comment, CommentView},
	route::model::{Envelope, IdInput, Listing},
	service::comment::{CreateCommentInput, UpdateCommentInput},
};
