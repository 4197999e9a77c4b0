use aide::{
	openapi::{SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::error;

pub const SECURITY_SCHEME_BEARER: &str = "Bearer";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const ARTICLE: &str = "Article";
	pub const COMMENT: &str = "Comment";
	pub const HEALTH: &str = "Health";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Blog API")
		.summary("Articles, comments and the accounts that write them")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("Registration, login and the current user".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::ARTICLE.into(),
			description: Some("Article drafting, listing and publishing".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::COMMENT.into(),
			description: Some("Comments on articles".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::HEALTH.into(),
			description: Some("Service status".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: Some("JWT".into()),
				description: Some("A token returned by register or login".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<axum::Json<error::ErrorResponse>, _>(|res| {
			res.example(error::ErrorResponse {
				success: false,
				message: "invalid request data".into(),
				errors: error::Message::new("length")
					.content("title must be between 1 and 200 characters")
					.field("title")
					.into_vec(),
				detail: None,
			})
		})
}
