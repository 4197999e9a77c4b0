pub use crate::{
	model::{Article, ArticleView, ArticleWithComments, Comment},
	route::model::{Envelope, IdInput, Listing, PageResponse, Paginate},
	service::article::{CreateArticleInput, UpdateArticleInput},
};

use std::str::FromStr;

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::{
	model::Category,
	store::{ArticleFilter, Sort, SortField},
};

#[derive(Debug, thiserror::Error)]
#[error("unknown sort field {0:?}, expected one of createdAt, updatedAt, title, viewCount")]
pub struct UnknownSortField(pub String);

/// Parses `field` (ascending) or `-field` (descending).
impl FromStr for Sort {
	type Err = UnknownSortField;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let (descending, name) = match value.strip_prefix('-') {
			Some(name) => (true, name),
			None => (false, value),
		};

		let field = match name {
			"createdAt" => SortField::CreatedAt,
			"updatedAt" => SortField::UpdatedAt,
			"title" => SortField::Title,
			"viewCount" => SortField::ViewCount,
			_ => return Err(UnknownSortField(value.to_owned())),
		};

		Ok(Self { field, descending })
	}
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "String")]
pub struct SortParam(pub Sort);

impl TryFrom<String> for SortParam {
	type Error = UnknownSortField;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse().map(Self)
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ListArticlesInput {
	/// The field to order by, prefixed with `-` for descending order.
	/// Defaults to `-createdAt`.
	#[schemars(with = "Option<String>")]
	pub sort: Option<SortParam>,
	pub category: Option<Category>,
	pub published: Option<bool>,
	/// Case-insensitive text matched against the title and content.
	#[validate(length(max = 200, message = "search must be at most 200 characters"))]
	pub search: Option<String>,
}

impl ListArticlesInput {
	pub fn filter(&self) -> ArticleFilter {
		ArticleFilter {
			category: self.category,
			published: self.published,
			search: self.search.clone(),
		}
	}

	pub fn sort(&self) -> Sort {
		self.sort.map(|sort| sort.0).unwrap_or_default()
	}
}

#[cfg(test)]
mod test {
	use crate::store::{Sort, SortField};

	#[test]
	fn test_parse_sort() {
		assert_eq!(
			"-createdAt".parse::<Sort>().unwrap(),
			Sort {
				field: SortField::CreatedAt,
				descending: true
			}
		);
		assert_eq!(
			"title".parse::<Sort>().unwrap(),
			Sort {
				field: SortField::Title,
				descending: false
			}
		);
		assert!("-views".parse::<Sort>().is_err());
		assert!("".parse::<Sort>().is_err());
	}
}
