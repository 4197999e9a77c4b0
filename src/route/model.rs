use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::service::{Page, Window};

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

#[inline]
fn ten() -> i64 {
	10
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, message = "page must be at least 1"))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
	#[serde(default = "ten")]
	pub limit: i64,
}

impl Paginate {
	pub fn window(&self) -> Window {
		Window {
			page: self.page,
			limit: self.limit,
		}
	}
}

/// A resource id taken from the path. Kept as text so malformed ids are
/// reported as unknown resources.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: String,
}

/// The success envelope around a single value.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Envelope<T> {
	/// Always `true`.
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	pub data: T,
}

impl<T> Envelope<T> {
	pub fn data(data: T) -> Self {
		Self {
			success: true,
			message: None,
			data,
		}
	}

	pub fn message(message: impl Into<String>, data: T) -> Self {
		Self {
			success: true,
			message: Some(message.into()),
			data,
		}
	}
}

/// An unpaginated list.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Listing<T> {
	pub success: bool,
	/// The number of items in `data`.
	pub count: usize,
	pub data: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
	fn from(data: Vec<T>) -> Self {
		Self {
			success: true,
			count: data.len(),
			data,
		}
	}
}

/// A single page of a larger list.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
	pub success: bool,
	/// The number of items on this page.
	pub count: usize,
	/// The number of matching items across all pages.
	pub total: i64,
	pub page: i64,
	pub total_pages: i64,
	pub has_next_page: bool,
	pub has_prev_page: bool,
	pub data: Vec<T>,
}

impl<T> From<Page<T>> for PageResponse<T> {
	fn from(page: Page<T>) -> Self {
		Self {
			success: true,
			count: page.items.len(),
			total: page.total,
			page: page.page,
			total_pages: page.total_pages(),
			has_next_page: page.has_next_page(),
			has_prev_page: page.has_prev_page(),
			data: page.items,
		}
	}
}
