//! Business rules on top of the persistence ports: validation, ownership
//! checks, pagination and author resolution.

pub mod article;
pub mod comment;
pub mod credential;
pub mod token;

pub use article::Articles;
pub use comment::Comments;
pub use credential::Credentials;
pub use token::TokenService;

use uuid::Uuid;

/// Parses a path or body identifier. Malformed ids are reported as unknown
/// resources rather than bad requests.
pub fn parse_id(raw: &str) -> Option<Uuid> {
	Uuid::parse_str(raw.trim()).ok()
}

/// The requested slice of a listing: a 1-indexed page of `limit` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
	pub page: i64,
	pub limit: i64,
}

impl Window {
	/// Number of items before the page. Saturates, so a page far past the
	/// end yields an empty result instead of overflowing.
	pub fn offset(&self) -> i64 {
		(self.page - 1).saturating_mul(self.limit)
	}
}

/// A window over a larger result set.
#[derive(Debug, Clone)]
pub struct Page<T> {
	pub items: Vec<T>,
	/// Number of records matching the query across all pages.
	pub total: i64,
	/// 1-indexed page number.
	pub page: i64,
	pub limit: i64,
}

impl<T> Page<T> {
	pub fn total_pages(&self) -> i64 {
		if self.limit <= 0 {
			return 0;
		}

		(self.total + self.limit - 1) / self.limit
	}

	pub fn has_next_page(&self) -> bool {
		self.page < self.total_pages()
	}

	pub fn has_prev_page(&self) -> bool {
		self.page > 1
	}
}

#[cfg(test)]
mod test {
	use super::{parse_id, Page, Window};

	fn page(total: i64, page: i64) -> Page<()> {
		Page {
			items: Vec::new(),
			total,
			page,
			limit: 10,
		}
	}

	#[test]
	fn test_window_offset() {
		let mut window = Window { page: 1, limit: 10 };

		assert_eq!(window.offset(), 0);

		window.page = 2;

		assert_eq!(window.offset(), 10);

		window.limit = 5;

		assert_eq!(window.offset(), 5);

		window.page = 3;

		assert_eq!(window.offset(), 10);
	}

	#[test]
	fn test_window_offset_saturates() {
		let window = Window {
			page: i64::MAX,
			limit: 10,
		};

		assert_eq!(window.offset(), i64::MAX);
	}

	#[test]
	fn test_total_pages_rounds_up() {
		assert_eq!(page(0, 1).total_pages(), 0);
		assert_eq!(page(10, 1).total_pages(), 1);
		assert_eq!(page(11, 1).total_pages(), 2);
		assert_eq!(page(25, 1).total_pages(), 3);
	}

	#[test]
	fn test_next_and_prev_flags() {
		assert!(page(25, 1).has_next_page());
		assert!(!page(25, 1).has_prev_page());
		assert!(page(25, 2).has_next_page());
		assert!(!page(25, 3).has_next_page());
		assert!(page(25, 3).has_prev_page());
		assert!(!page(0, 1).has_next_page());
	}

	#[test]
	fn test_parse_id() {
		assert!(parse_id("not-a-uuid").is_none());
		assert!(parse_id("67e55044-10b1-426f-9247-bb680e5fe0c8").is_some());
	}
}
