//! Pagination math.

use crate::model::PaginationInput;

/// Page used when none is requested.
pub const DEFAULT_PAGE: i32 = 0;

/// Page size used when none (or a non-positive one) is requested.
pub const DEFAULT_SIZE: i32 = 20;

/// Resolved pagination: `page >= 0`, `size > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i32,
    size: i32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_SIZE,
        }
    }
}

impl Pagination {
    /// Resolve raw values. Negative pages become 0, non-positive sizes
    /// become [`DEFAULT_SIZE`].
    pub fn new(page: Option<i32>, size: Option<i32>) -> Self {
        Self {
            page: page.filter(|p| *p >= 0).unwrap_or(DEFAULT_PAGE),
            size: size.filter(|s| *s > 0).unwrap_or(DEFAULT_SIZE),
        }
    }

    /// Resolve optional GraphQL input.
    pub fn from_input(input: Option<&PaginationInput>) -> Self {
        input.map_or_else(Self::default, |p| Self::new(p.page, p.size))
    }

    /// Zero-based page number.
    pub fn page(&self) -> i32 {
        self.page
    }

    /// Page size.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Backend `limit` for message history.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Backend `offset` for message history: `page * size`.
    ///
    /// Page 0 and an absent page give the same offset.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// `ceil(total / size)`, 0 for an empty result.
    pub fn total_pages(&self, total: i64) -> i32 {
        if total <= 0 {
            return 0;
        }
        let size = i64::from(self.size);
        saturating_i32(total / size + i64::from(total % size != 0))
    }
}

/// Narrow a backend count to a GraphQL `Int`.
pub fn saturating_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
