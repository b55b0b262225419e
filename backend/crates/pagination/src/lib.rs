//! Limit/offset pagination primitives shared by backend feed endpoints.
//!
//! Feed reads accept either a raw `(limit, offset)` pair or a one-based
//! `(page, limit)` pair. Both are validated here so that every endpoint
//! rejects out-of-range parameters identically instead of silently
//! clamping them. Responses carry a [`PageInfo`] envelope describing the
//! window that was served and whether more items remain.

use serde::{Deserialize, Serialize};

/// Smallest accepted page size.
pub const LIMIT_MIN: u32 = 1;
/// Largest accepted page size.
pub const LIMIT_MAX: u32 = 100;
/// Page size applied when the caller does not supply one.
pub const LIMIT_DEFAULT: u32 = 20;

/// Validation failures for pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The requested page size falls outside the accepted range.
    #[error("limit must be between {LIMIT_MIN} and {LIMIT_MAX}")]
    LimitOutOfRange,
    /// Pages are one-based; zero is not a valid page number.
    #[error("page must be at least 1")]
    PageOutOfRange,
}

/// A validated read window over an ordered collection.
///
/// Construct with [`PageRequest::new`] for raw limit/offset input or
/// [`PageRequest::from_page`] for one-based page numbers. A default
/// request serves the first [`LIMIT_DEFAULT`] items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Validate a raw `(limit, offset)` pair.
    ///
    /// `limit` of `None` applies [`LIMIT_DEFAULT`]; an explicit value
    /// outside `1..=100` is rejected rather than clamped.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::LimitOutOfRange`] when `limit` is
    /// outside the accepted range.
    pub const fn new(limit: Option<u32>, offset: u64) -> Result<Self, PaginationError> {
        let limit = match limit {
            None => LIMIT_DEFAULT,
            Some(value) if value >= LIMIT_MIN && value <= LIMIT_MAX => value,
            Some(_) => return Err(PaginationError::LimitOutOfRange),
        };
        Ok(Self { limit, offset })
    }

    /// Validate a one-based `(page, limit)` pair.
    ///
    /// The offset is derived as `(page - 1) * limit`.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::PageOutOfRange`] when `page` is zero and
    /// [`PaginationError::LimitOutOfRange`] when `limit` is outside the
    /// accepted range.
    pub const fn from_page(page: u32, limit: Option<u32>) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::PageOutOfRange);
        }
        let request = match Self::new(limit, 0) {
            Ok(value) => value,
            Err(err) => return Err(err),
        };
        let offset = (page as u64 - 1) * request.limit as u64;
        Ok(Self {
            limit: request.limit,
            offset,
        })
    }

    /// The validated page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// The number of items skipped before the window starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// The one-based page number this window corresponds to.
    ///
    /// Offsets that do not fall on a page boundary round down to the page
    /// containing the first served item.
    #[must_use]
    pub const fn page(&self) -> u32 {
        #[expect(
            clippy::integer_division,
            reason = "flooring is the intended page-boundary semantics"
        )]
        let zero_based = self.offset / self.limit as u64;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "page counts in practice fit u32; saturation is acceptable at the extreme"
        )]
        let page = if zero_based >= u32::MAX as u64 {
            u32::MAX
        } else {
            zero_based as u32 + 1
        };
        page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: LIMIT_DEFAULT,
            offset: 0,
        }
    }
}

/// Envelope describing the window served by a paginated read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// One-based page number.
    pub page: u32,
    /// Page size that was applied.
    pub limit: u32,
    /// Exact count of items matching the query.
    pub total: u64,
    /// Whether any item exists past the served window.
    pub has_more: bool,
}

impl PageInfo {
    /// Derive the envelope for a request against a collection of `total`
    /// matching items. `has_more` holds exactly when `page * limit < total`.
    #[must_use]
    pub const fn compute(request: &PageRequest, total: u64) -> Self {
        let page = request.page();
        let limit = request.limit();
        Self {
            page,
            limit,
            total,
            has_more: (page as u64) * (limit as u64) < total,
        }
    }
}

/// A window of items together with its [`PageInfo`] envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items within the served window, in query order.
    pub items: Vec<T>,
    /// Envelope describing the window.
    pub info: PageInfo,
}

impl<T> Page<T> {
    /// Assemble a page from served items and the request that produced them.
    #[must_use]
    pub const fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            items,
            info: PageInfo::compute(request, total),
        }
    }

    /// An empty page for a query that matched nothing.
    #[must_use]
    pub const fn empty(request: &PageRequest) -> Self {
        Self {
            items: Vec::new(),
            info: PageInfo::compute(request, 0),
        }
    }
}
