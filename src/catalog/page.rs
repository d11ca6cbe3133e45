//! One filtered catalog page plus its pagination metadata.

// self
use crate::{_prelude::*, catalog::ProductRecord, http::RawResponse};

/// Totals advertised by the storefront through `X-WP-Total` / `X-WP-TotalPages`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageTotals {
	/// Total number of products matching the query.
	pub total_items: Option<u64>,
	/// Total number of pages at the requested page size.
	pub total_pages: Option<u64>,
}
impl PageTotals {
	/// Header carrying the total item count.
	pub const TOTAL_ITEMS_HEADER: &'static str = "X-WP-Total";
	/// Header carrying the total page count.
	pub const TOTAL_PAGES_HEADER: &'static str = "X-WP-TotalPages";

	/// Reads both totals from response headers.
	pub fn from_response(raw: &RawResponse) -> Self {
		Self {
			total_items: raw.header_u64(Self::TOTAL_ITEMS_HEADER),
			total_pages: raw.header_u64(Self::TOTAL_PAGES_HEADER),
		}
	}

	/// Returns `true` once `page` is at or past the advertised last page.
	pub fn is_last_page(&self, page: u32) -> bool {
		self.total_pages.is_some_and(|last| u64::from(page) >= last)
	}
}

/// Filtered page of products.
///
/// `total_items` and `total_pages` come from the storefront when it reports them. Otherwise they
/// only describe this page's eligible items: true totals need a full scan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
	/// Eligible products, in upstream order.
	pub items: Vec<ProductRecord>,
	/// 1-based page index.
	pub page: u32,
	/// Requested page size.
	pub per_page: u32,
	/// Page count at `per_page`.
	pub total_pages: u64,
	/// Item count across all pages.
	pub total_items: u64,
}
impl Page {
	/// Builds a page, filling in whatever totals upstream left out.
	pub fn assemble(
		items: Vec<ProductRecord>,
		page: u32,
		per_page: u32,
		totals: PageTotals,
	) -> Self {
		let total_items = totals.total_items.unwrap_or(items.len() as u64);
		let total_pages = totals
			.total_pages
			.unwrap_or_else(|| total_items.div_ceil(u64::from(per_page.max(1))));

		Self { items, page, per_page, total_pages, total_items }
	}
}
