//! Storefront catalog client: exhaustive scans, single pages, and stock write-back.
//!
//! Pages are requested strictly one after another. A scan ends on the first empty page, or
//! earlier when the storefront advertises its page count and the last page has been read. Any
//! failure mid-scan discards what was collected so far.

// crates.io
use reqwest::header::{ACCEPT, AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	catalog::{Page, PageTotals, ProductRecord, retain_eligible},
	error::{ConfigError, ParseError, UpstreamError},
	http::ReqwestHttpClient,
	obs::{self, Operation},
};

#[derive(Serialize)]
struct PageQuery {
	status: &'static str,
	page: u32,
	per_page: u32,
}

#[derive(Serialize)]
struct StockPatch {
	stock_quantity: u32,
	manage_stock: bool,
}

struct RawPage {
	records: Vec<ProductRecord>,
	totals: PageTotals,
}

/// Paginated, filtered access to the storefront's products endpoint.
#[derive(Clone)]
pub struct CatalogFetcher {
	http_client: ReqwestHttpClient,
	products_url: Url,
	credentials: ClientCredentials,
	per_page: u32,
}
impl CatalogFetcher {
	/// Largest page size the storefront accepts.
	pub const MAX_PER_PAGE: u32 = 100;

	/// Creates a fetcher for the storefront rooted at `store_url`.
	///
	/// Scans use [`Self::MAX_PER_PAGE`] until [`Self::with_per_page`] says otherwise. Every page
	/// and write-back is bounded by `http_client`'s timeout.
	pub fn new(
		store_url: &Url,
		credentials: ClientCredentials,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let mut products_url = store_url.clone();

		products_url
			.path_segments_mut()
			.map_err(|_| ConfigError::InvalidUrl {
				field: "woocommerce.url",
				source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
			})?
			.pop_if_empty()
			.extend(["wp-json", "wc", "v3", "products"]);

		Ok(Self { http_client, products_url, credentials, per_page: Self::MAX_PER_PAGE })
	}

	/// Overrides the page size used by [`Self::fetch_all`].
	pub fn with_per_page(mut self, per_page: u32) -> Result<Self, ConfigError> {
		validate_per_page(per_page)?;

		self.per_page = per_page;

		Ok(self)
	}

	/// Products endpoint derived from the store URL.
	pub fn products_url(&self) -> &Url {
		&self.products_url
	}

	/// Page size used by exhaustive scans.
	pub fn per_page(&self) -> u32 {
		self.per_page
	}

	/// Walks every page and returns all eligible products in upstream order.
	pub async fn fetch_all(&self) -> Result<Vec<ProductRecord>> {
		obs::observe(Operation::CatalogScan, "fetch_all", async {
			let mut products = Vec::new();
			let mut page = 1;

			loop {
				let RawPage { records, totals } = self.request_page(page, self.per_page).await?;

				if records.is_empty() {
					break;
				}

				let received = records.len();
				let eligible = retain_eligible(records);

				obs::record_page(page, received, eligible.len());
				products.extend(eligible);

				if totals.is_last_page(page) {
					break;
				}

				page += 1;
			}

			Ok(products)
		})
		.await
	}

	/// Fetches one page and annotates it with pagination metadata.
	pub async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Page> {
		if page == 0 {
			return Err(ConfigError::InvalidPageNumber.into());
		}

		validate_per_page(per_page)?;

		obs::observe(Operation::CatalogPage, "fetch_page", async {
			let RawPage { records, totals } = self.request_page(page, per_page).await?;
			let received = records.len();
			let eligible = retain_eligible(records);

			obs::record_page(page, received, eligible.len());

			Ok(Page::assemble(eligible, page, per_page, totals))
		})
		.await
	}

	/// Sets the stock of one product and returns the record the storefront echoes back.
	///
	/// The echo may be partial; see [`ProductRecord::from_write_back`].
	pub async fn update_stock(&self, product_id: u64, new_quantity: u32) -> Result<ProductRecord> {
		obs::observe(Operation::StockUpdate, "update_stock", async {
			let url = format!("{}/{product_id}", self.products_url);
			let request = self
				.http_client
				.put(url)
				.header(AUTHORIZATION, self.credentials.basic_header())
				.header(ACCEPT, "application/json")
				.json(&StockPatch { stock_quantity: new_quantity, manage_stock: true });
			let raw = self
				.http_client
				.execute(request)
				.await
				.map_err(|e| UpstreamError::transport(Operation::StockUpdate, e))?;

			if !raw.is_success() {
				return Err(UpstreamError {
					operation: Operation::StockUpdate,
					status: Some(raw.status_code()),
					body: raw.body,
				}
				.into());
			}

			let fields = raw.parse_json(Operation::StockUpdate)?;
			let status = Some(raw.status_code());

			ProductRecord::from_write_back(product_id, fields).map_err(|source| {
				Error::from(ParseError {
					operation: Operation::StockUpdate,
					status,
					body: raw.body,
					source,
				})
			})
		})
		.await
	}

	async fn request_page(&self, page: u32, per_page: u32) -> Result<RawPage> {
		let request = self
			.http_client
			.get(self.products_url.clone())
			.header(AUTHORIZATION, self.credentials.basic_header())
			.header(ACCEPT, "application/json")
			.query(&PageQuery { status: "publish", page, per_page });
		let raw = self
			.http_client
			.execute(request)
			.await
			.map_err(|e| UpstreamError::transport(Operation::CatalogPage, e))?;

		if !raw.is_success() {
			return Err(UpstreamError {
				operation: Operation::CatalogPage,
				status: Some(raw.status_code()),
				body: raw.body,
			}
			.into());
		}

		let records = raw.parse_json(Operation::CatalogPage)?;

		Ok(RawPage { records, totals: PageTotals::from_response(&raw) })
	}
}
impl Debug for CatalogFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CatalogFetcher")
			.field("products_url", &self.products_url.as_str())
			.field("consumer_key", &self.credentials.client_id.as_str())
			.field("per_page", &self.per_page)
			.finish()
	}
}

fn validate_per_page(per_page: u32) -> Result<(), ConfigError> {
	if (1..=CatalogFetcher::MAX_PER_PAGE).contains(&per_page) {
		Ok(())
	} else {
		Err(ConfigError::InvalidPageSize { per_page, max: CatalogFetcher::MAX_PER_PAGE })
	}
}
