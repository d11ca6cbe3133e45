//! Bol.com Retailer API offers: reading an offer and pushing its stock.
//!
//! Every call authenticates with a bearer token taken from the shared [`TokenCache`]. The write
//! path is switched off unless the configuration enables it; a disabled client refuses before it
//! touches the identity provider or the marketplace. Reads are always allowed.

// crates.io
use reqwest::{
	RequestBuilder,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
// self
use crate::{
	_prelude::*,
	auth::TokenCache,
	error::{ConfigError, UpstreamError},
	http::ReqwestHttpClient,
	obs::{self, Operation},
};

/// Media type of the Retailer API version this client speaks.
pub const RETAILER_MEDIA_TYPE: &str = "application/vnd.retailer.v10+json";

/// Acknowledgement of an asynchronous marketplace operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStatus {
	/// Identifier to poll the process status with.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub process_status_id: Option<String>,
	/// Current state, e.g. `PENDING` or `SUCCESS`.
	pub status: String,
	/// Kind of operation, e.g. `UPDATE_OFFER_STOCK`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub event_type: Option<String>,
	/// Human-readable description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Remaining fields (links, timestamps, entity id).
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Stock block of an offer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferStock {
	/// Amount last set by the retailer.
	pub amount: i64,
	/// Amount after the marketplace subtracted open orders.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub corrected_stock: Option<i64>,
	/// Whether the retailer manages the amount on its own.
	#[serde(default)]
	pub managed_by_retailer: bool,
}

/// Offer as listed on the marketplace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
	/// Marketplace offer identifier.
	pub offer_id: String,
	/// European article number of the listed product.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ean: Option<String>,
	/// Retailer's own reference, typically the storefront SKU.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
	/// Offer paused by the retailer.
	#[serde(default)]
	pub on_hold_by_retailer: bool,
	/// Stock as the marketplace sees it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stock: Option<OfferStock>,
	/// Pricing, fulfilment, condition and the rest, untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Client for the marketplace offer endpoints.
#[derive(Clone, Debug)]
pub struct MarketplaceClient {
	http_client: ReqwestHttpClient,
	api_url: Url,
	tokens: Arc<TokenCache>,
	writes_enabled: bool,
}
impl MarketplaceClient {
	/// Creates a client with the write path disabled.
	///
	/// Marketplace calls are bounded by `http_client`'s timeout; token exchanges by the one the
	/// cache was built with.
	pub fn new(api_url: Url, tokens: Arc<TokenCache>, http_client: ReqwestHttpClient) -> Self {
		Self { http_client, api_url, tokens, writes_enabled: false }
	}

	/// Switches the write path on or off.
	pub fn with_writes_enabled(mut self, enabled: bool) -> Self {
		self.writes_enabled = enabled;

		self
	}

	/// Whether [`Self::update_stock`] will contact the marketplace.
	pub fn writes_enabled(&self) -> bool {
		self.writes_enabled
	}

	/// Reads one offer, including its current stock.
	pub async fn offer(&self, offer_id: &str) -> Result<Offer> {
		obs::observe(Operation::MarketplaceOffer, "offer", async {
			let request = self.http_client.get(self.offer_url(offer_id));

			self.send(Operation::MarketplaceOffer, request).await
		})
		.await
	}

	/// Sets the stock amount of one offer.
	pub async fn update_stock(&self, offer_id: &str, amount: u32) -> Result<ProcessStatus> {
		if !self.writes_enabled {
			return Err(ConfigError::MarketplaceWritesDisabled.into());
		}

		obs::observe(Operation::MarketplaceStock, "update_stock", async {
			let request = self
				.http_client
				.put(format!("{}/stock", self.offer_url(offer_id)))
				.header(CONTENT_TYPE, RETAILER_MEDIA_TYPE)
				.body(stock_body(amount).to_string());

			self.send(Operation::MarketplaceStock, request).await
		})
		.await
	}

	async fn send<T>(&self, operation: Operation, request: RequestBuilder) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let token = self.tokens.get_token().await?;
		let request = request
			.header(AUTHORIZATION, token.value.bearer_header())
			.header(ACCEPT, RETAILER_MEDIA_TYPE);
		let raw = self
			.http_client
			.execute(request)
			.await
			.map_err(|e| UpstreamError::transport(operation, e))?;

		if !raw.is_success() {
			return Err(UpstreamError {
				operation,
				status: Some(raw.status_code()),
				body: raw.body,
			}
			.into());
		}

		Ok(raw.parse_json(operation)?)
	}

	fn offer_url(&self, offer_id: &str) -> String {
		format!("{}/offers/{offer_id}", self.api_url.as_str().trim_end_matches('/'))
	}
}

// `managedByRetailer: false` lets the marketplace correct the amount for orders still open.
fn stock_body(amount: u32) -> Value {
	json!({ "amount": amount, "managedByRetailer": false })
}
