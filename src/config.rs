//! Startup configuration and component wiring.
//!
//! The configuration is a JSON document with a `woocommerce` section (store URL and consumer
//! credentials) and a `bol` section (marketplace client credentials and endpoints), plus optional
//! `http` and `webhook_log` settings. Loading validates everything up front; a bad configuration
//! is fatal at startup and never surfaces later as a runtime failure.

// std
use std::{fs, time::Duration as StdDuration};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenCache},
	catalog::CatalogFetcher,
	error::ConfigError,
	http::ReqwestHttpClient,
	marketplace::MarketplaceClient,
	webhook::WebhookLog,
};

/// Default marketplace token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://login.bol.com/token";
/// Default marketplace Retailer API root.
pub const DEFAULT_API_URL: &str = "https://api.bol.com/retailer";
/// Default webhook log location.
pub const DEFAULT_WEBHOOK_LOG: &str = "webhook_log.jsonl";

/// Whole-process configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct SyncConfig {
	/// Storefront settings.
	pub woocommerce: StorefrontConfig,
	/// Marketplace settings.
	pub bol: MarketplaceConfig,
	/// Outbound HTTP settings.
	#[serde(default)]
	pub http: HttpConfig,
	/// Webhook log file.
	#[serde(default = "default_webhook_log")]
	pub webhook_log: PathBuf,
}
impl SyncConfig {
	/// Reads, parses, and validates a configuration file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

		Self::from_json_str(&raw)
	}

	/// Parses and validates a configuration document.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Malformed { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Checks every setting without building anything.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.woocommerce.validate()?;
		self.bol.validate()?;

		if self.http.timeout_secs == 0 {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(())
	}

	/// Shared HTTP client with the configured timeout applied to every request.
	pub fn http_client(&self) -> Result<ReqwestHttpClient, ConfigError> {
		ReqwestHttpClient::with_timeout(StdDuration::from_secs(self.http.timeout_secs))
	}

	/// Token cache for the marketplace identity provider.
	pub fn token_cache(&self, http_client: ReqwestHttpClient) -> Result<TokenCache, ConfigError> {
		Ok(TokenCache::new(
			parse_url("bol.token_url", &self.bol.token_url)?,
			ClientCredentials::new(&self.bol.client_id, &self.bol.client_secret),
			http_client,
		))
	}

	/// Storefront catalog fetcher.
	pub fn catalog(&self, http_client: ReqwestHttpClient) -> Result<CatalogFetcher, ConfigError> {
		let store = &self.woocommerce;
		let store_url = parse_url("woocommerce.url", &store.url)?;
		let credentials = ClientCredentials::new(&store.consumer_key, &store.consumer_secret);

		CatalogFetcher::new(&store_url, credentials, http_client)?.with_per_page(store.per_page)
	}

	/// Marketplace client sharing `tokens`, with the write path set from `bol.writes_enabled`.
	pub fn marketplace(
		&self,
		tokens: Arc<TokenCache>,
		http_client: ReqwestHttpClient,
	) -> Result<MarketplaceClient, ConfigError> {
		let api_url = parse_url("bol.api_url", &self.bol.api_url)?;

		Ok(MarketplaceClient::new(api_url, tokens, http_client)
			.with_writes_enabled(self.bol.writes_enabled))
	}

	/// Builds every component, sharing one HTTP client and one token cache.
	pub fn build(&self) -> Result<SyncComponents> {
		let http_client = self.http_client()?;
		let tokens = Arc::new(self.token_cache(http_client.clone())?);

		Ok(SyncComponents {
			catalog: self.catalog(http_client.clone())?,
			marketplace: self.marketplace(tokens.clone(), http_client)?,
			tokens,
			webhooks: WebhookLog::open(&self.webhook_log)?,
		})
	}
}

/// Storefront section.
#[derive(Clone, Deserialize)]
pub struct StorefrontConfig {
	/// Store root URL, e.g. `https://shop.example.com`.
	pub url: String,
	/// REST consumer key.
	pub consumer_key: String,
	/// REST consumer secret.
	pub consumer_secret: String,
	/// Page size for catalog scans.
	#[serde(default = "default_per_page")]
	pub per_page: u32,
}
impl StorefrontConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		parse_url("woocommerce.url", &self.url)?;
		require("woocommerce.consumer_key", &self.consumer_key)?;
		require("woocommerce.consumer_secret", &self.consumer_secret)?;

		if !(1..=CatalogFetcher::MAX_PER_PAGE).contains(&self.per_page) {
			return Err(ConfigError::InvalidPageSize {
				per_page: self.per_page,
				max: CatalogFetcher::MAX_PER_PAGE,
			});
		}

		Ok(())
	}
}
impl Debug for StorefrontConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StorefrontConfig")
			.field("url", &self.url)
			.field("consumer_key", &self.consumer_key)
			.field("consumer_secret", &"<redacted>")
			.field("per_page", &self.per_page)
			.finish()
	}
}

/// Marketplace section.
#[derive(Clone, Deserialize)]
pub struct MarketplaceConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// Token endpoint.
	#[serde(default = "default_token_url")]
	pub token_url: String,
	/// Retailer API root.
	#[serde(default = "default_api_url")]
	pub api_url: String,
	/// Enables stock pushes to the marketplace.
	#[serde(default)]
	pub writes_enabled: bool,
}
impl MarketplaceConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		require("bol.client_id", &self.client_id)?;
		require("bol.client_secret", &self.client_secret)?;
		parse_url("bol.token_url", &self.token_url)?;
		parse_url("bol.api_url", &self.api_url)?;

		Ok(())
	}
}
impl Debug for MarketplaceConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MarketplaceConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("token_url", &self.token_url)
			.field("api_url", &self.api_url)
			.field("writes_enabled", &self.writes_enabled)
			.finish()
	}
}

/// Outbound HTTP section.
#[derive(Clone, Debug, Deserialize)]
pub struct HttpConfig {
	/// Per-request timeout in seconds.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}
impl Default for HttpConfig {
	fn default() -> Self {
		Self { timeout_secs: default_timeout_secs() }
	}
}

/// Components built from one [`SyncConfig`].
#[derive(Debug)]
pub struct SyncComponents {
	/// Storefront catalog.
	pub catalog: CatalogFetcher,
	/// Marketplace write path.
	pub marketplace: MarketplaceClient,
	/// Token cache shared with the marketplace client.
	pub tokens: Arc<TokenCache>,
	/// Webhook log.
	pub webhooks: WebhookLog,
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::Missing { field }) } else { Ok(()) }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
	require(field, value)?;

	Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn default_per_page() -> u32 {
	CatalogFetcher::MAX_PER_PAGE
}

fn default_token_url() -> String {
	DEFAULT_TOKEN_URL.into()
}

fn default_api_url() -> String {
	DEFAULT_API_URL.into()
}

fn default_timeout_secs() -> u64 {
	ReqwestHttpClient::DEFAULT_TIMEOUT.as_secs()
}

fn default_webhook_log() -> PathBuf {
	DEFAULT_WEBHOOK_LOG.into()
}
