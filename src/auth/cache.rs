//! Client-credentials token cache for the marketplace identity provider.
//!
//! [`TokenCache`] owns exactly one slot. [`TokenCache::get_token`] returns the cached token while
//! it is usable and otherwise performs a `client_credentials` exchange. The check, the exchange,
//! and the store all run under one async mutex, so concurrent callers that find an expired token
//! wait for a single exchange instead of stampeding the token endpoint. A failed exchange leaves
//! the slot exactly as it was.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::{ClientId, ClientSecret, TokenResponse, basic::BasicTokenResponse};
use reqwest::header::{ACCEPT, AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::AuthError,
	http::ReqwestHttpClient,
	obs::{self, Operation},
};

/// Identifier and secret pair sent as one HTTP Basic credential.
///
/// Used for the marketplace OAuth client and for the storefront consumer key/secret alike.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
	/// Client identifier (or storefront consumer key).
	pub client_id: ClientId,
	/// Client secret (or storefront consumer secret); redacted in `Debug`.
	pub client_secret: ClientSecret,
}
impl ClientCredentials {
	/// Wraps a client identifier and secret.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: ClientId::new(client_id.into()),
			client_secret: ClientSecret::new(client_secret.into()),
		}
	}

	/// `Authorization` header value carrying `identifier:secret` as one Basic credential.
	pub fn basic_header(&self) -> String {
		let raw = format!("{}:{}", self.client_id.as_str(), self.client_secret.secret());

		format!("Basic {}", STANDARD.encode(raw))
	}
}

/// Process-wide cache for the marketplace bearer token.
///
/// Construct one at startup and share it behind an [`Arc`] with every component that writes to
/// the marketplace.
pub struct TokenCache {
	http_client: ReqwestHttpClient,
	token_url: Url,
	credentials: ClientCredentials,
	slot: AsyncMutex<Option<AccessToken>>,
}
impl TokenCache {
	/// Subtracted from the provider's TTL so a token never expires right after it is handed out.
	pub const SAFETY_MARGIN: Duration = Duration::seconds(30);

	/// Creates an empty cache for the provided token endpoint and credentials.
	///
	/// `http_client` bounds the exchange; pass one with a timeout, such as
	/// [`ReqwestHttpClient::default`].
	pub fn new(
		token_url: Url,
		credentials: ClientCredentials,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self { http_client, token_url, credentials, slot: AsyncMutex::new(None) }
	}

	/// Returns a usable token, exchanging credentials only when the slot is empty or expired.
	pub async fn get_token(&self) -> Result<AccessToken> {
		let mut slot = self.slot.lock().await;
		let now = OffsetDateTime::now_utc();

		if let Some(token) = slot.as_ref().filter(|token| token.is_usable_at(now)) {
			obs::record_cache_hit(token.expires_at);

			return Ok(token.clone());
		}

		let token = obs::observe(Operation::TokenExchange, "get_token", self.exchange()).await?;

		*slot = Some(token.clone());

		Ok(token)
	}

	/// Exchanges credentials even if the cached token is still usable.
	///
	/// On failure the previously cached token stays in place.
	pub async fn refresh(&self) -> Result<AccessToken> {
		let mut slot = self.slot.lock().await;
		let token = obs::observe(Operation::TokenExchange, "refresh", self.exchange()).await?;

		*slot = Some(token.clone());

		Ok(token)
	}

	/// Peeks at the cached token without issuing a request. The token may be expired.
	///
	/// Shares the lock with [`Self::get_token`]: while an exchange is in flight this waits for it,
	/// up to the HTTP client's timeout, and then observes its result.
	pub async fn cached(&self) -> Option<AccessToken> {
		self.slot.lock().await.clone()
	}

	async fn exchange(&self) -> Result<AccessToken> {
		let request = self
			.http_client
			.post(self.token_url.clone())
			.header(AUTHORIZATION, self.credentials.basic_header())
			.header(ACCEPT, "application/json")
			.form(&[("grant_type", "client_credentials")]);
		let raw = self.http_client.execute(request).await.map_err(AuthError::transport)?;
		let status = Some(raw.status_code());

		if !raw.is_success() {
			return Err(AuthError { status, body: raw.body }.into());
		}

		let Ok(response) = serde_json::from_str::<BasicTokenResponse>(&raw.body) else {
			return Err(AuthError { status, body: raw.body }.into());
		};
		let Some(ttl) = response.expires_in().and_then(|ttl| Duration::try_from(ttl).ok()) else {
			return Err(AuthError { status, body: raw.body }.into());
		};
		let expires_at = OffsetDateTime::now_utc() + ttl - Self::SAFETY_MARGIN;

		obs::record_token_stored(expires_at);

		Ok(AccessToken::new(response.access_token().secret().to_owned(), expires_at))
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("token_url", &self.token_url.as_str())
			.field("client_id", &self.credentials.client_id.as_str())
			.finish()
	}
}
