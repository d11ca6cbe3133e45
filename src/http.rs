//! Transport primitives shared by the token cache, catalog, and marketplace clients.
//!
//! Every outbound call goes through [`ReqwestHttpClient::execute`], which buffers the whole body
//! and hands back a [`RawResponse`]. Callers decide what counts as success; the status and the raw
//! body stay available so failures can be surfaced verbatim.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::{RequestBuilder, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ParseError},
	obs::Operation,
};

/// Buffered HTTP response: status, headers, and body text.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body decoded as text (lossy for non-UTF-8 payloads).
	pub body: String,
}
impl RawResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Numeric status code.
	pub fn status_code(&self) -> u16 {
		self.status.as_u16()
	}

	/// Reads an integer header such as `X-WP-Total`; absent or unparsable values yield `None`.
	pub fn header_u64(&self, name: &str) -> Option<u64> {
		self.headers.get(name)?.to_str().ok()?.trim().parse().ok()
	}

	/// Deserializes the body, reporting the failing JSON path on mismatch.
	pub fn parse_json<T>(&self, operation: Operation) -> Result<T, ParseError>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_str(&self.body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ParseError {
			operation,
			status: Some(self.status_code()),
			body: self.body.clone(),
			source,
		})
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`Default`] and [`ReqwestHttpClient::with_timeout`] bound every request; a hung upstream turns
/// into an ordinary failure of the calling operation. [`ReqwestHttpClient::with_client`] keeps
/// whatever limits the supplied client carries.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Per-request timeout of [`ReqwestHttpClient::default`].
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests time out after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		if timeout.is_zero() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		let client = ReqwestClient::builder()
			.timeout(timeout)
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()?;

		Ok(Self(client))
	}

	/// Sends the request and buffers the full response.
	pub async fn execute(&self, request: RequestBuilder) -> Result<RawResponse, ReqwestError> {
		let response = request.send().await?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.text().await?;

		Ok(RawResponse { status, headers, body })
	}
}
impl Default for ReqwestHttpClient {
	fn default() -> Self {
		// Building only fails when the TLS backend cannot initialize, where `ReqwestClient::new`
		// panics just like reqwest's own `Default`.
		Self::with_timeout(Self::DEFAULT_TIMEOUT).unwrap_or_else(|_| Self(ReqwestClient::new()))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
