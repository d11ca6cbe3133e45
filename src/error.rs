//! Crate-level error types shared by the token cache, catalog, marketplace, and webhook log.

// self
use crate::{_prelude::*, obs::Operation};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Marketplace credential exchange failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Catalog or marketplace call returned a non-success answer or never answered.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Upstream answered with a body that does not have the expected shape.
	#[error(transparent)]
	Parse(#[from] ParseError),
	/// Local configuration problem; fatal at startup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Webhook log could not be written or read.
	#[error(transparent)]
	Log(#[from] LogError),
}
impl Error {
	/// HTTP status reported by upstream, when the failure carries one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Auth(e) => e.status,
			Self::Upstream(e) => e.status,
			Self::Parse(e) => e.status,
			Self::Config(_) | Self::Log(_) => None,
		}
	}

	/// Raw upstream body (or transport message), when the failure carries one.
	pub fn body(&self) -> Option<&str> {
		match self {
			Self::Auth(e) => Some(&e.body),
			Self::Upstream(e) => Some(&e.body),
			Self::Parse(e) => Some(&e.body),
			Self::Config(_) | Self::Log(_) => None,
		}
	}
}

/// Token endpoint refused the client credentials, answered with something that is not a token,
/// or could not be reached.
#[derive(Debug, ThisError)]
#[error("Token endpoint rejected the credential exchange (status: {status:?}): {body}.")]
pub struct AuthError {
	/// HTTP status code; absent when the request never produced a response.
	pub status: Option<u16>,
	/// Response body verbatim, or the transport failure message.
	pub body: String,
}
impl AuthError {
	pub(crate) fn transport(err: ReqwestError) -> Self {
		Self { status: None, body: transport_message(&err) }
	}
}

/// Catalog or marketplace call failed.
#[derive(Debug, ThisError)]
#[error("The {operation} call failed upstream (status: {status:?}): {body}.")]
pub struct UpstreamError {
	/// Operation that issued the call.
	pub operation: Operation,
	/// HTTP status code; absent when the request never produced a response.
	pub status: Option<u16>,
	/// Response body verbatim, or the transport failure message.
	pub body: String,
}
impl UpstreamError {
	pub(crate) fn transport(operation: Operation, err: ReqwestError) -> Self {
		Self { operation, status: None, body: transport_message(&err) }
	}
}

/// Response body could not be converted into the expected typed record.
#[derive(Debug, ThisError)]
#[error("The {operation} response is malformed at `{path}`.", path = .source.path())]
pub struct ParseError {
	/// Operation that received the body.
	pub operation: Operation,
	/// HTTP status code of the response.
	pub status: Option<u16>,
	/// Response body verbatim.
	pub body: String,
	/// Structured parsing failure including the JSON path that failed.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

/// Configuration and request validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Configuration file could not be read.
	#[error("Configuration file {} could not be read.", .path.display())]
	Read {
		/// Path that was requested.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration document is not valid JSON of the expected layout.
	#[error("Configuration document is malformed.")]
	Malformed {
		/// Structured parsing failure including the offending key path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Required setting is missing or blank.
	#[error("Setting `{field}` is required.")]
	Missing {
		/// Dotted path of the setting.
		field: &'static str,
	},
	/// Configured URL cannot be parsed or joined.
	#[error("Setting `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Dotted path of the setting.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Page size outside the range the catalog accepts.
	#[error("Page size {per_page} is outside 1..={max}.")]
	InvalidPageSize {
		/// Requested page size.
		per_page: u32,
		/// Largest accepted page size.
		max: u32,
	},
	/// Page request names page zero.
	#[error("Page numbers start at 1.")]
	InvalidPageNumber,
	/// Outbound timeout must be positive.
	#[error("The HTTP timeout must be positive.")]
	NonPositiveTimeout,
	/// Marketplace write path is switched off.
	#[error("Marketplace writes are disabled; enable `bol.writes_enabled` to push stock.")]
	MarketplaceWritesDisabled,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Webhook log failures.
#[derive(Debug, ThisError)]
pub enum LogError {
	/// File-system failure while touching the log.
	#[error("Webhook log I/O failed for {}.", .path.display())]
	Io {
		/// Log file path.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},
	/// Event could not be serialized into a JSON line.
	#[error("Webhook event could not be serialized.")]
	Serialize(#[from] serde_json::Error),
}

fn transport_message(err: &ReqwestError) -> String {
	if err.is_timeout() {
		format!("request timed out: {err}")
	} else {
		err.to_string()
	}
}
