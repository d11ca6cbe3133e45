//! Marketplace bearer value with redacting formatters.

// self
use crate::_prelude::*;

/// Bearer value issued by the marketplace identity provider.
///
/// `Debug` and `Display` print a placeholder; the raw value only leaves through [`Self::expose`]
/// and [`Self::bearer_header`].
#[derive(Clone, PartialEq, Eq)]
pub struct BearerSecret(String);
impl BearerSecret {
	/// Takes ownership of the raw value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw value, for comparisons and header construction only.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// `Authorization` header value.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl Debug for BearerSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BearerSecret(<redacted>)")
	}
}
impl Display for BearerSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
