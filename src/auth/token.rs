//! Access token issued by the marketplace identity provider.

// self
use crate::{_prelude::*, auth::BearerSecret};

/// Bearer token plus the instant after which it must not be handed out.
///
/// Value and expiry travel together; the cache swaps whole tokens, never one field.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	/// Opaque bearer value.
	pub value: BearerSecret,
	/// Expiry instant, already shortened by the cache's safety margin.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token that stops being usable at `expires_at`.
	pub fn new(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { value: BearerSecret::new(value), expires_at }
	}

	/// Returns `true` while `instant` is strictly before the expiry.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}

	/// Checks usability against the current UTC clock.
	pub fn is_usable(&self) -> bool {
		self.is_usable_at(OffsetDateTime::now_utc())
	}

	/// Time left before expiry at `instant`; zero once expired.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
