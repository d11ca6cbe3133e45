// self
use crate::{_prelude::*, obs::Operation};

/// Runs `fut` inside a `voorraad_sync.op` span tagged with `op` and `stage`.
pub(crate) async fn in_op_span<Fut>(op: Operation, stage: &'static str, fut: Fut) -> Fut::Output
where
	Fut: Future,
{
	#[cfg(feature = "tracing")]
	{
		use tracing::Instrument;

		fut.instrument(tracing::info_span!("voorraad_sync.op", op = op.as_str(), stage)).await
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, stage);

		fut.await
	}
}

pub(crate) fn record_failure(op: Operation, err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(op = op.as_str(), status = ?err.status(), "{err}");
	#[cfg(not(feature = "tracing"))]
	let _ = (op, err);
}

pub(crate) fn record_cache_hit(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%expires_at, "Reusing cached marketplace token.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_at;
}

pub(crate) fn record_token_stored(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%expires_at, "Stored fresh marketplace token.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_at;
}

pub(crate) fn record_page(page: u32, received: usize, eligible: usize) {
	#[cfg(feature = "tracing")]
	tracing::debug!(page, received, eligible, "Fetched catalog page.");
	#[cfg(not(feature = "tracing"))]
	let _ = (page, received, eligible);
}

pub(crate) fn record_suspect_quantity(raw: f64, truncated: i64) {
	#[cfg(feature = "tracing")]
	tracing::warn!(raw, truncated, "Fractional stock quantity truncated toward zero.");
	#[cfg(not(feature = "tracing"))]
	let _ = (raw, truncated);
}

pub(crate) fn record_skipped_log_line(path: &Path, line: usize) {
	#[cfg(feature = "tracing")]
	tracing::warn!(path = %path.display(), line, "Skipping malformed webhook log line.");
	#[cfg(not(feature = "tracing"))]
	let _ = (path, line);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn span_passes_output_through() {
		let value = in_op_span(Operation::CatalogScan, "test", async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn event_helpers_accept_any_input() {
		record_page(1, 100, 0);
		record_suspect_quantity(3.7, 3);
		record_cache_hit(OffsetDateTime::now_utc());
	}
}
