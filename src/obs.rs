//! Optional observability helpers for cache, catalog, and marketplace operations.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps every operation in a `voorraad_sync.op` span carrying the `op` and
//!   `stage` fields, and emits the debug/warn events defined in this module.
//! - `metrics` increments the `voorraad_sync_operation_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Upstream-facing operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Client-credentials exchange against the marketplace identity provider.
	TokenExchange,
	/// Exhaustive catalog scan.
	CatalogScan,
	/// Single catalog page request.
	CatalogPage,
	/// Storefront stock write-back.
	StockUpdate,
	/// Marketplace offer read.
	MarketplaceOffer,
	/// Marketplace offer stock update.
	MarketplaceStock,
	/// Webhook log append.
	WebhookAppend,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::TokenExchange => "token_exchange",
			Operation::CatalogScan => "catalog_scan",
			Operation::CatalogPage => "catalog_page",
			Operation::StockUpdate => "stock_update",
			Operation::MarketplaceOffer => "marketplace_offer",
			Operation::MarketplaceStock => "marketplace_stock",
			Operation::WebhookAppend => "webhook_append",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the attempt, runs `fut` inside the operation span, then records success or failure.
pub(crate) async fn observe<T, Fut>(op: Operation, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	record_outcome(op, Outcome::Attempt);

	let result = in_op_span(op, stage, fut).await;

	match &result {
		Ok(_) => record_outcome(op, Outcome::Success),
		Err(e) => {
			record_failure(op, e);
			record_outcome(op, Outcome::Failure);
		},
	}

	result
}
