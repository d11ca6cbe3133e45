//! Typed view of a storefront product and the eligibility filter.

// crates.io
use serde::Deserializer;
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, obs};

/// Product kinds reported by the storefront.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
	/// Standalone sellable product.
	Simple,
	/// Parent grouping of variations; never sold directly.
	Variable,
	/// Concrete variant of a variable product.
	Variation,
	/// Bundle of other products.
	Grouped,
	/// Product sold elsewhere.
	External,
	/// Any kind this crate does not know about.
	#[serde(other)]
	Other,
}
impl ProductType {
	/// Returns `true` for kinds that represent a sellable, stock-tracked unit.
	pub const fn is_stock_unit(self) -> bool {
		matches!(self, Self::Simple | Self::Variation)
	}
}

/// Publication status reported by the storefront.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
	/// Publicly listed.
	Publish,
	/// Unpublished draft.
	Draft,
	/// Awaiting review.
	Pending,
	/// Visible to shop managers only.
	Private,
	/// Scheduled for later publication.
	Future,
	/// Any status this crate does not know about.
	#[serde(other)]
	Other,
}

/// Product as returned by the storefront.
///
/// Only the fields the filter and the stock sync depend on are typed; everything else is kept in
/// [`ProductRecord::extra`] and serialized back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
	/// Storefront identifier.
	pub id: u64,
	/// Product kind.
	#[serde(rename = "type")]
	pub kind: ProductType,
	/// Publication status.
	pub status: ProductStatus,
	/// Whether the stock number is maintained on this record.
	///
	/// Variations report `"parent"` when the parent owns the stock; that reads as `false`.
	#[serde(default, deserialize_with = "deserialize_manage_stock")]
	pub manage_stock: bool,
	/// Units in stock. Fractional values are truncated toward zero.
	#[serde(default, deserialize_with = "deserialize_quantity")]
	pub stock_quantity: Option<i64>,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Stock keeping unit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sku: Option<String>,
	/// Parent product for variations (`0` or absent otherwise).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<u64>,
	/// Remaining upstream fields, untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl ProductRecord {
	/// Returns `true` for published, stock-managed simple products and variations.
	pub fn is_eligible(&self) -> bool {
		self.kind.is_stock_unit() && self.manage_stock && self.status == ProductStatus::Publish
	}

	/// Reads the storefront's answer to a stock write for `product_id`.
	///
	/// Unlike listings, the answer may be partial: a missing `id` is taken from the request and a
	/// missing `type` or `status` reads as `other`.
	pub fn from_write_back(
		product_id: u64,
		mut fields: Map<String, Value>,
	) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		fields.entry("id").or_insert_with(|| product_id.into());
		fields.entry("type").or_insert_with(|| "other".into());
		fields.entry("status").or_insert_with(|| "other".into());

		serde_path_to_error::deserialize(Value::Object(fields))
	}
}

/// Keeps eligible records, preserving upstream order.
pub fn retain_eligible(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
	records.into_iter().filter(ProductRecord::is_eligible).collect()
}

fn deserialize_manage_stock<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(matches!(Option::<Value>::deserialize(deserializer)?, Some(Value::Bool(true))))
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Quantity {
		Integer(i64),
		Fractional(f64),
	}

	Ok(match Option::<Quantity>::deserialize(deserializer)? {
		None => None,
		Some(Quantity::Integer(value)) => Some(value),
		Some(Quantity::Fractional(raw)) => {
			// Saturating cast.
			let truncated = raw.trunc() as i64;

			if raw.fract() != 0. {
				obs::record_suspect_quantity(raw, truncated);
			}

			Some(truncated)
		},
	})
}
