//! Append-only JSON-lines log of inbound stock-change webhooks.
//!
//! The routing layer appends each event before it calls into the catalog or the marketplace, so a
//! failing sync never loses the record of what was received.

// std
use std::{
	fs::{self, OpenOptions},
	io::{ErrorKind, Write},
};
// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::LogError,
	obs::{self, Operation, Outcome},
};

/// One received webhook.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockEvent {
	/// Arrival instant.
	#[serde(with = "time::serde::rfc3339")]
	pub received_at: OffsetDateTime,
	/// Product the event refers to, when the payload names one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub product_id: Option<u64>,
	/// Stock level carried by the payload, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stock_quantity: Option<i64>,
	/// Inbound body as received.
	pub payload: Value,
}
impl StockEvent {
	/// Wraps a payload received now, lifting out the product id and stock level when present.
	pub fn from_payload(payload: Value) -> Self {
		let product_id = ["id", "product_id"]
			.into_iter()
			.find_map(|key| payload.get(key).and_then(Value::as_u64));
		let stock_quantity = payload
			.get("stock_quantity")
			.and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|raw| raw.trunc() as i64)));

		Self { received_at: OffsetDateTime::now_utc(), product_id, stock_quantity, payload }
	}

	/// Overrides the arrival instant.
	pub fn with_received_at(mut self, instant: OffsetDateTime) -> Self {
		self.received_at = instant;

		self
	}
}

/// File-backed webhook log; one compact JSON object per line.
#[derive(Debug)]
pub struct WebhookLog {
	path: PathBuf,
	writer: Mutex<()>,
}
impl WebhookLog {
	/// Opens (or prepares) the log at `path` without truncating existing entries.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
		let path = path.into();

		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.map_err(|source| LogError::Io { path: parent.to_path_buf(), source })?;
		}

		Ok(Self { path, writer: Mutex::new(()) })
	}

	/// Location of the log file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Appends one event and syncs it to disk before returning.
	pub fn append(&self, event: &StockEvent) -> Result<(), LogError> {
		obs::record_outcome(Operation::WebhookAppend, Outcome::Attempt);

		let result = self.append_line(event);

		match &result {
			Ok(()) => obs::record_outcome(Operation::WebhookAppend, Outcome::Success),
			Err(_) => obs::record_outcome(Operation::WebhookAppend, Outcome::Failure),
		}

		result
	}

	/// Reads every well-formed entry in append order.
	///
	/// Blank lines are ignored and malformed lines are skipped with a warning. A log that was
	/// never written reads as empty.
	pub fn entries(&self) -> Result<Vec<StockEvent>, LogError> {
		let contents = match fs::read_to_string(&self.path) {
			Ok(contents) => contents,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
			Err(source) => return Err(LogError::Io { path: self.path.clone(), source }),
		};
		let mut events = Vec::new();

		for (idx, line) in contents.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}

			match serde_json::from_str(line) {
				Ok(event) => events.push(event),
				Err(_) => obs::record_skipped_log_line(&self.path, idx + 1),
			}
		}

		Ok(events)
	}

	fn append_line(&self, event: &StockEvent) -> Result<(), LogError> {
		let mut line = serde_json::to_string(event)?;

		line.push('\n');

		let _guard = self.writer.lock();
		let io_err = |source| LogError::Io { path: self.path.clone(), source };
		let mut file =
			OpenOptions::new().create(true).append(true).open(&self.path).map_err(io_err)?;

		file.write_all(line.as_bytes()).map_err(io_err)?;
		file.sync_data().map_err(io_err)
	}
}
