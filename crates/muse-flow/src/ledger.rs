//! Per-session response ledger.
//!
//! A single accumulating mapping from stable field keys to typed answers.
//! Writes are idempotent overwrites: the last write for a key wins, a
//! revisited field never appends. Two reserved keys carry system-assigned
//! timestamps and reject user writes.

use std::collections::BTreeMap;

use chrono::Utc;
use muse_core::errors::{ErrorInfo, MuseError};
use muse_core::ResponseValue;
use serde::{Deserialize, Serialize};

/// Reserved key stamped when the participant commits the demographics page.
pub const KEY_TIMESTAMP_START: &str = "timestamp_start";

/// Reserved key stamped when the survey completes.
pub const KEY_TIMESTAMP_END: &str = "timestamp_end";

/// Ledger key for a round's primary free-text response.
pub fn response_key(content_key: &str) -> String {
    format!("{content_key}_response")
}

/// Ledger key for an image caption response.
pub fn caption_key(asset: &str) -> String {
    format!("{asset}_caption")
}

/// Ledger key for the post-reveal "would you revise" follow-up.
pub fn would_revise_key(base: &str) -> String {
    format!("{base}_would_revise")
}

/// Ledger key for the revision collected when the follow-up is answered yes.
/// Distinct from the original response key by design.
pub fn revision_key(base: &str) -> String {
    format!("{base}_revision")
}

/// Ledger key for one of the per-image rating sliders.
pub fn slider_key(asset: &str, dimension: &str) -> String {
    format!("{asset}_{dimension}")
}

/// The accumulating per-session response record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ledger {
    entries: BTreeMap<String, ResponseValue>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one field. Overwrites any prior value under the same key.
    /// Rejects the reserved timestamp keys.
    pub fn write(
        &mut self,
        key: impl Into<String>,
        value: ResponseValue,
    ) -> Result<(), MuseError> {
        let key = key.into();
        if key == KEY_TIMESTAMP_START || key == KEY_TIMESTAMP_END {
            return Err(MuseError::Validation(
                ErrorInfo::new("reserved-key", "timestamps are system-assigned")
                    .with_context("key", key),
            ));
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Reads a field back.
    pub fn get(&self, key: &str) -> Option<&ResponseValue> {
        self.entries.get(key)
    }

    /// Whether the free-text field under `key` is missing or blank after
    /// trimming whitespace.
    pub fn is_blank(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(value) => value.is_blank_text(),
            None => true,
        }
    }

    /// Number of recorded fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no fields have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stamps the survey start timestamp (ISO-8601, UTC).
    pub fn stamp_start(&mut self) {
        self.entries.insert(
            KEY_TIMESTAMP_START.to_string(),
            ResponseValue::Text(Utc::now().to_rfc3339()),
        );
    }

    /// Stamps the survey end timestamp (ISO-8601, UTC).
    pub fn stamp_end(&mut self) {
        self.entries.insert(
            KEY_TIMESTAMP_END.to_string(),
            ResponseValue::Text(Utc::now().to_rfc3339()),
        );
    }

    /// Flattens the ledger to the record appended to the durable store.
    pub fn to_record(&self) -> ResponseRecord {
        ResponseRecord {
            fields: self
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_cell()))
                .collect(),
        }
    }
}

/// The flattened ledger handed to the durable store at survey completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResponseRecord {
    fields: BTreeMap<String, String>,
}

impl ResponseRecord {
    /// Builds a record directly from flattened fields.
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// The flattened field mapping.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}
