//! Decoding of the enriched-event envelope that carries derived contexts.
//!
//! An event arrives as a base64 string wrapping one tab-separated line with a
//! fixed column layout. Only the columns needed to find the JSON-bearing
//! fields (plus a few identifiers useful in logs) are named here.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::{ExtractError, Result};

pub const ENRICHED_EVENT_COLUMNS: usize = 131;

const NAMED_COLUMNS: &[(&str, usize)] = &[
    ("app_id", 0),
    ("platform", 1),
    ("event", 5),
    ("event_id", 6),
    ("contexts", 52),
    ("unstruct_event", 58),
    ("derived_contexts", 122),
];

const JSON_COLUMNS: &[&str] = &["contexts", "unstruct_event", "derived_contexts"];

pub fn decode_base64(payload: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ExtractError::Envelope(format!("base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ExtractError::Envelope(format!("utf-8: {e}")))
}

/// One enriched event split into its columns, borrowing the TSV line.
#[derive(Debug, Clone)]
pub struct EnrichedEvent<'a> {
    columns: Vec<&'a str>,
}

impl<'a> EnrichedEvent<'a> {
    pub fn from_tsv(line: &'a str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() != ENRICHED_EVENT_COLUMNS {
            return Err(ExtractError::Envelope(format!(
                "expected {ENRICHED_EVENT_COLUMNS} columns, found {}",
                columns.len()
            )));
        }
        Ok(Self { columns })
    }

    /// Raw column text; `None` when out of range or empty.
    pub fn column(&self, index: usize) -> Option<&'a str> {
        self.columns.get(index).copied().filter(|c| !c.is_empty())
    }

    pub fn field(&self, name: &str) -> Option<&'a str> {
        NAMED_COLUMNS
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, idx)| self.column(*idx))
    }

    /// The JSON-bearing fields present on this event.
    pub fn json_fields(&self) -> BTreeMap<&'static str, &'a str> {
        JSON_COLUMNS
            .iter()
            .filter_map(|name| self.field(name).map(|raw| (*name, raw)))
            .collect()
    }
}
