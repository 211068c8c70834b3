use serde::{Deserialize, Serialize};

/// Extraction knobs carried by [`crate::Extractor`].
///
/// Deserializes from partial JSON; absent fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Record skipped fragments in the result's diagnostics list.
    pub collect_diagnostics: bool,
    /// Accept the self-describing `{"schema": ..., "data": [...]}` contexts
    /// wrapper in addition to a bare fragment array.
    pub unwrap_contexts_envelope: bool,
    /// Event field read by the event-level entry points.
    pub derived_contexts_field: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            collect_diagnostics: true,
            unwrap_contexts_envelope: true,
            derived_contexts_field: "derived_contexts".to_string(),
        }
    }
}

impl ExtractOptions {
    pub fn with_diagnostics(mut self, on: bool) -> Self {
        self.collect_diagnostics = on;
        self
    }

    pub fn with_envelope(mut self, on: bool) -> Self {
        self.unwrap_contexts_envelope = on;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.derived_contexts_field = field.into();
        self
    }
}
