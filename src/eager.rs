//! Eager accessor: every fragment of the requested families is fully decoded
//! into a `serde_json::Value` tree up front.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::{ExtractError, Result};
use crate::group::{group_fragments, DerivedContextMap, Diagnostic, Scope};
use crate::navigate::{Kind, Navigate};
use crate::options::ExtractOptions;
use crate::path::{Path, Step};

/// Decoded families, keyed by family key.
#[derive(Debug, Clone, Default)]
pub struct EagerContexts {
    families: BTreeMap<String, Vec<Value>>,
    diagnostics: Vec<Diagnostic>,
}

impl EagerContexts {
    /// Decode every fragment of an already grouped map. A fragment whose
    /// `data` is not valid JSON is left out of its family.
    pub fn decode(map: DerivedContextMap<'_>, opts: &ExtractOptions) -> Self {
        let (grouped, mut diagnostics) = map.into_parts();
        let mut families = BTreeMap::new();
        for (key, fragments) in grouped {
            let mut values = Vec::with_capacity(fragments.len());
            for fragment in fragments {
                match serde_json::from_str::<Value>(fragment.data) {
                    Ok(v) => values.push(v),
                    Err(e) => {
                        let error = ExtractError::MalformedFragment {
                            index: fragment.index,
                            reason: format!("invalid `data`: {e}"),
                        };
                        tracing::debug!(
                            index = fragment.index,
                            %error,
                            "dropping undecodable fragment"
                        );
                        if opts.collect_diagnostics {
                            diagnostics.push(Diagnostic {
                                index: fragment.index,
                                error,
                            });
                        }
                    }
                }
            }
            if !values.is_empty() {
                families.insert(key, values);
            }
        }
        diagnostics.sort_by_key(|d| d.index);
        Self {
            families,
            diagnostics,
        }
    }

    /// Group and decode every family in `raw`.
    pub fn decode_all(raw: &str) -> Result<Self> {
        let opts = ExtractOptions::default();
        let map = group_fragments(raw, Scope::All, &opts)?;
        Ok(Self::decode(map, &opts))
    }

    pub fn family(&self, key: &str) -> EagerFamily<'_> {
        EagerFamily {
            values: self.families.get(key).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// First occurrence of `key` as an object: the `output[key]["field"]`
    /// shape of single-occurrence families.
    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.families.get(key)?.first()?.as_object()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of JSON nodes materialized across all families.
    pub fn decoded_nodes(&self) -> usize {
        self.families.values().flatten().map(count_nodes).sum()
    }

    pub fn into_families(self) -> BTreeMap<String, Vec<Value>> {
        self.families
    }
}

fn count_nodes(v: &Value) -> usize {
    1 + match v {
        Value::Array(a) => a.iter().map(count_nodes).sum(),
        Value::Object(m) => m.values().map(count_nodes).sum(),
        _ => 0,
    }
}

/// Decode only the fragments of `family` found in `raw`.
pub fn get_derived_context_map(family: &str, raw: &str) -> Result<EagerContexts> {
    let opts = ExtractOptions::default();
    let map = group_fragments(raw, Scope::Family(family), &opts)?;
    Ok(EagerContexts::decode(map, &opts))
}

/// The decoded occurrences of one family, in source order.
#[derive(Debug, Clone, Copy)]
pub struct EagerFamily<'v> {
    values: &'v [Value],
}

impl<'v> EagerFamily<'v> {
    pub fn at(&self, index: usize) -> Decoded<'v> {
        Decoded(self.values.get(index))
    }

    /// Field of the first occurrence.
    pub fn get(&self, field: &str) -> Decoded<'v> {
        self.at(0).get(field)
    }

    /// A leading index selects the occurrence; otherwise the path starts in
    /// the first one.
    pub fn path(&self, path: &Path) -> Decoded<'v> {
        match path.steps().split_first() {
            Some((Step::Index(i), rest)) => rest.iter().fold(self.at(*i), |n, s| n.step(s)),
            _ => self.at(0).path(path),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Decoded<'v>> + 'v {
        let values = self.values;
        values.iter().map(|v| Decoded(Some(v)))
    }
}

/// A position inside a decoded tree; `None` is the missing sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded<'v>(Option<&'v Value>);

impl<'v> Decoded<'v> {
    pub fn new(value: &'v Value) -> Self {
        Decoded(Some(value))
    }

    pub fn value(&self) -> Option<&'v Value> {
        self.0
    }
}

impl Navigate for Decoded<'_> {
    fn get(&self, field: &str) -> Self {
        Decoded(self.0.and_then(|v| v.as_object()).and_then(|m| m.get(field)))
    }

    fn at(&self, index: usize) -> Self {
        Decoded(self.0.and_then(|v| v.as_array()).and_then(|a| a.get(index)))
    }

    fn kind(&self) -> Kind {
        match self.0 {
            None => Kind::Missing,
            Some(Value::Null) => Kind::Null,
            Some(Value::Bool(_)) => Kind::Bool,
            Some(Value::Number(_)) => Kind::Number,
            Some(Value::String(_)) => Kind::String,
            Some(Value::Array(_)) => Kind::Array,
            Some(Value::Object(_)) => Kind::Object,
        }
    }

    fn string(&self) -> String {
        self.0
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_default()
    }

    fn float64(&self) -> f64 {
        self.0.and_then(Value::as_f64).unwrap_or(0.0)
    }

    fn boolean(&self) -> bool {
        self.0.and_then(Value::as_bool).unwrap_or(false)
    }
}
