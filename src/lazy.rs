//! Lazy accessor: fragments stay as borrowed spans of the source text and are
//! only scanned along the path a caller navigates.
//!
//! Sibling fields are skipped bracket-by-bracket without building values,
//! sibling occurrences of a family are never touched, and a terminal
//! extractor decodes exactly one scalar.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::{ExtractError, Result};
use crate::group::{group_fragments, DerivedContextMap, Diagnostic, Scope};
use crate::navigate::{Kind, Navigate};
use crate::options::ExtractOptions;
use crate::parser::{element_span, element_span_counted, field_span, field_span_counted};
use crate::path::{Path, Step};

/// Grouped fragments as lazy handles, keyed by family key.
#[derive(Debug, Clone, Default)]
pub struct LazyContexts<'a> {
    families: BTreeMap<String, Vec<LazyValue<'a>>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> LazyContexts<'a> {
    pub fn from_map(map: DerivedContextMap<'a>) -> Self {
        let (grouped, diagnostics) = map.into_parts();
        let families = grouped
            .into_iter()
            .map(|(key, fragments)| {
                let handles: Vec<LazyValue<'a>> = fragments
                    .iter()
                    .map(|f| LazyValue::from_span(f.data))
                    .collect();
                (key, handles)
            })
            .collect();
        Self {
            families,
            diagnostics,
        }
    }

    /// Group every family in `raw`.
    pub fn all(raw: &'a str) -> Result<Self> {
        let map = group_fragments(raw, Scope::All, &ExtractOptions::default())?;
        Ok(Self::from_map(map))
    }

    pub fn family(&self, key: &str) -> LazyFamily<'_, 'a> {
        LazyFamily {
            fragments: self.families.get(key).map(Vec::as_slice).unwrap_or(&[]),
        }
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
}

/// Lazy handles for the fragments of `family` found in `raw`.
pub fn get_derived_context_map2<'a>(family: &str, raw: &'a str) -> Result<LazyContexts<'a>> {
    let map = group_fragments(raw, Scope::Family(family), &ExtractOptions::default())?;
    Ok(LazyContexts::from_map(map))
}

/// The occurrences of one family, in source order.
#[derive(Debug, Clone, Copy)]
pub struct LazyFamily<'c, 'a> {
    fragments: &'c [LazyValue<'a>],
}

impl<'c, 'a> LazyFamily<'c, 'a> {
    pub fn at(&self, index: usize) -> LazyValue<'a> {
        self.fragments.get(index).copied().unwrap_or(LazyValue::MISSING)
    }

    /// Field of the first occurrence.
    pub fn get(&self, field: &str) -> LazyValue<'a> {
        self.at(0).get(field)
    }

    /// A leading index selects the occurrence; otherwise the path starts in
    /// the first one.
    pub fn path(&self, path: &Path) -> LazyValue<'a> {
        match path.steps().split_first() {
            Some((Step::Index(i), rest)) => rest.iter().fold(self.at(*i), |n, s| n.step(s)),
            _ => self.at(0).path(path),
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = LazyValue<'a>> + 'c {
        let fragments = self.fragments;
        fragments.iter().copied()
    }
}

/// A handle on a span of raw JSON text; `None` is the missing sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyValue<'a> {
    raw: Option<&'a str>,
}

impl<'a> LazyValue<'a> {
    pub const MISSING: Self = Self { raw: None };

    /// Wrap JSON text. Surrounding whitespace is ignored; nothing is
    /// validated until the value is navigated or extracted.
    pub fn parse(text: &'a str) -> Self {
        let trimmed = text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'));
        if trimmed.is_empty() {
            Self::MISSING
        } else {
            Self::from_span(trimmed)
        }
    }

    fn from_span(raw: &'a str) -> Self {
        Self { raw: Some(raw) }
    }

    /// The borrowed JSON text this handle points at.
    pub fn raw(&self) -> Option<&'a str> {
        self.raw
    }

    /// String value without copying when it contains no escapes. Strings
    /// that `serde_json` would reject, such as ones with raw control
    /// characters, yield `None`.
    pub fn str(&self) -> Option<Cow<'a, str>> {
        let raw = self.raw?;
        let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
        if !inner.bytes().any(|b| b == b'\\' || b < 0x20) {
            return Some(Cow::Borrowed(inner));
        }
        serde_json::from_str::<String>(raw).ok().map(Cow::Owned)
    }

    /// Walk `path` like [`Navigate::path`] and also return how many object
    /// entries and array elements were stepped through. A skipped sibling
    /// counts once however large it is.
    pub fn path_visits(&self, path: &Path) -> (Self, usize) {
        path.steps()
            .iter()
            .fold((*self, 0), |(node, visits), step| {
                let (raw, seen) = match (node.raw, step) {
                    (None, _) => (None, 0),
                    (Some(raw), Step::Key(k)) => field_span_counted(raw, k),
                    (Some(raw), Step::Index(i)) => element_span_counted(raw, *i),
                };
                (Self { raw }, visits + seen)
            })
    }

    /// Materialize the span. Used for printing and comparison with the eager
    /// path; `None` for the missing sentinel.
    pub fn decode(&self) -> Option<Result<Value>> {
        self.raw.map(|raw| {
            serde_json::from_str(raw).map_err(|e| ExtractError::InvalidInput(e.to_string()))
        })
    }
}

impl Navigate for LazyValue<'_> {
    fn get(&self, field: &str) -> Self {
        Self {
            raw: self.raw.and_then(|raw| field_span(raw, field)),
        }
    }

    fn at(&self, index: usize) -> Self {
        Self {
            raw: self.raw.and_then(|raw| element_span(raw, index)),
        }
    }

    fn kind(&self) -> Kind {
        match self.raw.and_then(|raw| raw.as_bytes().first().copied()) {
            None => Kind::Missing,
            Some(b'{') => Kind::Object,
            Some(b'[') => Kind::Array,
            Some(b'"') => Kind::String,
            Some(b't' | b'f') => Kind::Bool,
            Some(b'n') => Kind::Null,
            Some(_) => Kind::Number,
        }
    }

    fn string(&self) -> String {
        self.str().map(Cow::into_owned).unwrap_or_default()
    }

    fn float64(&self) -> f64 {
        match self.kind() {
            Kind::Number => self
                .raw
                .and_then(|raw| serde_json::from_str::<f64>(raw).ok())
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn boolean(&self) -> bool {
        self.raw == Some("true")
    }
}
