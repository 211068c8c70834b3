//! Grouping of a derived-contexts array into families.

use std::collections::BTreeMap;

use crate::errors::{ExtractError, Result};
use crate::options::ExtractOptions;
use crate::parser::{field_span, key_matches, ArrayElements, ObjectEntries, Parser};
use crate::schema::normalize_schema;

/// Which families a grouping pass keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'k> {
    All,
    Family(&'k str),
}

impl Scope<'_> {
    fn admits(&self, key: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::Family(wanted) => *wanted == key,
        }
    }
}

/// One `{schema, data}` element, with `data` still as raw JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment<'a> {
    /// Position in the source array.
    pub index: usize,
    pub schema: String,
    pub data: &'a str,
}

/// A fragment that was dropped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub index: usize,
    pub error: ExtractError,
}

/// Family key -> fragments of that family in source order.
#[derive(Debug, Clone, Default)]
pub struct DerivedContextMap<'a> {
    families: BTreeMap<String, Vec<Fragment<'a>>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> DerivedContextMap<'a> {
    /// Group every family with default options.
    pub fn parse(raw: &'a str) -> Result<Self> {
        group_fragments(raw, Scope::All, &ExtractOptions::default())
    }

    pub fn family(&self, key: &str) -> &[Fragment<'a>] {
        self.families.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Fragment<'a>])> {
        self.families
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
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

    pub(crate) fn into_parts(self) -> (BTreeMap<String, Vec<Fragment<'a>>>, Vec<Diagnostic>) {
        (self.families, self.diagnostics)
    }
}

/// Locate the fragment array: either `raw` itself or the `data` member of a
/// self-describing contexts wrapper. The top-level value has to span the whole
/// input apart from surrounding whitespace.
fn fragment_array<'a>(raw: &'a str, opts: &ExtractOptions) -> Result<&'a str> {
    let mut p = Parser::new(raw);
    let top = p
        .value_span()
        .map_err(|e| ExtractError::InvalidInput(format!("top-level value: {e}")))?;
    p.skip_ws();
    if !p.eof() {
        return Err(ExtractError::InvalidInput(
            "trailing characters after the top-level value".into(),
        ));
    }
    match top.as_bytes().first() {
        Some(b'[') => Ok(top),
        Some(b'{') if opts.unwrap_contexts_envelope => {
            let data = field_span(top, "data").ok_or_else(|| {
                ExtractError::InvalidInput("contexts wrapper has no `data` array".into())
            })?;
            if data.starts_with('[') {
                Ok(data)
            } else {
                Err(ExtractError::InvalidInput(
                    "contexts wrapper `data` is not an array".into(),
                ))
            }
        }
        _ => Err(ExtractError::InvalidInput(
            "expected a JSON array of context fragments".into(),
        )),
    }
}

fn malformed(index: usize, reason: &str) -> ExtractError {
    ExtractError::MalformedFragment {
        index,
        reason: reason.to_string(),
    }
}

/// Pull `schema` and `data` out of one array element.
fn split_fragment(index: usize, element: &str) -> Result<(String, &str)> {
    let entries = ObjectEntries::new(element).ok_or_else(|| malformed(index, "not an object"))?;
    let mut schema = None;
    let mut data = None;
    for entry in entries {
        let (key, value) = entry.map_err(|e| malformed(index, &e.to_string()))?;
        if key_matches(key, "schema") {
            schema = Some(value);
        } else if key_matches(key, "data") {
            data = Some(value);
        }
    }
    let schema = schema
        .and_then(|s| serde_json::from_str::<String>(s).ok())
        .ok_or_else(|| malformed(index, "missing string `schema`"))?;
    let data = data.ok_or_else(|| malformed(index, "missing `data`"))?;
    Ok((schema, data))
}

/// Group the fragments in `raw` by family key.
///
/// Only a top-level input that is not a (terminated) fragment array fails
/// the call. A fragment that cannot be read or whose schema does not
/// normalize is skipped, logged and, if enabled, recorded as a diagnostic.
pub fn group_fragments<'a>(
    raw: &'a str,
    scope: Scope<'_>,
    opts: &ExtractOptions,
) -> Result<DerivedContextMap<'a>> {
    let array = fragment_array(raw, opts)?;
    let elements = ArrayElements::new(array)
        .ok_or_else(|| ExtractError::InvalidInput("expected a JSON array".into()))?;

    let mut map = DerivedContextMap::default();
    let skip = |map: &mut DerivedContextMap<'a>, index: usize, error: ExtractError| {
        tracing::debug!(index, %error, "skipping derived context fragment");
        if opts.collect_diagnostics {
            map.diagnostics.push(Diagnostic { index, error });
        }
    };

    for (index, element) in elements.enumerate() {
        let element = element
            .map_err(|e| ExtractError::InvalidInput(format!("fragment array: {e}")))?;
        let (schema, data) = match split_fragment(index, element) {
            Ok(parts) => parts,
            Err(error) => {
                skip(&mut map, index, error);
                continue;
            }
        };
        let key = match normalize_schema(&schema) {
            Ok(key) => key,
            Err(error) => {
                skip(&mut map, index, error);
                continue;
            }
        };
        if !scope.admits(&key) {
            continue;
        }
        map.families
            .entry(key)
            .or_default()
            .push(Fragment { index, schema, data });
    }

    tracing::trace!(
        families = map.families.len(),
        skipped = map.diagnostics.len(),
        "grouped derived contexts"
    );
    Ok(map)
}
