pub mod envelope;
pub mod errors;
pub mod eager;
pub mod group;
pub mod lazy;
pub mod navigate;
pub mod options;
pub mod path;
pub mod schema;
mod parser;

use eager::EagerContexts;
use envelope::EnrichedEvent;
use errors::Result;
use group::{group_fragments, DerivedContextMap, Scope};
use lazy::LazyContexts;
use options::ExtractOptions;

/// Entry point carrying [`ExtractOptions`]. Every call groups the input from
/// scratch; nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn group<'a>(&self, raw: &'a str, scope: Scope<'_>) -> Result<DerivedContextMap<'a>> {
        group_fragments(raw, scope, &self.options)
    }

    /// Decode only `family`.
    pub fn eager(&self, family: &str, raw: &str) -> Result<EagerContexts> {
        let map = self.group(raw, Scope::Family(family))?;
        Ok(EagerContexts::decode(map, &self.options))
    }

    /// Decode every family, for callers that read several of them.
    pub fn eager_all(&self, raw: &str) -> Result<EagerContexts> {
        let map = self.group(raw, Scope::All)?;
        Ok(EagerContexts::decode(map, &self.options))
    }

    pub fn lazy<'a>(&self, family: &str, raw: &'a str) -> Result<LazyContexts<'a>> {
        self.group(raw, Scope::Family(family)).map(LazyContexts::from_map)
    }

    pub fn lazy_all<'a>(&self, raw: &'a str) -> Result<LazyContexts<'a>> {
        self.group(raw, Scope::All).map(LazyContexts::from_map)
    }

    /// Lazy lookup of `family` in the configured field of `event`. An event
    /// without that field yields an empty result.
    pub fn lazy_from_event<'a>(
        &self,
        event: &EnrichedEvent<'a>,
        family: &str,
    ) -> Result<LazyContexts<'a>> {
        match event.field(&self.options.derived_contexts_field) {
            Some(raw) => self.lazy(family, raw),
            None => {
                tracing::debug!(
                    field = %self.options.derived_contexts_field,
                    "event has no derived contexts"
                );
                Ok(LazyContexts::default())
            }
        }
    }

    pub fn eager_from_event(
        &self,
        event: &EnrichedEvent<'_>,
        family: &str,
    ) -> Result<EagerContexts> {
        match event.field(&self.options.derived_contexts_field) {
            Some(raw) => self.eager(family, raw),
            None => Ok(EagerContexts::default()),
        }
    }
}

pub use eager::{get_derived_context_map, Decoded, EagerFamily};
pub use errors::ExtractError;
pub use lazy::{get_derived_context_map2, LazyFamily, LazyValue};
pub use navigate::{Kind, Navigate};
pub use path::{Path, Step};
pub use schema::{normalize_schema, SchemaKey};
