//! Schema-key normalization.
//!
//! `iglu:com.dbip/isp/jsonschema/1-0-0` becomes `contexts_com_dbip_isp_1`:
//! dots in the vendor turn into underscores, minor and patch versions are
//! dropped, and casing is passed through untouched.

use crate::errors::{ExtractError, Result};

const IGLU_PREFIX: &str = "iglu:";
pub const CONTEXTS_PREFIX: &str = "contexts";

/// The parsed parts of an `iglu:` schema URI, borrowed from the URI text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaKey<'s> {
    pub vendor: &'s str,
    pub name: &'s str,
    pub format: &'s str,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

fn malformed(uri: &str, reason: impl Into<String>) -> ExtractError {
    ExtractError::MalformedSchema {
        schema: uri.to_string(),
        reason: reason.into(),
    }
}

fn check_segment(uri: &str, what: &str, seg: &str, allow_dots: bool) -> Result<()> {
    if seg.is_empty() {
        return Err(malformed(uri, format!("empty {what}")));
    }
    let ok = seg
        .bytes()
        .all(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || (allow_dots && c == b'.'));
    if !ok {
        return Err(malformed(uri, format!("invalid character in {what}")));
    }
    Ok(())
}

impl<'s> SchemaKey<'s> {
    pub fn parse(uri: &'s str) -> Result<Self> {
        let rest = uri
            .strip_prefix(IGLU_PREFIX)
            .ok_or_else(|| malformed(uri, "missing `iglu:` prefix"))?;
        let segments: Vec<&str> = rest.split('/').collect();
        let [vendor, name, format, version] = segments[..] else {
            return Err(malformed(
                uri,
                format!("expected 4 `/`-separated segments, found {}", segments.len()),
            ));
        };
        check_segment(uri, "vendor", vendor, true)?;
        check_segment(uri, "name", name, false)?;
        check_segment(uri, "format", format, false)?;

        let parts: Vec<&str> = version.split('-').collect();
        let [major, minor, patch] = parts[..] else {
            return Err(malformed(uri, "version must be <major>-<minor>-<patch>"));
        };
        let num = |s: &str| -> Result<u32> {
            if s.is_empty() || !s.bytes().all(|c| c.is_ascii_digit()) {
                return Err(malformed(uri, format!("bad version component `{s}`")));
            }
            s.parse::<u32>()
                .map_err(|_| malformed(uri, format!("bad version component `{s}`")))
        };

        Ok(Self {
            vendor,
            name,
            format,
            major: num(major)?,
            minor: num(minor)?,
            patch: num(patch)?,
        })
    }

    pub fn key_with_prefix(&self, prefix: &str) -> String {
        format!(
            "{prefix}_{}_{}_{}",
            self.vendor.replace('.', "_"),
            self.name,
            self.major
        )
    }

    /// The family key used for entries of a contexts array.
    pub fn family_key(&self) -> String {
        self.key_with_prefix(CONTEXTS_PREFIX)
    }
}

/// Normalize a schema URI straight to its family key.
pub fn normalize_schema(uri: &str) -> Result<String> {
    SchemaKey::parse(uri).map(|k| k.family_key())
}
