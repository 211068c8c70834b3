//! Total navigation over JSON values.
//!
//! Both accessors hand out handles implementing [`Navigate`]. Navigation never
//! fails: stepping into an absent field or index, or through a value of the
//! wrong shape, yields the missing sentinel, and every further step keeps
//! yielding it. The coercing terminals map missing values and type mismatches
//! to `""`, `0.0` and `false`; the `try_*` variants report them instead.

use crate::errors::{ExtractError, Result};
use crate::path::{Path, Step};

/// Shape of the value a handle currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Missing,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Missing => "missing",
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

pub trait Navigate: Sized + Clone {
    fn get(&self, field: &str) -> Self;
    fn at(&self, index: usize) -> Self;
    fn kind(&self) -> Kind;

    /// String value, or `""`.
    fn string(&self) -> String;
    /// Numeric value, or `0.0`.
    fn float64(&self) -> f64;
    /// Boolean value, or `false`.
    fn boolean(&self) -> bool;

    fn exists(&self) -> bool {
        self.kind() != Kind::Missing
    }

    fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    fn step(&self, step: &Step) -> Self {
        match step {
            Step::Key(k) => self.get(k),
            Step::Index(i) => self.at(*i),
        }
    }

    fn path(&self, path: &Path) -> Self {
        path.steps()
            .iter()
            .fold(self.clone(), |node, step| node.step(step))
    }

    fn try_string(&self) -> Result<String> {
        self.expect_kind(Kind::String).map(|_| self.string())
    }

    fn try_float64(&self) -> Result<f64> {
        self.expect_kind(Kind::Number).map(|_| self.float64())
    }

    fn try_boolean(&self) -> Result<bool> {
        self.expect_kind(Kind::Bool).map(|_| self.boolean())
    }

    fn expect_kind(&self, expected: Kind) -> Result<()> {
        match self.kind() {
            Kind::Missing => Err(ExtractError::MissingField(format!(
                "no {} at navigated path",
                expected.name()
            ))),
            k if k == expected => Ok(()),
            found => Err(ExtractError::TypeMismatch {
                expected: expected.name(),
                found: found.name(),
            }),
        }
    }
}
