use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::errors::{ExtractError, Result};
use crate::parser::{ParseError, Parser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Key(String), // .foo or ['foo']
    Index(usize), // [0]
}

/// A navigation path through one fragment, e.g. `$.traits.connection_type`
/// or `$[3].value`. The leading `$` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
}

fn invalid(e: ParseError) -> ExtractError {
    ExtractError::InvalidPath(e.to_string())
}

impl Path {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let mut p = Parser::new(input);
        let mut steps = Vec::new();
        p.skip_ws();
        if !p.consume(b'$') && !p.eof() && p.peek() != Some(b'.') && p.peek() != Some(b'[') {
            // bare leading key: `traits.isp`
            steps.push(Step::Key(p.parse_identifier().map_err(invalid)?));
        }

        loop {
            p.skip_ws();
            if p.eof() {
                break;
            }
            if p.peek_str("..") {
                return Err(ExtractError::InvalidPath(
                    "recursive descent is not supported".into(),
                ));
            }
            if p.consume(b'.') {
                if p.peek() == Some(b'*') {
                    return Err(ExtractError::InvalidPath("wildcards are not supported".into()));
                }
                steps.push(Step::Key(p.parse_identifier().map_err(invalid)?));
                continue;
            }
            if p.consume(b'[') {
                p.skip_ws();
                let step = match p.peek() {
                    Some(b'\'' | b'"') => Step::Key(p.parse_quoted_string().map_err(invalid)?),
                    Some(b'*' | b'?' | b':') => {
                        return Err(ExtractError::InvalidPath(
                            "only keys and indices are supported".into(),
                        ))
                    }
                    _ => {
                        let idx = p.parse_int().map_err(invalid)?;
                        let idx = usize::try_from(idx).map_err(|_| {
                            ExtractError::InvalidPath(format!("negative index {idx}"))
                        })?;
                        Step::Index(idx)
                    }
                };
                p.skip_ws();
                p.expect(b']').map_err(invalid)?;
                steps.push(step);
                continue;
            }
            return Err(ExtractError::InvalidPath(format!(
                "unexpected input in `{input}`"
            )));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(Step::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(Step::Index(index));
        self
    }
}

impl FromStr for Path {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

fn is_plain(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|c| c == b'_' || c == b'-' || c.is_ascii_alphanumeric())
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(k) if is_plain(k) => write!(f, ".{k}"),
            Step::Key(k) => write!(f, "['{}']", k.replace('\\', "\\\\").replace('\'', "\\'")),
            Step::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.steps.iter().join(""))
    }
}
