// src/parser.rs
//! Byte cursor shared by the path parser and the lazy JSON scanner.
//!
//! The scanning half never builds values: it only finds where a JSON value
//! starts and ends, so callers can hand the span to `serde_json` later (or
//! never). Scalar tokens are not validated when skipped; only the
//! string/bracket structure has to be sound for a span to be found.

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    InvalidSyntax { pos: usize, msg: String },
    UnexpectedEof,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidSyntax { pos, msg } => write!(f, "{msg} at byte {pos}"),
            ParseError::UnexpectedEof => f.write_str("unexpected end of input"),
        }
    }
}

pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::InvalidSyntax {
            pos: self.i,
            msg: msg.into(),
        }
    }

    pub fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.i;
        while let Some(c) = self.peek() {
            if c == b'_' || c == b'-' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(self.err("identifier expected"));
        }
        Ok(self.s[start..self.i].to_string())
    }

    pub fn parse_int(&mut self) -> Result<i64, ParseError> {
        let start = self.i;
        if self.peek() == Some(b'-') {
            self.i += 1;
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start || &self.s[start..self.i] == "-" {
            return Err(self.err("expected integer"));
        }
        self.s[start..self.i]
            .parse::<i64>()
            .map_err(|_| self.err("bad integer"))
    }

    /// Single- or double-quoted string as written in a navigation path.
    pub fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        let quote = self.peek().ok_or(ParseError::UnexpectedEof)?;
        if quote != b'\'' && quote != b'"' {
            return Err(self.err("expected quoted string"));
        }
        self.i += 1;
        let mut out = String::new();
        let mut run = self.i;
        while let Some(c) = self.peek() {
            if c == quote {
                out.push_str(&self.s[run..self.i]);
                self.i += 1;
                return Ok(out);
            }
            if c == b'\\' {
                out.push_str(&self.s[run..self.i]);
                self.i += 1;
                let nc = self.peek().ok_or(ParseError::UnexpectedEof)?;
                self.i += 1;
                match nc {
                    b'n' => out.push('\n'),
                    b't' => out.push('\t'),
                    b'r' => out.push('\r'),
                    b'\\' => out.push('\\'),
                    b'"' => out.push('"'),
                    b'\'' => out.push('\''),
                    _ => {
                        // keep unknown escapes verbatim; back up so multi-byte chars stay whole
                        self.i -= 1;
                        out.push('\\');
                    }
                }
                run = self.i;
            } else {
                self.i += 1;
            }
        }
        Err(ParseError::UnexpectedEof)
    }

    pub fn expect(&mut self, c: u8) -> Result<(), ParseError> {
        if self.consume(c) {
            Ok(())
        } else if self.eof() {
            Err(ParseError::UnexpectedEof)
        } else {
            Err(self.err(format!("expected '{}'", c as char)))
        }
    }

    pub fn consume(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.i += 1;
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Skip over a JSON string, cursor on the opening quote.
    fn skip_string(&mut self) -> Result<(), ParseError> {
        self.expect(b'"')?;
        let bytes = self.s.as_bytes();
        while self.i < bytes.len() {
            match bytes[self.i] {
                b'"' => {
                    self.i += 1;
                    return Ok(());
                }
                b'\\' => self.i += 2,
                _ => self.i += 1,
            }
        }
        Err(ParseError::UnexpectedEof)
    }

    fn skip_container(&mut self) -> Result<(), ParseError> {
        let mut open: Vec<u8> = Vec::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof),
                Some(b'"') => self.skip_string()?,
                Some(c @ (b'{' | b'[')) => {
                    open.push(if c == b'{' { b'}' } else { b']' });
                    self.i += 1;
                }
                Some(c @ (b'}' | b']')) => {
                    if open.pop() != Some(c) {
                        return Err(self.err("mismatched bracket"));
                    }
                    self.i += 1;
                    if open.is_empty() {
                        return Ok(());
                    }
                }
                Some(_) => self.i += 1,
            }
        }
    }

    fn skip_scalar(&mut self) -> Result<(), ParseError> {
        let start = self.i;
        while let Some(c) = self.peek() {
            if matches!(c, b',' | b'}' | b']' | b':' | b' ' | b'\t' | b'\n' | b'\r') {
                break;
            }
            self.i += 1;
        }
        if self.i == start {
            return Err(if self.eof() {
                ParseError::UnexpectedEof
            } else {
                self.err("value expected")
            });
        }
        Ok(())
    }

    /// Skip leading whitespace and return the exact text of the next value.
    pub fn value_span(&mut self) -> Result<&'a str, ParseError> {
        self.skip_ws();
        let start = self.i;
        match self.peek() {
            None => return Err(ParseError::UnexpectedEof),
            Some(b'"') => self.skip_string()?,
            Some(b'{' | b'[') => self.skip_container()?,
            Some(_) => self.skip_scalar()?,
        }
        Ok(&self.s[start..self.i])
    }
}

/// True when the raw, still-quoted key `raw_key` spells `name`.
pub fn key_matches(raw_key: &str, name: &str) -> bool {
    if raw_key.len() < 2 {
        return false;
    }
    let inner = &raw_key[1..raw_key.len() - 1];
    if !inner.contains('\\') {
        return inner == name;
    }
    serde_json::from_str::<String>(raw_key)
        .map(|k| k == name)
        .unwrap_or(false)
}

/// Iterates `(raw key, raw value)` pairs of a JSON object span.
pub struct ObjectEntries<'a> {
    p: Parser<'a>,
    done: bool,
}

impl<'a> ObjectEntries<'a> {
    /// `None` when `raw` is not an object.
    pub fn new(raw: &'a str) -> Option<Self> {
        let mut p = Parser::new(raw);
        p.skip_ws();
        if !p.consume(b'{') {
            return None;
        }
        p.skip_ws();
        let done = p.consume(b'}');
        Some(Self { p, done })
    }

    fn next_entry(&mut self) -> Result<(&'a str, &'a str), ParseError> {
        self.p.skip_ws();
        if self.p.peek() != Some(b'"') {
            return Err(self.p.err("object key expected"));
        }
        let key = self.p.value_span()?;
        self.p.skip_ws();
        self.p.expect(b':')?;
        let value = self.p.value_span()?;
        self.p.skip_ws();
        if self.p.consume(b'}') {
            self.done = true;
        } else {
            self.p.expect(b',')?;
        }
        Ok((key, value))
    }
}

impl<'a> Iterator for ObjectEntries<'a> {
    type Item = Result<(&'a str, &'a str), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let entry = self.next_entry();
        if entry.is_err() {
            self.done = true;
        }
        Some(entry)
    }
}

/// Iterates the raw element spans of a JSON array span.
pub struct ArrayElements<'a> {
    p: Parser<'a>,
    done: bool,
}

impl<'a> ArrayElements<'a> {
    /// `None` when `raw` is not an array.
    pub fn new(raw: &'a str) -> Option<Self> {
        let mut p = Parser::new(raw);
        p.skip_ws();
        if !p.consume(b'[') {
            return None;
        }
        p.skip_ws();
        let done = p.consume(b']');
        Some(Self { p, done })
    }

    fn next_element(&mut self) -> Result<&'a str, ParseError> {
        let value = self.p.value_span()?;
        self.p.skip_ws();
        if self.p.consume(b']') {
            self.done = true;
        } else {
            self.p.expect(b',')?;
        }
        Ok(value)
    }
}

impl<'a> Iterator for ArrayElements<'a> {
    type Item = Result<&'a str, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let element = self.next_element();
        if element.is_err() {
            self.done = true;
        }
        Some(element)
    }
}

/// Value stored under `name` in the object span `raw`. A duplicated key
/// resolves to its last occurrence, as `serde_json` does when decoding.
pub fn field_span<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    field_span_counted(raw, name).0
}

/// [`field_span`] plus the number of entries stepped through.
pub fn field_span_counted<'a>(raw: &'a str, name: &str) -> (Option<&'a str>, usize) {
    let Some(entries) = ObjectEntries::new(raw) else {
        return (None, 0);
    };
    let mut found = None;
    let mut visited = 0;
    for (key, value) in entries.map_while(|entry| entry.ok()) {
        visited += 1;
        if key_matches(key, name) {
            found = Some(value);
        }
    }
    (found, visited)
}

/// Element `index` of the array span `raw`.
pub fn element_span(raw: &str, index: usize) -> Option<&str> {
    element_span_counted(raw, index).0
}

/// [`element_span`] plus the number of elements stepped through.
pub fn element_span_counted(raw: &str, index: usize) -> (Option<&str>, usize) {
    let Some(elements) = ArrayElements::new(raw) else {
        return (None, 0);
    };
    let mut visited = 0;
    for (i, element) in elements.map_while(|element| element.ok()).enumerate() {
        visited = i + 1;
        if i == index {
            return (Some(element), visited);
        }
    }
    (None, visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn value_span_stops_at_value_end() {
        let mut p = Parser::new(r#"  {"a":[1,"]",{"b":"}"}]} , 3"#);
        assert_eq!(p.value_span().unwrap(), r#"{"a":[1,"]",{"b":"}"}]}"#);
        p.skip_ws();
        assert!(p.consume(b','));
        assert_eq!(p.value_span().unwrap(), "3");
        assert!(p.eof());
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let mut p = Parser::new(r#""a\"b\\" tail"#);
        assert_eq!(p.value_span().unwrap(), r#""a\"b\\""#);
    }

    #[test]
    fn mismatched_brackets_are_rejected() {
        let mut p = Parser::new(r#"{"n":[1,}}"#);
        assert!(matches!(p.value_span(), Err(ParseError::InvalidSyntax { .. })));
    }

    #[test]
    fn unterminated_container_is_eof() {
        let mut p = Parser::new(r#"{"a":[1,2"#);
        assert_eq!(p.value_span(), Err(ParseError::UnexpectedEof));
    }

    #[test]
    fn object_entries_yield_raw_pairs() {
        let raw = r#"{ "name" : "Host", "value":"sp.ted.com" }"#;
        let pairs: Vec<_> = ObjectEntries::new(raw)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            pairs,
            vec![(r#""name""#, r#""Host""#), (r#""value""#, r#""sp.ted.com""#)]
        );
    }

    #[test]
    fn field_and_element_lookup() {
        let raw = r#"{"traits":{"asn":20001,"list":[true,null,"x"]}}"#;
        let traits = field_span(raw, "traits").unwrap();
        assert_eq!(field_span(traits, "asn"), Some("20001"));
        let list = field_span(traits, "list").unwrap();
        assert_eq!(element_span(list, 2), Some(r#""x""#));
        assert_eq!(element_span(list, 3), None);
        assert_eq!(field_span(raw, "missing"), None);
        assert_eq!(field_span("[1]", "traits"), None);
    }

    #[test]
    fn duplicate_keys_resolve_to_the_last_one() {
        let raw = r#"{"k":"first","other":1,"k":"last"}"#;
        assert_eq!(field_span(raw, "k"), Some(r#""last""#));
        assert_eq!(field_span_counted(raw, "k"), (Some(r#""last""#), 3));
    }

    #[test]
    fn counted_lookups_report_entries_stepped_through() {
        let raw = r#"{"big":[[1,2,3],{"x":[4,5]}],"a":{"b":1}}"#;
        assert_eq!(field_span_counted(raw, "a"), (Some(r#"{"b":1}"#), 2));
        assert_eq!(field_span_counted("[1]", "a"), (None, 0));
        let list = "[10,[20,21],30]";
        assert_eq!(element_span_counted(list, 2), (Some("30"), 3));
        assert_eq!(element_span_counted(list, 0), (Some("10"), 1));
        assert_eq!(element_span_counted(list, 5), (None, 3));
    }

    #[test]
    fn escaped_keys_match_decoded_name() {
        assert!(key_matches(r#""a\u0062c""#, "abc"));
        assert!(key_matches(r#""plain""#, "plain"));
        assert!(!key_matches(r#""plain""#, "plan"));
        assert!(key_matches(r#""""#, ""));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(ObjectEntries::new("{ }").unwrap().count(), 0);
        assert_eq!(ArrayElements::new("[ ]").unwrap().count(), 0);
    }

    #[test]
    fn quoted_path_strings() {
        let mut p = Parser::new(r#"'it\'s é'"#);
        assert_eq!(p.parse_quoted_string().unwrap(), "it's é");
        let mut p = Parser::new("-12]");
        assert_eq!(p.parse_int().unwrap(), -12);
        assert!(p.peek_str("]"));
    }
}
