//! Attribute path parsing for patch operations.
//!
//! Implements the RFC 7644 Section 3.5.2 attribute path grammar, restricted
//! to single-equality value filters:
//!
//! ```text
//! PATH      = [ schema-urn ":" ] attrName [ "[" valFilter "]" ] [ "." subAttr ]
//! valFilter = attrName SP "eq" SP literal
//! literal   = quoted-string / number / "true" / "false" / "null"
//! ```
//!
//! Parsing is a single forward pass with no lookahead beyond one character.
//! Names are kept verbatim; case-folding against the schema happens during
//! resolution. Whitespace around filter tokens is tolerated because several
//! identity providers emit it.

use crate::error::{PatchError, PatchResult};
use serde_json::Value;
use std::fmt;

/// RFC 7644 comparators and keywords this engine recognizes but does not
/// support inside value filters.
const KNOWN_OPERATORS: &[&str] = &[
    "ne", "co", "sw", "ew", "gt", "ge", "lt", "le", "pr", "and", "or", "not",
];

/// Comparison operator inside a value filter.
///
/// Only equality is supported. The other RFC comparators are recognized as
/// tokens so they can be rejected with a precise error instead of a generic
/// syntax failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equality comparison
    Eq,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Eq => f.write_str("eq"),
        }
    }
}

/// A parsed value filter, e.g. `type eq "work"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFilter {
    /// Sub-attribute compared inside each element
    pub attribute: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Literal to compare against
    pub value: Value,
}

impl ValueFilter {
    /// Whether one element of a multi-valued attribute satisfies this
    /// filter.
    ///
    /// String comparison honors the compared sub-attribute's `caseExact`
    /// characteristic; other literal types compare by JSON equality.
    /// Elements that are not objects, or that lack the compared
    /// sub-attribute, never match.
    pub fn matches(&self, element: &Value, case_exact: bool) -> bool {
        let Some(obj) = element.as_object() else {
            return false;
        };
        let Some(actual) = obj
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(&self.attribute))
            .map(|(_, value)| value)
        else {
            return false;
        };

        match (actual, &self.value) {
            (Value::String(a), Value::String(b)) if !case_exact => a.eq_ignore_ascii_case(b),
            _ => actual == &self.value,
        }
    }
}

impl fmt::Display for ValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // serde_json renders strings quoted and escaped, which is exactly
        // the filter literal syntax.
        write!(f, "{} {} {}", self.attribute, self.op, self.value)
    }
}

/// A parsed patch path, not yet bound to any schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPath {
    /// Extension schema URN prefix, verbatim as written
    pub schema_urn: Option<String>,
    /// Attribute name, verbatim as written
    pub attribute: String,
    /// Value filter narrowing a multi-valued complex attribute
    pub filter: Option<ValueFilter>,
    /// Sub-attribute following the attribute or filter
    pub sub_attribute: Option<String>,
}

impl PatchPath {
    /// Parse a path string.
    pub fn parse(input: &str) -> PatchResult<Self> {
        PathParser::new(input).parse()
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(urn) = &self.schema_urn {
            write!(f, "{urn}:")?;
        }
        f.write_str(&self.attribute)?;
        if let Some(filter) = &self.filter {
            write!(f, "[{filter}]")?;
        }
        if let Some(sub) = &self.sub_attribute {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}

/// Recursive descent scanner over a raw path string.
struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(mut self) -> PatchResult<PatchPath> {
        let schema_urn = self.split_schema_urn()?;

        let attribute = self.parse_name("attribute name")?;

        let filter = if self.try_consume_char('[') {
            let filter = self.parse_filter()?;
            self.skip_whitespace();
            if !self.try_consume_char(']') {
                return Err(PatchError::path_syntax(self.pos, "unterminated value filter"));
            }
            Some(filter)
        } else {
            None
        };

        let sub_attribute = if self.try_consume_char('.') {
            Some(self.parse_name("sub-attribute name after '.'")?)
        } else {
            None
        };

        if self.pos < self.input.len() {
            return Err(PatchError::path_syntax(
                self.pos,
                format!("unexpected trailing characters '{}'", &self.input[self.pos..]),
            ));
        }

        Ok(PatchPath {
            schema_urn,
            attribute,
            filter,
            sub_attribute,
        })
    }

    /// Detach an extension schema prefix.
    ///
    /// Colons are legal only inside a URN prefix, which extends to the
    /// last colon before the attribute expression. The filter body is
    /// excluded from the search because quoted literals may contain
    /// colons.
    fn split_schema_urn(&mut self) -> PatchResult<Option<String>> {
        let head_end = self.input.find('[').unwrap_or(self.input.len());
        let Some(last_colon) = self.input[..head_end].rfind(':') else {
            return Ok(None);
        };

        let prefix = &self.input[..last_colon];
        let has_urn_scheme = prefix
            .get(..4)
            .is_some_and(|head| head.eq_ignore_ascii_case("urn:"));
        if !has_urn_scheme {
            return Err(PatchError::path_syntax(
                0,
                "attribute paths containing ':' must carry a 'urn:' schema prefix",
            ));
        }

        self.pos = last_colon + 1;
        Ok(Some(prefix.to_string()))
    }

    /// An attribute or sub-attribute name: leading letter (or `$` for
    /// `$ref`-style names), then letters, digits, `-`, `_` or `$`.
    fn parse_name(&mut self, what: &str) -> PatchResult<String> {
        let start = self.pos;
        match self.current_char() {
            Some(c) if c.is_ascii_alphabetic() || c == '$' => self.pos += c.len_utf8(),
            _ => return Err(PatchError::path_syntax(self.pos, format!("expected {what}"))),
        }
        while let Some(c) = self.current_char() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '$') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_filter(&mut self) -> PatchResult<ValueFilter> {
        self.skip_whitespace();
        let attribute = self.parse_name("filter attribute name")?;

        self.skip_whitespace();
        let op_token = self.parse_operator_token()?;
        let op = match op_token.as_str() {
            "eq" => FilterOp::Eq,
            token if KNOWN_OPERATORS.contains(&token) => {
                return Err(PatchError::UnsupportedFilterOperator { op: op_token });
            }
            _ => {
                return Err(PatchError::filter_syntax(format!(
                    "unknown operator '{op_token}'"
                )));
            }
        };

        self.skip_whitespace();
        let value = self.parse_literal()?;

        Ok(ValueFilter {
            attribute,
            op,
            value,
        })
    }

    fn parse_operator_token(&mut self) -> PatchResult<String> {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_ascii_alphabetic() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(PatchError::filter_syntax("expected comparison operator"));
        }
        Ok(self.input[start..self.pos].to_ascii_lowercase())
    }

    fn parse_literal(&mut self) -> PatchResult<Value> {
        match self.current_char() {
            Some('"') => self.parse_string_literal(),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number_literal(),
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                while let Some(c) = self.current_char() {
                    if c.is_ascii_alphabetic() {
                        self.pos += c.len_utf8();
                    } else {
                        break;
                    }
                }
                match &self.input[start..self.pos] {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    other => Err(PatchError::filter_syntax(format!(
                        "expected literal, found '{other}'"
                    ))),
                }
            }
            _ => Err(PatchError::filter_syntax("expected comparison literal")),
        }
    }

    fn parse_string_literal(&mut self) -> PatchResult<Value> {
        // Opening quote is known present.
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.current_char() {
                None => return Err(PatchError::filter_syntax("unterminated string literal")),
                Some('"') => {
                    self.pos += 1;
                    return Ok(Value::String(out));
                }
                Some('\\') => {
                    self.pos += 1;
                    let Some(escaped) = self.current_char() else {
                        return Err(PatchError::filter_syntax("unterminated string literal"));
                    };
                    let resolved = match escaped {
                        '"' => '"',
                        '\\' => '\\',
                        '/' => '/',
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => {
                            return Err(PatchError::filter_syntax(format!(
                                "invalid escape sequence '\\{other}'"
                            )));
                        }
                    };
                    out.push(resolved);
                    self.pos += escaped.len_utf8();
                }
                Some(c) => {
                    out.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn parse_number_literal(&mut self) -> PatchResult<Value> {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let token = &self.input[start..self.pos];
        serde_json::from_str::<Value>(token)
            .ok()
            .filter(Value::is_number)
            .ok_or_else(|| PatchError::filter_syntax(format!("invalid number literal '{token}'")))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn try_consume_char(&mut self, c: char) -> bool {
        if self.current_char() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }
}
