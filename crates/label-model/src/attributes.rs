//! Supplier parametrics stored as a single table cell.
//!
//! Cells are written as JSON objects. For reading, the literal forms the
//! catalog crawler emitted are accepted as well: a Python dict
//! (`{'Family': 'Ceramic Capacitors'}`) or an ordered dict
//! (`OrderedDict([('Family', 'Ceramic Capacitors')])`).

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AttributesError;

/// Attribute name to value. Later duplicates overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Parse a stored cell. An empty or blank cell is an empty mapping.
    pub fn parse_cell(cell: &str) -> Result<Self, AttributesError> {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(trimmed) {
            return Ok(Self(map));
        }
        let pairs = LiteralParser::new(trimmed).parse()?;
        Ok(pairs.into_iter().collect())
    }

    /// Serialize for storage in a cell.
    pub fn to_cell(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| String::from("{}"))
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for Attributes {
    type Err = AttributesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_cell(s)
    }
}

const ORDERED_DICT: &str = "OrderedDict";

/// Recursive-descent reader for the two Python literal shapes.
struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Vec<(String, String)>, AttributesError> {
        self.skip_ws();
        let pairs = if self.peek() == Some('{') {
            self.parse_dict()?
        } else if self.eat_word(ORDERED_DICT) {
            self.parse_ordered_dict()?
        } else {
            return Err(self.error("expected '{' or OrderedDict"));
        };
        self.skip_ws();
        if self.pos != self.chars.len() {
            return Err(self.error("trailing characters after mapping"));
        }
        Ok(pairs)
    }

    fn parse_dict(&mut self) -> Result<Vec<(String, String)>, AttributesError> {
        self.expect('{')?;
        let mut pairs = Vec::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(pairs);
            }
            let key = self.parse_string()?;
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let value = self.parse_string()?;
            pairs.push((key, value));
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                self.expect('}')?;
                return Ok(pairs);
            }
        }
    }

    fn parse_ordered_dict(&mut self) -> Result<Vec<(String, String)>, AttributesError> {
        self.skip_ws();
        self.expect('(')?;
        self.skip_ws();
        if self.eat(')') {
            return Ok(Vec::new());
        }
        self.expect('[')?;
        let mut pairs = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                break;
            }
            self.expect('(')?;
            self.skip_ws();
            let key = self.parse_string()?;
            self.skip_ws();
            self.expect(',')?;
            self.skip_ws();
            let value = self.parse_string()?;
            self.skip_ws();
            self.expect(')')?;
            pairs.push((key, value));
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                self.expect(']')?;
                break;
            }
        }
        self.skip_ws();
        self.expect(')')?;
        Ok(pairs)
    }

    fn parse_string(&mut self) -> Result<String, AttributesError> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected quoted string")),
        };
        self.pos += 1;
        let mut out = String::new();
        while let Some(ch) = self.next() {
            match ch {
                c if c == quote => return Ok(out),
                '\\' => out.push(self.parse_escape()?),
                c => out.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn parse_escape(&mut self) -> Result<char, AttributesError> {
        let Some(ch) = self.next() else {
            return Err(self.error("dangling escape"));
        };
        let decoded = match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'x' => self.parse_hex(2)?,
            'u' => self.parse_hex(4)?,
            'U' => self.parse_hex(8)?,
            other => other,
        };
        Ok(decoded)
    }

    fn parse_hex(&mut self, digits: usize) -> Result<char, AttributesError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated hex escape"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        let ch = char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?;
        self.pos = end;
        Ok(ch)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let len = word.chars().count();
        let end = self.pos + len;
        if end <= self.chars.len() && self.chars[self.pos..end].iter().copied().eq(word.chars()) {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), AttributesError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> AttributesError {
        AttributesError::malformed(self.pos, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_object() {
        let attrs = Attributes::parse_cell(r#"{"Family": "Crystals", "Frequency": "16MHz"}"#)
            .expect("json cell");
        assert_eq!(attrs.get("Family"), Some("Crystals"));
        assert_eq!(attrs.get("Frequency"), Some("16MHz"));
    }

    #[test]
    fn parses_python_dict_with_escapes() {
        let attrs = Attributes::parse_cell(r#"{'Tolerance': '\xb110%', "Note": 'it\'s'}"#)
            .expect("python dict");
        assert_eq!(attrs.get("Tolerance"), Some("±10%"));
        assert_eq!(attrs.get("Note"), Some("it's"));
    }

    #[test]
    fn parses_ordered_dict() {
        let cell = "OrderedDict([('Family', 'Crystals'), ('Family', 'Oscillators'), ('Size', '5mm')])";
        let attrs = Attributes::parse_cell(cell).expect("ordered dict");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("Family"), Some("Oscillators"));
        assert!(Attributes::parse_cell("OrderedDict()").unwrap().is_empty());
    }

    #[test]
    fn blank_cell_is_empty() {
        assert!(Attributes::parse_cell("  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        let err = Attributes::parse_cell("{'a': 'b'").unwrap_err();
        assert!(matches!(err, AttributesError::Malformed { .. }));
        assert!(Attributes::parse_cell("[1, 2]").is_err());
        assert!(Attributes::parse_cell("{'a': 'b'} extra").is_err());
    }

    #[test]
    fn cell_round_trips_through_json() {
        let attrs: Attributes = [
            ("Capacitance".to_string(), "10uF".to_string()),
            ("Voltage - Rated".to_string(), "16V".to_string()),
        ]
        .into_iter()
        .collect();
        let cell = attrs.to_cell();
        assert_eq!(cell, r#"{"Capacitance":"10uF","Voltage - Rated":"16V"}"#);
        assert_eq!(cell.parse::<Attributes>().unwrap(), attrs);
    }
}
