//! The JSON value tree: an immutable document model with canonical
//! text rendering.
//!
//! A [`Value`] is built once — by the parser or by the tree writer — and is
//! never mutated afterwards. Strings remember their raw (unescaped) content
//! and memoize the quoted form on first render.

use std::cell::OnceCell;
use std::fmt;

use crate::coerce;
use crate::error::{Error, Result};

/// A node of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// A quoted string; content is kept unescaped.
    Str(QuotedStr),
    /// An unquoted literal (number, boolean, bare word); content is the
    /// literal's exact source text.
    Literal(String),
    Object(ValueMap),
    Array(Vec<Value>),
}

impl Value {
    /// Build a quoted-string node.
    pub fn string(content: impl Into<String>) -> Value {
        Value::Str(QuotedStr::new(content))
    }

    /// Build an unquoted-literal node from its exact text.
    pub fn literal(text: impl Into<String>) -> Value {
        Value::Literal(text.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Literal(_) => "literal",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Raw textual content of a primitive node; `None` for everything else.
    pub fn content(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.content()),
            Value::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// Object member lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// Array element lookup.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_array()?.get(index)
    }

    pub fn get_object(&self, key: &str) -> Option<&ValueMap> {
        self.get(key)?.as_object()
    }

    pub fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.get(key)?.as_array()
    }

    /// Object member lookup that only yields primitives.
    pub fn get_primitive(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| v.content().is_some())
    }

    pub fn object_at(&self, index: usize) -> Option<&ValueMap> {
        self.at(index)?.as_object()
    }

    pub fn array_at(&self, index: usize) -> Option<&[Value]> {
        self.at(index)?.as_array()
    }

    pub fn primitive_at(&self, index: usize) -> Option<&Value> {
        self.at(index).filter(|v| v.content().is_some())
    }

    fn primitive_text(&self) -> Result<&str> {
        self.content()
            .ok_or_else(|| Error::type_mismatch("<value>", "primitive", self.kind_name()))
    }

    pub fn as_bool(&self) -> Result<bool> {
        coerce::bool_from_text(self.primitive_text()?)
    }

    pub fn as_i32(&self) -> Result<i32> {
        coerce::narrow_i32(self.as_i64()?)
    }

    pub fn as_i64(&self) -> Result<i64> {
        coerce::i64_from_text(self.primitive_text()?)
    }

    pub fn as_f32(&self) -> Result<f32> {
        Ok(self.as_f64()? as f32)
    }

    pub fn as_f64(&self) -> Result<f64> {
        coerce::f64_from_text(self.primitive_text()?)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Literal(text) => f.write_str(text),
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", quote(key))?;
                }
                f.write_str("}")
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, value) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A quoted string with its escaped rendering memoized on first use.
#[derive(Debug, Clone, Default)]
pub struct QuotedStr {
    content: String,
    rendered: OnceCell<String>,
}

impl QuotedStr {
    pub fn new(content: impl Into<String>) -> Self {
        QuotedStr {
            content: content.into(),
            rendered: OnceCell::new(),
        }
    }

    /// The unescaped content.
    pub fn content(&self) -> &str {
        &self.content
    }
}

// The memo cell is a rendering cache, not part of the value.
impl PartialEq for QuotedStr {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl fmt::Display for QuotedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rendered.get_or_init(|| quote(&self.content)))
    }
}

fn quote(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 2);
    out.push('"');
    for ch in content.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Insertion-ordered string-keyed map of values. Duplicate inserts replace
/// the existing entry in place.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        ValueMap::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

// Objects compare as key/value sets; insertion order only matters for
// rendering.
impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
