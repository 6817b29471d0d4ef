//! Dynamic object backend: decodes typed values out of an untyped host
//! object/array graph whose shape is unknown until probed.
//!
//! The host graph is modeled as an opaque capability that keeps the
//! three-way presence distinction explicit: a fetch answers `None` when the
//! key never existed (undefined), and `Some` of a null node when the key is
//! present but empty. Undefined is a decode error for non-optional fields;
//! a present null is a valid nullable decode.

use crate::codec::Decode;
use crate::coerce;
use crate::descriptor::{Descriptor, Kind};
use crate::error::{Error, Result};
use crate::protocol::{StructuredInput, Tag};

/// Capability exposed by a host dynamic object graph.
pub trait DynamicSource {
    /// Fetch a named field. `None` means undefined; a present null comes
    /// back as `Some` of a null node.
    fn field(&self, name: &str) -> Option<&Self>;

    /// Fetch a positional element of an array-like node.
    fn element(&self, index: usize) -> Option<&Self>;

    /// Ordered keys of an object-like node.
    fn keys(&self) -> Vec<String>;

    /// Length of an array-like node; 0 for everything else.
    fn length(&self) -> usize;

    fn is_null(&self) -> bool;

    fn as_bool(&self) -> Option<bool>;

    fn as_i64(&self) -> Option<i64>;

    fn as_f64(&self) -> Option<f64>;

    fn as_str(&self) -> Option<&str>;

    /// Kind name used in diagnostics.
    fn kind_name(&self) -> &'static str;
}

impl DynamicSource for serde_json::Value {
    fn field(&self, name: &str) -> Option<&Self> {
        self.get(name)
    }

    fn element(&self, index: usize) -> Option<&Self> {
        self.get(index)
    }

    fn keys(&self) -> Vec<String> {
        match self.as_object() {
            Some(map) => map.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn length(&self) -> usize {
        self.as_array().map_or(0, |items| items.len())
    }

    fn is_null(&self) -> bool {
        serde_json::Value::is_null(self)
    }

    fn as_bool(&self) -> Option<bool> {
        serde_json::Value::as_bool(self)
    }

    fn as_i64(&self) -> Option<i64> {
        serde_json::Value::as_i64(self)
    }

    fn as_f64(&self) -> Option<f64> {
        serde_json::Value::as_f64(self)
    }

    fn as_str(&self) -> Option<&str> {
        serde_json::Value::as_str(self)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}

/// Decode a typed value from a host dynamic object graph.
pub fn read_dynamic<T, S>(source: &S) -> Result<T>
where
    T: Decode,
    S: DynamicSource,
{
    tracing::trace!("reading dynamic object");
    let mut reader = DynReader {
        cursor: Cursor::Object {
            obj: source,
            pos: 0,
        },
        current_tag: None,
    };
    T::decode(&mut reader)
}

enum Cursor<'a, S> {
    Object {
        obj: &'a S,
        pos: usize,
    },
    List {
        obj: &'a S,
        len: usize,
        pos: usize,
    },
    Map {
        obj: &'a S,
        keys: Vec<String>,
        pos: usize,
    },
    /// One map entry: the bound value node plus the key it was filed under.
    Entry {
        obj: &'a S,
        key: String,
        pos: usize,
    },
}

struct DynReader<'a, S> {
    cursor: Cursor<'a, S>,
    current_tag: Option<Tag>,
}

impl<'a, S: DynamicSource> DynReader<'a, S> {
    fn whole(&self) -> &'a S {
        match &self.cursor {
            Cursor::Object { obj, .. }
            | Cursor::List { obj, .. }
            | Cursor::Map { obj, .. }
            | Cursor::Entry { obj, .. } => *obj,
        }
    }

    fn fetch(&self, tag: &Tag) -> Option<&'a S> {
        match (&self.cursor, tag) {
            (Cursor::Entry { obj, .. }, Tag::Name(name)) if name == "value" => Some(*obj),
            (Cursor::Entry { .. }, _) => None,
            (Cursor::Object { obj, .. } | Cursor::Map { obj, .. }, Tag::Name(name)) => {
                obj.field(name)
            }
            (Cursor::List { obj, .. }, Tag::Index(index)) => obj.element(*index),
            _ => None,
        }
    }

    /// Undefined results become [`Error::MissingField`].
    fn require(&self, tag: &Tag) -> Result<&'a S> {
        self.fetch(tag)
            .ok_or_else(|| Error::missing_field(tag.to_string()))
    }

    fn entry_key(&self, tag: &Tag) -> Option<&str> {
        match (&self.cursor, tag) {
            (Cursor::Entry { key, .. }, Tag::Name(name)) if name == "key" => Some(key.as_str()),
            _ => None,
        }
    }

    fn mismatch(&self, tag: &Tag, expected: &str, found: &str) -> Error {
        Error::type_mismatch(tag.to_string(), expected, found)
    }
}

impl<'a, S: DynamicSource> StructuredInput for DynReader<'a, S> {
    fn read_begin<'s>(&'s mut self, desc: &Descriptor) -> Result<Box<dyn StructuredInput + 's>> {
        let current: &'a S = match &self.current_tag {
            Some(tag) => self.require(&tag.clone())?,
            None => self.whole(),
        };
        let cursor: Cursor<'s, S> = match desc.kind() {
            kind if kind.is_list_like() => Cursor::List {
                obj: current,
                len: current.length(),
                pos: 0,
            },
            Kind::Map => Cursor::Map {
                obj: current,
                keys: current.keys(),
                pos: 0,
            },
            Kind::MapEntry => {
                let key = match &self.current_tag {
                    Some(Tag::Name(key)) => key.clone(),
                    _ => {
                        return Err(Error::unexpected(
                            desc.name(),
                            "a named map key",
                            "no key tag",
                        ))
                    }
                };
                Cursor::Entry {
                    obj: current,
                    key,
                    pos: 0,
                }
            }
            _ => Cursor::Object {
                obj: current,
                pos: 0,
            },
        };
        Ok(Box::new(DynReader {
            cursor,
            current_tag: None,
        }))
    }

    fn read_element(&mut self, desc: &Descriptor) -> Result<Option<usize>> {
        let found = match &mut self.cursor {
            Cursor::Object { obj, pos } => {
                // Probe declared names, treating undefined as absence.
                let mut hit = None;
                while *pos < desc.element_count() {
                    let name = desc.element_name(*pos);
                    *pos += 1;
                    if obj.field(name).is_some() {
                        hit = Some((*pos - 1, Tag::name(name)));
                        break;
                    }
                }
                hit
            }
            Cursor::List { obj, len, pos } => {
                // Sparse hosts may carry holes; skip undefined positions.
                let mut hit = None;
                while *pos < *len {
                    let index = *pos;
                    *pos += 1;
                    if obj.element(index).is_some() {
                        hit = Some((*pos, Tag::index(index)));
                        break;
                    }
                }
                hit
            }
            Cursor::Map { obj, keys, pos } => {
                let mut hit = None;
                while *pos < keys.len() {
                    let key = keys[*pos].clone();
                    *pos += 1;
                    if obj.field(&key).is_some() {
                        hit = Some((*pos, Tag::Name(key)));
                        break;
                    }
                }
                hit
            }
            Cursor::Entry { pos, .. } => {
                if *pos < desc.element_count() {
                    *pos += 1;
                    Some((*pos - 1, Tag::name(desc.element_name(*pos - 1))))
                } else {
                    None
                }
            }
        };
        Ok(found.map(|(index, tag)| {
            self.current_tag = Some(tag);
            index
        }))
    }

    fn current_tag_or_null(&self) -> Option<Tag> {
        self.current_tag.clone()
    }

    fn read_tagged_not_null_mark(&mut self, tag: &Tag) -> Result<bool> {
        if self.entry_key(tag).is_some() {
            return Ok(true);
        }
        match self.fetch(tag) {
            Some(value) => Ok(!value.is_null()),
            None => Err(Error::missing_field(tag.to_string())),
        }
    }

    fn read_tagged_bool(&mut self, tag: &Tag) -> Result<bool> {
        if self.entry_key(tag).is_some() {
            return Err(self.mismatch(tag, "boolean", "string"));
        }
        let value = self.require(tag)?;
        value
            .as_bool()
            .ok_or_else(|| self.mismatch(tag, "boolean", value.kind_name()))
    }

    fn read_tagged_i32(&mut self, tag: &Tag) -> Result<i32> {
        coerce::narrow_i32(self.read_tagged_i64(tag)?)
    }

    fn read_tagged_i64(&mut self, tag: &Tag) -> Result<i64> {
        if self.entry_key(tag).is_some() {
            return Err(self.mismatch(tag, "number", "string"));
        }
        let value = self.require(tag)?;
        if let Some(n) = value.as_i64() {
            return Ok(n);
        }
        match value.as_f64() {
            Some(f) => coerce::truncate_i64(f),
            None => Err(self.mismatch(tag, "number", value.kind_name())),
        }
    }

    fn read_tagged_f64(&mut self, tag: &Tag) -> Result<f64> {
        if self.entry_key(tag).is_some() {
            return Err(self.mismatch(tag, "number", "string"));
        }
        let value = self.require(tag)?;
        value
            .as_f64()
            .ok_or_else(|| self.mismatch(tag, "number", value.kind_name()))
    }

    fn read_tagged_string(&mut self, tag: &Tag) -> Result<String> {
        if let Some(key) = self.entry_key(tag) {
            return Ok(key.to_string());
        }
        let value = self.require(tag)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(tag, "string", value.kind_name()))
    }
}
