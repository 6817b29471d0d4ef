//! Tree mapper: binds the traversal protocol to the [`Value`] model.
//!
//! The writer assembles a [`Value`] tree from traversal calls; the reader
//! walks an existing tree in lock-step with the descriptor. One
//! reader/writer instance exists per composite being traversed and is
//! dropped when that composite closes.

use crate::codec::{Decode, Encode};
use crate::descriptor::{Descriptor, Kind, SIZE_INDEX};
use crate::error::{Error, Result};
use crate::protocol::{StructuredInput, StructuredOutput, Tag};
use crate::value::{Value, ValueMap};
use crate::{coerce, parser};

/// Decode a typed value from a parsed [`Value`] tree. The root must be an
/// object or an array.
pub fn read_tree<T: Decode>(tree: &Value) -> Result<T> {
    if !matches!(tree, Value::Object(_) | Value::Array(_)) {
        return Err(Error::unexpected(
            "<root>",
            "object or array",
            tree.kind_name(),
        ));
    }
    tracing::trace!("reading tree");
    let mut reader = TreeReader::root(tree);
    T::decode(&mut reader)
}

/// Parse `input` and decode a typed value from the resulting tree.
pub fn from_text<T: Decode>(input: &str) -> Result<T> {
    read_tree(&parser::parse(input)?)
}

/// Encode a typed value into a [`Value`] tree. The value must encode as a
/// composite.
pub fn write_tree<T: Encode + ?Sized>(value: &T) -> Result<Value> {
    tracing::trace!("writing tree");
    let mut result = None;
    {
        let mut writer = TreeWriter::root(&mut result);
        value.encode(&mut writer)?;
    }
    result.ok_or_else(|| Error::unexpected("<root>", "a finished composite", "nothing written"))
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

enum Source<'a> {
    /// The whole tree, before the first descent.
    Root(&'a Value),
    Object { map: &'a ValueMap, pos: usize },
    List { items: &'a [Value], pos: usize },
    Map { map: &'a ValueMap, pos: usize },
    Entry { key: &'a str, value: &'a Value, pos: usize },
}

struct TreeReader<'a> {
    source: Source<'a>,
    current_tag: Option<Tag>,
}

impl<'a> TreeReader<'a> {
    fn root(tree: &'a Value) -> Self {
        TreeReader {
            source: Source::Root(tree),
            current_tag: None,
        }
    }

    /// Sub-tree addressed by `tag` within this reader's composite.
    fn element(&self, tag: &Tag) -> Result<&'a Value> {
        match &self.source {
            Source::Root(value) => Ok(*value),
            Source::Object { map, .. } | Source::Map { map, .. } => match tag {
                Tag::Name(name) => map
                    .get(name)
                    .ok_or_else(|| Error::missing_field(name.clone())),
                Tag::Index(_) => Err(Error::missing_field(tag.to_string())),
            },
            Source::List { items, .. } => match tag {
                Tag::Index(index) => items
                    .get(*index)
                    .ok_or_else(|| Error::missing_field(tag.to_string())),
                Tag::Name(_) => Err(Error::missing_field(tag.to_string())),
            },
            Source::Entry { value, .. } => match tag {
                Tag::Name(name) if name == "value" => Ok(*value),
                other => Err(Error::unexpected(
                    other.to_string(),
                    "the entry value tag",
                    "unknown entry tag",
                )),
            },
        }
    }

    fn entry_key(&self, tag: &Tag) -> Option<&'a str> {
        match (&self.source, tag) {
            (Source::Entry { key, .. }, Tag::Name(name)) if name == "key" => Some(*key),
            _ => None,
        }
    }

    /// Content of the primitive addressed by `tag`; any primitive variant
    /// qualifies.
    fn primitive_text(&self, tag: &Tag) -> Result<&'a str> {
        if let Some(key) = self.entry_key(tag) {
            return Ok(key);
        }
        let value = self.element(tag)?;
        value
            .content()
            .ok_or_else(|| Error::type_mismatch(tag.to_string(), "primitive", value.kind_name()))
    }

    /// Content of the unquoted literal addressed by `tag`. Numbers and
    /// booleans must arrive unquoted; a quoted string where a number is
    /// wanted is a kind mismatch, not a coercion candidate.
    fn literal_text(&self, tag: &Tag) -> Result<&'a str> {
        if self.entry_key(tag).is_some() {
            return Err(Error::type_mismatch(tag.to_string(), "literal", "string"));
        }
        match self.element(tag)? {
            Value::Literal(text) => Ok(text),
            other => Err(Error::type_mismatch(
                tag.to_string(),
                "literal",
                other.kind_name(),
            )),
        }
    }

    fn shape_error(&self, desc: &Descriptor, expected: &str, found: &Value) -> Error {
        let at = self
            .current_tag_or_null()
            .map(|tag| tag.to_string())
            .unwrap_or_else(|| "<root>".to_string());
        Error::unexpected(
            at,
            format!("{expected} for {}", desc.name()),
            found.kind_name(),
        )
    }
}

impl<'a> StructuredInput for TreeReader<'a> {
    fn read_begin<'s>(&'s mut self, desc: &Descriptor) -> Result<Box<dyn StructuredInput + 's>> {
        let current: &'a Value = match &self.current_tag {
            Some(tag) => self.element(&tag.clone())?,
            None => match &self.source {
                Source::Root(value) => *value,
                _ => {
                    return Err(Error::unexpected(
                        "<none>",
                        "a selected element",
                        "no current tag",
                    ))
                }
            },
        };
        let source: Source<'s> = match desc.kind() {
            kind if kind.is_list_like() => match current {
                Value::Array(items) => Source::List { items, pos: 0 },
                other => return Err(self.shape_error(desc, "array", other)),
            },
            Kind::Map => match current {
                Value::Object(map) => Source::Map { map, pos: 0 },
                other => return Err(self.shape_error(desc, "object", other)),
            },
            Kind::MapEntry => {
                let key = match &self.current_tag {
                    Some(Tag::Name(key)) => key.as_str(),
                    _ => {
                        return Err(Error::unexpected(
                            desc.name(),
                            "a named map key",
                            "no key tag",
                        ))
                    }
                };
                Source::Entry {
                    key,
                    value: current,
                    pos: 0,
                }
            }
            _ => match current {
                Value::Object(map) => Source::Object { map, pos: 0 },
                other => return Err(self.shape_error(desc, "object", other)),
            },
        };
        Ok(Box::new(TreeReader {
            source,
            current_tag: None,
        }))
    }

    fn read_element(&mut self, desc: &Descriptor) -> Result<Option<usize>> {
        let found = match &mut self.source {
            Source::Root(_) => None,
            Source::Object { map, pos } => {
                // Scan declared names in order, skipping ones the source
                // does not carry.
                let mut hit = None;
                while *pos < desc.element_count() {
                    let name = desc.element_name(*pos);
                    *pos += 1;
                    if map.contains(name) {
                        hit = Some((*pos - 1, Tag::name(name)));
                        break;
                    }
                }
                hit
            }
            Source::List { items, pos } => {
                if *pos < items.len() {
                    *pos += 1;
                    Some((*pos, Tag::index(*pos - 1)))
                } else {
                    None
                }
            }
            Source::Map { map, pos } => {
                if *pos < map.len() {
                    *pos += 1;
                    match map.key_at(*pos - 1) {
                        Some(key) => Some((*pos, Tag::name(key))),
                        None => None,
                    }
                } else {
                    None
                }
            }
            Source::Entry { pos, .. } => {
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
        Ok(!self.element(tag)?.is_null())
    }

    fn read_tagged_bool(&mut self, tag: &Tag) -> Result<bool> {
        coerce::bool_from_text(self.literal_text(tag)?)
    }

    fn read_tagged_i32(&mut self, tag: &Tag) -> Result<i32> {
        coerce::narrow_i32(coerce::i64_from_text(self.literal_text(tag)?)?)
    }

    fn read_tagged_i64(&mut self, tag: &Tag) -> Result<i64> {
        coerce::i64_from_text(self.literal_text(tag)?)
    }

    fn read_tagged_f64(&mut self, tag: &Tag) -> Result<f64> {
        coerce::f64_from_text(self.literal_text(tag)?)
    }

    fn read_tagged_string(&mut self, tag: &Tag) -> Result<String> {
        Ok(self.primitive_text(tag)?.to_string())
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

enum Node {
    Object(ValueMap),
    List(Vec<Value>),
    Map(ValueMap),
    Entry {
        key: Option<String>,
        value: Option<Value>,
    },
}

enum Sink<'a> {
    /// The external destination of the root composite.
    Root(&'a mut Option<Value>),
    /// A slot inside the parent writer's node. `tag` is `None` for map
    /// entries, whose address is the key they discover while traversing.
    Parent {
        node: &'a mut Node,
        tag: Option<Tag>,
    },
}

struct TreeWriter<'a> {
    sink: Sink<'a>,
    node: Node,
    current_tag: Option<Tag>,
}

impl<'a> TreeWriter<'a> {
    fn root(result: &'a mut Option<Value>) -> Self {
        TreeWriter {
            sink: Sink::Root(result),
            node: Node::Object(ValueMap::new()),
            current_tag: None,
        }
    }

    /// Every write funnels through here.
    fn put(node: &mut Node, tag: &Tag, value: Value) -> Result<()> {
        match node {
            Node::Object(map) | Node::Map(map) => match tag {
                Tag::Name(name) => {
                    map.insert(name.clone(), value);
                    Ok(())
                }
                Tag::Index(_) => Err(Error::unexpected(
                    tag.to_string(),
                    "a named element",
                    "an indexed element",
                )),
            },
            Node::List(items) => match tag {
                // The 1-based element tag places the value.
                Tag::Index(index) if *index <= items.len() => {
                    items.insert(*index, value);
                    Ok(())
                }
                other => Err(Error::unexpected(
                    other.to_string(),
                    "the next list position",
                    "an out-of-order element",
                )),
            },
            Node::Entry { key, value: slot } => match tag {
                Tag::Name(name) if name == "key" => match value {
                    Value::Str(s) => {
                        *key = Some(s.content().to_string());
                        Ok(())
                    }
                    other => Err(Error::type_mismatch("key", "string", other.kind_name())),
                },
                Tag::Name(name) if name == "value" => {
                    *slot = Some(value);
                    Ok(())
                }
                other => Err(Error::unexpected(
                    other.to_string(),
                    "entry key or value",
                    "unknown entry tag",
                )),
            },
        }
    }

    fn put_element(&mut self, tag: &Tag, value: Value) -> Result<()> {
        Self::put(&mut self.node, tag, value)
    }

    fn should_write(&self, index: usize) -> bool {
        match self.node {
            // The size pseudo-element has no representation in a tree.
            Node::List(_) | Node::Map(_) => index != SIZE_INDEX,
            _ => true,
        }
    }

    fn element_tag(&self, desc: &Descriptor, index: usize) -> Tag {
        match self.node {
            Node::List(_) | Node::Map(_) => Tag::index(index - 1),
            _ => Tag::name(self.compose_name("", desc.element_name(index))),
        }
    }
}

impl<'a> StructuredOutput for TreeWriter<'a> {
    fn write_begin<'s>(&'s mut self, desc: &Descriptor) -> Result<Box<dyn StructuredOutput + 's>> {
        let node = match desc.kind() {
            kind if kind.is_list_like() => Node::List(Vec::new()),
            Kind::Map => Node::Map(ValueMap::new()),
            Kind::MapEntry => Node::Entry {
                key: None,
                value: None,
            },
            _ => Node::Object(ValueMap::new()),
        };
        let sink: Sink<'s> = if desc.kind() == Kind::MapEntry {
            // Entries deliver their (key, value) pair straight into the
            // enclosing map writer's node.
            Sink::Parent {
                node: &mut self.node,
                tag: None,
            }
        } else {
            match self.current_tag.clone() {
                Some(tag) => Sink::Parent {
                    node: &mut self.node,
                    tag: Some(tag),
                },
                // No tag selected: this is the root composite, so the child
                // inherits this writer's own sink.
                None => match &mut self.sink {
                    Sink::Root(result) => Sink::Root(&mut **result),
                    Sink::Parent { node, tag } => Sink::Parent {
                        node: &mut **node,
                        tag: tag.clone(),
                    },
                },
            }
        };
        Ok(Box::new(TreeWriter {
            sink,
            node,
            current_tag: None,
        }))
    }

    fn write_element(&mut self, desc: &Descriptor, index: usize) -> Result<bool> {
        if !self.should_write(index) {
            return Ok(false);
        }
        self.current_tag = Some(self.element_tag(desc, index));
        Ok(true)
    }

    fn write_finished(&mut self, desc: &Descriptor) -> Result<()> {
        let _ = desc;
        let node = std::mem::replace(&mut self.node, Node::Object(ValueMap::new()));
        let finished = match node {
            Node::Object(map) | Node::Map(map) => Value::Object(map),
            Node::List(items) => Value::Array(items),
            Node::Entry { key, value } => {
                let key = key.ok_or_else(|| Error::missing_field("key"))?;
                let value = value.ok_or_else(|| Error::missing_field("value"))?;
                return match &mut self.sink {
                    Sink::Parent { node, .. } => Self::put(node, &Tag::name(key), value),
                    Sink::Root(_) => Err(Error::unexpected(
                        "<root>",
                        "an enclosing map",
                        "entry at root",
                    )),
                };
            }
        };
        match &mut self.sink {
            Sink::Root(result) => {
                **result = Some(finished);
                Ok(())
            }
            Sink::Parent { node, tag } => {
                let tag = tag
                    .clone()
                    .ok_or_else(|| Error::unexpected("<finish>", "a field tag", "none"))?;
                Self::put(node, &tag, finished)
            }
        }
    }

    fn current_tag_or_null(&self) -> Option<Tag> {
        self.current_tag.clone()
    }

    fn write_tagged_null(&mut self, tag: &Tag) -> Result<()> {
        self.put_element(tag, Value::Null)
    }

    fn write_tagged_bool(&mut self, tag: &Tag, value: bool) -> Result<()> {
        self.put_element(tag, Value::literal(value.to_string()))
    }

    fn write_tagged_i32(&mut self, tag: &Tag, value: i32) -> Result<()> {
        self.put_element(tag, Value::literal(value.to_string()))
    }

    fn write_tagged_i64(&mut self, tag: &Tag, value: i64) -> Result<()> {
        self.put_element(tag, Value::literal(value.to_string()))
    }

    // Overridden so floats keep their own canonical text instead of the
    // widened f64 rendering.
    fn write_tagged_f32(&mut self, tag: &Tag, value: f32) -> Result<()> {
        self.put_element(tag, Value::literal(value.to_string()))
    }

    fn write_tagged_f64(&mut self, tag: &Tag, value: f64) -> Result<()> {
        self.put_element(tag, Value::literal(value.to_string()))
    }

    fn write_tagged_string(&mut self, tag: &Tag, value: &str) -> Result<()> {
        self.put_element(tag, Value::string(value))
    }
}
