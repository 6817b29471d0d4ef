//! Protocol readers over a [`Config`] tree.
//!
//! Object scopes are addressed by composed dotted paths against the active
//! view; crossing a list boundary switches to value-held readers, and a
//! nested object encountered there opens a fresh path scope of its own.

use descent_core::descriptor::{Descriptor, Kind};
use descent_core::{coerce, Decode, Error, Result, StructuredInput, Tag};

use crate::source::{Config, ConfigValue, ConfigView};

/// Decode a typed value from a configuration tree. The root must be
/// object-like.
pub fn read_config<T: Decode>(config: &Config) -> Result<T> {
    tracing::trace!(origin = config.origin(), "reading config");
    let mut reader = ConfigReader {
        scope: Scope::Object {
            view: config.view(),
            base: String::new(),
            pos: 0,
        },
        current_tag: None,
    };
    T::decode(&mut reader)
}

fn dotted(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

enum Scope<'a> {
    /// Path-addressed object scope.
    Object {
        view: ConfigView<'a>,
        base: String,
        pos: usize,
    },
    List {
        origin: &'a str,
        items: &'a [ConfigValue],
        pos: usize,
    },
    Map {
        origin: &'a str,
        entries: &'a [(String, ConfigValue)],
        pos: usize,
    },
    Entry {
        origin: &'a str,
        key: &'a str,
        value: &'a ConfigValue,
        pos: usize,
    },
}

struct ConfigReader<'a> {
    scope: Scope<'a>,
    current_tag: Option<Tag>,
}

impl<'a> ConfigReader<'a> {
    fn origin_str(&self) -> &'a str {
        match &self.scope {
            Scope::Object { view, .. } => view.origin,
            Scope::List { origin, .. }
            | Scope::Map { origin, .. }
            | Scope::Entry { origin, .. } => *origin,
        }
    }

    fn entry_key(&self, tag: &Tag) -> Option<&'a str> {
        match (&self.scope, tag) {
            (Scope::Entry { key, .. }, Tag::Name(name)) if name == "key" => Some(*key),
            _ => None,
        }
    }

    /// Configuration value addressed by `tag` within this scope.
    fn scalar(&self, tag: &Tag) -> Result<&'a ConfigValue> {
        match (&self.scope, tag) {
            (Scope::Object { view, .. }, Tag::Name(path)) => view.value(path),
            (Scope::List { origin, items, .. }, Tag::Index(index)) => {
                items.get(*index).ok_or_else(|| Error::MissingField {
                    tag: format!("{index} ({origin})"),
                })
            }
            (Scope::Entry { value, .. }, Tag::Name(name)) if name == "value" => Ok(*value),
            (Scope::Map { .. }, _) => Err(Error::unexpected(
                tag.to_string(),
                "a map entry",
                "a direct read on a map scope",
            )),
            _ => Err(Error::MissingField {
                tag: format!("{tag} ({})", self.origin_str()),
            }),
        }
    }

    fn mismatch(&self, tag: &Tag, expected: &str, found: &str) -> Error {
        Error::type_mismatch(
            format!("{tag} ({})", self.origin_str()),
            expected,
            found,
        )
    }

    /// Value the current tag points at, for opening a nested composite.
    fn composite_value(&self) -> Result<&'a ConfigValue> {
        match &self.current_tag {
            Some(tag) => self.scalar(tag),
            None => Err(Error::unexpected(
                "<none>",
                "a selected element",
                "no current tag",
            )),
        }
    }
}

impl<'a> StructuredInput for ConfigReader<'a> {
    fn compose_name(&self, parent: &str, child: &str) -> String {
        dotted(parent, child)
    }

    fn read_begin<'s>(&'s mut self, desc: &Descriptor) -> Result<Box<dyn StructuredInput + 's>> {
        let scope: Scope<'s> = match (&self.scope, desc.kind()) {
            (Scope::Map { origin, entries, .. }, Kind::MapEntry) => {
                let index = match &self.current_tag {
                    Some(Tag::Index(index)) => *index,
                    _ => {
                        return Err(Error::unexpected(
                            desc.name(),
                            "an entry position",
                            "no index tag",
                        ))
                    }
                };
                let (key, value) = entries
                    .get(index)
                    .map(|(key, value)| (key.as_str(), value))
                    .ok_or_else(|| Error::MissingField {
                        tag: format!("{index} ({origin})"),
                    })?;
                Scope::Entry {
                    origin: *origin,
                    key,
                    value,
                    pos: 0,
                }
            }
            (Scope::Map { .. }, _) => {
                return Err(Error::unexpected(
                    desc.name(),
                    "a map entry",
                    "a map scope reads entries only",
                ))
            }
            (_, Kind::MapEntry) => {
                return Err(Error::unexpected(
                    desc.name(),
                    "an enclosing map",
                    "entry outside a map",
                ))
            }
            (Scope::Object { view, .. }, kind) => {
                let path = match &self.current_tag {
                    Some(Tag::Name(path)) => path.as_str(),
                    Some(Tag::Index(_)) => {
                        return Err(Error::unexpected(
                            desc.name(),
                            "a named element",
                            "an indexed element",
                        ))
                    }
                    None => "",
                };
                if kind.is_list_like() {
                    if path.is_empty() {
                        return Err(Error::unexpected(
                            "<root>",
                            "an object-like root",
                            desc.name(),
                        ));
                    }
                    Scope::List {
                        origin: view.origin,
                        items: view.list(path)?,
                        pos: 0,
                    }
                } else if kind == Kind::Map {
                    if path.is_empty() {
                        return Err(Error::unexpected(
                            "<root>",
                            "an object-like root",
                            desc.name(),
                        ));
                    }
                    Scope::Map {
                        origin: view.origin,
                        entries: view.object(path)?,
                        pos: 0,
                    }
                } else {
                    // Nested records stay path-addressed within the same
                    // view, under a longer prefix.
                    Scope::Object {
                        view: *view,
                        base: path.to_string(),
                        pos: 0,
                    }
                }
            }
            (Scope::List { .. } | Scope::Entry { .. }, kind) => {
                let value = self.composite_value()?;
                let origin = self.origin_str();
                let tag = self.current_tag.clone().unwrap_or(Tag::Index(0));
                if kind.is_list_like() {
                    match value {
                        ConfigValue::List(items) => Scope::List {
                            origin,
                            items,
                            pos: 0,
                        },
                        other => return Err(self.mismatch(&tag, "list", other.kind_name())),
                    }
                } else if kind == Kind::Map {
                    match value {
                        ConfigValue::Object(entries) => Scope::Map {
                            origin,
                            entries,
                            pos: 0,
                        },
                        other => return Err(self.mismatch(&tag, "object", other.kind_name())),
                    }
                } else {
                    match value {
                        ConfigValue::Object(_) => Scope::Object {
                            view: ConfigView {
                                node: value,
                                origin,
                            },
                            base: String::new(),
                            pos: 0,
                        },
                        other => return Err(self.mismatch(&tag, "object", other.kind_name())),
                    }
                }
            }
        };
        Ok(Box::new(ConfigReader {
            scope,
            current_tag: None,
        }))
    }

    fn read_element(&mut self, desc: &Descriptor) -> Result<Option<usize>> {
        let found = match &mut self.scope {
            Scope::Object { view, base, pos } => {
                // Scan declared names, skipping paths the source does not
                // carry.
                let mut hit = None;
                while *pos < desc.element_count() {
                    let name = desc.element_name(*pos);
                    *pos += 1;
                    let path = dotted(base, name);
                    if view.contains(&path) {
                        hit = Some((*pos - 1, Tag::Name(path)));
                        break;
                    }
                }
                hit
            }
            Scope::List { items, pos, .. } => {
                if *pos < items.len() {
                    *pos += 1;
                    Some((*pos, Tag::index(*pos - 1)))
                } else {
                    None
                }
            }
            Scope::Map { entries, pos, .. } => {
                if *pos < entries.len() {
                    *pos += 1;
                    Some((*pos, Tag::index(*pos - 1)))
                } else {
                    None
                }
            }
            Scope::Entry { pos, .. } => {
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
        Ok(!matches!(self.scalar(tag)?, ConfigValue::Null))
    }

    fn read_tagged_bool(&mut self, tag: &Tag) -> Result<bool> {
        if self.entry_key(tag).is_some() {
            return Err(self.mismatch(tag, "boolean", "string"));
        }
        match self.scalar(tag)? {
            ConfigValue::Bool(b) => Ok(*b),
            other => Err(self.mismatch(tag, "boolean", other.kind_name())),
        }
    }

    fn read_tagged_i32(&mut self, tag: &Tag) -> Result<i32> {
        coerce::narrow_i32(self.read_tagged_i64(tag)?)
    }

    fn read_tagged_i64(&mut self, tag: &Tag) -> Result<i64> {
        if self.entry_key(tag).is_some() {
            return Err(self.mismatch(tag, "number", "string"));
        }
        match self.scalar(tag)? {
            ConfigValue::Int(i) => Ok(*i),
            ConfigValue::Float(f) => coerce::truncate_i64(*f),
            other => Err(self.mismatch(tag, "number", other.kind_name())),
        }
    }

    fn read_tagged_f64(&mut self, tag: &Tag) -> Result<f64> {
        if self.entry_key(tag).is_some() {
            return Err(self.mismatch(tag, "number", "string"));
        }
        match self.scalar(tag)? {
            ConfigValue::Int(i) => Ok(*i as f64),
            ConfigValue::Float(f) => Ok(*f),
            other => Err(self.mismatch(tag, "number", other.kind_name())),
        }
    }

    fn read_tagged_string(&mut self, tag: &Tag) -> Result<String> {
        if let Some(key) = self.entry_key(tag) {
            return Ok(key.to_string());
        }
        match self.scalar(tag)? {
            ConfigValue::String(s) => Ok(s.clone()),
            other => Err(self.mismatch(tag, "string", other.kind_name())),
        }
    }
}
