//! The already-parsed configuration tree the reader walks.
//!
//! The engine takes no part in parsing configuration syntax: callers hand it
//! a [`Config`] built from whatever their loader produced, along with an
//! origin description that every diagnostic carries.

use descent_core::{Error, Result};

/// One configuration value. Object entries keep their declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Object(Vec<(String, ConfigValue)>),
}

impl ConfigValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Int(_) | ConfigValue::Float(_) => "number",
            ConfigValue::String(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Object(_) => "object",
        }
    }

    /// Walk a dotted path through nested objects. The empty path resolves to
    /// the node itself.
    pub(crate) fn resolve(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return Some(self);
        }
        let mut current = self;
        for segment in path.split('.') {
            let ConfigValue::Object(entries) = current else {
                return None;
            };
            current = entries
                .iter()
                .find(|(key, _)| key == segment)
                .map(|(_, value)| value)?;
        }
        Some(current)
    }

    /// Adapt a parsed JSON document into a configuration value.
    pub fn from_json(value: &serde_json::Value) -> ConfigValue {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    ConfigValue::Float(f)
                } else {
                    ConfigValue::Null
                }
            }
            serde_json::Value::String(s) => ConfigValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                ConfigValue::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

/// An already-parsed hierarchical configuration, addressed by dotted paths,
/// with an origin description used in diagnostics.
#[derive(Debug, Clone)]
pub struct Config {
    root: ConfigValue,
    origin: String,
}

impl Config {
    pub fn new(root: ConfigValue, origin: impl Into<String>) -> Self {
        Config {
            root,
            origin: origin.into(),
        }
    }

    pub fn from_json(value: &serde_json::Value, origin: impl Into<String>) -> Self {
        Config::new(ConfigValue::from_json(value), origin)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn contains(&self, path: &str) -> bool {
        self.view().contains(path)
    }

    pub fn value(&self, path: &str) -> Result<&ConfigValue> {
        self.view().value(path)
    }

    pub fn list(&self, path: &str) -> Result<&[ConfigValue]> {
        self.view().list(path)
    }

    pub fn object(&self, path: &str) -> Result<&[(String, ConfigValue)]> {
        self.view().object(path)
    }

    /// Whether the path resolves to an explicit null.
    pub fn is_null(&self, path: &str) -> Result<bool> {
        self.view().is_null(path)
    }

    pub(crate) fn view(&self) -> ConfigView<'_> {
        ConfigView {
            node: &self.root,
            origin: &self.origin,
        }
    }
}

/// Borrowed view of one object scope inside a [`Config`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConfigView<'a> {
    pub(crate) node: &'a ConfigValue,
    pub(crate) origin: &'a str,
}

impl<'a> ConfigView<'a> {
    pub(crate) fn contains(&self, path: &str) -> bool {
        self.node.resolve(path).is_some()
    }

    pub(crate) fn value(&self, path: &str) -> Result<&'a ConfigValue> {
        self.node.resolve(path).ok_or_else(|| Error::MissingField {
            tag: format!("{path} ({})", self.origin),
        })
    }

    pub(crate) fn list(&self, path: &str) -> Result<&'a [ConfigValue]> {
        match self.value(path)? {
            ConfigValue::List(items) => Ok(items),
            other => Err(self.mismatch(path, "list", other.kind_name())),
        }
    }

    pub(crate) fn object(&self, path: &str) -> Result<&'a [(String, ConfigValue)]> {
        match self.value(path)? {
            ConfigValue::Object(entries) => Ok(entries),
            other => Err(self.mismatch(path, "object", other.kind_name())),
        }
    }

    pub(crate) fn is_null(&self, path: &str) -> Result<bool> {
        Ok(matches!(self.value(path)?, ConfigValue::Null))
    }

    pub(crate) fn mismatch(&self, path: &str, expected: &str, found: &str) -> Error {
        Error::type_mismatch(format!("{path} ({})", self.origin), expected, found)
    }
}
