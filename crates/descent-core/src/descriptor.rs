//! Schema descriptors: the shape metadata callers supply for every type
//! handed to the engine.
//!
//! The engine never synthesizes a descriptor from introspection. Each type's
//! descriptor is a `const`-constructible value, typically a `static` next to
//! the type's `Encode`/`Decode` implementations.

/// Shape category of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A record with named fields.
    Record,
    /// A singleton object with no state of its own.
    Object,
    /// A variant of a sealed hierarchy.
    Sealed,
    List,
    Set,
    Map,
    /// One key/value pair inside a linearized map.
    MapEntry,
    /// An open polymorphic wrapper; traverses like a list.
    Polymorphic,
}

impl Kind {
    pub fn is_list_like(self) -> bool {
        matches!(self, Kind::List | Kind::Set | Kind::Polymorphic)
    }

    pub fn is_obj_like(self) -> bool {
        matches!(self, Kind::Record | Kind::Object | Kind::Sealed)
    }
}

/// Reserved element index for the collection size pseudo-element on
/// list-like and map descriptors. Data elements there are tagged starting
/// at 1; no real element is ever assigned this index.
pub const SIZE_INDEX: usize = 0;

/// Element index of the key inside a [`Kind::MapEntry`] descriptor.
pub const KEY_INDEX: usize = 0;
/// Element index of the value inside a [`Kind::MapEntry`] descriptor.
pub const VALUE_INDEX: usize = 1;

/// Describes one type's shape: its kind, name and ordered element names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    name: &'static str,
    kind: Kind,
    elements: &'static [&'static str],
}

impl Descriptor {
    pub const fn new(name: &'static str, kind: Kind, elements: &'static [&'static str]) -> Self {
        Descriptor {
            name,
            kind,
            elements,
        }
    }

    pub const fn record(name: &'static str, elements: &'static [&'static str]) -> Self {
        Descriptor::new(name, Kind::Record, elements)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Declared name of element `index`.
    ///
    /// # Panics
    /// Panics when the index is out of range; list-like descriptors have no
    /// named elements and must never be asked for one.
    pub fn element_name(&self, index: usize) -> &'static str {
        self.elements[index]
    }
}

/// Shared descriptor for the built-in list shape.
pub static LIST: Descriptor = Descriptor::new("List", Kind::List, &[]);
/// Shared descriptor for the built-in set shape.
pub static SET: Descriptor = Descriptor::new("Set", Kind::Set, &[]);
/// Shared descriptor for the built-in map shape.
pub static MAP: Descriptor = Descriptor::new("Map", Kind::Map, &[]);
/// Shared descriptor for one linearized map entry.
pub static MAP_ENTRY: Descriptor = Descriptor::new("MapEntry", Kind::MapEntry, &["key", "value"]);
