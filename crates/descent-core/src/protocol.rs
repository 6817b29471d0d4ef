//! The structural traversal protocol: the dual reader/writer contracts every
//! backend implements.
//!
//! A composite value is decomposed into a sequence of (tag, primitive) writes
//! — or reconstructed from a sequence of (tag, primitive) reads — with a
//! fresh protocol instance opened for every nested composite via
//! [`StructuredOutput::write_begin`] / [`StructuredInput::read_begin`].
//! Instances nest strictly: a child borrows its parent for exactly the
//! duration of the child composite's traversal, so the call stack is the tag
//! stack.
//!
//! Maps are not native here: they travel as an ordered sequence of
//! [`Kind::MapEntry`](crate::descriptor::Kind) composites with reserved
//! `key`/`value` tags, which lets every backend reuse its generic composite
//! machinery for maps.

use std::fmt;

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};

/// The addressing unit a backend uses to answer "give me the next piece of
/// data": a (possibly composed) name, or a zero-based position inside a
/// list-like composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Name(String),
    Index(usize),
}

impl Tag {
    pub fn name(name: impl Into<String>) -> Tag {
        Tag::Name(name.into())
    }

    pub fn index(index: usize) -> Tag {
        Tag::Index(index)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Tag::Name(name) => Some(name),
            Tag::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Tag::Index(index) => Some(*index),
            Tag::Name(_) => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Name(name) => f.write_str(name),
            Tag::Index(index) => write!(f, "{index}"),
        }
    }
}

/// The output side of the protocol: records one field at a time and opens a
/// nested writer per composite.
pub trait StructuredOutput {
    /// Path composition hook. Tree-shaped backends keep the bare child name;
    /// path-addressed backends join with a separator.
    fn compose_name(&self, parent: &str, child: &str) -> String {
        let _ = parent;
        child.to_string()
    }

    /// Open a writer scoped to the nested composite the current tag
    /// addresses (or the external sink, at the root), chosen by the
    /// descriptor's kind.
    fn write_begin<'a>(&'a mut self, desc: &Descriptor) -> Result<Box<dyn StructuredOutput + 'a>>;

    /// Position on element `index` of `desc`, deriving its tag. Returns
    /// `false` when the element must not be written — the reserved size
    /// pseudo-element on list-like and map composites.
    fn write_element(&mut self, desc: &Descriptor, index: usize) -> Result<bool>;

    /// Seal the composite and hand the finished value up to the parent (or
    /// the external sink if this writer is the root).
    fn write_finished(&mut self, desc: &Descriptor) -> Result<()>;

    /// Tag selected by the latest [`write_element`](Self::write_element).
    ///
    /// # Panics
    /// Panics when no element has been selected on this writer.
    fn current_tag(&self) -> Tag {
        self.current_tag_or_null()
            .expect("no element selected on this writer")
    }

    fn current_tag_or_null(&self) -> Option<Tag>;

    fn write_tagged_null(&mut self, tag: &Tag) -> Result<()>;

    fn write_tagged_bool(&mut self, tag: &Tag, value: bool) -> Result<()>;

    fn write_tagged_i8(&mut self, tag: &Tag, value: i8) -> Result<()> {
        self.write_tagged_i32(tag, i32::from(value))
    }

    fn write_tagged_i16(&mut self, tag: &Tag, value: i16) -> Result<()> {
        self.write_tagged_i32(tag, i32::from(value))
    }

    fn write_tagged_i32(&mut self, tag: &Tag, value: i32) -> Result<()>;

    fn write_tagged_i64(&mut self, tag: &Tag, value: i64) -> Result<()>;

    fn write_tagged_f32(&mut self, tag: &Tag, value: f32) -> Result<()> {
        self.write_tagged_f64(tag, f64::from(value))
    }

    fn write_tagged_f64(&mut self, tag: &Tag, value: f64) -> Result<()>;

    fn write_tagged_char(&mut self, tag: &Tag, value: char) -> Result<()> {
        self.write_tagged_string(tag, &value.to_string())
    }

    fn write_tagged_string(&mut self, tag: &Tag, value: &str) -> Result<()>;

    /// Enums travel as their variant name.
    fn write_tagged_enum(&mut self, tag: &Tag, variant: &str) -> Result<()> {
        self.write_tagged_string(tag, variant)
    }

    /// Fallback for values without a dedicated representation: their display
    /// form, recorded as a string.
    fn write_tagged_value(&mut self, tag: &Tag, value: &dyn fmt::Display) -> Result<()> {
        self.write_tagged_string(tag, &value.to_string())
    }
}

/// The input side of the protocol: yields element indices to decode and
/// answers tagged primitive reads.
pub trait StructuredInput {
    /// Path composition hook, mirroring
    /// [`StructuredOutput::compose_name`].
    fn compose_name(&self, parent: &str, child: &str) -> String {
        let _ = parent;
        child.to_string()
    }

    /// Open a reader over the sub-structure the current tag addresses (or
    /// the whole source, at the root), chosen by the descriptor's kind. A
    /// source whose shape does not match the kind is a decode failure, never
    /// a coercion.
    fn read_begin<'a>(&'a mut self, desc: &Descriptor) -> Result<Box<dyn StructuredInput + 'a>>;

    /// Advance to the next element to decode, returning its index in `desc`,
    /// or `None` once the composite is exhausted. Declared elements absent
    /// from the source are skipped, which is what makes optional fields
    /// decodable.
    fn read_element(&mut self, desc: &Descriptor) -> Result<Option<usize>>;

    /// Tag produced by the latest [`read_element`](Self::read_element).
    ///
    /// # Panics
    /// Panics when no element has been selected on this reader.
    fn current_tag(&self) -> Tag {
        self.current_tag_or_null()
            .expect("no element selected on this reader")
    }

    fn current_tag_or_null(&self) -> Option<Tag>;

    /// Whether a nullable field holds a value to decode; `false` means the
    /// source carries an explicit null there.
    fn read_tagged_not_null_mark(&mut self, tag: &Tag) -> Result<bool>;

    fn read_tagged_bool(&mut self, tag: &Tag) -> Result<bool>;

    fn read_tagged_i8(&mut self, tag: &Tag) -> Result<i8> {
        let wide = self.read_tagged_i32(tag)?;
        i8::try_from(wide).map_err(|_| Error::NumericFormat {
            text: wide.to_string(),
            target: "i8",
        })
    }

    fn read_tagged_i16(&mut self, tag: &Tag) -> Result<i16> {
        let wide = self.read_tagged_i32(tag)?;
        i16::try_from(wide).map_err(|_| Error::NumericFormat {
            text: wide.to_string(),
            target: "i16",
        })
    }

    fn read_tagged_i32(&mut self, tag: &Tag) -> Result<i32>;

    fn read_tagged_i64(&mut self, tag: &Tag) -> Result<i64>;

    fn read_tagged_f32(&mut self, tag: &Tag) -> Result<f32> {
        Ok(self.read_tagged_f64(tag)? as f32)
    }

    fn read_tagged_f64(&mut self, tag: &Tag) -> Result<f64>;

    fn read_tagged_char(&mut self, tag: &Tag) -> Result<char> {
        let s = self.read_tagged_string(tag)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::type_mismatch(
                tag.to_string(),
                "char",
                format!("string {s:?}"),
            )),
        }
    }

    fn read_tagged_string(&mut self, tag: &Tag) -> Result<String>;

    /// Resolve an enum by its variant name, returning the variant's position
    /// in `variants`.
    fn read_tagged_enum(&mut self, tag: &Tag, variants: &'static [&'static str]) -> Result<usize> {
        let name = self.read_tagged_string(tag)?;
        variants
            .iter()
            .position(|variant| *variant == name)
            .ok_or_else(|| {
                Error::type_mismatch(tag.to_string(), format!("one of {variants:?}"), name)
            })
    }
}
