//! `Encode`/`Decode` drivers: the layer that walks a type's descriptor and
//! steers a backend through the traversal protocol.
//!
//! User types implement both traits by hand against a `static`
//! [`Descriptor`]; primitives and the std collections below come built in.
//! Collection encoders emit the reserved size pseudo-element first — tree
//! backends suppress it through
//! [`write_element`](StructuredOutput::write_element).

use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::{self, Descriptor, KEY_INDEX, SIZE_INDEX, VALUE_INDEX};
use crate::error::{Error, Result};
use crate::protocol::{StructuredInput, StructuredOutput};

/// A value that can drive a [`StructuredOutput`].
pub trait Encode {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()>;
}

/// A value that can be rebuilt from a [`StructuredInput`].
pub trait Decode: Sized {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self>;
}

/// Encode an optional field value; an absent value writes an explicit null.
pub fn encode_nullable<T: Encode>(
    value: Option<&T>,
    output: &mut dyn StructuredOutput,
) -> Result<()> {
    match value {
        Some(value) => value.encode(output),
        None => {
            let tag = output.current_tag();
            output.write_tagged_null(&tag)
        }
    }
}

/// Decode an optional field value via the not-null mark.
pub fn decode_nullable<T: Decode>(input: &mut dyn StructuredInput) -> Result<Option<T>> {
    let tag = input.current_tag();
    if input.read_tagged_not_null_mark(&tag)? {
        Ok(Some(T::decode(input)?))
    } else {
        Ok(None)
    }
}

macro_rules! primitive_codec {
    ($ty:ty, $write:ident, $read:ident) => {
        impl Encode for $ty {
            fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
                let tag = output.current_tag();
                output.$write(&tag, *self)
            }
        }

        impl Decode for $ty {
            fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
                let tag = input.current_tag();
                input.$read(&tag)
            }
        }
    };
}

primitive_codec!(bool, write_tagged_bool, read_tagged_bool);
primitive_codec!(i8, write_tagged_i8, read_tagged_i8);
primitive_codec!(i16, write_tagged_i16, read_tagged_i16);
primitive_codec!(i32, write_tagged_i32, read_tagged_i32);
primitive_codec!(i64, write_tagged_i64, read_tagged_i64);
primitive_codec!(f32, write_tagged_f32, read_tagged_f32);
primitive_codec!(f64, write_tagged_f64, read_tagged_f64);
primitive_codec!(char, write_tagged_char, read_tagged_char);

impl Encode for str {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let tag = output.current_tag();
        output.write_tagged_string(&tag, self)
    }
}

impl Encode for String {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let tag = output.current_tag();
        output.write_tagged_string(&tag, self)
    }
}

impl Decode for String {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let tag = input.current_tag();
        input.read_tagged_string(&tag)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        (**self).encode(output)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        T::decode(input).map(Box::new)
    }
}

fn encode_sequence<'a, T, I>(
    desc: &Descriptor,
    items: I,
    len: usize,
    output: &mut dyn StructuredOutput,
) -> Result<()>
where
    T: Encode + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut writer = output.write_begin(desc)?;
    if writer.write_element(desc, SIZE_INDEX)? {
        let tag = writer.current_tag();
        writer.write_tagged_i64(&tag, len as i64)?;
    }
    for (i, item) in items.enumerate() {
        if writer.write_element(desc, i + 1)? {
            item.encode(writer.as_mut())?;
        }
    }
    writer.write_finished(desc)
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        encode_sequence(&descriptor::LIST, self.iter(), self.len(), output)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&descriptor::LIST)?;
        let mut items = Vec::new();
        while reader.read_element(&descriptor::LIST)?.is_some() {
            items.push(T::decode(reader.as_mut())?);
        }
        Ok(items)
    }
}

impl<T: Encode + Ord> Encode for BTreeSet<T> {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        encode_sequence(&descriptor::SET, self.iter(), self.len(), output)
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&descriptor::SET)?;
        let mut items = BTreeSet::new();
        while reader.read_element(&descriptor::SET)?.is_some() {
            items.insert(T::decode(reader.as_mut())?);
        }
        Ok(items)
    }
}

// Maps linearize to entry composites; keys must render as plain string tags.
impl<V: Encode> Encode for BTreeMap<String, V> {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let mut writer = output.write_begin(&descriptor::MAP)?;
        if writer.write_element(&descriptor::MAP, SIZE_INDEX)? {
            let tag = writer.current_tag();
            writer.write_tagged_i64(&tag, self.len() as i64)?;
        }
        for (i, (key, value)) in self.iter().enumerate() {
            if !writer.write_element(&descriptor::MAP, i + 1)? {
                continue;
            }
            let mut entry = writer.write_begin(&descriptor::MAP_ENTRY)?;
            if entry.write_element(&descriptor::MAP_ENTRY, KEY_INDEX)? {
                let tag = entry.current_tag();
                entry.write_tagged_string(&tag, key)?;
            }
            if entry.write_element(&descriptor::MAP_ENTRY, VALUE_INDEX)? {
                value.encode(entry.as_mut())?;
            }
            entry.write_finished(&descriptor::MAP_ENTRY)?;
        }
        writer.write_finished(&descriptor::MAP)
    }
}

impl<V: Decode> Decode for BTreeMap<String, V> {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&descriptor::MAP)?;
        let mut map = BTreeMap::new();
        while reader.read_element(&descriptor::MAP)?.is_some() {
            let mut entry = reader.read_begin(&descriptor::MAP_ENTRY)?;
            let mut key: Option<String> = None;
            let mut value: Option<V> = None;
            while let Some(index) = entry.read_element(&descriptor::MAP_ENTRY)? {
                match index {
                    KEY_INDEX => {
                        let tag = entry.current_tag();
                        key = Some(entry.read_tagged_string(&tag)?);
                    }
                    VALUE_INDEX => value = Some(V::decode(entry.as_mut())?),
                    other => {
                        return Err(Error::unexpected(
                            other.to_string(),
                            "entry key or value",
                            "extra entry element",
                        ))
                    }
                }
            }
            let key = key.ok_or_else(|| Error::missing_field("key"))?;
            let value = value.ok_or_else(|| Error::missing_field("value"))?;
            map.insert(key, value);
        }
        Ok(map)
    }
}
