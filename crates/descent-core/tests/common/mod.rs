//! Shared fixture types with hand-written descriptors and codecs.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use descent_core::{
    decode_nullable, encode_nullable, Decode, Descriptor, Encode, Error, Result, StructuredInput,
    StructuredOutput,
};

// ============================================================================
// Payload / Event
// ============================================================================

pub static PAYLOAD: Descriptor = Descriptor::record("Payload", &["from", "to", "msg"]);

#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub from: i64,
    pub to: i64,
    pub msg: String,
}

impl Encode for Payload {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let mut writer = output.write_begin(&PAYLOAD)?;
        if writer.write_element(&PAYLOAD, 0)? {
            self.from.encode(writer.as_mut())?;
        }
        if writer.write_element(&PAYLOAD, 1)? {
            self.to.encode(writer.as_mut())?;
        }
        if writer.write_element(&PAYLOAD, 2)? {
            self.msg.encode(writer.as_mut())?;
        }
        writer.write_finished(&PAYLOAD)
    }
}

impl Decode for Payload {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&PAYLOAD)?;
        let mut from = None;
        let mut to = None;
        let mut msg = None;
        while let Some(index) = reader.read_element(&PAYLOAD)? {
            match index {
                0 => from = Some(i64::decode(reader.as_mut())?),
                1 => to = Some(i64::decode(reader.as_mut())?),
                2 => msg = Some(String::decode(reader.as_mut())?),
                _ => unreachable!(),
            }
        }
        Ok(Payload {
            from: from.ok_or_else(|| Error::missing_field("from"))?,
            to: to.ok_or_else(|| Error::missing_field("to"))?,
            msg: msg.ok_or_else(|| Error::missing_field("msg"))?,
        })
    }
}

pub static EVENT: Descriptor = Descriptor::record("Event", &["id", "payload", "timestamp"]);

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i32,
    pub payload: Payload,
    pub timestamp: i64,
}

impl Encode for Event {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let mut writer = output.write_begin(&EVENT)?;
        if writer.write_element(&EVENT, 0)? {
            self.id.encode(writer.as_mut())?;
        }
        if writer.write_element(&EVENT, 1)? {
            self.payload.encode(writer.as_mut())?;
        }
        if writer.write_element(&EVENT, 2)? {
            self.timestamp.encode(writer.as_mut())?;
        }
        writer.write_finished(&EVENT)
    }
}

impl Decode for Event {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&EVENT)?;
        let mut id = None;
        let mut payload = None;
        let mut timestamp = None;
        while let Some(index) = reader.read_element(&EVENT)? {
            match index {
                0 => id = Some(i32::decode(reader.as_mut())?),
                1 => payload = Some(Payload::decode(reader.as_mut())?),
                2 => timestamp = Some(i64::decode(reader.as_mut())?),
                _ => unreachable!(),
            }
        }
        Ok(Event {
            id: id.ok_or_else(|| Error::missing_field("id"))?,
            payload: payload.ok_or_else(|| Error::missing_field("payload"))?,
            timestamp: timestamp.ok_or_else(|| Error::missing_field("timestamp"))?,
        })
    }
}

// ============================================================================
// Enum travelling as its variant name
// ============================================================================

pub static COLOR_VARIANTS: &[&str] = &["Red", "Green", "Blue"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    fn variant_name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Green => "Green",
            Color::Blue => "Blue",
        }
    }
}

impl Encode for Color {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let tag = output.current_tag();
        output.write_tagged_enum(&tag, self.variant_name())
    }
}

impl Decode for Color {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let tag = input.current_tag();
        match input.read_tagged_enum(&tag, COLOR_VARIANTS)? {
            0 => Ok(Color::Red),
            1 => Ok(Color::Green),
            _ => Ok(Color::Blue),
        }
    }
}

pub static COLOR_HOLDER: Descriptor = Descriptor::record("ColorHolder", &["color"]);

#[derive(Debug, Clone, PartialEq)]
pub struct ColorHolder {
    pub color: Color,
}

impl Decode for ColorHolder {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&COLOR_HOLDER)?;
        let mut color = None;
        while let Some(index) = reader.read_element(&COLOR_HOLDER)? {
            match index {
                0 => color = Some(Color::decode(reader.as_mut())?),
                _ => unreachable!(),
            }
        }
        Ok(ColorHolder {
            color: color.ok_or_else(|| Error::missing_field("color"))?,
        })
    }
}

// ============================================================================
// Sealed variant decoded by probing which declared element is present
// ============================================================================

pub static EITHER: Descriptor = Descriptor::new(
    "DummyEither",
    descent_core::Kind::Sealed,
    &["error"],
);

#[derive(Debug, Clone, PartialEq)]
pub enum DummyEither {
    Left(String),
    Right(Payload),
}

impl Decode for DummyEither {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        {
            let mut probe = input.read_begin(&EITHER)?;
            if let Some(0) = probe.read_element(&EITHER)? {
                let tag = probe.current_tag();
                return Ok(DummyEither::Left(probe.read_tagged_string(&tag)?));
            }
        }
        Ok(DummyEither::Right(Payload::decode(input)?))
    }
}

pub static EVENT2: Descriptor = Descriptor::record("Event2", &["id", "payload", "timestamp"]);

#[derive(Debug, Clone, PartialEq)]
pub struct Event2 {
    pub id: i32,
    pub payload: DummyEither,
    pub timestamp: i64,
}

impl Decode for Event2 {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&EVENT2)?;
        let mut id = None;
        let mut payload = None;
        let mut timestamp = None;
        while let Some(index) = reader.read_element(&EVENT2)? {
            match index {
                0 => id = Some(i32::decode(reader.as_mut())?),
                1 => payload = Some(DummyEither::decode(reader.as_mut())?),
                2 => timestamp = Some(i64::decode(reader.as_mut())?),
                _ => unreachable!(),
            }
        }
        Ok(Event2 {
            id: id.ok_or_else(|| Error::missing_field("id"))?,
            payload: payload.ok_or_else(|| Error::missing_field("payload"))?,
            timestamp: timestamp.ok_or_else(|| Error::missing_field("timestamp"))?,
        })
    }
}

// ============================================================================
// Optional-field pairs
// ============================================================================

pub static PAIR: Descriptor = Descriptor::record("Pair", &["a", "b"]);

/// Both fields fall back to their defaults when the source omits them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairLoose {
    pub a: i32,
    pub b: i32,
}

impl Decode for PairLoose {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&PAIR)?;
        let mut pair = PairLoose::default();
        while let Some(index) = reader.read_element(&PAIR)? {
            match index {
                0 => pair.a = i32::decode(reader.as_mut())?,
                1 => pair.b = i32::decode(reader.as_mut())?,
                _ => unreachable!(),
            }
        }
        Ok(pair)
    }
}

/// `b` is required.
#[derive(Debug, Clone, PartialEq)]
pub struct PairStrict {
    pub a: i32,
    pub b: i32,
}

impl Decode for PairStrict {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&PAIR)?;
        let mut a = None;
        let mut b = None;
        while let Some(index) = reader.read_element(&PAIR)? {
            match index {
                0 => a = Some(i32::decode(reader.as_mut())?),
                1 => b = Some(i32::decode(reader.as_mut())?),
                _ => unreachable!(),
            }
        }
        Ok(PairStrict {
            a: a.ok_or_else(|| Error::missing_field("a"))?,
            b: b.ok_or_else(|| Error::missing_field("b"))?,
        })
    }
}

// ============================================================================
// Nullable holder — present-null decodes, absence is an error
// ============================================================================

pub static HOLDER: Descriptor = Descriptor::record("Holder", &["x"]);

#[derive(Debug, Clone, PartialEq)]
pub struct Holder {
    pub x: Option<i32>,
}

impl Decode for Holder {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&HOLDER)?;
        let mut seen = false;
        let mut x = None;
        while let Some(index) = reader.read_element(&HOLDER)? {
            match index {
                0 => {
                    seen = true;
                    x = decode_nullable::<i32>(reader.as_mut())?;
                }
                _ => unreachable!(),
            }
        }
        if !seen {
            return Err(Error::missing_field("x"));
        }
        Ok(Holder { x })
    }
}

// ============================================================================
// Recursive tree
// ============================================================================

pub static TREE: Descriptor = Descriptor::record("Tree", &["name", "left", "right"]);

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub name: String,
    pub left: Option<Box<Tree>>,
    pub right: Option<Box<Tree>>,
}

impl Tree {
    pub fn leaf(name: &str) -> Tree {
        Tree {
            name: name.to_string(),
            left: None,
            right: None,
        }
    }

    pub fn node(name: &str, left: Option<Tree>, right: Option<Tree>) -> Tree {
        Tree {
            name: name.to_string(),
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }
}

impl Encode for Tree {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let mut writer = output.write_begin(&TREE)?;
        if writer.write_element(&TREE, 0)? {
            self.name.encode(writer.as_mut())?;
        }
        if writer.write_element(&TREE, 1)? {
            encode_nullable(self.left.as_ref(), writer.as_mut())?;
        }
        if writer.write_element(&TREE, 2)? {
            encode_nullable(self.right.as_ref(), writer.as_mut())?;
        }
        writer.write_finished(&TREE)
    }
}

impl Decode for Tree {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&TREE)?;
        let mut name = None;
        let mut left = None;
        let mut right = None;
        while let Some(index) = reader.read_element(&TREE)? {
            match index {
                0 => name = Some(String::decode(reader.as_mut())?),
                1 => left = decode_nullable::<Box<Tree>>(reader.as_mut())?,
                2 => right = decode_nullable::<Box<Tree>>(reader.as_mut())?,
                _ => unreachable!(),
            }
        }
        Ok(Tree {
            name: name.ok_or_else(|| Error::missing_field("name"))?,
            left,
            right,
        })
    }
}

// ============================================================================
// The zoo — every primitive width plus collection shapes in one record
// ============================================================================

pub static ZOO: Descriptor = Descriptor::record(
    "Zoo",
    &[
        "b", "s", "i", "l", "f", "d", "flag", "c", "name", "color", "opt", "list", "set", "map",
        "nested",
    ],
);

#[derive(Debug, Clone, PartialEq)]
pub struct Zoo {
    pub b: i8,
    pub s: i16,
    pub i: i32,
    pub l: i64,
    pub f: f32,
    pub d: f64,
    pub flag: bool,
    pub c: char,
    pub name: String,
    pub color: Color,
    pub opt: Option<i32>,
    pub list: Vec<i64>,
    pub set: BTreeSet<i32>,
    pub map: BTreeMap<String, String>,
    pub nested: Payload,
}

pub fn sample_zoo() -> Zoo {
    Zoo {
        b: -7,
        s: 2600,
        i: 100500,
        l: -42_000_000_000,
        f: 10.5,
        d: 2.25,
        flag: true,
        c: 'z',
        name: "zoo \"keeper\"".to_string(),
        color: Color::Green,
        opt: Some(99),
        list: vec![1, 1, 2, 3, 5],
        set: BTreeSet::from([3, 1, 4]),
        map: BTreeMap::from([
            ("one".to_string(), "uno".to_string()),
            ("two".to_string(), "dos".to_string()),
        ]),
        nested: Payload {
            from: 42,
            to: 43,
            msg: "Hello world".to_string(),
        },
    }
}

impl Encode for Zoo {
    fn encode(&self, output: &mut dyn StructuredOutput) -> Result<()> {
        let mut writer = output.write_begin(&ZOO)?;
        if writer.write_element(&ZOO, 0)? {
            self.b.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 1)? {
            self.s.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 2)? {
            self.i.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 3)? {
            self.l.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 4)? {
            self.f.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 5)? {
            self.d.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 6)? {
            self.flag.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 7)? {
            self.c.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 8)? {
            self.name.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 9)? {
            self.color.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 10)? {
            encode_nullable(self.opt.as_ref(), writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 11)? {
            self.list.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 12)? {
            self.set.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 13)? {
            self.map.encode(writer.as_mut())?;
        }
        if writer.write_element(&ZOO, 14)? {
            self.nested.encode(writer.as_mut())?;
        }
        writer.write_finished(&ZOO)
    }
}

impl Decode for Zoo {
    fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
        let mut reader = input.read_begin(&ZOO)?;
        let mut zoo = Zoo {
            b: 0,
            s: 0,
            i: 0,
            l: 0,
            f: 0.0,
            d: 0.0,
            flag: false,
            c: '\0',
            name: String::new(),
            color: Color::Red,
            opt: None,
            list: Vec::new(),
            set: BTreeSet::new(),
            map: BTreeMap::new(),
            nested: Payload {
                from: 0,
                to: 0,
                msg: String::new(),
            },
        };
        while let Some(index) = reader.read_element(&ZOO)? {
            match index {
                0 => zoo.b = i8::decode(reader.as_mut())?,
                1 => zoo.s = i16::decode(reader.as_mut())?,
                2 => zoo.i = i32::decode(reader.as_mut())?,
                3 => zoo.l = i64::decode(reader.as_mut())?,
                4 => zoo.f = f32::decode(reader.as_mut())?,
                5 => zoo.d = f64::decode(reader.as_mut())?,
                6 => zoo.flag = bool::decode(reader.as_mut())?,
                7 => zoo.c = char::decode(reader.as_mut())?,
                8 => zoo.name = String::decode(reader.as_mut())?,
                9 => zoo.color = Color::decode(reader.as_mut())?,
                10 => zoo.opt = decode_nullable::<i32>(reader.as_mut())?,
                11 => zoo.list = Vec::decode(reader.as_mut())?,
                12 => zoo.set = BTreeSet::decode(reader.as_mut())?,
                13 => zoo.map = BTreeMap::decode(reader.as_mut())?,
                14 => zoo.nested = Payload::decode(reader.as_mut())?,
                _ => unreachable!(),
            }
        }
        Ok(zoo)
    }
}
