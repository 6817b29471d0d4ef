//! # descent-core
//!
//! Schema-driven structural serialization: one traversal protocol that lets
//! a typed value (records, lists, sets, maps, enums, nullable wrappers)
//! move between concrete representations without the traversal logic knowing
//! which representation it is talking to.
//!
//! A caller supplies a [`Descriptor`] per type plus hand-written
//! [`Encode`]/[`Decode`] drivers; the protocol recursively decomposes the
//! value into (tag, primitive) writes or rebuilds it from (tag, primitive)
//! reads, opening a fresh reader/writer per nested composite.
//!
//! ## Quick start
//!
//! ```rust
//! use descent_core::{parse, read_tree, write_tree};
//! use std::collections::BTreeMap;
//!
//! // Text → value tree
//! let tree = parse(r#"{"one": 1, "two": 2}"#).unwrap();
//!
//! // Value tree → typed value
//! let map: BTreeMap<String, i64> = read_tree(&tree).unwrap();
//! assert_eq!(map["one"], 1);
//!
//! // Typed value → value tree → canonical text
//! let back = write_tree(&map).unwrap();
//! assert_eq!(back, tree);
//! ```
//!
//! ## Modules
//!
//! - [`value`] — the immutable JSON value tree with canonical rendering
//! - [`parser`] — single-lookahead recursive-descent text parser
//! - [`descriptor`] — caller-supplied shape metadata
//! - [`protocol`] — the [`StructuredInput`]/[`StructuredOutput`] contracts
//! - [`codec`] — [`Encode`]/[`Decode`] drivers and std built-ins
//! - [`tree`] — reader/writer pair over [`Value`] trees
//! - [`dynamic`] — reader over an untyped host object graph
//! - [`coerce`] — shared literal-coercion rules
//! - [`error`] — error types for parse and decode failures
//!
//! Decoding is a synchronous depth-first descent; recursion depth equals the
//! nesting depth of the type being decoded, bounded only by stack capacity.

pub mod codec;
pub mod coerce;
pub mod descriptor;
pub mod dynamic;
pub mod error;
pub mod parser;
pub mod protocol;
pub mod tree;
pub mod value;

pub use codec::{decode_nullable, encode_nullable, Decode, Encode};
pub use descriptor::{Descriptor, Kind};
pub use dynamic::{read_dynamic, DynamicSource};
pub use error::{Error, Result};
pub use parser::parse;
pub use protocol::{StructuredInput, StructuredOutput, Tag};
pub use tree::{from_text, read_tree, write_tree};
pub use value::Value;
