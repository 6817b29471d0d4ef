//! # descent-config
//!
//! Hierarchical-configuration backend for the descent traversal protocol.
//!
//! A [`Config`] is an already-parsed configuration tree — this crate takes
//! no part in parsing configuration syntax. Reads resolve against the source
//! through composed dotted paths, and every diagnostic names the offending
//! path together with the configuration's origin.
//!
//! ## Quick start
//!
//! ```rust
//! use descent_config::{read_config, Config};
//! use std::collections::BTreeMap;
//!
//! let doc = serde_json::json!({"limits": {"one": 1, "two": 2}});
//! let config = Config::from_json(&doc, "application.conf");
//!
//! #[derive(Debug, PartialEq)]
//! struct Limits {
//!     limits: BTreeMap<String, i64>,
//! }
//! # use descent_core::{Decode, Descriptor, Result, StructuredInput};
//! # static LIMITS: Descriptor = Descriptor::record("Limits", &["limits"]);
//! # impl Decode for Limits {
//! #     fn decode(input: &mut dyn StructuredInput) -> Result<Self> {
//! #         let mut reader = input.read_begin(&LIMITS)?;
//! #         let mut limits = None;
//! #         while let Some(index) = reader.read_element(&LIMITS)? {
//! #             match index {
//! #                 0 => limits = Some(BTreeMap::decode(reader.as_mut())?),
//! #                 _ => unreachable!(),
//! #             }
//! #         }
//! #         Ok(Limits { limits: limits.unwrap_or_default() })
//! #     }
//! # }
//!
//! let decoded: Limits = read_config(&config).unwrap();
//! assert_eq!(decoded.limits["two"], 2);
//! ```

mod reader;
mod source;

pub use reader::read_config;
pub use source::{Config, ConfigValue};
