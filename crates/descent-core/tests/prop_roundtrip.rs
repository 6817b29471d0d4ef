//! Property-based round-trip tests.
//!
//! Two invariants are exercised with random inputs:
//!
//! - rendering a [`Value`] tree to text and re-parsing that text yields a
//!   structurally equal tree;
//! - encoding a typed value into a tree and decoding it back yields an equal
//!   value.
//!
//! Literal strategies are constrained to texts the canonical renderer can
//! emit (numbers and booleans); arbitrary literal texts could contain
//! structural delimiters and are unrepresentable by construction.

mod common;

use std::collections::BTreeMap;

use common::Payload;
use descent_core::{parse, read_tree, write_tree, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_literal() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| Value::literal(n.to_string())),
        (-1.0e9f64..1.0e9f64).prop_map(|f| Value::literal(f.to_string())),
        any::<bool>().prop_map(|b| Value::literal(b.to_string())),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        arb_literal(),
        any::<String>().prop_map(Value::string),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((any::<String>(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn arb_payload() -> impl Strategy<Value = Payload> {
    (any::<i64>(), any::<i64>(), any::<String>()).prop_map(|(from, to, msg)| Payload {
        from,
        to,
        msg,
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn render_reparse_is_idempotent(value in arb_value()) {
        let text = value.to_string();
        let reparsed = parse(&text).unwrap();
        prop_assert_eq!(reparsed, value);
    }

    #[test]
    fn record_roundtrips_through_tree(payload in arb_payload()) {
        let tree = write_tree(&payload).unwrap();
        let back: Payload = read_tree(&tree).unwrap();
        prop_assert_eq!(back, payload);
    }

    #[test]
    fn map_roundtrips_through_tree(map in prop::collection::btree_map(any::<String>(), any::<i64>(), 0..8)) {
        let tree = write_tree(&map).unwrap();
        let back: BTreeMap<String, i64> = read_tree(&tree).unwrap();
        prop_assert_eq!(back, map);
    }

    #[test]
    fn list_roundtrips_through_tree(list in prop::collection::vec(any::<i64>(), 0..16)) {
        let tree = write_tree(&list).unwrap();
        let back: Vec<i64> = read_tree(&tree).unwrap();
        prop_assert_eq!(back, list);
    }
}
