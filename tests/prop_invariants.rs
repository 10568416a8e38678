//! Property-based checks for value storage, text conversion and undo.

use proptest::prelude::*;
use talipot_core::storage::ValueStore;
use talipot_core::{Color, Graph, IntegerKind, NodeId, PropertyInterface, PropertyValue, Vec3f};

#[derive(Debug, Clone)]
enum Op {
    Set(usize, i32),
    SetAll(i32),
    SetDefault(i32),
    Erase(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..6usize, -50..50i32).prop_map(|(n, v)| Op::Set(n, v)),
        (-50..50i32).prop_map(Op::SetAll),
        (-50..50i32).prop_map(Op::SetDefault),
        (0..6usize).prop_map(Op::Erase),
    ]
}

fn finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

fn round_trips<T: PropertyValue>(value: T) -> Result<(), TestCaseError> {
    let text = value.to_text();
    prop_assert_eq!(T::parse(&text), Some(value), "text was {:?}", text);
    Ok(())
}

proptest! {
    /// An id reads the default until it is written, then the written value.
    #[test]
    fn prop_store_default_until_set(
        default in -100..100i32,
        writes in prop::collection::vec((0..20u32, -100..100i32), 0..30),
    ) {
        let mut store = ValueStore::new(default);
        let mut expected = std::collections::HashMap::new();
        for (id, value) in &writes {
            store.set(NodeId(*id), *value);
            expected.insert(*id, *value);
        }
        for id in 0..20u32 {
            let want = expected.get(&id).copied().unwrap_or(default);
            prop_assert_eq!(*store.get(NodeId(id)), want);
        }
        for key in store.non_default_keys() {
            prop_assert_ne!(store.get(key), store.default_value());
        }
    }

    /// After `set_all` every id reads the new value and nothing is overridden.
    #[test]
    fn prop_store_set_all(
        writes in prop::collection::vec((0..20u32, -100..100i32), 0..30),
        value in -100..100i32,
    ) {
        let mut store = ValueStore::new(0);
        for (id, v) in writes {
            store.set(NodeId(id), v);
        }
        store.set_all(value);
        prop_assert!(!store.has_non_default_values());
        for id in 0..20u32 {
            prop_assert_eq!(*store.get(NodeId(id)), value);
        }
    }

    #[test]
    fn prop_scalar_text_round_trip(
        b in any::<bool>(),
        i in any::<i32>(),
        d in finite(),
        s in ".*",
        rgba in any::<[u8; 4]>(),
        xyz in (-1.0e6f32..1.0e6, -1.0e6f32..1.0e6, -1.0e6f32..1.0e6),
    ) {
        round_trips(b)?;
        round_trips(i)?;
        round_trips(d)?;
        round_trips(s)?;
        round_trips(Color::from_channels(rgba))?;
        round_trips(Vec3f::new(xyz.0, xyz.1, xyz.2))?;
    }

    #[test]
    fn prop_vector_text_round_trip(
        ints in prop::collection::vec(any::<i32>(), 0..8),
        doubles in prop::collection::vec(finite(), 0..8),
        strings in prop::collection::vec("[a-z ,()\"\\\\]{0,6}", 0..5),
    ) {
        round_trips(ints)?;
        round_trips(doubles)?;
        round_trips(strings)?;
    }

    /// Any sequence of writes between `push` and `pop` leaves no trace.
    #[test]
    fn prop_pop_restores_snapshot(
        setup in prop::collection::vec(op_strategy(), 0..8),
        ops in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let graph = Graph::new();
        let nodes = graph.add_nodes(6).unwrap();
        let degree = graph.typed_property::<IntegerKind>("degree").unwrap();
        let apply = |op: &Op| match *op {
            Op::Set(n, v) => degree.set_node_value(nodes[n], v),
            Op::SetAll(v) => degree.set_all_node_value(v),
            Op::SetDefault(v) => degree.set_node_default_value(v),
            Op::Erase(n) => degree.erase_node(nodes[n]),
        };
        setup.iter().for_each(apply);
        let snapshot = |d: &dyn PropertyInterface| {
            let values: Vec<String> = nodes.iter().map(|n| d.node_string_value(*n)).collect();
            (d.node_default_string_value(), values)
        };
        let before = snapshot(&*degree);

        graph.push();
        ops.iter().for_each(apply);
        graph.pop().unwrap();

        prop_assert_eq!(snapshot(&*degree), before);
    }
}
