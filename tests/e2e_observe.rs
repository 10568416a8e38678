//! End-to-end tests for property and graph notifications.

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use talipot_core::{
    DoubleKind, Event, EventTarget, Graph, GraphEventKind, GraphId, IntegerKind, Phase, PropertyInterface,
};

fn recorder() -> (Arc<Mutex<Vec<Event>>>, impl Fn(&Event) + Send + Sync + 'static) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    (log, move |e: &Event| sink.lock().push(e.clone()))
}

// ============================================================================
// 1. Property events
// ============================================================================

#[test]
fn test_hold_batches_observer_delivery() {
    let graph = Graph::new();
    let n = graph.add_node().unwrap();
    let weight = graph.typed_property::<DoubleKind>("weight").unwrap();

    let batches = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&batches);
    let _observer = weight.observe(move |events| sink.lock().push(events.len()));
    let listened = Arc::new(Mutex::new(0usize));
    let count = Arc::clone(&listened);
    let _listener = weight.listen(move |_| *count.lock() += 1);

    {
        let _hold = graph.hold_observers();
        for i in 0..1000 {
            weight.set_node_value(n, f64::from(i));
        }
        assert!(batches.lock().is_empty());
    }

    assert_eq!(*batches.lock(), vec![1000]);
    assert_eq!(*listened.lock(), 2000);
    assert_eq!(weight.node_value(n), 999.0);
}

#[test]
fn test_before_and_after_events_in_order() {
    let graph = Graph::new();
    let n = graph.add_node().unwrap();
    let degree = graph.typed_property::<IntegerKind>("degree").unwrap();
    let (log, listener) = recorder();
    let _sub = degree.listen(listener);

    degree.set_node_value(n, 1);
    degree.set_all_node_value(2);
    degree.set_node_default_value(3);

    let seen: Vec<(EventTarget, Phase)> =
        log.lock().iter().filter_map(|e| e.as_property()).map(|e| (e.target, e.phase)).collect();
    assert_eq!(
        seen,
        vec![
            (EventTarget::Node(n), Phase::Before),
            (EventTarget::Node(n), Phase::After),
            (EventTarget::AllNodes, Phase::Before),
            (EventTarget::AllNodes, Phase::After),
            (EventTarget::NodeDefault, Phase::Before),
            (EventTarget::NodeDefault, Phase::After),
        ]
    );
}

#[test]
fn test_events_only_for_graph_elements() {
    let graph = Graph::new();
    let (a, b) = (graph.add_node().unwrap(), graph.add_node().unwrap());
    let sub = graph.add_subgraph("sub").unwrap();
    sub.add_existing_node(a).unwrap();
    let local = sub.local_property::<IntegerKind>("degree").unwrap();
    let (log, listener) = recorder();
    let _sub = local.listen(listener);

    local.set_node_value(a, 1);
    local.set_node_value(b, 1);

    assert_eq!(log.lock().len(), 2);
    assert_eq!(local.non_default_nodes(), vec![a]);
}

#[test]
fn test_dropped_subscription_stops_delivery() {
    let graph = Graph::new();
    let n = graph.add_node().unwrap();
    let degree = graph.typed_property::<IntegerKind>("degree").unwrap();
    let (log, listener) = recorder();
    let sub = degree.listen(listener);
    degree.set_node_value(n, 1);
    drop(sub);
    degree.set_node_value(n, 2);
    assert_eq!(log.lock().len(), 2);
}

// ============================================================================
// 2. Graph events
// ============================================================================

#[test]
fn test_property_registry_events() {
    let graph = Graph::new();
    let sub = graph.add_subgraph("sub").unwrap();
    let (root_log, root_listener) = recorder();
    let (sub_log, sub_listener) = recorder();
    let _r = graph.listen(root_listener);
    let _s = sub.listen(sub_listener);

    let p = graph.typed_property::<DoubleKind>("weight").unwrap();
    assert!(p.rename("w"));
    assert!(graph.delete_local_property("w"));

    let root_kinds: Vec<GraphEventKind> =
        root_log.lock().iter().filter_map(|e| e.as_graph()).map(|e| e.kind.clone()).collect();
    assert_eq!(
        root_kinds,
        vec![
            GraphEventKind::AddLocalProperty("weight".into()),
            GraphEventKind::BeforeRenameLocalProperty { old: "weight".into(), new: "w".into() },
            GraphEventKind::AfterRenameLocalProperty { old: "weight".into(), new: "w".into() },
            GraphEventKind::BeforeDelLocalProperty("w".into()),
            GraphEventKind::AfterDelLocalProperty("w".into()),
        ]
    );

    let sub_kinds: Vec<GraphEventKind> =
        sub_log.lock().iter().filter_map(|e| e.as_graph()).map(|e| e.kind.clone()).collect();
    assert_eq!(
        sub_kinds,
        vec![
            GraphEventKind::AddInheritedProperty("weight".into()),
            GraphEventKind::BeforeDelInheritedProperty("weight".into()),
            GraphEventKind::AfterDelInheritedProperty("weight".into()),
            GraphEventKind::AddInheritedProperty("w".into()),
            GraphEventKind::BeforeDelInheritedProperty("w".into()),
            GraphEventKind::AfterDelInheritedProperty("w".into()),
        ]
    );
}

fn graph_kinds(log: &Mutex<Vec<Event>>) -> Vec<GraphEventKind> {
    log.lock().iter().filter_map(|e| e.as_graph()).map(|e| e.kind.clone()).collect()
}

#[test]
fn test_rename_uncovers_ancestor_property() {
    let graph = Graph::new();
    let sub = graph.add_subgraph("sub").unwrap();
    let leaf = sub.add_subgraph("leaf").unwrap();
    graph.typed_property::<IntegerKind>("a").unwrap();
    let local = sub.local_property::<DoubleKind>("a").unwrap();

    let (sub_log, sub_listener) = recorder();
    let (leaf_log, leaf_listener) = recorder();
    let _s = sub.listen(sub_listener);
    let _l = leaf.listen(leaf_listener);

    assert!(local.rename("b"));
    assert_eq!(
        graph_kinds(&sub_log),
        vec![
            GraphEventKind::BeforeRenameLocalProperty { old: "a".into(), new: "b".into() },
            GraphEventKind::AddInheritedProperty("a".into()),
            GraphEventKind::AfterRenameLocalProperty { old: "a".into(), new: "b".into() },
        ]
    );
    assert_eq!(
        graph_kinds(&leaf_log),
        vec![
            GraphEventKind::BeforeDelInheritedProperty("a".into()),
            GraphEventKind::AfterDelInheritedProperty("a".into()),
            GraphEventKind::AddInheritedProperty("a".into()),
            GraphEventKind::AddInheritedProperty("b".into()),
        ]
    );
    assert_eq!(leaf.property("a").map(|p| p.typename()), Some("int"));
    assert_eq!(leaf.property("b").map(|p| p.typename()), Some("double"));
}

#[test]
fn test_shadowing_announced_to_sub_graph() {
    let graph = Graph::new();
    let sub = graph.add_subgraph("sub").unwrap();
    graph.typed_property::<IntegerKind>("a").unwrap();
    let (log, listener) = recorder();
    let _s = sub.listen(listener);

    sub.local_property::<IntegerKind>("a").unwrap();
    assert!(sub.delete_local_property("a"));
    assert_eq!(
        graph_kinds(&log),
        vec![
            GraphEventKind::BeforeDelInheritedProperty("a".into()),
            GraphEventKind::AfterDelInheritedProperty("a".into()),
            GraphEventKind::AddLocalProperty("a".into()),
            GraphEventKind::BeforeDelLocalProperty("a".into()),
            GraphEventKind::AfterDelLocalProperty("a".into()),
            GraphEventKind::AddInheritedProperty("a".into()),
        ]
    );
}

#[test]
fn test_pop_propagates_inherited_events() {
    let graph = Graph::new();
    let sub = graph.add_subgraph("sub").unwrap();
    let (log, listener) = recorder();
    let _s = sub.listen(listener);

    graph.push();
    graph.typed_property::<DoubleKind>("weight").unwrap();
    graph.pop().unwrap();
    graph.unpop().unwrap();

    graph.push();
    assert!(graph.delete_local_property("weight"));
    graph.pop().unwrap();

    assert_eq!(
        graph_kinds(&log),
        vec![
            GraphEventKind::AddInheritedProperty("weight".into()),
            GraphEventKind::AfterDelInheritedProperty("weight".into()),
            GraphEventKind::AddInheritedProperty("weight".into()),
            GraphEventKind::BeforeDelInheritedProperty("weight".into()),
            GraphEventKind::AfterDelInheritedProperty("weight".into()),
            GraphEventKind::AddInheritedProperty("weight".into()),
        ]
    );
    assert!(sub.exist_property("weight"));
}

#[test]
fn test_element_events() {
    let graph = Graph::new();
    let (log, listener) = recorder();
    let _sub = graph.listen(listener);

    let a = graph.add_node().unwrap();
    let b = graph.add_node().unwrap();
    let e = graph.add_edge(a, b).unwrap();
    graph.delete_node(a).unwrap();
    let child = graph.add_subgraph("child").unwrap();

    let kinds: Vec<GraphEventKind> = log.lock().iter().filter_map(|e| e.as_graph()).map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            GraphEventKind::AddNode(a),
            GraphEventKind::AddNode(b),
            GraphEventKind::AddEdge(e),
            GraphEventKind::DelEdge(e),
            GraphEventKind::DelNode(a),
            GraphEventKind::AddSubgraph(child.id()),
        ]
    );
    assert_ne!(child.id(), GraphId::ROOT);
}

#[test]
fn test_nested_notification_depth_is_bounded() {
    let graph = Graph::with_config(talipot_core::GraphConfig { max_notification_depth: 5, ..Default::default() });
    let n = graph.add_node().unwrap();
    let degree = graph.typed_property::<IntegerKind>("degree").unwrap();
    let weak = Arc::downgrade(&degree);
    let calls = Arc::new(Mutex::new(0usize));
    let count = Arc::clone(&calls);
    let _sub = degree.listen(move |e| {
        if e.as_property().is_some_and(|p| p.phase == Phase::After) {
            *count.lock() += 1;
            if let Some(p) = weak.upgrade() {
                p.set_node_value(n, p.node_value(n) + 1);
            }
        }
    });

    degree.set_node_value(n, 1);
    assert!(*calls.lock() <= 5);
    assert!(degree.node_value(n) > 1);
    assert_eq!(degree.name(), "degree");
}
