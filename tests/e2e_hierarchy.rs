//! End-to-end tests for sub-graphs and property inheritance.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use talipot_core::{DoubleKind, Graph, IntegerKind, PropertyInterface};

fn names(properties: &[Arc<dyn PropertyInterface>]) -> Vec<String> {
    properties.iter().map(|p| p.name()).collect()
}

// ============================================================================
// 1. Inheritance
// ============================================================================

#[test]
fn test_sub_graph_sees_ancestor_property() {
    let graph = Graph::new();
    let n = graph.add_node().unwrap();
    let sub = graph.add_subgraph("sub").unwrap();
    let leaf = sub.add_subgraph("leaf").unwrap();
    leaf.add_existing_node(n).unwrap_err();
    sub.add_existing_node(n).unwrap();
    leaf.add_existing_node(n).unwrap();

    let weight = graph.typed_property::<DoubleKind>("weight").unwrap();
    weight.set_node_value(n, 3.0);

    let inherited = leaf.typed_property::<DoubleKind>("weight").unwrap();
    assert_eq!(inherited.id(), weight.id());
    assert_eq!(inherited.node_value(n), 3.0);
    assert!(leaf.exist_property("weight"));
    assert!(!leaf.exist_local_property("weight"));
    assert_eq!(names(&leaf.inherited_properties()), vec!["weight"]);
    assert_eq!(inherited.graph().map(|g| g.id()), Some(graph.id()));
}

#[test]
fn test_local_property_shadows_inherited() {
    let graph = Graph::new();
    let sub = graph.add_subgraph("sub").unwrap();
    let root_degree = graph.typed_property::<IntegerKind>("degree").unwrap();
    graph.typed_property::<DoubleKind>("weight").unwrap();

    let local = sub.local_property::<IntegerKind>("degree").unwrap();
    assert_ne!(local.id(), root_degree.id());
    assert_eq!(sub.property("degree").map(|p| p.id()), Some(local.id()));
    assert_eq!(names(&sub.local_properties()), vec!["degree"]);
    assert_eq!(names(&sub.inherited_properties()), vec!["weight"]);
    assert_eq!(names(&sub.properties()), vec!["degree", "weight"]);

    assert!(sub.delete_local_property("degree"));
    assert_eq!(sub.property("degree").map(|p| p.id()), Some(root_degree.id()));
}

#[test]
fn test_type_conflict_with_inherited_property() {
    let graph = Graph::new();
    let sub = graph.add_subgraph("sub").unwrap();
    graph.typed_property::<IntegerKind>("degree").unwrap();
    assert!(sub.typed_property::<DoubleKind>("degree").is_err());
    assert!(sub.local_property::<DoubleKind>("degree").is_ok());
}

// ============================================================================
// 2. Membership
// ============================================================================

#[test]
fn test_sub_graph_elements_propagate_up() {
    let graph = Graph::new();
    let sub = graph.add_subgraph("sub").unwrap();
    let leaf = sub.add_subgraph("leaf").unwrap();
    let (a, b) = (leaf.add_node().unwrap(), leaf.add_node().unwrap());
    let e = leaf.add_edge(a, b).unwrap();

    for g in [&graph, &sub, &leaf] {
        assert_eq!(g.nodes(), vec![a, b]);
        assert_eq!(g.edges(), vec![e]);
    }
    assert!(leaf.is_descendant_of(&graph));
    assert_eq!(leaf.root(), graph);
    assert_eq!(graph.subgraphs(), vec![sub.clone()]);
}

#[test]
fn test_add_existing_edge_brings_its_ends() {
    let graph = Graph::new();
    let (a, b) = (graph.add_node().unwrap(), graph.add_node().unwrap());
    let e = graph.add_edge(a, b).unwrap();
    let sub = graph.add_subgraph("sub").unwrap();

    sub.add_existing_edge(e).unwrap();
    assert_eq!(sub.nodes(), vec![a, b]);
    assert_eq!(sub.ends(e), Some((a, b)));
}

#[test]
fn test_sub_graph_deletion_keeps_values() {
    let graph = Graph::new();
    let n = graph.add_node().unwrap();
    let sub = graph.add_subgraph("sub").unwrap();
    sub.add_existing_node(n).unwrap();
    let weight = graph.typed_property::<DoubleKind>("weight").unwrap();
    weight.set_node_value(n, 5.0);

    sub.delete_node(n).unwrap();
    assert!(!sub.is_node(n));
    assert!(graph.is_node(n));
    assert_eq!(weight.node_value(n), 5.0);
}
