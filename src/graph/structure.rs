//! Element membership, the sub-graph tree and the property registry.
//!
//! Every structural mutation is expressed as a [`Change`] and applied
//! through [`Structure::apply`] / [`Registry::apply`], forward when it
//! happens (or is re-applied by `unpop`), backward when a checkpoint is
//! popped.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use crate::model::{EdgeId, GraphId, NodeId};
use crate::observe::GraphEventKind;
use crate::property::PropertyHandle;
use crate::undo::{Change, IdCounters};
use crate::{Error, Result};

// ============================================================================
// Structure
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct GraphData {
    pub name: String,
    pub parent: Option<GraphId>,
    pub children: Vec<GraphId>,
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<EdgeId>,
}

impl GraphData {
    fn new(name: &str, parent: Option<GraphId>) -> Self {
        Self { name: name.to_owned(), parent, children: Vec::new(), nodes: BTreeSet::new(), edges: BTreeSet::new() }
    }
}

pub(crate) struct Structure {
    pub graphs: BTreeMap<GraphId, GraphData>,
    /// Ends of every edge of the root graph.
    pub ends: HashMap<EdgeId, (NodeId, NodeId)>,
    /// Next ids to hand out.
    pub counters: IdCounters,
}

impl Structure {
    pub fn new() -> Self {
        let mut graphs = BTreeMap::new();
        graphs.insert(GraphId::ROOT, GraphData::new("root", None));
        Self { graphs, ends: HashMap::new(), counters: IdCounters { node: 0, edge: 0, graph: 1 } }
    }

    pub fn graph(&self, g: GraphId) -> Result<&GraphData> {
        self.graphs.get(&g).ok_or_else(|| Error::NotFound(format!("graph {g}")))
    }

    pub fn contains_node(&self, g: GraphId, n: NodeId) -> bool {
        self.graphs.get(&g).is_some_and(|data| data.nodes.contains(&n))
    }

    pub fn contains_edge(&self, g: GraphId, e: EdgeId) -> bool {
        self.graphs.get(&g).is_some_and(|data| data.edges.contains(&e))
    }

    /// Root first, `g` last.
    pub fn lineage(&self, g: GraphId) -> Vec<GraphId> {
        let mut chain = Vec::new();
        let mut current = Some(g);
        while let Some(id) = current {
            chain.push(id);
            current = self.graphs.get(&id).and_then(|data| data.parent);
        }
        chain.reverse();
        chain
    }

    /// `g` and every graph below it, parents before children.
    pub fn descendants(&self, g: GraphId) -> Vec<GraphId> {
        let mut out = Vec::new();
        let mut stack = vec![g];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.graphs.get(&id) {
                out.push(id);
                stack.extend(data.children.iter().rev());
            }
        }
        out
    }

    /// Whether `g` lies strictly below `ancestor`.
    pub fn is_strict_descendant(&self, g: GraphId, ancestor: GraphId) -> bool {
        g != ancestor && self.lineage(g).contains(&ancestor)
    }

    pub fn incident_edges(&self, g: GraphId, n: NodeId) -> Vec<EdgeId> {
        let Some(data) = self.graphs.get(&g) else {
            return Vec::new();
        };
        data.edges
            .iter()
            .filter(|e| self.ends.get(*e).is_some_and(|(src, dst)| *src == n || *dst == n))
            .copied()
            .collect()
    }

    pub fn apply(&mut self, change: &Change, forward: bool) {
        match change {
            Change::NodeAdded { graph, node } => self.set_node(*graph, *node, forward),
            Change::NodeRemoved { graph, node } => self.set_node(*graph, *node, !forward),
            Change::EdgeAdded { graph, edge, ends } => self.set_edge(*graph, *edge, *ends, forward),
            Change::EdgeRemoved { graph, edge, ends } => self.set_edge(*graph, *edge, *ends, !forward),
            Change::SubgraphAdded { parent, child, name } => {
                if forward {
                    self.graphs.insert(*child, GraphData::new(name, Some(*parent)));
                    if let Some(data) = self.graphs.get_mut(parent) {
                        data.children.push(*child);
                    }
                } else {
                    self.graphs.remove(child);
                    if let Some(data) = self.graphs.get_mut(parent) {
                        data.children.retain(|c| c != child);
                    }
                }
            }
            Change::PropertyAdded { .. } | Change::PropertyRemoved { .. } | Change::PropertyRenamed { .. } => {}
        }
    }

    fn set_node(&mut self, g: GraphId, n: NodeId, present: bool) {
        if let Some(data) = self.graphs.get_mut(&g) {
            if present {
                data.nodes.insert(n);
            } else {
                data.nodes.remove(&n);
            }
        }
    }

    fn set_edge(&mut self, g: GraphId, e: EdgeId, ends: (NodeId, NodeId), present: bool) {
        if let Some(data) = self.graphs.get_mut(&g) {
            if present {
                data.edges.insert(e);
            } else {
                data.edges.remove(&e);
            }
        }
        if g == GraphId::ROOT {
            if present {
                self.ends.insert(e, ends);
            } else {
                self.ends.remove(&e);
            }
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Local properties of every graph of a hierarchy, by name.
#[derive(Default)]
pub(crate) struct Registry {
    pub locals: HashMap<GraphId, BTreeMap<String, PropertyHandle>>,
}

impl Registry {
    pub fn local(&self, g: GraphId, name: &str) -> Option<&PropertyHandle> {
        self.locals.get(&g)?.get(name)
    }

    pub fn has_local(&self, g: GraphId, name: &str) -> bool {
        self.local(g, name).is_some()
    }

    pub fn all(&self) -> Vec<PropertyHandle> {
        self.locals.values().flat_map(|m| m.values().cloned()).collect()
    }

    pub fn apply(&mut self, change: &Change, forward: bool) {
        match change {
            Change::PropertyAdded { graph, name, handle } => self.set_local(*graph, name, handle, forward),
            Change::PropertyRemoved { graph, name, handle } => self.set_local(*graph, name, handle, !forward),
            Change::PropertyRenamed { graph, old, new } => {
                let (from, to) = if forward { (old, new) } else { (new, old) };
                let Some(locals) = self.locals.get_mut(graph) else {
                    return;
                };
                if let Some(handle) = locals.remove(from) {
                    handle.journal.set_name(to);
                    locals.insert(to.clone(), handle);
                }
            }
            _ => {}
        }
    }

    /// Strict descendants of `g` that see its property `name` as inherited,
    /// i.e. are not shadowed by a local property of that name.
    pub fn heirs(&self, structure: &Structure, g: GraphId, name: &str) -> Vec<GraphId> {
        let mut out = Vec::new();
        let mut stack: Vec<GraphId> = structure.graphs.get(&g).map(|d| d.children.clone()).unwrap_or_default();
        while let Some(id) = stack.pop() {
            if self.has_local(id, name) {
                continue;
            }
            out.push(id);
            if let Some(data) = structure.graphs.get(&id) {
                stack.extend(data.children.iter().copied());
            }
        }
        out.sort_unstable();
        out
    }

    /// Nearest strict ancestor of `g` owning a local property `name`.
    pub fn ancestor_owning(&self, structure: &Structure, g: GraphId, name: &str) -> Option<GraphId> {
        let lineage = structure.lineage(g);
        lineage.iter().rev().skip(1).copied().find(|a| self.has_local(*a, name))
    }

    fn set_local(&mut self, g: GraphId, name: &str, handle: &PropertyHandle, present: bool) {
        if present {
            self.locals.entry(g).or_default().insert(name.to_owned(), handle.clone());
        } else if let Some(locals) = self.locals.get_mut(&g) {
            locals.remove(name);
        }
    }
}

/// Graph events announcing `change`, applied in the given direction.
///
/// Must be called once `change` is applied to both `structure` and
/// `registry`. Property changes are also announced to the descendants that
/// inherit the property, and to the graph itself when its local property
/// shadows or uncovers an ancestor's.
pub(crate) fn change_events(
    change: &Change,
    forward: bool,
    structure: &Structure,
    registry: &Registry,
) -> Vec<(GraphId, GraphEventKind)> {
    let mut out = Vec::new();
    match (change, forward) {
        (Change::NodeAdded { graph, node }, true) | (Change::NodeRemoved { graph, node }, false) => {
            out.push((*graph, GraphEventKind::AddNode(*node)));
        }
        (Change::NodeAdded { graph, node }, false) | (Change::NodeRemoved { graph, node }, true) => {
            out.push((*graph, GraphEventKind::DelNode(*node)));
        }
        (Change::EdgeAdded { graph, edge, .. }, true) | (Change::EdgeRemoved { graph, edge, .. }, false) => {
            out.push((*graph, GraphEventKind::AddEdge(*edge)));
        }
        (Change::EdgeAdded { graph, edge, .. }, false) | (Change::EdgeRemoved { graph, edge, .. }, true) => {
            out.push((*graph, GraphEventKind::DelEdge(*edge)));
        }
        (Change::PropertyAdded { graph, name, .. }, true) | (Change::PropertyRemoved { graph, name, .. }, false) => {
            property_appeared(&mut out, *graph, name, structure, registry);
            out.push((*graph, GraphEventKind::AddLocalProperty(name.clone())));
            for heir in registry.heirs(structure, *graph, name) {
                out.push((heir, GraphEventKind::AddInheritedProperty(name.clone())));
            }
        }
        (Change::PropertyAdded { graph, name, .. }, false) | (Change::PropertyRemoved { graph, name, .. }, true) => {
            out.push((*graph, GraphEventKind::AfterDelLocalProperty(name.clone())));
            property_vanished(&mut out, *graph, name, structure, registry);
        }
        (Change::PropertyRenamed { graph, old, new }, _) => {
            let (from, to) = if forward { (old, new) } else { (new, old) };
            property_vanished(&mut out, *graph, from, structure, registry);
            property_appeared(&mut out, *graph, to, structure, registry);
            for heir in registry.heirs(structure, *graph, to) {
                out.push((heir, GraphEventKind::AddInheritedProperty(to.clone())));
            }
            out.push((*graph, GraphEventKind::AfterRenameLocalProperty { old: from.clone(), new: to.clone() }));
        }
        (Change::SubgraphAdded { parent, child, .. }, true) => {
            out.push((*parent, GraphEventKind::AddSubgraph(*child)));
        }
        (Change::SubgraphAdded { .. }, false) => {}
    }
    out
}

/// `g` now owns `name` locally: an ancestor's property of that name, if
/// any, is no longer inherited by `g`.
fn property_appeared(
    out: &mut Vec<(GraphId, GraphEventKind)>,
    g: GraphId,
    name: &str,
    structure: &Structure,
    registry: &Registry,
) {
    if registry.ancestor_owning(structure, g, name).is_some() {
        out.push((g, GraphEventKind::AfterDelInheritedProperty(name.to_owned())));
    }
}

/// `g` no longer owns `name` locally: its heirs lose it, and an ancestor's
/// property of that name, if any, becomes inherited by `g` and its heirs.
fn property_vanished(
    out: &mut Vec<(GraphId, GraphEventKind)>,
    g: GraphId,
    name: &str,
    structure: &Structure,
    registry: &Registry,
) {
    let heirs = registry.heirs(structure, g, name);
    for heir in &heirs {
        out.push((*heir, GraphEventKind::AfterDelInheritedProperty(name.to_owned())));
    }
    if registry.ancestor_owning(structure, g, name).is_some() {
        out.push((g, GraphEventKind::AddInheritedProperty(name.to_owned())));
        for heir in heirs {
            out.push((heir, GraphEventKind::AddInheritedProperty(name.to_owned())));
        }
    }
}
