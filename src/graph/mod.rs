//! # Graph Context
//!
//! A [`Graph`] is a cheap handle (`Clone`) to one graph of a hierarchy. All
//! graphs of a hierarchy share one context: element membership, the
//! sub-graph tree, the property registry, one event hub and one checkpoint
//! recorder.
//!
//! Property lookup goes from the graph up to the root: a property defined
//! on an ancestor is *inherited* unless a local one of the same name
//! shadows it.
//!
//! Lock order inside the context: recorder, structure, registry. Property
//! stores are only ever locked after the recorder and never together with
//! the structure or the registry. No lock is held while events are
//! delivered.

mod structure;

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::config::GraphConfig;
use crate::model::{EdgeId, GraphId, NodeId, PropertyId, PropertyType};
use crate::observe::{Event, EventHub, GraphEvent, GraphEventKind, HoldGuard, Phase, Subject, Subscription};
use crate::property::{
    dispatch_kind, downcast, BooleanKind, BooleanVectorKind, ColorKind, ColorVectorKind, CoordVectorKind, DoubleKind,
    DoubleVectorKind, GraphKind, IntegerKind, IntegerVectorKind, LayoutKind, Property, PropertyHandle,
    PropertyInterface, PropertyKind, SizeKind, SizeVectorKind, StringKind, StringVectorKind,
};
use crate::undo::{Change, Journal, Recorder, Redo};
use crate::{Error, Result};

use structure::{change_events, Registry, Structure};

// ============================================================================
// Shared context
// ============================================================================

pub(crate) struct Shared {
    pub config: GraphConfig,
    structure: RwLock<Structure>,
    registry: RwLock<Registry>,
    pub hub: Arc<EventHub>,
    pub recorder: Mutex<Recorder>,
}

impl Shared {
    pub fn contains_node(&self, g: GraphId, n: NodeId) -> bool {
        self.structure.read().contains_node(g, n)
    }

    pub fn contains_edge(&self, g: GraphId, e: EdgeId) -> bool {
        self.structure.read().contains_edge(g, e)
    }

    pub fn nodes_of(&self, g: GraphId) -> Vec<NodeId> {
        self.structure.read().graphs.get(&g).map(|d| d.nodes.iter().copied().collect()).unwrap_or_default()
    }

    pub fn edges_of(&self, g: GraphId) -> Vec<EdgeId> {
        self.structure.read().graphs.get(&g).map(|d| d.edges.iter().copied().collect()).unwrap_or_default()
    }

    pub fn retain_nodes(&self, g: GraphId, mut nodes: Vec<NodeId>) -> Vec<NodeId> {
        let structure = self.structure.read();
        nodes.retain(|n| structure.contains_node(g, *n));
        nodes
    }

    pub fn retain_edges(&self, g: GraphId, mut edges: Vec<EdgeId>) -> Vec<EdgeId> {
        let structure = self.structure.read();
        edges.retain(|e| structure.contains_edge(g, *e));
        edges
    }

    fn emit(&self, graph: GraphId, kind: GraphEventKind) {
        self.hub.emit(Subject::Graph(graph), Event::Graph(GraphEvent { graph, kind }));
    }

    /// Plans changes against the current structure, applies and records
    /// them, then publishes their events.
    fn mutate<R, E>(
        &self,
        plan: impl FnOnce(&mut Structure) -> std::result::Result<(R, Vec<Change>), E>,
    ) -> std::result::Result<R, E> {
        let (result, events) = {
            let mut recorder = self.recorder.lock();
            let mut structure = self.structure.write();
            let (result, changes) = plan(&mut structure)?;
            let mut registry = self.registry.write();
            let mut events = Vec::with_capacity(changes.len());
            for change in changes {
                structure.apply(&change, true);
                registry.apply(&change, true);
                events.extend(change_events(&change, true, &structure, &registry));
                recorder.note_change(change);
            }
            (result, events)
        };
        for (graph, kind) in events {
            self.emit(graph, kind);
        }
        Ok(result)
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Handle to one graph of a hierarchy.
#[derive(Clone)]
pub struct Graph {
    id: GraphId,
    shared: Arc<Shared>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// A new, empty root graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        let shared = Shared {
            hub: EventHub::new(config.max_notification_depth),
            recorder: Mutex::new(Recorder::new(config.max_checkpoints)),
            structure: RwLock::new(Structure::new()),
            registry: RwLock::new(Registry::default()),
            config,
        };
        Self { id: GraphId::ROOT, shared: Arc::new(shared) }
    }

    pub(crate) fn from_parts(id: GraphId, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    fn handle(&self, id: GraphId) -> Graph {
        Self::from_parts(id, Arc::clone(&self.shared))
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn config(&self) -> &GraphConfig {
        &self.shared.config
    }

    pub fn name(&self) -> String {
        self.shared.structure.read().graphs.get(&self.id).map(|d| d.name.clone()).unwrap_or_default()
    }

    pub fn is_root(&self) -> bool {
        self.id == GraphId::ROOT
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    pub fn root(&self) -> Graph {
        self.handle(GraphId::ROOT)
    }

    pub fn parent(&self) -> Option<Graph> {
        let parent = self.shared.structure.read().graphs.get(&self.id)?.parent?;
        Some(self.handle(parent))
    }

    pub fn subgraphs(&self) -> Vec<Graph> {
        let children = self.shared.structure.read().graphs.get(&self.id).map(|d| d.children.clone()).unwrap_or_default();
        children.into_iter().map(|id| self.handle(id)).collect()
    }

    /// Creates an empty sub-graph.
    pub fn add_subgraph(&self, name: &str) -> Result<Graph> {
        let parent = self.id;
        let child = self.shared.mutate::<_, Error>(|structure| {
            structure.graph(parent).map_err(|_| detached(parent))?;
            let child = GraphId(structure.counters.next_graph()?);
            Ok((child, vec![Change::SubgraphAdded { parent, child, name: name.to_owned() }]))
        })?;
        Ok(self.handle(child))
    }

    /// Whether this graph lies strictly below `other` in the same hierarchy.
    pub fn is_descendant_of(&self, other: &Graph) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) && self.is_descendant_of_id(other.id)
    }

    pub(crate) fn is_descendant_of_id(&self, ancestor: GraphId) -> bool {
        self.shared.structure.read().is_strict_descendant(self.id, ancestor)
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Adds a new node to this graph and every ancestor.
    pub fn add_node(&self) -> Result<NodeId> {
        let g = self.id;
        self.shared.mutate(|structure| {
            structure.graph(g).map_err(|_| detached(g))?;
            let node = NodeId(structure.counters.next_node()?);
            let changes = structure.lineage(g).into_iter().map(|graph| Change::NodeAdded { graph, node }).collect();
            Ok((node, changes))
        })
    }

    pub fn add_nodes(&self, count: usize) -> Result<Vec<NodeId>> {
        let g = self.id;
        self.shared.mutate(|structure| {
            structure.graph(g).map_err(|_| detached(g))?;
            let lineage = structure.lineage(g);
            let mut nodes = Vec::with_capacity(count);
            let mut changes = Vec::with_capacity(count * lineage.len());
            for _ in 0..count {
                let node = NodeId(structure.counters.next_node()?);
                nodes.push(node);
                changes.extend(lineage.iter().map(|graph| Change::NodeAdded { graph: *graph, node }));
            }
            Ok((nodes, changes))
        })
    }

    /// Adds an edge between two nodes of this graph, to this graph and
    /// every ancestor.
    pub fn add_edge(&self, src: NodeId, dst: NodeId) -> Result<EdgeId> {
        let g = self.id;
        self.shared.mutate(|structure| {
            structure.graph(g).map_err(|_| detached(g))?;
            for n in [src, dst] {
                if !structure.contains_node(g, n) {
                    return Err(Error::NotFound(format!("node {n} in graph {g}")));
                }
            }
            let edge = EdgeId(structure.counters.next_edge()?);
            let changes = structure
                .lineage(g)
                .into_iter()
                .map(|graph| Change::EdgeAdded { graph, edge, ends: (src, dst) })
                .collect();
            Ok((edge, changes))
        })
    }

    /// Adds a node of the parent graph to this sub-graph.
    pub fn add_existing_node(&self, n: NodeId) -> Result<()> {
        let g = self.id;
        self.shared.mutate(|structure| {
            let owner = structure.graph(g)?.parent.unwrap_or(g);
            if !structure.contains_node(owner, n) {
                return Err(Error::NotFound(format!("node {n} in graph {owner}")));
            }
            let changes = if structure.contains_node(g, n) {
                Vec::new()
            } else {
                vec![Change::NodeAdded { graph: g, node: n }]
            };
            Ok(((), changes))
        })
    }

    /// Adds an edge of the parent graph, and its ends, to this sub-graph.
    pub fn add_existing_edge(&self, e: EdgeId) -> Result<()> {
        let g = self.id;
        self.shared.mutate(|structure| {
            let owner = structure.graph(g)?.parent.unwrap_or(g);
            let ends = match structure.ends.get(&e) {
                Some(ends) if structure.contains_edge(owner, e) => *ends,
                _ => return Err(Error::NotFound(format!("edge {e} in graph {owner}"))),
            };
            let mut changes = Vec::new();
            if !structure.contains_edge(g, e) {
                let (src, dst) = ends;
                for node in if src == dst { vec![src] } else { vec![src, dst] } {
                    if !structure.contains_node(g, node) {
                        changes.push(Change::NodeAdded { graph: g, node });
                    }
                }
                changes.push(Change::EdgeAdded { graph: g, edge: e, ends });
            }
            Ok(((), changes))
        })
    }

    /// Removes `n` and its incident edges from this graph and its
    /// descendants. On the root the node ceases to exist and its values are
    /// dropped from every property.
    pub fn delete_node(&self, n: NodeId) -> Result<()> {
        let g = self.id;
        let dropped_edges = self.shared.mutate(|structure| {
            if !structure.contains_node(g, n) {
                return Err(Error::NotFound(format!("node {n} in graph {g}")));
            }
            let mut changes = Vec::new();
            let mut dropped = Vec::new();
            for graph in structure.descendants(g) {
                if !structure.contains_node(graph, n) {
                    continue;
                }
                for edge in structure.incident_edges(graph, n) {
                    if let Some(ends) = structure.ends.get(&edge) {
                        changes.push(Change::EdgeRemoved { graph, edge, ends: *ends });
                        if graph == GraphId::ROOT {
                            dropped.push(edge);
                        }
                    }
                }
                changes.push(Change::NodeRemoved { graph, node: n });
            }
            Ok((dropped, changes))
        })?;

        if self.is_root() {
            let handles = self.shared.registry.read().all();
            for handle in handles {
                handle.journal.forget_node(n);
                for e in &dropped_edges {
                    handle.journal.forget_edge(*e);
                }
            }
        }
        Ok(())
    }

    /// Removes `e` from this graph and its descendants.
    pub fn delete_edge(&self, e: EdgeId) -> Result<()> {
        let g = self.id;
        self.shared.mutate(|structure| {
            let ends = match structure.ends.get(&e) {
                Some(ends) if structure.contains_edge(g, e) => *ends,
                _ => return Err(Error::NotFound(format!("edge {e} in graph {g}"))),
            };
            let changes = structure
                .descendants(g)
                .into_iter()
                .filter(|graph| structure.contains_edge(*graph, e))
                .map(|graph| Change::EdgeRemoved { graph, edge: e, ends })
                .collect();
            Ok(((), changes))
        })?;

        if self.is_root() {
            let handles = self.shared.registry.read().all();
            for handle in handles {
                handle.journal.forget_edge(e);
            }
        }
        Ok(())
    }

    /// Nodes of this graph, ascending.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.shared.nodes_of(self.id)
    }

    pub fn edges(&self) -> Vec<EdgeId> {
        self.shared.edges_of(self.id)
    }

    pub fn number_of_nodes(&self) -> usize {
        self.shared.structure.read().graphs.get(&self.id).map_or(0, |d| d.nodes.len())
    }

    pub fn number_of_edges(&self) -> usize {
        self.shared.structure.read().graphs.get(&self.id).map_or(0, |d| d.edges.len())
    }

    /// `(source, target)` of an edge of this graph.
    pub fn ends(&self, e: EdgeId) -> Option<(NodeId, NodeId)> {
        let structure = self.shared.structure.read();
        if !structure.contains_edge(self.id, e) {
            return None;
        }
        structure.ends.get(&e).copied()
    }

    pub fn is_node(&self, n: NodeId) -> bool {
        self.shared.contains_node(self.id, n)
    }

    pub fn is_edge(&self, e: EdgeId) -> bool {
        self.shared.contains_edge(self.id, e)
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// The property `name` visible from this graph (local or inherited),
    /// created locally if none exists.
    ///
    /// Fails with `Error::PropertyType` if the existing property has
    /// another type.
    pub fn typed_property<K: PropertyKind>(&self, name: &str) -> Result<Arc<Property<K>>> {
        match self.property(name) {
            Some(existing) => expect_kind::<K>(name, existing),
            None => Ok(self.create_local::<K>(name)),
        }
    }

    /// The local property `name`, created if missing (shadowing any
    /// inherited one).
    pub fn local_property<K: PropertyKind>(&self, name: &str) -> Result<Arc<Property<K>>> {
        let existing = self.shared.registry.read().local(self.id, name).map(|h| Arc::clone(&h.property));
        match existing {
            Some(existing) => expect_kind::<K>(name, existing),
            None => Ok(self.create_local::<K>(name)),
        }
    }

    /// Like [`Graph::typed_property`] with the type given by name
    /// (`"double"`, `"vector<coord>"`, ...).
    pub fn property_by_type(&self, name: &str, typename: &str) -> Result<Arc<dyn PropertyInterface>> {
        let ty: PropertyType = typename.parse()?;
        match self.property(name) {
            Some(existing) if existing.property_type() == ty => Ok(existing),
            Some(existing) => Err(Error::PropertyType {
                name: name.to_owned(),
                expected: ty.typename(),
                found: existing.typename(),
            }),
            None => Ok(dispatch_kind!(ty, make_attached(self, name))),
        }
    }

    /// Local or inherited property `name`.
    pub fn property(&self, name: &str) -> Option<Arc<dyn PropertyInterface>> {
        let lineage = self.shared.structure.read().lineage(self.id);
        let registry = self.shared.registry.read();
        lineage
            .iter()
            .rev()
            .find_map(|g| registry.local(*g, name))
            .map(|h| Arc::clone(&h.property))
    }

    pub fn exist_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn exist_local_property(&self, name: &str) -> bool {
        self.shared.registry.read().has_local(self.id, name)
    }

    /// Local properties, by name.
    pub fn local_properties(&self) -> Vec<Arc<dyn PropertyInterface>> {
        let registry = self.shared.registry.read();
        registry
            .locals
            .get(&self.id)
            .map(|locals| locals.values().map(|h| Arc::clone(&h.property)).collect())
            .unwrap_or_default()
    }

    /// Properties of ancestors visible from here (not shadowed), nearest
    /// ancestor first.
    pub fn inherited_properties(&self) -> Vec<Arc<dyn PropertyInterface>> {
        let lineage = self.shared.structure.read().lineage(self.id);
        let registry = self.shared.registry.read();
        let mut seen: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for (depth, g) in lineage.iter().rev().enumerate() {
            let Some(locals) = registry.locals.get(g) else {
                continue;
            };
            for (name, handle) in locals {
                if seen.contains(&name.as_str()) {
                    continue;
                }
                seen.push(name);
                if depth > 0 {
                    out.push(Arc::clone(&handle.property));
                }
            }
        }
        out
    }

    /// Local then inherited properties.
    pub fn properties(&self) -> Vec<Arc<dyn PropertyInterface>> {
        let mut all = self.local_properties();
        all.extend(self.inherited_properties());
        all
    }

    /// Deletes the local property `name`. `false` if there is none.
    ///
    /// Descendants that inherited it are told so, and inherit instead the
    /// ancestor's property of the same name if there is one.
    pub fn delete_local_property(&self, name: &str) -> bool {
        let Some(handle) = self.shared.registry.read().local(self.id, name).cloned() else {
            return false;
        };
        let g = self.id;
        self.shared.emit(g, GraphEventKind::BeforeDelLocalProperty(name.to_owned()));
        for heir in self.heirs(name) {
            self.shared.emit(heir, GraphEventKind::BeforeDelInheritedProperty(name.to_owned()));
        }

        let change = Change::PropertyRemoved { graph: g, name: name.to_owned(), handle };
        let Ok(()) = self.shared.mutate::<_, Infallible>(|_| Ok(((), vec![change])));
        debug!(graph = %g, property = name, "property deleted");
        true
    }

    /// Renames the local property `old`. `false` if it does not exist or
    /// `new` is already a local property.
    ///
    /// For descendants this reads as the deletion of `old` followed by the
    /// addition of `new`.
    pub fn rename_local_property(&self, old: &str, new: &str) -> bool {
        {
            let registry = self.shared.registry.read();
            if !registry.has_local(self.id, old) || registry.has_local(self.id, new) {
                return false;
            }
        }
        let g = self.id;
        self.shared.emit(g, GraphEventKind::BeforeRenameLocalProperty { old: old.to_owned(), new: new.to_owned() });
        for heir in self.heirs(old) {
            self.shared.emit(heir, GraphEventKind::BeforeDelInheritedProperty(old.to_owned()));
        }
        self.announce_shadowing(new);

        let change = Change::PropertyRenamed { graph: g, old: old.to_owned(), new: new.to_owned() };
        let Ok(()) = self.shared.mutate::<_, Infallible>(|_| Ok(((), vec![change])));
        debug!(graph = %g, old, new, "property renamed");
        true
    }

    /// Rename requested through the property itself.
    pub(crate) fn rename_property(&self, id: PropertyId, old: &str, new: &str) -> bool {
        let owned = self.shared.registry.read().local(self.id, old).is_some_and(|h| h.property.id() == id);
        owned && self.rename_local_property(old, new)
    }

    fn create_local<K: PropertyKind>(&self, name: &str) -> Arc<Property<K>> {
        let property = Property::<K>::attached(name, self.id, &self.shared);
        let handle = PropertyHandle::of(Arc::clone(&property));
        let g = self.id;
        self.announce_shadowing(name);
        let change = Change::PropertyAdded { graph: g, name: name.to_owned(), handle };
        let Ok(()) = self.shared.mutate::<_, Infallible>(|_| Ok(((), vec![change])));
        debug!(graph = %g, property = name, type_name = K::TYPE.typename(), "property created");
        property
    }

    /// Warns this graph that a new local `name` is about to hide the
    /// ancestor property it inherits under that name.
    fn announce_shadowing(&self, name: &str) {
        let inherited = {
            let structure = self.shared.structure.read();
            self.shared.registry.read().ancestor_owning(&structure, self.id, name).is_some()
        };
        if inherited {
            self.shared.emit(self.id, GraphEventKind::BeforeDelInheritedProperty(name.to_owned()));
        }
    }

    fn heirs(&self, name: &str) -> Vec<GraphId> {
        let structure = self.shared.structure.read();
        self.shared.registry.read().heirs(&structure, self.id, name)
    }

    // ========================================================================
    // Checkpoints
    // ========================================================================

    /// Opens a checkpoint. Checkpoints nest and are shared by the whole
    /// hierarchy.
    pub fn push(&self) {
        let mut recorder = self.shared.recorder.lock();
        let counters = self.shared.structure.read().counters;
        recorder.push(counters);
        debug!(depth = recorder.depth(), "checkpoint opened");
    }

    /// Reverts everything recorded since the matching `push`.
    pub fn pop(&self) -> Result<()> {
        let mut checkpoint = self.shared.recorder.lock().take_top()?;
        let states = checkpoint.capture();
        let journals: Vec<Arc<dyn Journal>> = checkpoint.journals.values().map(|e| Arc::clone(&e.journal)).collect();
        for journal in &journals {
            journal.announce(Phase::Before);
        }

        let (post, events) = {
            let mut structure = self.shared.structure.write();
            let mut registry = self.shared.registry.write();
            let post = structure.counters;
            let mut events = Vec::new();
            for change in checkpoint.changes.iter().rev() {
                structure.apply(change, false);
                registry.apply(change, false);
                events.extend(change_events(change, false, &structure, &registry));
            }
            structure.counters = checkpoint.counters;
            (post, events)
        };
        for entry in checkpoint.journals.values() {
            entry.journal.rollback(&*entry.log);
        }

        let (properties, changes) = (checkpoint.journals.len(), checkpoint.changes.len());
        checkpoint.redo = Some(Redo { states, counters: post });
        let depth = {
            let mut recorder = self.shared.recorder.lock();
            recorder.stash_redo(checkpoint);
            recorder.depth()
        };
        debug!(depth, properties, changes, "checkpoint reverted");

        for (graph, kind) in events {
            self.shared.emit(graph, kind);
        }
        for journal in &journals {
            journal.announce(Phase::After);
        }
        Ok(())
    }

    /// Closes the top checkpoint keeping its changes. An empty checkpoint
    /// is simply discarded; otherwise its record is folded into the
    /// enclosing checkpoint.
    pub fn pop_if_no_updates(&self) -> Result<()> {
        let mut recorder = self.shared.recorder.lock();
        let recorded = recorder.commit_top()?;
        debug!(depth = recorder.depth(), recorded, "checkpoint committed");
        Ok(())
    }

    /// Re-applies the checkpoint reverted by the last `pop`.
    pub fn unpop(&self) -> Result<()> {
        let mut checkpoint = self.shared.recorder.lock().take_redo()?;
        let Some(redo) = checkpoint.redo.take() else {
            return Err(Error::InvalidState("popped checkpoint has no redo state".into()));
        };
        for (journal, _) in &redo.states {
            journal.announce(Phase::Before);
        }

        let events = {
            let mut structure = self.shared.structure.write();
            let mut registry = self.shared.registry.write();
            let mut events = Vec::new();
            for change in &checkpoint.changes {
                structure.apply(change, true);
                registry.apply(change, true);
                events.extend(change_events(change, true, &structure, &registry));
            }
            structure.counters = redo.counters;
            events
        };
        for (journal, state) in &redo.states {
            journal.rollback(&**state);
        }

        let depth = {
            let mut recorder = self.shared.recorder.lock();
            recorder.reopen(checkpoint);
            recorder.depth()
        };
        debug!(depth, "checkpoint re-applied");

        for (graph, kind) in events {
            self.shared.emit(graph, kind);
        }
        for (journal, _) in &redo.states {
            journal.announce(Phase::After);
        }
        Ok(())
    }

    pub fn can_pop(&self) -> bool {
        self.shared.recorder.lock().depth() > 0
    }

    pub fn can_unpop(&self) -> bool {
        self.shared.recorder.lock().can_unpop()
    }

    pub fn checkpoint_depth(&self) -> usize {
        self.shared.recorder.lock().depth()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Structural events of this graph, synchronously.
    pub fn listen<F>(&self, f: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.shared.hub.listen(Subject::Graph(self.id), f)
    }

    pub fn observe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&[Event]) + Send + Sync + 'static,
    {
        self.shared.hub.observe(Subject::Graph(self.id), f)
    }

    /// Holds observer delivery for the whole hierarchy until the guard drops.
    pub fn hold_observers(&self) -> HoldGuard {
        self.shared.hub.hold()
    }
}

fn expect_kind<K: PropertyKind>(name: &str, property: Arc<dyn PropertyInterface>) -> Result<Arc<Property<K>>> {
    let found = property.typename();
    downcast::<K>(property).ok_or_else(|| Error::PropertyType {
        name: name.to_owned(),
        expected: K::TYPE.typename(),
        found,
    })
}

/// Error for a handle whose graph was removed by `pop`.
fn detached(g: GraphId) -> Error {
    Error::InvalidState(format!("graph {g} no longer exists"))
}

fn make_attached<K: PropertyKind>(graph: &Graph, name: &str) -> Arc<dyn PropertyInterface> {
    graph.create_local::<K>(name)
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Graph {}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("nodes", &self.number_of_nodes())
            .field("edges", &self.number_of_edges())
            .finish()
    }
}
