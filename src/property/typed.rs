//! `Property<K>`: typed storage + notification + journaling.
//!
//! Every write follows the same order: "before" event, then the checkpoint
//! log is noted and the store mutated under the recorder and store locks,
//! then the "after" event. No lock is held while events are delivered.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::trace;

use super::{PropertyInterface, PropertyKind, VectorPropertyInterface};
use crate::config::GraphConfig;
use crate::graph::{Graph, Shared};
use crate::model::{EdgeId, GraphId, NodeId, PropertyId, PropertyType, Value};
use crate::observe::{Event, EventHub, EventTarget, HoldGuard, Phase, PropertyEvent, Subject, Subscription};
use crate::storage::{ElementKey, ValueStore};
use crate::types::PropertyValue;
use crate::undo::{AnyLog, Journal, StoreLog};
use crate::{Error, Result};

use super::wrapper::{EdgeValue, NodeValue};

static NEXT_PROPERTY_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Property
// ============================================================================

/// A node/edge valuation of kind `K`.
///
/// Properties are shared (`Arc`) and internally locked; every method takes
/// `&self`.
pub struct Property<K: PropertyKind> {
    id: PropertyId,
    name: RwLock<Arc<str>>,
    graph: Option<GraphId>,
    ctx: Weak<Shared>,
    hub: Arc<EventHub>,
    nodes: RwLock<ValueStore<NodeId, K::Node>>,
    edges: RwLock<ValueStore<EdgeId, K::Edge>>,
    me: Weak<Self>,
}

/// Checkpoint log of one property.
pub(crate) struct PropertyLog<K: PropertyKind> {
    pub nodes: StoreLog<NodeId, K::Node>,
    pub edges: StoreLog<EdgeId, K::Edge>,
}

impl<K: PropertyKind> Default for PropertyLog<K> {
    fn default() -> Self {
        Self { nodes: StoreLog::default(), edges: StoreLog::default() }
    }
}

type LogSide<K, Key, T> = fn(&mut PropertyLog<K>) -> &mut StoreLog<Key, T>;

impl<K: PropertyKind> Property<K> {
    /// A property that belongs to no graph. It has its own event hub, is
    /// never journaled and notifies for every element.
    pub fn detached(name: &str) -> Arc<Self> {
        let hub = EventHub::new(GraphConfig::default().max_notification_depth);
        Self::build(name, None, Weak::new(), hub, true)
    }

    pub(crate) fn attached(name: &str, graph: GraphId, shared: &Arc<Shared>) -> Arc<Self> {
        Self::build(
            name,
            Some(graph),
            Arc::downgrade(shared),
            Arc::clone(&shared.hub),
            shared.config.prune_default_overrides,
        )
    }

    fn build(name: &str, graph: Option<GraphId>, ctx: Weak<Shared>, hub: Arc<EventHub>, prune: bool) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id: PropertyId(NEXT_PROPERTY_ID.fetch_add(1, AtomicOrdering::Relaxed)),
            name: RwLock::new(Arc::from(name)),
            graph,
            ctx,
            hub,
            nodes: RwLock::new(ValueStore::with_pruning(K::node_default(), prune)),
            edges: RwLock::new(ValueStore::with_pruning(K::edge_default(), prune)),
            me: me.clone(),
        })
    }

    pub fn graph_id(&self) -> Option<GraphId> {
        self.graph
    }

    // ========================================================================
    // Wrappers
    // ========================================================================

    /// Accessor bound to node `n`.
    pub fn node(&self, n: NodeId) -> NodeValue<'_, K> {
        NodeValue::new(self, n)
    }

    /// Accessor bound to edge `e`.
    pub fn edge(&self, e: EdgeId) -> EdgeValue<'_, K> {
        EdgeValue::new(self, e)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn node_value(&self, n: NodeId) -> K::Node {
        self.nodes.read().get(n).clone()
    }

    pub fn edge_value(&self, e: EdgeId) -> K::Edge {
        self.edges.read().get(e).clone()
    }

    pub fn node_default_value(&self) -> K::Node {
        self.nodes.read().default_value().clone()
    }

    pub fn edge_default_value(&self) -> K::Edge {
        self.edges.read().default_value().clone()
    }

    /// Whether `n` carries an explicit value.
    pub fn has_non_default_node_value(&self, n: NodeId) -> bool {
        self.nodes.read().get_with_flag(n).1
    }

    pub fn has_non_default_edge_value(&self, e: EdgeId) -> bool {
        self.edges.read().get_with_flag(e).1
    }

    /// Nodes of the owning graph whose value equals `value`, sorted. A
    /// detached property only reports explicitly set nodes.
    pub fn nodes_equal_to(&self, value: &K::Node) -> Vec<NodeId> {
        match self.scope() {
            Some((g, shared)) => {
                let members = shared.nodes_of(g);
                let nodes = self.nodes.read();
                members.into_iter().filter(|n| nodes.get(*n) == value).collect()
            }
            None => self.nodes.read().find_all(value),
        }
    }

    pub fn edges_equal_to(&self, value: &K::Edge) -> Vec<EdgeId> {
        match self.scope() {
            Some((g, shared)) => {
                let members = shared.edges_of(g);
                let edges = self.edges.read();
                members.into_iter().filter(|e| edges.get(*e) == value).collect()
            }
            None => self.edges.read().find_all(value),
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub fn set_node_value(&self, n: NodeId, value: K::Node) {
        let notify = self.notifies(|g, shared| shared.contains_node(g, n));
        self.write_one(&self.nodes, Self::node_log, n, EventTarget::Node(n), notify, value);
    }

    pub fn set_edge_value(&self, e: EdgeId, value: K::Edge) {
        let notify = self.notifies(|g, shared| shared.contains_edge(g, e));
        self.write_one(&self.edges, Self::edge_log, e, EventTarget::Edge(e), notify, value);
    }

    /// Sets the default node value and drops every node override.
    pub fn set_all_node_value(&self, value: K::Node) {
        self.write_all(&self.nodes, Self::node_log, EventTarget::AllNodes, value);
    }

    pub fn set_all_edge_value(&self, value: K::Edge) {
        self.write_all(&self.edges, Self::edge_log, EventTarget::AllEdges, value);
    }

    /// Bulk set restricted to `scope`. When `scope` is a strict descendant
    /// of the owning graph each of its nodes is set individually and the
    /// default is left alone; otherwise this is `set_all_node_value`.
    pub fn set_all_node_value_in(&self, value: K::Node, scope: &Graph) {
        if self.is_strict_scope(scope) {
            for n in scope.nodes() {
                self.set_node_value(n, value.clone());
            }
        } else {
            self.set_all_node_value(value);
        }
    }

    pub fn set_all_edge_value_in(&self, value: K::Edge, scope: &Graph) {
        if self.is_strict_scope(scope) {
            for e in scope.edges() {
                self.set_edge_value(e, value.clone());
            }
        } else {
            self.set_all_edge_value(value);
        }
    }

    /// Changes the default node value while every node of the owning graph
    /// keeps the value it reads now.
    pub fn set_node_default_value(&self, value: K::Node) {
        let members = self.scope().map(|(g, shared)| shared.nodes_of(g)).unwrap_or_default();
        self.write_default(&self.nodes, Self::node_log, EventTarget::NodeDefault, members, value);
    }

    pub fn set_edge_default_value(&self, value: K::Edge) {
        let members = self.scope().map(|(g, shared)| shared.edges_of(g)).unwrap_or_default();
        self.write_default(&self.edges, Self::edge_log, EventTarget::EdgeDefault, members, value);
    }

    /// Copies `src`'s value of `from` to `dst`. With `if_not_default`, a
    /// `src` reading the default is skipped and `false` returned.
    pub fn copy_node_from(&self, dst: NodeId, src: NodeId, from: &Property<K>, if_not_default: bool) -> bool {
        let (value, explicit) = {
            let nodes = from.nodes.read();
            let (value, explicit) = nodes.get_with_flag(src);
            (value.clone(), explicit)
        };
        if if_not_default && !explicit {
            return false;
        }
        self.set_node_value(dst, value);
        true
    }

    pub fn copy_edge_from(&self, dst: EdgeId, src: EdgeId, from: &Property<K>, if_not_default: bool) -> bool {
        let (value, explicit) = {
            let edges = from.edges.read();
            let (value, explicit) = edges.get_with_flag(src);
            (value.clone(), explicit)
        };
        if if_not_default && !explicit {
            return false;
        }
        self.set_edge_value(dst, value);
        true
    }

    /// Makes this property a copy of `other`: same defaults, same explicit
    /// values on `other`'s graph elements.
    pub fn copy_from(&self, other: &Property<K>) {
        if std::ptr::eq(self, other) {
            return;
        }
        let node_values: Vec<_> = other.non_default_nodes().into_iter().map(|n| (n, other.node_value(n))).collect();
        let edge_values: Vec<_> = other.non_default_edges().into_iter().map(|e| (e, other.edge_value(e))).collect();

        self.set_all_node_value(other.node_default_value());
        self.set_all_edge_value(other.edge_default_value());
        for (n, v) in node_values {
            self.set_node_value(n, v);
        }
        for (e, v) in edge_values {
            self.set_edge_value(e, v);
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Every event of this property, synchronously.
    pub fn listen<F>(&self, f: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.hub.listen(Subject::Property(self.id), f)
    }

    /// After-phase events of this property, batched while held.
    pub fn observe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&[Event]) + Send + Sync + 'static,
    {
        self.hub.observe(Subject::Property(self.id), f)
    }

    /// Holds observers of the hub this property publishes on.
    pub fn hold_observers(&self) -> HoldGuard {
        self.hub.hold()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn node_log(log: &mut PropertyLog<K>) -> &mut StoreLog<NodeId, K::Node> {
        &mut log.nodes
    }

    fn edge_log(log: &mut PropertyLog<K>) -> &mut StoreLog<EdgeId, K::Edge> {
        &mut log.edges
    }

    /// Owning graph id and context, if attached and the graph is alive.
    fn scope(&self) -> Option<(GraphId, Arc<Shared>)> {
        Some((self.graph?, self.ctx.upgrade()?))
    }

    fn is_strict_scope(&self, scope: &Graph) -> bool {
        match self.scope() {
            Some((g, shared)) => Arc::ptr_eq(scope.shared(), &shared) && scope.is_descendant_of_id(g),
            None => false,
        }
    }

    /// Whether element events should be published: somebody listens and the
    /// element belongs to the owning graph (always true when detached).
    fn notifies(&self, owns: impl FnOnce(GraphId, &Shared) -> bool) -> bool {
        if !self.hub.is_observed(Subject::Property(self.id)) {
            return false;
        }
        match self.scope() {
            Some((g, shared)) => owns(g, &shared),
            None => true,
        }
    }

    fn emit(&self, target: EventTarget, phase: Phase) {
        let event = PropertyEvent { property: self.id, name: Arc::clone(&*self.name.read()), target, phase };
        self.hub.emit(Subject::Property(self.id), Event::Property(event));
    }

    fn journal(&self) -> Option<Arc<dyn Journal>> {
        self.me.upgrade().map(|me| me as Arc<dyn Journal>)
    }

    /// Runs `f` with this property's log in the open checkpoint, under the
    /// recorder lock. `None` when detached or no checkpoint is open.
    fn record<R>(&self, f: impl FnOnce(Option<&mut PropertyLog<K>>) -> R) -> R {
        let Some(shared) = self.ctx.upgrade() else {
            return f(None);
        };
        let mut recorder = shared.recorder.lock();
        let log = recorder.log_for::<PropertyLog<K>>(self.id, || self.journal());
        f(log)
    }

    fn write_one<Key, T>(
        &self,
        store: &RwLock<ValueStore<Key, T>>,
        side: LogSide<K, Key, T>,
        id: Key,
        target: EventTarget,
        notify: bool,
        value: T,
    ) where
        Key: ElementKey,
        T: PropertyValue,
    {
        if notify {
            self.emit(target, Phase::Before);
        }
        self.record(|log| {
            let mut values = store.write();
            if let Some(log) = log {
                side(log).note(id, || values.override_of(id).cloned());
            }
            values.set(id, value);
        });
        if notify {
            self.emit(target, Phase::After);
        }
    }

    fn erase_one<Key, T>(
        &self,
        store: &RwLock<ValueStore<Key, T>>,
        side: LogSide<K, Key, T>,
        id: Key,
        target: EventTarget,
        notify: bool,
    ) where
        Key: ElementKey,
        T: PropertyValue,
    {
        if store.read().override_of(id).is_none() {
            return;
        }
        if notify {
            self.emit(target, Phase::Before);
        }
        self.record(|log| {
            let mut values = store.write();
            if let Some(log) = log {
                side(log).note(id, || values.override_of(id).cloned());
            }
            values.remove(id);
        });
        if notify {
            self.emit(target, Phase::After);
        }
    }

    fn write_all<Key, T>(&self, store: &RwLock<ValueStore<Key, T>>, side: LogSide<K, Key, T>, target: EventTarget, value: T)
    where
        Key: ElementKey,
        T: PropertyValue,
    {
        self.emit(target, Phase::Before);
        self.record(|log| {
            let (default, overrides) = store.write().set_all(value);
            if let Some(log) = log {
                side(log).note_reset(default, overrides);
            }
        });
        self.emit(target, Phase::After);
    }

    fn write_default<Key, T>(
        &self,
        store: &RwLock<ValueStore<Key, T>>,
        side: LogSide<K, Key, T>,
        target: EventTarget,
        members: Vec<Key>,
        value: T,
    ) where
        Key: ElementKey,
        T: PropertyValue,
    {
        if *store.read().default_value() == value {
            return;
        }
        self.emit(target, Phase::Before);
        self.record(|log| {
            let mut values = store.write();
            let old = values.default_value().clone();
            let keep: Vec<Key> = members.into_iter().filter(|id| values.override_of(*id).is_none()).collect();
            if let Some(log) = log {
                let side = side(log);
                side.note_default(|| old.clone());
                for id in &keep {
                    side.note(*id, || None);
                }
            }
            values.set_default(value);
            for id in keep {
                values.set(id, old.clone());
            }
        });
        self.emit(target, Phase::After);
    }
}

impl<K: PropertyKind> fmt::Debug for Property<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("name", &&*self.name.read().clone())
            .field("type", &K::TYPE.typename())
            .field("graph", &self.graph)
            .finish()
    }
}

// ============================================================================
// PropertyInterface
// ============================================================================

fn erased_mismatch<K: PropertyKind>(value: &Value) -> Error {
    Error::TypeMismatch { op: "=", lhs: K::TYPE.typename(), rhs: value.type_name() }
}

fn parse_or_trace<T: PropertyValue>(property: &str, type_name: &str, text: &str) -> Option<T> {
    let parsed = T::parse(text);
    if parsed.is_none() {
        trace!(property, input = text, type_name, "string value rejected");
    }
    parsed
}

impl<K: PropertyKind> PropertyInterface for Property<K> {
    fn id(&self) -> PropertyId {
        self.id
    }

    fn name(&self) -> String {
        self.name.read().to_string()
    }

    fn property_type(&self) -> PropertyType {
        K::TYPE
    }

    fn graph(&self) -> Option<Graph> {
        let (g, shared) = self.scope()?;
        Some(Graph::from_parts(g, shared))
    }

    fn rename(&self, new_name: &str) -> bool {
        match self.graph() {
            Some(graph) => graph.rename_property(self.id, &self.name(), new_name),
            None => {
                self.set_name(new_name);
                true
            }
        }
    }

    fn node_string_value(&self, n: NodeId) -> String {
        self.nodes.read().get(n).to_text()
    }

    fn edge_string_value(&self, e: EdgeId) -> String {
        self.edges.read().get(e).to_text()
    }

    fn set_node_string_value(&self, n: NodeId, text: &str) -> bool {
        match parse_or_trace::<K::Node>(&self.name(), K::TYPE.typename(), text) {
            Some(v) => {
                self.set_node_value(n, v);
                true
            }
            None => false,
        }
    }

    fn set_edge_string_value(&self, e: EdgeId, text: &str) -> bool {
        match parse_or_trace::<K::Edge>(&self.name(), K::TYPE.typename(), text) {
            Some(v) => {
                self.set_edge_value(e, v);
                true
            }
            None => false,
        }
    }

    fn node_default_string_value(&self) -> String {
        self.nodes.read().default_value().to_text()
    }

    fn edge_default_string_value(&self) -> String {
        self.edges.read().default_value().to_text()
    }

    fn set_node_default_string_value(&self, text: &str) -> bool {
        match parse_or_trace::<K::Node>(&self.name(), K::TYPE.typename(), text) {
            Some(v) => {
                self.set_node_default_value(v);
                true
            }
            None => false,
        }
    }

    fn set_edge_default_string_value(&self, text: &str) -> bool {
        match parse_or_trace::<K::Edge>(&self.name(), K::TYPE.typename(), text) {
            Some(v) => {
                self.set_edge_default_value(v);
                true
            }
            None => false,
        }
    }

    fn set_all_node_string_value(&self, text: &str) -> bool {
        match parse_or_trace::<K::Node>(&self.name(), K::TYPE.typename(), text) {
            Some(v) => {
                self.set_all_node_value(v);
                true
            }
            None => false,
        }
    }

    fn set_all_edge_string_value(&self, text: &str) -> bool {
        match parse_or_trace::<K::Edge>(&self.name(), K::TYPE.typename(), text) {
            Some(v) => {
                self.set_all_edge_value(v);
                true
            }
            None => false,
        }
    }

    fn compare_nodes(&self, a: NodeId, b: NodeId) -> Ordering {
        let nodes = self.nodes.read();
        PropertyValue::total_cmp(nodes.get(a), nodes.get(b))
    }

    fn compare_edges(&self, a: EdgeId, b: EdgeId) -> Ordering {
        let edges = self.edges.read();
        PropertyValue::total_cmp(edges.get(a), edges.get(b))
    }

    fn node_value_erased(&self, n: NodeId) -> Value {
        self.node_value(n).into_value()
    }

    fn edge_value_erased(&self, e: EdgeId) -> Value {
        self.edge_value(e).into_value()
    }

    fn node_default_value_erased(&self) -> Value {
        self.node_default_value().into_value()
    }

    fn edge_default_value_erased(&self) -> Value {
        self.edge_default_value().into_value()
    }

    fn set_node_value_erased(&self, n: NodeId, value: Value) -> Result<()> {
        let err = erased_mismatch::<K>(&value);
        let v = K::Node::from_value(value).ok_or(err)?;
        self.set_node_value(n, v);
        Ok(())
    }

    fn set_edge_value_erased(&self, e: EdgeId, value: Value) -> Result<()> {
        let err = erased_mismatch::<K>(&value);
        let v = K::Edge::from_value(value).ok_or(err)?;
        self.set_edge_value(e, v);
        Ok(())
    }

    fn set_all_node_value_erased(&self, value: Value) -> Result<()> {
        let err = erased_mismatch::<K>(&value);
        let v = K::Node::from_value(value).ok_or(err)?;
        self.set_all_node_value(v);
        Ok(())
    }

    fn set_all_edge_value_erased(&self, value: Value) -> Result<()> {
        let err = erased_mismatch::<K>(&value);
        let v = K::Edge::from_value(value).ok_or(err)?;
        self.set_all_edge_value(v);
        Ok(())
    }

    fn set_node_default_value_erased(&self, value: Value) -> Result<()> {
        let err = erased_mismatch::<K>(&value);
        let v = K::Node::from_value(value).ok_or(err)?;
        self.set_node_default_value(v);
        Ok(())
    }

    fn set_edge_default_value_erased(&self, value: Value) -> Result<()> {
        let err = erased_mismatch::<K>(&value);
        let v = K::Edge::from_value(value).ok_or(err)?;
        self.set_edge_default_value(v);
        Ok(())
    }

    fn non_default_nodes(&self) -> Vec<NodeId> {
        let keys = self.nodes.read().non_default_keys();
        match self.scope() {
            Some((g, shared)) => shared.retain_nodes(g, keys),
            None => keys,
        }
    }

    fn non_default_edges(&self) -> Vec<EdgeId> {
        let keys = self.edges.read().non_default_keys();
        match self.scope() {
            Some((g, shared)) => shared.retain_edges(g, keys),
            None => keys,
        }
    }

    fn number_of_non_default_nodes(&self) -> usize {
        self.non_default_nodes().len()
    }

    fn number_of_non_default_edges(&self) -> usize {
        self.non_default_edges().len()
    }

    fn erase_node(&self, n: NodeId) {
        let notify = self.notifies(|g, shared| shared.contains_node(g, n));
        self.erase_one(&self.nodes, Self::node_log, n, EventTarget::Node(n), notify);
    }

    fn erase_edge(&self, e: EdgeId) {
        let notify = self.notifies(|g, shared| shared.contains_edge(g, e));
        self.erase_one(&self.edges, Self::edge_log, e, EventTarget::Edge(e), notify);
    }

    fn copy_node(&self, dst: NodeId, src: NodeId, from: &dyn PropertyInterface, if_not_default: bool) -> bool {
        match from.as_any().downcast_ref::<Property<K>>() {
            Some(from) => self.copy_node_from(dst, src, from, if_not_default),
            None => false,
        }
    }

    fn copy_edge(&self, dst: EdgeId, src: EdgeId, from: &dyn PropertyInterface, if_not_default: bool) -> bool {
        match from.as_any().downcast_ref::<Property<K>>() {
            Some(from) => self.copy_edge_from(dst, src, from, if_not_default),
            None => false,
        }
    }

    fn as_vector(&self) -> Option<&dyn VectorPropertyInterface> {
        K::as_vector(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// ============================================================================
// Journal
// ============================================================================

impl<K: PropertyKind> Journal for Property<K> {
    fn rollback(&self, log: &dyn Any) {
        let Some(log) = log.downcast_ref::<PropertyLog<K>>() else {
            return;
        };
        log.nodes.restore(&mut self.nodes.write());
        log.edges.restore(&mut self.edges.write());
    }

    fn capture(&self, log: &dyn Any) -> Option<AnyLog> {
        let log = log.downcast_ref::<PropertyLog<K>>()?;
        let state = PropertyLog::<K> {
            nodes: log.nodes.mirror(&self.nodes.read()),
            edges: log.edges.mirror(&self.edges.read()),
        };
        Some(Box::new(state))
    }

    fn merge(&self, parent: &mut (dyn Any + Send + Sync), child: AnyLog) {
        let (Some(parent), Ok(child)) = (parent.downcast_mut::<PropertyLog<K>>(), child.downcast::<PropertyLog<K>>()) else {
            return;
        };
        let PropertyLog { nodes, edges } = *child;
        parent.nodes.absorb(nodes);
        parent.edges.absorb(edges);
    }

    fn announce(&self, phase: Phase) {
        self.emit(EventTarget::AllNodes, phase);
        self.emit(EventTarget::AllEdges, phase);
    }

    fn forget_node(&self, n: NodeId) {
        self.erase_one(&self.nodes, Self::node_log, n, EventTarget::Node(n), false);
    }

    fn forget_edge(&self, e: EdgeId) {
        self.erase_one(&self.edges, Self::edge_log, e, EventTarget::Edge(e), false);
    }

    fn set_name(&self, name: &str) {
        *self.name.write() = Arc::from(name);
    }
}
