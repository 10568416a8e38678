//! # Checkpoints
//!
//! `Graph::push` opens a checkpoint on the shared [`Recorder`]. From then
//! on every property mutation notes the *prior* state of what it touches in
//! a per-property log, and every structural change is appended to the
//! checkpoint's change list. `pop` replays both backwards.
//!
//! Per value store the log keeps:
//!
//! - the first-seen prior override of each touched element,
//! - the default as it was before the first default change,
//! - a full backup taken at the first bulk set; after that nothing else
//!   needs to be noted for this checkpoint.
//!
//! Restoring applies the backup, then the old default, then the touched
//! entries. Committing a nested checkpoint folds its log into the parent so
//! that the outer `pop` still reverts everything.

use std::any::Any;
use std::sync::Arc;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use tracing::debug;

use crate::model::{EdgeId, GraphId, NodeId, PropertyId};
use crate::observe::Phase;
use crate::property::PropertyHandle;
use crate::storage::{ElementKey, ValueStore};
use crate::{Error, Result};

pub(crate) type AnyLog = Box<dyn Any + Send + Sync>;

// ============================================================================
// Journal
// ============================================================================

/// Undo-side view of a property. Implemented by every `Property<K>`.
pub(crate) trait Journal: Send + Sync {
    /// Restores the stores from `log`.
    fn rollback(&self, log: &dyn Any);

    /// Current state of everything `log` mentions, as a log of the same shape.
    fn capture(&self, log: &dyn Any) -> Option<AnyLog>;

    /// Folds a committed child log into its parent's.
    fn merge(&self, parent: &mut (dyn Any + Send + Sync), child: AnyLog);

    /// Tells listeners that every value may have changed.
    fn announce(&self, phase: Phase);

    /// Drops the override of a deleted node. Journaled, not notified.
    fn forget_node(&self, n: NodeId);

    fn forget_edge(&self, e: EdgeId);

    fn set_name(&self, name: &str);
}

// ============================================================================
// StoreLog
// ============================================================================

/// Prior state of one `ValueStore` since a checkpoint was opened.
pub(crate) struct StoreLog<K: ElementKey, T> {
    touched: HashMap<K, Option<T>>,
    old_default: Option<T>,
    backup: Option<(T, HashMap<K, T>)>,
}

impl<K: ElementKey, T> Default for StoreLog<K, T> {
    fn default() -> Self {
        Self { touched: HashMap::new(), old_default: None, backup: None }
    }
}

impl<K: ElementKey, T: Clone + PartialEq> StoreLog<K, T> {
    /// Notes the override `id` had before its first change.
    pub fn note(&mut self, id: K, prior: impl FnOnce() -> Option<T>) {
        if self.backup.is_none() {
            self.touched.entry(id).or_insert_with(prior);
        }
    }

    pub fn note_default(&mut self, current: impl FnOnce() -> T) {
        if self.backup.is_none() && self.old_default.is_none() {
            self.old_default = Some(current());
        }
    }

    /// Takes the full state replaced by a bulk set.
    pub fn note_reset(&mut self, default: T, overrides: HashMap<K, T>) {
        if self.backup.is_none() {
            self.backup = Some((default, overrides));
        }
    }

    pub fn restore(&self, store: &mut ValueStore<K, T>) {
        if let Some((default, overrides)) = &self.backup {
            store.restore(default.clone(), overrides.clone());
        }
        if let Some(default) = &self.old_default {
            store.set_default(default.clone());
        }
        for (id, value) in &self.touched {
            store.put_entry(*id, value.clone());
        }
    }

    /// The current state of `store` for the entries this log mentions.
    pub fn mirror(&self, store: &ValueStore<K, T>) -> Self {
        Self {
            touched: self.touched.keys().map(|id| (*id, store.override_of(*id).cloned())).collect(),
            old_default: self.old_default.as_ref().map(|_| store.default_value().clone()),
            backup: self
                .backup
                .as_ref()
                .map(|_| (store.default_value().clone(), store.overrides().clone())),
        }
    }

    /// `self` is the parent log, `child` the log of a committed nested checkpoint.
    pub fn absorb(&mut self, child: Self) {
        if self.backup.is_some() {
            return;
        }
        for (id, value) in child.touched {
            self.touched.entry(id).or_insert(value);
        }
        if self.old_default.is_none() {
            self.old_default = child.old_default;
        }
        self.backup = child.backup;
    }
}

// ============================================================================
// Structural changes
// ============================================================================

/// Id allocation state, saved at push and put back at pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct IdCounters {
    pub node: u32,
    pub edge: u32,
    pub graph: u32,
}

impl IdCounters {
    pub fn next_node(&mut self) -> Result<u32> {
        bump(&mut self.node, "node")
    }

    pub fn next_edge(&mut self) -> Result<u32> {
        bump(&mut self.edge, "edge")
    }

    pub fn next_graph(&mut self) -> Result<u32> {
        bump(&mut self.graph, "graph")
    }
}

/// Hands out `*counter` and advances it, failing once the id space is used up.
fn bump(counter: &mut u32, what: &str) -> Result<u32> {
    let id = *counter;
    *counter = id.checked_add(1).ok_or_else(|| Error::InvalidState(format!("{what} ids exhausted")))?;
    Ok(id)
}

/// One structural mutation, in the order it happened.
#[derive(Clone)]
pub(crate) enum Change {
    NodeAdded { graph: GraphId, node: NodeId },
    NodeRemoved { graph: GraphId, node: NodeId },
    EdgeAdded { graph: GraphId, edge: EdgeId, ends: (NodeId, NodeId) },
    EdgeRemoved { graph: GraphId, edge: EdgeId, ends: (NodeId, NodeId) },
    PropertyAdded { graph: GraphId, name: String, handle: PropertyHandle },
    PropertyRemoved { graph: GraphId, name: String, handle: PropertyHandle },
    PropertyRenamed { graph: GraphId, old: String, new: String },
    SubgraphAdded { parent: GraphId, child: GraphId, name: String },
}

// ============================================================================
// Recorder
// ============================================================================

pub(crate) struct JournalEntry {
    pub journal: Arc<dyn Journal>,
    pub log: AnyLog,
}

/// What `unpop` needs to re-apply a reverted checkpoint.
pub(crate) struct Redo {
    pub states: Vec<(Arc<dyn Journal>, AnyLog)>,
    pub counters: IdCounters,
}

pub(crate) struct Checkpoint {
    pub journals: HashMap<PropertyId, JournalEntry>,
    pub changes: Vec<Change>,
    pub counters: IdCounters,
    pub redo: Option<Redo>,
}

impl Checkpoint {
    fn new(counters: IdCounters) -> Self {
        Self { journals: HashMap::new(), changes: Vec::new(), counters, redo: None }
    }

    pub fn is_empty(&self) -> bool {
        self.journals.is_empty() && self.changes.is_empty()
    }

    /// Current state of every journaled property, for redo.
    pub fn capture(&self) -> Vec<(Arc<dyn Journal>, AnyLog)> {
        self.journals
            .values()
            .filter_map(|entry| {
                let state = entry.journal.capture(&*entry.log)?;
                Some((Arc::clone(&entry.journal), state))
            })
            .collect()
    }

    fn absorb(&mut self, child: Checkpoint) {
        for (id, entry) in child.journals {
            match self.journals.entry(id) {
                Entry::Occupied(mut parent) => {
                    let parent = parent.get_mut();
                    parent.journal.merge(&mut *parent.log, entry.log);
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }
        self.changes.extend(child.changes);
    }
}

/// The checkpoint stack of a graph hierarchy.
pub(crate) struct Recorder {
    stack: Vec<Checkpoint>,
    redo: Vec<Checkpoint>,
    max_depth: Option<usize>,
}

impl Recorder {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self { stack: Vec::new(), redo: Vec::new(), max_depth }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn can_unpop(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn push(&mut self, counters: IdCounters) {
        self.redo.clear();
        self.stack.push(Checkpoint::new(counters));
        if let Some(max) = self.max_depth {
            if self.stack.len() > max.max(1) {
                self.stack.remove(0);
                debug!(max, "checkpoint limit reached, oldest checkpoint committed");
            }
        }
    }

    /// Log of property `id` in the open checkpoint, created on first use.
    /// `None` when no checkpoint is open. Always discards redo state.
    pub fn log_for<L>(&mut self, id: PropertyId, journal: impl FnOnce() -> Option<Arc<dyn Journal>>) -> Option<&mut L>
    where
        L: Default + Any + Send + Sync,
    {
        self.redo.clear();
        let top = self.stack.last_mut()?;
        let entry = match top.journals.entry(id) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(JournalEntry { journal: journal()?, log: Box::new(L::default()) }),
        };
        entry.log.downcast_mut::<L>()
    }

    pub fn note_change(&mut self, change: Change) {
        self.redo.clear();
        if let Some(top) = self.stack.last_mut() {
            top.changes.push(change);
        }
    }

    pub fn take_top(&mut self) -> Result<Checkpoint> {
        self.stack
            .pop()
            .ok_or_else(|| Error::InvalidState("pop without a matching push".into()))
    }

    /// Closes the top checkpoint keeping its changes. Returns whether it
    /// recorded anything.
    pub fn commit_top(&mut self) -> Result<bool> {
        let top = self.take_top()?;
        if top.is_empty() {
            return Ok(false);
        }
        if let Some(parent) = self.stack.last_mut() {
            parent.absorb(top);
        }
        Ok(true)
    }

    pub fn stash_redo(&mut self, checkpoint: Checkpoint) {
        self.redo.push(checkpoint);
    }

    pub fn take_redo(&mut self) -> Result<Checkpoint> {
        self.redo
            .pop()
            .ok_or_else(|| Error::InvalidState("unpop without a popped checkpoint".into()))
    }

    /// Puts a re-applied checkpoint back on the stack, keeping further redo.
    pub fn reopen(&mut self, checkpoint: Checkpoint) {
        self.stack.push(checkpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(default: i32, entries: &[(u32, i32)]) -> ValueStore<NodeId, i32> {
        let mut s = ValueStore::new(default);
        for (n, v) in entries {
            s.set(NodeId(*n), *v);
        }
        s
    }

    fn snapshot(s: &ValueStore<NodeId, i32>) -> (i32, Vec<(NodeId, i32)>) {
        let keys = s.non_default_keys();
        (*s.default_value(), keys.into_iter().map(|k| (k, *s.get(k))).collect())
    }

    #[test]
    fn test_restore_touched_and_default() {
        let mut s = store(0, &[(1, 5)]);
        let before = snapshot(&s);
        let mut log = StoreLog::default();

        log.note(NodeId(1), || s.override_of(NodeId(1)).cloned());
        s.set(NodeId(1), 6);
        log.note(NodeId(2), || s.override_of(NodeId(2)).cloned());
        s.set(NodeId(2), 7);
        log.note(NodeId(1), || s.override_of(NodeId(1)).cloned());
        s.set(NodeId(1), 8);
        log.note_default(|| *s.default_value());
        s.set_default(3);

        log.restore(&mut s);
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn test_restore_after_reset() {
        let mut s = store(0, &[(1, 5), (2, 6)]);
        let before = snapshot(&s);
        let mut log = StoreLog::default();

        log.note(NodeId(1), || s.override_of(NodeId(1)).cloned());
        s.set(NodeId(1), 9);
        let (d, o) = s.set_all(4);
        log.note_reset(d, o);
        log.note(NodeId(3), || s.override_of(NodeId(3)).cloned());
        s.set(NodeId(3), 1);

        log.restore(&mut s);
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn test_mirror_reinstates_current() {
        let mut s = store(0, &[(1, 5)]);
        let mut log = StoreLog::default();
        log.note(NodeId(1), || s.override_of(NodeId(1)).cloned());
        s.set(NodeId(1), 2);
        let after = snapshot(&s);
        let redo = log.mirror(&s);

        log.restore(&mut s);
        assert_eq!(*s.get(NodeId(1)), 5);
        redo.restore(&mut s);
        assert_eq!(snapshot(&s), after);
    }

    #[test]
    fn test_absorb_keeps_parent_priors() {
        let mut s = store(0, &[]);
        let before = snapshot(&s);

        let mut parent = StoreLog::default();
        parent.note(NodeId(1), || s.override_of(NodeId(1)).cloned());
        s.set(NodeId(1), 1);

        let mut child = StoreLog::default();
        child.note(NodeId(1), || s.override_of(NodeId(1)).cloned());
        s.set(NodeId(1), 2);
        let (d, o) = s.set_all(7);
        child.note_reset(d, o);

        parent.absorb(child);
        parent.restore(&mut s);
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn test_recorder_usage_errors() {
        let mut rec = Recorder::new(None);
        assert!(matches!(rec.take_top(), Err(Error::InvalidState(_))));
        assert!(matches!(rec.commit_top(), Err(Error::InvalidState(_))));
        assert!(matches!(rec.take_redo(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_recorder_max_depth() {
        let mut rec = Recorder::new(Some(2));
        for _ in 0..5 {
            rec.push(IdCounters::default());
        }
        assert_eq!(rec.depth(), 2);
    }

    #[test]
    fn test_empty_commit() {
        let mut rec = Recorder::new(None);
        rec.push(IdCounters::default());
        assert_eq!(rec.commit_top().ok(), Some(false));
        assert_eq!(rec.depth(), 0);
    }

    #[test]
    fn test_id_counters_exhaustion() {
        let mut counters = IdCounters { node: u32::MAX - 1, edge: 0, graph: 1 };
        assert_eq!(counters.next_node().ok(), Some(u32::MAX - 1));
        assert!(matches!(counters.next_node(), Err(Error::InvalidState(_))));
        assert_eq!(counters.node, u32::MAX);
        assert_eq!(counters.next_edge().ok(), Some(0));
        assert_eq!(counters.next_graph().ok(), Some(1));
        assert_eq!(counters, IdCounters { node: u32::MAX, edge: 1, graph: 2 });
    }
}
