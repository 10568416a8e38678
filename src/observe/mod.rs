//! # Observation
//!
//! Every property mutation and every structural graph change is published
//! as an [`Event`] on an [`EventHub`]. Subscribers come in two flavours:
//!
//! - **listeners** (`listen`) get each event synchronously, at the point of
//!   mutation, including "before" events and even while observers are held;
//! - **observers** (`observe`) get batches of after-phase and structural
//!   events. While a [`HoldGuard`] is alive their events are queued; the
//!   release of the last guard hands each observer one batch.
//!
//! Callbacks are always invoked with no internal lock held, so they may
//! mutate properties re-entrantly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use hashbrown::HashMap;
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::error;

use crate::model::{EdgeId, GraphId, NodeId, PropertyId};

// ============================================================================
// Events
// ============================================================================

/// Which values a property event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Edge(EdgeId),
    /// Bulk set of every node value.
    AllNodes,
    /// Bulk set of every edge value.
    AllEdges,
    /// Default node value changed, existing values kept.
    NodeDefault,
    /// Default edge value changed, existing values kept.
    EdgeDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

/// A property value mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    pub property: PropertyId,
    pub name: Arc<str>,
    pub target: EventTarget,
    pub phase: Phase,
}

/// Structural change of one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEventKind {
    AddNode(NodeId),
    DelNode(NodeId),
    AddEdge(EdgeId),
    DelEdge(EdgeId),
    AddSubgraph(GraphId),
    AddLocalProperty(String),
    AddInheritedProperty(String),
    BeforeDelLocalProperty(String),
    AfterDelLocalProperty(String),
    BeforeDelInheritedProperty(String),
    AfterDelInheritedProperty(String),
    BeforeRenameLocalProperty { old: String, new: String },
    AfterRenameLocalProperty { old: String, new: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEvent {
    pub graph: GraphId,
    pub kind: GraphEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Property(PropertyEvent),
    Graph(GraphEvent),
}

impl Event {
    /// "About to happen" events. Listeners only; observers never see them.
    pub fn is_information(&self) -> bool {
        match self {
            Event::Property(e) => e.phase == Phase::Before,
            Event::Graph(e) => matches!(
                e.kind,
                GraphEventKind::BeforeDelLocalProperty(_)
                    | GraphEventKind::BeforeDelInheritedProperty(_)
                    | GraphEventKind::BeforeRenameLocalProperty { .. }
            ),
        }
    }

    pub fn as_property(&self) -> Option<&PropertyEvent> {
        match self {
            Event::Property(e) => Some(e),
            Event::Graph(_) => None,
        }
    }

    pub fn as_graph(&self) -> Option<&GraphEvent> {
        match self {
            Event::Graph(e) => Some(e),
            Event::Property(_) => None,
        }
    }
}

/// What a subscription is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Property(PropertyId),
    Graph(GraphId),
}

// ============================================================================
// EventHub
// ============================================================================

type ListenFn = Arc<dyn Fn(&Event) + Send + Sync>;
type ObserveFn = Arc<dyn Fn(&[Event]) + Send + Sync>;

#[derive(Clone)]
enum Callback {
    Listener(ListenFn),
    Observer(ObserveFn),
}

struct Subscriber {
    id: u64,
    subject: Subject,
    callback: Callback,
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    /// Registration order.
    subscribers: Vec<Subscriber>,
    holds: usize,
    /// Observer id → events queued while held.
    queued: HashMap<u64, Vec<Event>>,
}

/// Dispatches events to subscribers. One hub is shared by a whole graph
/// hierarchy and all of its properties.
pub struct EventHub {
    state: Mutex<HubState>,
    depth: AtomicUsize,
    max_depth: usize,
}

impl EventHub {
    pub fn new(max_depth: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(HubState::default()),
            depth: AtomicUsize::new(0),
            max_depth,
        })
    }

    /// Registers a listener. Dropping the returned `Subscription` removes it.
    pub fn listen<F>(self: &Arc<Self>, subject: Subject, f: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(subject, Callback::Listener(Arc::new(f)))
    }

    /// Registers an observer. Dropping the returned `Subscription` removes it.
    pub fn observe<F>(self: &Arc<Self>, subject: Subject, f: F) -> Subscription
    where
        F: Fn(&[Event]) + Send + Sync + 'static,
    {
        self.subscribe(subject, Callback::Observer(Arc::new(f)))
    }

    fn subscribe(self: &Arc<Self>, subject: Subject, callback: Callback) -> Subscription {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push(Subscriber { id, subject, callback });
        Subscription { hub: Arc::downgrade(self), id: Some(id) }
    }

    fn unsubscribe(&self, id: u64) {
        let mut state = self.state.lock();
        state.subscribers.retain(|s| s.id != id);
        state.queued.remove(&id);
    }

    /// Whether anybody subscribed to `subject`.
    pub fn is_observed(&self, subject: Subject) -> bool {
        self.state.lock().subscribers.iter().any(|s| s.subject == subject)
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    pub fn is_held(&self) -> bool {
        self.state.lock().holds > 0
    }

    /// Publishes `event` to the subscribers of `subject`.
    pub fn emit(&self, subject: Subject, event: Event) {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst);
        let _depth = DepthGuard(&self.depth);
        if depth >= self.max_depth {
            error!(?subject, depth, "notification depth limit reached, event dropped");
            return;
        }

        let information = event.is_information();
        let mut now: SmallVec<[Callback; 4]> = SmallVec::new();
        {
            let mut state = self.state.lock();
            let HubState { subscribers, holds, queued, .. } = &mut *state;
            for sub in subscribers.iter().filter(|s| s.subject == subject) {
                match &sub.callback {
                    Callback::Listener(_) => now.push(sub.callback.clone()),
                    Callback::Observer(_) if information => {}
                    Callback::Observer(_) if *holds > 0 => {
                        queued.entry(sub.id).or_default().push(event.clone());
                    }
                    Callback::Observer(_) => now.push(sub.callback.clone()),
                }
            }
        }

        for callback in now {
            match callback {
                Callback::Listener(f) => f(&event),
                Callback::Observer(f) => f(std::slice::from_ref(&event)),
            }
        }
    }

    /// Starts queueing observer deliveries until the guard is dropped. Nests.
    pub fn hold(self: &Arc<Self>) -> HoldGuard {
        self.state.lock().holds += 1;
        HoldGuard { hub: Arc::clone(self) }
    }

    fn unhold(&self) {
        {
            let mut state = self.state.lock();
            state.holds = state.holds.saturating_sub(1);
        }
        self.flush();
    }

    /// Delivers queued batches once no hold remains. Events produced by the
    /// observers while flushing are queued and delivered by the next round.
    fn flush(&self) {
        let mut rounds = 0;
        loop {
            let batches: Vec<(ObserveFn, Vec<Event>)> = {
                let mut state = self.state.lock();
                if state.holds > 0 || state.queued.is_empty() {
                    return;
                }
                if rounds >= self.max_depth {
                    error!(rounds, "observer flush does not settle, queued events dropped");
                    state.queued.clear();
                    return;
                }
                state.holds += 1;
                let HubState { subscribers, queued, .. } = &mut *state;
                subscribers
                    .iter()
                    .filter_map(|sub| match &sub.callback {
                        Callback::Observer(f) => queued.remove(&sub.id).map(|events| (Arc::clone(f), events)),
                        Callback::Listener(_) => None,
                    })
                    .collect()
            };

            for (f, events) in &batches {
                f(events);
            }

            self.state.lock().holds -= 1;
            rounds += 1;
        }
    }
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Guards
// ============================================================================

/// Keeps a listener or observer registered. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    hub: Weak<EventHub>,
    id: Option<u64>,
}

impl Subscription {
    /// Keeps the subscription for the lifetime of the hub.
    pub fn detach(mut self) {
        self.id = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let (Some(id), Some(hub)) = (self.id, self.hub.upgrade()) {
            hub.unsubscribe(id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Observer hold. The last guard dropped flushes the queued batches.
#[must_use = "dropping a HoldGuard releases the hold immediately"]
pub struct HoldGuard {
    hub: Arc<EventHub>,
}

impl Drop for HoldGuard {
    fn drop(&mut self) {
        self.hub.unhold();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_event(n: u32, phase: Phase) -> Event {
        Event::Property(PropertyEvent {
            property: PropertyId(1),
            name: Arc::from("p"),
            target: EventTarget::Node(NodeId(n)),
            phase,
        })
    }

    const P: Subject = Subject::Property(PropertyId(1));

    #[test]
    fn test_listeners_in_registration_order() {
        let hub = EventHub::new(200);
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&log), Arc::clone(&log));
        let _s1 = hub.listen(P, move |_| a.lock().push("first"));
        let _s2 = hub.listen(P, move |_| b.lock().push("second"));
        hub.emit(P, node_event(1, Phase::Before));
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_subject_filtering() {
        let hub = EventHub::new(200);
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _s = hub.listen(Subject::Property(PropertyId(2)), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        hub.emit(P, node_event(1, Phase::After));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_observer_skips_information() {
        let hub = EventHub::new(200);
        let batches = Arc::new(Mutex::new(Vec::new()));
        let b = Arc::clone(&batches);
        let _s = hub.observe(P, move |events| b.lock().push(events.len()));
        hub.emit(P, node_event(1, Phase::Before));
        hub.emit(P, node_event(1, Phase::After));
        assert_eq!(*batches.lock(), vec![1]);
    }

    #[test]
    fn test_hold_batches_observers_not_listeners() {
        let hub = EventHub::new(200);
        let batches = Arc::new(Mutex::new(Vec::new()));
        let heard = Arc::new(AtomicUsize::new(0));
        let b = Arc::clone(&batches);
        let h = Arc::clone(&heard);
        let _o = hub.observe(P, move |events| b.lock().push(events.len()));
        let _l = hub.listen(P, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        {
            let _outer = hub.hold();
            {
                let _inner = hub.hold();
                for n in 0..10 {
                    hub.emit(P, node_event(n, Phase::After));
                }
            }
            assert!(hub.is_held());
            assert!(batches.lock().is_empty());
        }
        assert_eq!(*batches.lock(), vec![10]);
        assert_eq!(heard.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_subscription_drop_unsubscribes() {
        let hub = EventHub::new(200);
        let sub = hub.listen(P, |_| {});
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);

        hub.listen(P, |_| {}).detach();
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn test_depth_limit_stops_recursion() {
        let hub = EventHub::new(5);
        let count = Arc::new(AtomicUsize::new(0));
        let weak = Arc::downgrade(&hub);
        let c = Arc::clone(&count);
        let _s = hub.listen(P, move |e| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(hub) = weak.upgrade() {
                hub.emit(P, e.clone());
            }
        });
        hub.emit(P, node_event(1, Phase::After));
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }
}
