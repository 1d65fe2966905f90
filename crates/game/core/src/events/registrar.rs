//! Hierarchical event registrar with a single priority queue per tree.
//!
//! Registrars live in an arena ([`RegistrarTree`]) and form a tree mirroring
//! the object hierarchy. Queueing an event on any registrar merges matching
//! listeners of that registrar and all its live descendants into the queue of
//! the tree's root; [`evaluate_events`] drains that queue from the high
//! priority end.
//!
//! # Ordering
//!
//! The queue is kept sorted ascending by [`Priority`] and popped from the back,
//! so the highest priority runs first. Among equal priorities, calls queued
//! earlier run first, and within one registrar listeners registered earlier
//! run first. Because a registrar queues its own listeners before recursing
//! into its children, a parent's listener runs before a child's listener of
//! the same priority.
//!
//! # Cascades
//!
//! A listener may queue further events or pre-queue single listener calls
//! while a pass is active. Pre-queued calls are merged into the main queue as
//! soon as the current listener returns, so a cascade of any length stays
//! strictly priority ordered. Calling [`evaluate_events`] from inside a pass is
//! a no-op.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{EventContext, EventKind, EventName, Priority};

/// Listener callback: receives the world that owns the tree and the context.
pub type ListenerFn<W> = dyn Fn(&mut W, &EventContext) + Send + Sync;

/// Callback run after a pass over the tree completes.
pub type CompletionFn<W> = dyn Fn(&mut W) + Send + Sync;

/// Index of a registrar node inside its [`RegistrarTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrarId(pub u32);

impl RegistrarId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RegistrarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registrar#{}", self.0)
    }
}

/// Registrar handle typed by the event catalog its owner understands.
pub struct Registrar<K> {
    id: RegistrarId,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Registrar<K> {
    pub(crate) const fn from_id(id: RegistrarId) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    pub const fn id(&self) -> RegistrarId {
        self.id
    }
}

impl<K> Clone for Registrar<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Registrar<K> {}

impl<K> PartialEq for Registrar<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K> Eq for Registrar<K> {}

impl<K> fmt::Debug for Registrar<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Registrar").field(&self.id).finish()
    }
}

impl<K> From<Registrar<K>> for RegistrarId {
    fn from(registrar: Registrar<K>) -> Self {
        registrar.id
    }
}

/// Identifier of a registered listener, unique within a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// A registered listener: priority plus callback.
pub struct Listener<W> {
    id: ListenerId,
    priority: Priority,
    callback: Arc<ListenerFn<W>>,
}

impl<W> Listener<W> {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl<W> Clone for Listener<W> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            priority: self.priority,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<W> fmt::Debug for Listener<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// One pending listener invocation in a root queue.
struct QueuedCall<W> {
    listener: Listener<W>,
    context: Arc<EventContext>,
    origin: RegistrarId,
}

impl<W> QueuedCall<W> {
    fn priority(&self) -> Priority {
        self.listener.priority
    }
}

/// State of one drain pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluationState {
    pub terminate: bool,
    pub executed: usize,
    pub skipped: usize,
}

struct RegistrarNode<W> {
    parent: Option<RegistrarId>,
    children: Vec<RegistrarId>,
    root: RegistrarId,
    active: bool,
    listeners: HashMap<EventName, Vec<Listener<W>>>,
    completions: Vec<Arc<CompletionFn<W>>>,
    // Only meaningful while this node is a root.
    queue: Vec<QueuedCall<W>>,
    pre_queue: Vec<QueuedCall<W>>,
    evaluation: Option<EvaluationState>,
}

impl<W> RegistrarNode<W> {
    fn new(id: RegistrarId) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            root: id,
            active: true,
            listeners: HashMap::new(),
            completions: Vec::new(),
            queue: Vec::new(),
            pre_queue: Vec::new(),
            evaluation: None,
        }
    }
}

/// Arena of registrar nodes.
///
/// Nodes are never freed: a deactivated node stays behind as an inert
/// tombstone so ids held elsewhere remain valid.
pub struct RegistrarTree<W> {
    nodes: Vec<RegistrarNode<W>>,
    next_listener: u64,
}

impl<W> Default for RegistrarTree<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> fmt::Debug for RegistrarTree<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrarTree")
            .field("nodes", &self.nodes.len())
            .field("next_listener", &self.next_listener)
            .finish()
    }
}

impl<W> RegistrarTree<W> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_listener: 0,
        }
    }

    /// Allocates a new, detached registrar (its own root).
    pub fn create<K: EventKind>(&mut self) -> Registrar<K> {
        let id = RegistrarId(self.nodes.len() as u32);
        self.nodes.push(RegistrarNode::new(id));
        Registrar::from_id(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: RegistrarId) -> &RegistrarNode<W> {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: RegistrarId) -> &mut RegistrarNode<W> {
        &mut self.nodes[id.index()]
    }

    pub fn is_active(&self, id: impl Into<RegistrarId>) -> bool {
        self.node(id.into()).active
    }

    pub fn root_of(&self, id: impl Into<RegistrarId>) -> RegistrarId {
        self.node(id.into()).root
    }

    pub fn parent_of(&self, id: impl Into<RegistrarId>) -> Option<RegistrarId> {
        self.node(id.into()).parent
    }

    pub fn children_of(&self, id: impl Into<RegistrarId>) -> &[RegistrarId] {
        &self.node(id.into()).children
    }

    /// Number of calls waiting in the queue of `id`'s root.
    pub fn queued_len(&self, id: impl Into<RegistrarId>) -> usize {
        let root = self.root_of(id);
        self.node(root).queue.len()
    }

    /// Returns true while a pass is draining the tree containing `id`.
    pub fn is_evaluating(&self, id: impl Into<RegistrarId>) -> bool {
        let root = self.root_of(id);
        self.node(root).evaluation.is_some()
    }

    /// Registers a listener for `event`, keeping the per-event list sorted.
    pub fn add_event_listener<K, F>(
        &mut self,
        registrar: Registrar<K>,
        event: K,
        priority: Priority,
        callback: F,
    ) -> ListenerId
    where
        K: EventKind,
        F: Fn(&mut W, &EventContext) + Send + Sync + 'static,
    {
        self.add_listener_by_name(registrar.id(), event.into(), priority, Arc::new(callback))
    }

    /// Untyped registration, used where the event name comes from content
    /// that was already checked against the owner's kind.
    pub(crate) fn add_listener_by_name(
        &mut self,
        registrar: RegistrarId,
        event: EventName,
        priority: Priority,
        callback: Arc<ListenerFn<W>>,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        let list = self
            .node_mut(registrar)
            .listeners
            .entry(event)
            .or_default();
        // Lower bound: a later registration lands below earlier equals and is
        // therefore popped after them.
        let at = list.partition_point(|l| l.priority < priority);
        list.insert(
            at,
            Listener {
                id,
                priority,
                callback,
            },
        );

        trace!(
            target: "armada::events",
            registrar = %registrar,
            event = %event,
            priority = %priority,
            listener = id.0,
            "listener registered"
        );
        id
    }

    /// Removes a listener. Calls already sitting in a queue still run.
    pub fn remove_event_listener(
        &mut self,
        registrar: impl Into<RegistrarId>,
        listener: ListenerId,
    ) -> bool {
        let node = self.node_mut(registrar.into());
        for list in node.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|l| l.id == listener) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Looks up a registered listener, e.g. to pre-queue it.
    pub fn listener(
        &self,
        registrar: impl Into<RegistrarId>,
        listener: ListenerId,
    ) -> Option<Listener<W>> {
        self.node(registrar.into())
            .listeners
            .values()
            .flat_map(|list| list.iter())
            .find(|l| l.id == listener)
            .cloned()
    }

    /// Registers a callback run after every pass over the containing tree.
    pub fn add_completion_callback<F>(&mut self, registrar: impl Into<RegistrarId>, callback: F)
    where
        F: Fn(&mut W) + Send + Sync + 'static,
    {
        self.node_mut(registrar.into())
            .completions
            .push(Arc::new(callback));
    }

    /// Attaches `child` under `parent`; the child's subtree adopts the
    /// parent's root. Calls pending in the child's own queue move over.
    pub fn add_sub_registrar(
        &mut self,
        parent: impl Into<RegistrarId>,
        child: impl Into<RegistrarId>,
    ) {
        let (parent, child) = (parent.into(), child.into());

        if !self.node(parent).active || !self.node(child).active {
            debug!(
                target: "armada::events",
                %parent, %child,
                "ignoring attach of inactive registrar"
            );
            return;
        }
        if self.is_ancestor_or_self(child, parent) {
            warn!(
                target: "armada::events",
                %parent, %child,
                "refusing attach that would create a cycle"
            );
            return;
        }

        if let Some(old_parent) = self.node(child).parent {
            self.remove_sub_registrar(old_parent, child);
        }

        let root = self.node(parent).root;
        let orphaned = std::mem::take(&mut self.node_mut(child).queue);

        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        self.set_subtree_root(child, root);

        if !orphaned.is_empty() {
            merge_sorted(&mut self.node_mut(root).queue, orphaned);
        }
    }

    /// Detaches `child` from `parent`; the child becomes its own root.
    pub fn remove_sub_registrar(
        &mut self,
        parent: impl Into<RegistrarId>,
        child: impl Into<RegistrarId>,
    ) {
        let (parent, child) = (parent.into(), child.into());
        let children = &mut self.node_mut(parent).children;
        let Some(pos) = children.iter().position(|&c| c == child) else {
            return;
        };
        children.remove(pos);
        self.node_mut(child).parent = None;
        self.set_subtree_root(child, child);
    }

    /// Permanently disables a registrar and all its descendants.
    ///
    /// Idempotent. Calls already queued from any of these registrars are
    /// skipped when popped.
    pub fn deactivate(&mut self, registrar: impl Into<RegistrarId>) {
        let id = registrar.into();
        if !self.node(id).active {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.remove_sub_registrar(parent, id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.active = false;
            node.queue.clear();
            node.pre_queue.clear();
            stack.extend(node.children.iter().copied());
        }

        debug!(target: "armada::events", registrar = %id, "registrar deactivated");
    }

    /// Queues every listener for `context.name` in this registrar and all live
    /// descendants into the root queue.
    pub fn queue_event(&mut self, registrar: impl Into<RegistrarId>, context: EventContext) {
        let id = registrar.into();
        let root = self.node(id).root;
        let context = Arc::new(context);

        trace!(
            target: "armada::events",
            registrar = %id,
            event = %context.name,
            source = %context.source,
            "event queued"
        );

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if !node.active {
                continue;
            }

            let incoming: Vec<QueuedCall<W>> = node
                .listeners
                .get(&context.name)
                .map(|list| {
                    list.iter()
                        .map(|listener| QueuedCall {
                            listener: listener.clone(),
                            context: Arc::clone(&context),
                            origin: current,
                        })
                        .collect()
                })
                .unwrap_or_default();

            // Depth-first, children in attach order.
            stack.extend(node.children.iter().rev().copied());

            if !incoming.is_empty() {
                merge_sorted(&mut self.node_mut(root).queue, incoming);
            }
        }
    }

    /// Schedules a single listener call during an active pass.
    ///
    /// The call is merged into the main queue right after the currently
    /// executing listener returns.
    pub fn pre_queue_listener_call(
        &mut self,
        origin: impl Into<RegistrarId>,
        listener: Listener<W>,
        context: EventContext,
    ) {
        let origin = origin.into();
        let root = self.node(origin).root;
        self.node_mut(root).pre_queue.push(QueuedCall {
            listener,
            context: Arc::new(context),
            origin,
        });
    }

    /// Asks the active pass on `registrar`'s tree to stop after the current
    /// listener. No-op outside a pass.
    pub fn terminate(&mut self, registrar: impl Into<RegistrarId>) {
        let root = self.root_of(registrar);
        if let Some(state) = self.node_mut(root).evaluation.as_mut() {
            state.terminate = true;
        }
    }

    fn flush_pre_queue(&mut self, root: RegistrarId) {
        let mut pending = std::mem::take(&mut self.node_mut(root).pre_queue);
        if pending.is_empty() {
            return;
        }
        // Earlier pre-queued calls must sit higher among equals.
        pending.reverse();
        pending.sort_by_key(QueuedCall::priority);
        merge_sorted(&mut self.node_mut(root).queue, pending);
    }

    fn set_subtree_root(&mut self, id: RegistrarId, root: RegistrarId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.root = root;
            stack.extend(node.children.iter().copied());
        }
    }

    fn is_ancestor_or_self(&self, ancestor: RegistrarId, mut id: RegistrarId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.node(id).parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn collect_completions(&self, root: RegistrarId) -> Vec<Arc<CompletionFn<W>>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if !node.active {
                continue;
            }
            out.extend(node.completions.iter().cloned());
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}

/// Stable two-pointer merge of `incoming` into `queue`; both ascending.
///
/// On equal priority the incoming call is placed below the existing one, so
/// the call queued first is popped first.
fn merge_sorted<W>(queue: &mut Vec<QueuedCall<W>>, incoming: Vec<QueuedCall<W>>) {
    if queue.is_empty() {
        *queue = incoming;
        return;
    }

    let existing = std::mem::take(queue);
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    let mut a = existing.into_iter().peekable();
    let mut b = incoming.into_iter().peekable();

    loop {
        let take_incoming = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => y.priority() <= x.priority(),
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (None, None) => break,
        };
        let next = if take_incoming { b.next() } else { a.next() };
        merged.extend(next);
    }

    *queue = merged;
}

/// Access to the registrar tree owned by a world.
pub trait EventHost: Sized + 'static {
    fn registrars(&self) -> &RegistrarTree<Self>;
    fn registrars_mut(&mut self) -> &mut RegistrarTree<Self>;
}

/// Drains the queue of `registrar`'s root.
///
/// Returns the finished pass state, or `None` when a pass was already active
/// on that tree (the queued work is then folded into the running pass).
pub fn evaluate_events<W: EventHost>(
    world: &mut W,
    registrar: impl Into<RegistrarId>,
) -> Option<EvaluationState> {
    let root = world.registrars().root_of(registrar);

    {
        let tree = world.registrars_mut();
        let node = tree.node_mut(root);
        if node.evaluation.is_some() {
            trace!(target: "armada::events", %root, "evaluation already in progress");
            return None;
        }
        if !node.active {
            return None;
        }
        node.evaluation = Some(EvaluationState::default());
        tree.flush_pre_queue(root);
    }

    loop {
        let call = {
            let node = world.registrars_mut().node_mut(root);
            if node.evaluation.is_some_and(|state| state.terminate) {
                break;
            }
            node.queue.pop()
        };
        let Some(call) = call else {
            break;
        };

        if !world.registrars().is_active(call.origin) {
            trace!(
                target: "armada::events",
                origin = %call.origin,
                event = %call.context.name,
                "skipping call from inactive registrar"
            );
            if let Some(state) = world.registrars_mut().node_mut(root).evaluation.as_mut() {
                state.skipped += 1;
            }
            continue;
        }

        (call.listener.callback)(world, &call.context);

        let tree = world.registrars_mut();
        if let Some(state) = tree.node_mut(root).evaluation.as_mut() {
            state.executed += 1;
        }
        tree.flush_pre_queue(root);
    }

    let tree = world.registrars_mut();
    let node = tree.node_mut(root);
    let state = node.evaluation.take().unwrap_or_default();
    if state.terminate {
        debug!(
            target: "armada::events",
            %root,
            dropped = node.queue.len(),
            "evaluation terminated early"
        );
        node.queue.clear();
        node.pre_queue.clear();
    }

    let completions = tree.collect_completions(root);
    for completion in completions {
        completion(world);
    }

    Some(state)
}
