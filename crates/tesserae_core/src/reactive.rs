//! Reactive signal storage and the `State<T>` handle
//!
//! Signals are type-erased values stored in a slot map. Every write bumps
//! the signal's version so hosts can cheaply tell whether anything they
//! rendered from has changed.
//!
//! # State
//!
//! [`State<T>`] binds a signal to a shared graph and a shared dirty flag.
//! It's the primary API for component state.
//!
//! ```rust
//! use tesserae_core::reactive::ReactiveContext;
//!
//! let ctx = ReactiveContext::new();
//! let open = ctx.use_state(false);
//!
//! open.set(true);
//! assert!(open.get());
//!
//! // Writes that change what's on screen also mark the host dirty
//! open.set_rebuild(false);
//! assert!(ctx.take_dirty());
//! ```

use std::any::Any;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
}

/// A reactive signal handle (cheap to copy)
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Signal<T> {
    /// Get the signal's ID
    pub fn id(&self) -> SignalId {
        self.id
    }
}

/// Internal signal node storage
struct SignalNode {
    value: Box<dyn Any + Send>,
    version: u64,
}

/// The graph that owns every signal value
#[derive(Default)]
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalNode>,
}

impl ReactiveGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new signal with an initial value
    pub fn create_signal<T: Send + 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalNode {
            value: Box::new(initial),
            version: 0,
        });
        Signal {
            id,
            _marker: PhantomData,
        }
    }

    /// Get a signal's value
    ///
    /// Returns `None` when the signal was disposed.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>())
            .cloned()
    }

    /// Set a signal's value
    pub fn set<T: Send + 'static>(&mut self, signal: Signal<T>, value: T) {
        if let Some(node) = self.signals.get_mut(signal.id) {
            node.value = Box::new(value);
            node.version += 1;
        }
    }

    /// Update a signal's value using a function
    pub fn update<T: Clone + Send + 'static, F: FnOnce(T) -> T>(
        &mut self,
        signal: Signal<T>,
        f: F,
    ) {
        if let Some(current) = self.get(signal) {
            self.set(signal, f(current));
        }
    }

    /// Number of writes a signal has seen
    pub fn signal_version(&self, id: SignalId) -> Option<u64> {
        self.signals.get(id).map(|node| node.version)
    }

    /// Drop a signal and its value
    pub fn dispose_signal(&mut self, id: SignalId) {
        self.signals.remove(id);
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> ReactiveStats {
        ReactiveStats {
            signal_count: self.signals.len(),
        }
    }
}

/// Statistics about the reactive graph
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReactiveStats {
    pub signal_count: usize,
}

// =============================================================================
// STATE - High-level API for component state management
// =============================================================================

/// Shared reactive graph
pub type SharedReactiveGraph = Arc<Mutex<ReactiveGraph>>;

/// Shared dirty flag for triggering host re-renders
pub type DirtyFlag = Arc<AtomicBool>;

fn lock(graph: &SharedReactiveGraph) -> MutexGuard<'_, ReactiveGraph> {
    // A panic while holding the lock leaves the graph itself consistent,
    // every write is a single slot replacement.
    graph.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A bound state value with direct get/set methods
///
/// # Example
///
/// ```rust
/// use tesserae_core::reactive::ReactiveContext;
///
/// let ctx = ReactiveContext::new();
/// let counter = ctx.use_state(0i32);
///
/// counter.update(|n| n + 1);
/// assert_eq!(counter.get(), 1);
/// ```
#[derive(Clone)]
pub struct State<T> {
    signal: Signal<T>,
    reactive: SharedReactiveGraph,
    dirty_flag: DirtyFlag,
}

impl<T> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("signal", &self.signal.id())
            .finish()
    }
}

impl<T: Clone + Send + 'static> State<T> {
    /// Create a new State wrapper
    pub fn new(signal: Signal<T>, reactive: SharedReactiveGraph, dirty_flag: DirtyFlag) -> Self {
        Self {
            signal,
            reactive,
            dirty_flag,
        }
    }

    /// Get the current value
    pub fn get(&self) -> T
    where
        T: Default,
    {
        lock(&self.reactive).get(self.signal).unwrap_or_default()
    }

    /// Get the current value, returning None if the signal is gone
    pub fn try_get(&self) -> Option<T> {
        lock(&self.reactive).get(self.signal)
    }

    /// Set a new value without marking the host dirty
    pub fn set(&self, value: T) {
        lock(&self.reactive).set(self.signal, value);
    }

    /// Set a new value AND mark the host dirty
    ///
    /// Use this when the write changes what the host renders.
    pub fn set_rebuild(&self, value: T) {
        lock(&self.reactive).set(self.signal, value);
        self.dirty_flag.store(true, Ordering::SeqCst);
    }

    /// Update the value using a function
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        lock(&self.reactive).update(self.signal, f);
    }

    /// Update the value AND mark the host dirty
    pub fn update_rebuild(&self, f: impl FnOnce(T) -> T) {
        lock(&self.reactive).update(self.signal, f);
        self.dirty_flag.store(true, Ordering::SeqCst);
    }

    /// Number of writes this state has seen
    pub fn version(&self) -> u64 {
        lock(&self.reactive)
            .signal_version(self.signal.id())
            .unwrap_or_default()
    }

    /// Get the underlying signal
    pub fn signal(&self) -> Signal<T> {
        self.signal
    }

    /// Get the signal ID (for dependency tracking)
    pub fn signal_id(&self) -> SignalId {
        self.signal.id()
    }
}

/// Owner of a reactive graph and the dirty flag its states share
///
/// Components allocate their internal state here; hosts poll
/// [`take_dirty`](Self::take_dirty) to decide whether to re-render.
#[derive(Clone, Default)]
pub struct ReactiveContext {
    graph: SharedReactiveGraph,
    dirty: DirtyFlag,
}

impl ReactiveContext {
    /// Create a context with an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new state slot
    pub fn use_state<T: Clone + Send + 'static>(&self, initial: T) -> State<T> {
        let signal = lock(&self.graph).create_signal(initial);
        State::new(signal, Arc::clone(&self.graph), Arc::clone(&self.dirty))
    }

    /// Whether any state was written with `set_rebuild` since the last call
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Read and clear the dirty flag
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    /// Get statistics about the underlying graph
    pub fn stats(&self) -> ReactiveStats {
        lock(&self.graph).stats()
    }
}
