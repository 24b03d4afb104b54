//! Controlled / uncontrolled state slots
//!
//! A [`Slot<T>`] is a resolved value-plus-setter pair. Components ask their
//! caller for an optional slot per piece of state; when the caller supplies
//! none, the component allocates an owned one. The choice is made once, at
//! construction, and every later read and write goes through the same pair.
//!
//! ```rust
//! use tesserae_core::reactive::ReactiveContext;
//! use tesserae_core::slot::Slot;
//!
//! let ctx = ReactiveContext::new();
//!
//! // Caller keeps the state and hands the component a view of it
//! let query = ctx.use_state(String::new());
//! let slot = Slot::from_state(&query);
//! slot.set("homer".to_string());
//! assert_eq!(query.get(), "homer");
//! assert!(slot.is_controlled());
//!
//! // No caller state: the component owns it
//! let owned = Slot::owned(&ctx, false);
//! assert!(!owned.is_controlled());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::reactive::{ReactiveContext, State};

/// Getter half of a slot
pub type SlotGetter<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Setter half of a slot
pub type SlotSetter<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Who owns the value behind a slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotOwner {
    /// Allocated by the component itself
    Internal,
    /// Supplied by the caller
    External,
}

/// A resolved value + setter pair
pub struct Slot<T> {
    get: SlotGetter<T>,
    set: SlotSetter<T>,
    owner: SlotOwner,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
            owner: self.owner,
        }
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot").field("owner", &self.owner).finish()
    }
}

impl<T: Clone + Default + Send + 'static> Slot<T> {
    /// Allocate an internally owned slot
    ///
    /// Writes go through `set_rebuild`, since slots hold render-affecting
    /// state.
    pub fn owned(ctx: &ReactiveContext, initial: T) -> Self {
        let mut slot = Self::wrap_state(&ctx.use_state(initial));
        slot.owner = SlotOwner::Internal;
        slot
    }

    /// View a caller-owned `State<T>` as a slot
    pub fn from_state(state: &State<T>) -> Self {
        Self::wrap_state(state)
    }

    fn wrap_state(state: &State<T>) -> Self {
        let reader = state.clone();
        let writer = state.clone();
        Self {
            get: Arc::new(move || reader.get()),
            set: Arc::new(move |value| writer.set_rebuild(value)),
            owner: SlotOwner::External,
        }
    }
}

impl<T> Slot<T> {
    /// Build a caller-owned slot from a getter and a setter
    pub fn controlled<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
            owner: SlotOwner::External,
        }
    }

    /// Read the current value
    pub fn get(&self) -> T {
        (self.get)()
    }

    /// Write a new value
    pub fn set(&self, value: T) {
        (self.set)(value)
    }

    pub fn owner(&self) -> SlotOwner {
        self.owner
    }

    /// Whether the caller owns this slot
    pub fn is_controlled(&self) -> bool {
        self.owner == SlotOwner::External
    }
}
