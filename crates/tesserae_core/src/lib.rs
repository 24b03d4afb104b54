//! Tesserae Core Runtime
//!
//! Foundational primitives for the Tesserae selector components:
//!
//! - **Reactive State**: versioned signals behind a shared `State<T>` handle
//! - **State Slots**: controlled / uncontrolled value-plus-setter pairs
//! - **Events**: pointer and key input with the geometry they carry
//! - **Document**: page-wide pointer listeners scoped to a guard
//!
//! # Example
//!
//! ```rust
//! use tesserae_core::{ReactiveContext, Slot};
//!
//! let ctx = ReactiveContext::new();
//!
//! // Caller-owned state handed to a component
//! let filter = ctx.use_state(String::new());
//! let slot = Slot::from_state(&filter);
//!
//! slot.set("cat".to_string());
//! assert_eq!(filter.get(), "cat");
//! ```

pub mod document;
pub mod events;
pub mod reactive;
pub mod slot;

pub use document::{Document, ListenerGuard, ListenerId, PointerCallback};
pub use events::{KeyCode, MouseButton, ParseKeyError, Point, PointerEvent, Rect};
pub use reactive::{
    DirtyFlag, ReactiveContext, ReactiveGraph, ReactiveStats, SharedReactiveGraph, Signal,
    SignalId, State,
};
pub use slot::{Slot, SlotGetter, SlotOwner, SlotSetter};
