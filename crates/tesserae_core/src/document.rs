//! Document-level pointer listeners
//!
//! Components that need to hear about presses anywhere on the page (an open
//! dropdown closing on an outside press, say) register here. Registration
//! returns a [`ListenerGuard`]; dropping the guard unregisters the listener,
//! so a listener can't outlive whatever holds its guard.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tesserae_core::document::Document;
//! use tesserae_core::events::PointerEvent;
//!
//! let document = Document::new();
//! let presses = Rc::new(Cell::new(0));
//!
//! let presses_clone = Rc::clone(&presses);
//! let guard = document.on_pointer_down(move |_| presses_clone.set(presses_clone.get() + 1));
//!
//! document.pointer_down(PointerEvent::down(4.0, 4.0));
//! drop(guard);
//! document.pointer_down(PointerEvent::down(4.0, 4.0));
//!
//! assert_eq!(presses.get(), 1);
//! assert_eq!(document.listener_count(), 0);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::trace;

use crate::events::PointerEvent;

new_key_type! {
    /// Identifier of a registered document listener
    pub struct ListenerId;
}

/// Callback for document pointer presses
///
/// Uses Rc since the UI is single-threaded.
pub type PointerCallback = Rc<dyn Fn(&PointerEvent)>;

type Registry = RefCell<SlotMap<ListenerId, PointerCallback>>;

/// The page-wide event source components attach to
#[derive(Clone, Default)]
pub struct Document {
    listeners: Rc<Registry>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pointer-down listener for as long as the guard lives
    #[must_use = "dropping the guard unregisters the listener immediately"]
    pub fn on_pointer_down<F>(&self, handler: F) -> ListenerGuard
    where
        F: Fn(&PointerEvent) + 'static,
    {
        let id = self.listeners.borrow_mut().insert(Rc::new(handler));
        trace!(?id, "document listener registered");
        ListenerGuard {
            id,
            registry: Rc::downgrade(&self.listeners),
        }
    }

    /// Deliver a pointer press to every registered listener
    ///
    /// Listeners run in registration order. A listener removed by an
    /// earlier one during the same dispatch is skipped. Returns the number
    /// of listeners that ran.
    pub fn pointer_down(&self, event: PointerEvent) -> usize {
        let snapshot: SmallVec<[(ListenerId, PointerCallback); 4]> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, cb)| (id, Rc::clone(cb)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.listeners.borrow().contains_key(id) {
                continue;
            }
            callback(&event);
            delivered += 1;
        }
        delivered
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Keeps a document listener registered; unregisters it on drop
#[derive(Debug)]
pub struct ListenerGuard {
    id: ListenerId,
    registry: Weak<Registry>,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.borrow().contains_key(self.id))
            .unwrap_or(false)
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        // The document may already be gone; nothing to release then
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
            trace!(id = ?self.id, "document listener released");
        }
    }
}
