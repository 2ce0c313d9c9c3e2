//! Synchronous, snapshot-dispatched handler lists.
//!
//! Replaces a JS-style event bus with explicit per-event handler lists:
//! each named event the facade exposes (see [`crate::analyzer`]) owns
//! one [`EventHandlers<T>`] rather than routing through a shared
//! string-keyed dispatcher. Handlers are stored behind a
//! [`std::sync::Mutex`] (rather than the `Rc`/`RefCell` the single
//! browser-thread original relied on) since the driver's tick loop
//! runs on a `tokio` task that may be scheduled on any worker thread.

use std::{
    panic,
    sync::{Arc, Mutex},
};

/// Opaque handle returned by [`EventHandlers::subscribe`], passed back
/// to [`EventHandlers::unsubscribe`] to remove a handler.
pub type SubscriptionId = u64;

/// A list of handlers for one event, dispatched synchronously from a
/// snapshot taken at the start of dispatch.
///
/// Handlers registered or removed *during* dispatch do not affect the
/// in-flight dispatch: [`Self::dispatch`] iterates a clone of the
/// handler list, not the live one.
pub struct EventHandlers<T> {
    next_id: Mutex<SubscriptionId>,
    handlers: Mutex<Vec<(SubscriptionId, Arc<dyn Fn(T) + Send + Sync>)>>,
}

impl<T> Default for EventHandlers<T> {
    fn default() -> Self {
        Self {
            next_id: Mutex::new(0),
            handlers: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone + 'static> EventHandlers<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`, returning an id usable with
    /// [`Self::unsubscribe`].
    pub fn subscribe(
        &self,
        handler: impl Fn(T) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };
        self.handlers.lock().unwrap().push((id, Arc::new(handler)));
        id
    }

    /// Removes a previously registered handler. A no-op if `id` is not
    /// (or is no longer) registered.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.lock().unwrap().retain(|(hid, _)| *hid != id);
    }

    /// Invokes every currently-registered handler with `value`.
    ///
    /// A handler that panics is caught, logged, and does not prevent
    /// the remaining handlers in this dispatch from running; it never
    /// propagates to the caller or corrupts engine state.
    pub fn dispatch(&self, value: T) {
        let snapshot: Vec<_> = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in snapshot {
            let value = value.clone();
            let outcome = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                handler(value);
            }));
            if outcome.is_err() {
                log::error!("connection quality observer handler panicked");
            }
        }
    }
}
