use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

use crate::events::{ScopeId, UserEvent};

/// Re-entrant publishes deeper than this are dropped with a warning.
/// A handler is allowed to publish follow-up events, but a cycle of
/// handlers feeding each other must terminate somewhere.
pub const MAX_PUBLISH_DEPTH: usize = 16;

thread_local! {
    static PUBLISH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Identifies one registered subscription; returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Handler = Arc<dyn Fn(&UserEvent) + Send + Sync>;

struct Subscriber {
    handle: SubscriptionHandle,
    scope: ScopeId,
    handler: Handler,
}

/// Process-wide typed publish/subscribe channel.
///
/// Topic model: project-scoped topics. [`EventBus::publish`] delivers only to
/// subscribers registered for the event's scope; [`EventBus::broadcast`]
/// delivers to every subscriber regardless of scope and exists for
/// cross-project announcements such as asset refreshes.
///
/// Handlers run synchronously and inline on the publishing thread, in
/// registration order. There is no replay buffer: a subscriber registered
/// after `publish` returns never sees that event. Handlers are expected to
/// return quickly or hand off to their own asynchronous work.
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
    next_handle: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Register a handler for all events published to `scope`.
    pub fn subscribe<F>(&self, scope: ScopeId, handler: F) -> SubscriptionHandle
    where
        F: Fn(&UserEvent) + Send + Sync + 'static,
    {
        let handle = SubscriptionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.lock_subscribers().push(Subscriber {
            handle,
            scope,
            handler: Arc::new(handler),
        });
        handle
    }

    /// Remove one subscription. Safe to call with a handle that was already
    /// removed; repeated calls are no-ops.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.lock_subscribers().retain(|s| s.handle != handle);
    }

    /// Synchronously remove every subscription registered for `scope`.
    /// Used by scope teardown so no event racing with teardown is delivered.
    pub fn unsubscribe_scope(&self, scope: ScopeId) {
        self.lock_subscribers().retain(|s| s.scope != scope);
    }

    /// Deliver `event` to every subscriber currently registered for its scope.
    pub fn publish(&self, event: &UserEvent) {
        let targets: Vec<Handler> = self
            .lock_subscribers()
            .iter()
            .filter(|s| s.scope == event.scope)
            .map(|s| Arc::clone(&s.handler))
            .collect();
        self.dispatch(&targets, event);
    }

    /// Deliver `event` to every subscriber on the bus, regardless of scope.
    pub fn broadcast(&self, event: &UserEvent) {
        let targets: Vec<Handler> = self
            .lock_subscribers()
            .iter()
            .map(|s| Arc::clone(&s.handler))
            .collect();
        self.dispatch(&targets, event);
    }

    /// Number of live subscriptions for `scope`.
    pub fn subscriber_count(&self, scope: ScopeId) -> usize {
        self.lock_subscribers()
            .iter()
            .filter(|s| s.scope == scope)
            .count()
    }

    // Handlers run outside the registry lock so a handler may itself
    // subscribe, unsubscribe, or publish without deadlocking.
    fn dispatch(&self, targets: &[Handler], event: &UserEvent) {
        let _guard = match DepthGuard::enter() {
            Some(guard) => guard,
            None => {
                warn!(%event, "publish depth cap reached, dropping re-entrant event");
                return;
            }
        };
        for handler in targets {
            handler(event);
        }
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks re-entrant publish depth on the current thread and restores it
/// even if a handler panics.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Option<Self> {
        PUBLISH_DEPTH.with(|depth| {
            if depth.get() >= MAX_PUBLISH_DEPTH {
                None
            } else {
                depth.set(depth.get() + 1);
                Some(DepthGuard)
            }
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        PUBLISH_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
