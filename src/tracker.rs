use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::bus::{EventBus, SubscriptionHandle};
use crate::events::{ScopeId, UserEvent, UserEventCategory, UserEventKind};
use crate::messages::keys;

/// Outcome reported by the host build system on build-finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failed,
}

/// Recorded status of the last observed build for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildStatus {
    #[default]
    Unknown,
    Pass,
    Fail,
}

/// Per-scope state machine turning raw build callbacks into derived task
/// events.
///
/// The recorded status is advanced only by `Task` events observed on the bus
/// (including this tracker's own publications), so any other producer of task
/// events keeps the tracker consistent; a quiet successful build records
/// `Pass` directly since it publishes nothing. Every `Failed` outcome publishes a
/// negative event, deliberately without de-duplicating repeated failures; a
/// `Success` publishes a positive "recovered" event only when the prior
/// recorded status was `Fail`.
pub struct BuildStatusTracker {
    bus: Arc<EventBus>,
    scope: ScopeId,
    status: Arc<Mutex<BuildStatus>>,
    subscription: SubscriptionHandle,
    disposed: Arc<AtomicBool>,
}

impl BuildStatusTracker {
    /// Create a tracker for `scope` and subscribe it to the bus. The status
    /// starts `Unknown` and is never persisted.
    pub fn new(bus: Arc<EventBus>, scope: ScopeId) -> Self {
        let status = Arc::new(Mutex::new(BuildStatus::Unknown));

        let recorded = Arc::clone(&status);
        let subscription = bus.subscribe(scope, move |event: &UserEvent| {
            if event.kind != UserEventKind::Task {
                return;
            }
            let next = match event.category {
                UserEventCategory::Negative => BuildStatus::Fail,
                UserEventCategory::Positive => BuildStatus::Pass,
                UserEventCategory::Neutral => BuildStatus::Unknown,
            };
            *recorded.lock().unwrap_or_else(PoisonError::into_inner) = next;
        });

        Self {
            bus,
            scope,
            status,
            subscription,
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reserved extension point; build-start currently carries no signal.
    pub fn on_build_started(&self) {}

    /// Evaluate a finished build. Publishes onto the bus; the recorded status
    /// is updated by the bus subscription, not here, so the recovery check
    /// below always reads the *prior* status.
    pub fn on_build_finished(&self, outcome: BuildOutcome) {
        if self.disposed.load(Ordering::SeqCst) {
            debug!(scope = %self.scope, "build finished on disposed tracker, ignoring");
            return;
        }

        let prior = self.status();
        match outcome {
            BuildOutcome::Failed => {
                self.bus.publish(&UserEvent::new(
                    UserEventKind::Task,
                    UserEventCategory::Negative,
                    keys::TASK_FAILURE,
                    self.scope,
                ));
            }
            BuildOutcome::Success if prior == BuildStatus::Fail => {
                self.bus.publish(&UserEvent::new(
                    UserEventKind::Task,
                    UserEventCategory::Positive,
                    keys::TASK_RECOVERED,
                    self.scope,
                ));
            }
            BuildOutcome::Success => {
                // Nothing to announce, but the pass is still recorded so a
                // later failure/recovery pair reads the right prior status.
                debug!(scope = %self.scope, ?prior, "successful build, nothing to report");
                *self.status.lock().unwrap_or_else(PoisonError::into_inner) = BuildStatus::Pass;
            }
        }
    }

    pub fn status(&self) -> BuildStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Tear the tracker down. Later build callbacks become no-ops and the bus
    /// subscription is removed synchronously.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.bus.unsubscribe(self.subscription);
    }
}
