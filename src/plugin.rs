use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::assets::AssetCatalog;
use crate::bus::EventBus;
use crate::config::ConfigStore;
use crate::events::ScopeId;
use crate::notify::{NotificationDispatcher, Notifier};
use crate::onboarding::{PluginHost, StartupGate, UpdateCoordinator};
use crate::schedule::{Alarm, register_delayed_request};
use crate::tracker::{BuildOutcome, BuildStatus, BuildStatusTracker};

pub const PLUGIN_NAME: &str = "BuildMood";
pub const PLUGIN_ID: &str = "io.buildmood.plugin";

/// How long after scope initialization the deferred update banner waits
/// before showing, to stay clear of host startup churn.
const DEFAULT_DISPLAY_DELAY: Duration = Duration::from_millis(250);

struct ScopeState {
    tracker: Arc<BuildStatusTracker>,
    alarm: Alarm,
    initialized: bool,
    pending: Vec<Box<dyn FnOnce() + Send>>,
}

/// Explicitly constructed composition root, one per process. Owns the bus,
/// the per-scope trackers, and the startup coordinator; the host forwards its
/// lifecycle and build callbacks here. Holds no global mutable state beyond
/// the injected durable config store.
pub struct PluginCore {
    bus: Arc<EventBus>,
    dispatcher: Arc<NotificationDispatcher>,
    coordinator: UpdateCoordinator,
    scopes: Mutex<HashMap<ScopeId, ScopeState>>,
    display_delay: Duration,
}

impl PluginCore {
    pub fn new(
        bus: Arc<EventBus>,
        host: Arc<dyn PluginHost>,
        store: Arc<dyn ConfigStore>,
        notifier: Arc<dyn Notifier>,
        assets: Arc<dyn AssetCatalog>,
    ) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(notifier, assets));
        let coordinator =
            UpdateCoordinator::new(host, store, Arc::clone(&bus), Arc::clone(&dispatcher));
        Self {
            bus,
            dispatcher,
            coordinator,
            scopes: Mutex::new(HashMap::new()),
            display_delay: DEFAULT_DISPLAY_DELAY,
        }
    }

    pub fn with_display_delay(mut self, delay: Duration) -> Self {
        self.display_delay = delay;
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    /// Host callback: a project opened. Wires a tracker and the dispatcher to
    /// the scope's topic, then runs the startup update check. A repeated open
    /// for a live scope is ignored; replacing the state would orphan the
    /// existing tracker's subscription and double-attach the dispatcher.
    pub fn scope_opened(&self, scope: ScopeId) {
        {
            let mut scopes = self.lock_scopes();
            if scopes.contains_key(&scope) {
                warn!(%scope, "scope already open, ignoring repeated open");
                return;
            }
            let tracker = Arc::new(BuildStatusTracker::new(Arc::clone(&self.bus), scope));
            Arc::clone(&self.dispatcher).attach(&self.bus, scope);
            scopes.insert(
                scope,
                ScopeState {
                    tracker,
                    alarm: Alarm::new(),
                    initialized: false,
                    pending: Vec::new(),
                },
            );
        }
        info!(%scope, "scope opened");

        // Lock released above: the update check re-enters the gate.
        self.coordinator.attempt_update_actions(scope, self);
    }

    /// Host callback: a project finished initializing. Releases callbacks
    /// deferred by the startup gate onto the scope's alarm.
    pub fn scope_initialized(&self, scope: ScopeId) {
        let (alarm, pending) = {
            let mut scopes = self.lock_scopes();
            let Some(state) = scopes.get_mut(&scope) else {
                debug!(%scope, "initialization signal for unknown scope");
                return;
            };
            state.initialized = true;
            (state.alarm.clone(), std::mem::take(&mut state.pending))
        };
        for callback in pending {
            register_delayed_request(&alarm, self.display_delay, callback);
        }
    }

    /// Host callback: a project closed. Synchronously unregisters every
    /// subscription of the scope and cancels its pending deferred work.
    pub fn scope_closed(&self, scope: ScopeId) {
        info!(%scope, "scope closed");
        let Some(state) = self.lock_scopes().remove(&scope) else {
            return;
        };
        state.tracker.dispose();
        self.bus.unsubscribe_scope(scope);
        state.alarm.dispose();
        // Pending callbacks (never released by initialization) drop here.
    }

    /// Host callback: a plugin finished (re)loading. A matching id means this
    /// add-on was updated in place, so the update check reruns per open scope.
    pub fn plugin_loaded(&self, plugin_id: &str) {
        if plugin_id != PLUGIN_ID {
            return;
        }
        let open_scopes: Vec<ScopeId> = self.lock_scopes().keys().copied().collect();
        for scope in open_scopes {
            self.coordinator.attempt_update_actions(scope, self);
        }
    }

    /// Build-system callback: a build started. Reserved, no effect.
    pub fn build_started(&self, scope: ScopeId) {
        if let Some(tracker) = self.tracker_for(scope) {
            tracker.on_build_started();
        }
    }

    /// Build-system callback: a build finished with `outcome`.
    pub fn build_finished(&self, scope: ScopeId, outcome: BuildOutcome) {
        match self.tracker_for(scope) {
            Some(tracker) => tracker.on_build_finished(outcome),
            None => debug!(%scope, "build finished for untracked scope, ignoring"),
        }
    }

    pub fn build_status(&self, scope: ScopeId) -> Option<BuildStatus> {
        self.tracker_for(scope).map(|t| t.status())
    }

    fn tracker_for(&self, scope: ScopeId) -> Option<Arc<BuildStatusTracker>> {
        self.lock_scopes()
            .get(&scope)
            .map(|state| Arc::clone(&state.tracker))
    }

    fn lock_scopes(&self) -> MutexGuard<'_, HashMap<ScopeId, ScopeState>> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StartupGate for PluginCore {
    fn run_when_initialized(&self, scope: ScopeId, callback: Box<dyn FnOnce() + Send>) {
        let mut scopes = self.lock_scopes();
        let Some(state) = scopes.get_mut(&scope) else {
            debug!(%scope, "deferred callback for disposed scope, dropping");
            return;
        };
        if state.initialized {
            let alarm = state.alarm.clone();
            drop(scopes);
            register_delayed_request(&alarm, self.display_delay, callback);
        } else {
            state.pending.push(callback);
        }
    }
}
