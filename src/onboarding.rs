use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bus::EventBus;
use crate::config::ConfigStore;
use crate::events::{ScopeId, UserEvent, UserEventCategory, UserEventKind};
use crate::messages::keys;
use crate::notify::NotificationDispatcher;

/// Host environment the add-on runs inside. The version lookup may miss
/// (plugin record not found); a miss means "nothing to do", never an error.
pub trait PluginHost: Send + Sync {
    fn installed_version(&self) -> Option<String>;
}

/// Fixed-version host, used by the demo binary and tests.
pub struct StaticPluginHost {
    version: Option<String>,
}

impl StaticPluginHost {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
        }
    }

    /// A host whose version lookup always misses.
    pub fn missing() -> Self {
        Self { version: None }
    }
}

impl PluginHost for StaticPluginHost {
    fn installed_version(&self) -> Option<String> {
        self.version.clone()
    }
}

/// Defers a callback until a scope has finished initializing. Fires the
/// callback once; a scope disposed before initialization drops it instead.
pub trait StartupGate: Send + Sync {
    fn run_when_initialized(&self, scope: ScopeId, callback: Box<dyn FnOnce() + Send>);
}

/// Detects add-on version changes at startup and runs one-time onboarding.
pub struct UpdateCoordinator {
    host: Arc<dyn PluginHost>,
    store: Arc<dyn ConfigStore>,
    bus: Arc<EventBus>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl UpdateCoordinator {
    pub fn new(
        host: Arc<dyn PluginHost>,
        store: Arc<dyn ConfigStore>,
        bus: Arc<EventBus>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            host,
            store,
            bus,
            dispatcher,
        }
    }

    /// Run the startup checks for `scope`.
    ///
    /// On a version change (first run included) the new version is persisted
    /// *before* anything is announced, so a crash mid-way never repeats the
    /// write loop; then one `AssetUpdate` broadcast goes out and the update
    /// banner is deferred through `gate` until the scope is initialized.
    /// Also generates the stable user id exactly once.
    pub fn attempt_update_actions(&self, scope: ScopeId, gate: &dyn StartupGate) {
        let mut config = match self.store.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "could not load persisted config, skipping update actions");
                return;
            }
        };

        if let Some(new_version) = self
            .host
            .installed_version()
            .filter(|installed| *installed != config.version)
        {
            info!(from = %config.version, to = %new_version, "add-on version changed");
            config.version = new_version.clone();
            if let Err(err) = self.store.save(&config) {
                warn!(%err, "failed to persist new version");
            }

            self.bus.broadcast(&UserEvent::new(
                UserEventKind::AssetUpdate,
                UserEventCategory::Neutral,
                keys::ASSETS_REFRESH,
                scope,
            ));

            let dispatcher = Arc::clone(&self.dispatcher);
            gate.run_when_initialized(
                scope,
                Box::new(move || dispatcher.display_update_notification(scope, &new_version)),
            );
        }

        if config.user_id.is_empty() {
            config.user_id = Uuid::new_v4().to_string();
            if let Err(err) = self.store.save(&config) {
                warn!(%err, "failed to persist generated user id");
            }
        }
    }
}
