use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assets::{AssetCatalog, AssetCategory};
use crate::bus::{EventBus, SubscriptionHandle};
use crate::events::{ScopeId, UserEvent, UserEventCategory, UserEventKind};
use crate::messages;
use crate::plugin::PLUGIN_NAME;

/// Fixed decoration used when the asset catalog has nothing to offer.
const FALLBACK_UPDATE_ASSET: &str = "https://assets.buildmood.io/misc/update_celebration.gif";

/// Failure of the rich rendering path. Always recovered locally by the
/// dispatcher's fallback; never surfaced to the user as an error.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no rendering surface available: {0}")]
    SurfaceUnavailable(String),

    #[error("rich rendering failed: {0}")]
    Failed(String),
}

/// A rendered message headed for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    /// HTML fragment; plain renderers may strip or print it verbatim.
    pub body: String,
    /// Sticky notifications stay up until dismissed (update banners).
    pub sticky: bool,
    /// `None` means no active project: deliver globally.
    pub scope: Option<ScopeId>,
}

/// Rendering/UI surface. The rich path may fail (missing IDE frame, headless
/// host); the plain path must always succeed.
pub trait Notifier: Send + Sync {
    fn show_rich(&self, notification: &Notification) -> Result<(), RenderError>;

    fn show_plain(&self, notification: &Notification);
}

/// Routes user events and direct calls to the rendering surface.
///
/// Contract: attempt the rich path first; on any error fall back to the plain
/// path, so the user sees each message exactly once via exactly one path.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    assets: Arc<dyn AssetCatalog>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, assets: Arc<dyn AssetCatalog>) -> Self {
        Self { notifier, assets }
    }

    /// Show the sticky "add-on updated" banner for `scope`.
    pub fn display_update_notification(&self, scope: ScopeId, new_version: &str) {
        let asset = self
            .assets
            .random_asset(AssetCategory::Celebration)
            .unwrap_or_else(|| FALLBACK_UPDATE_ASSET.to_string());

        let notification = Notification {
            title: format!("{PLUGIN_NAME} updated to v{new_version}"),
            body: build_update_message(&asset),
            sticky: true,
            scope: Some(scope),
        };
        info!(%scope, version = new_version, "displaying update notification");
        self.show(&notification);
    }

    /// Show a regular message. `message` may be a display key; it is resolved
    /// through the bundle first. Absent `scope` still delivers globally.
    pub fn send_message(&self, title: &str, message: &str, scope: Option<ScopeId>) {
        let notification = Notification {
            title: title.to_string(),
            body: messages::resolve(message).to_string(),
            sticky: false,
            scope,
        };
        self.show(&notification);
    }

    /// Subscribe this dispatcher to `scope` so task events become user-visible
    /// messages without producers calling it directly.
    pub fn attach(self: Arc<Self>, bus: &EventBus, scope: ScopeId) -> SubscriptionHandle {
        bus.subscribe(scope, move |event: &UserEvent| {
            if event.kind != UserEventKind::Task {
                return;
            }
            let title = match event.category {
                UserEventCategory::Positive => format!("{PLUGIN_NAME}: back on track"),
                UserEventCategory::Negative => format!("{PLUGIN_NAME}: build trouble"),
                UserEventCategory::Neutral => PLUGIN_NAME.to_string(),
            };
            self.send_message(&title, &event.message, Some(event.scope));
        })
    }

    fn show(&self, notification: &Notification) {
        if let Err(err) = self.notifier.show_rich(notification) {
            warn!(%err, "rich notification failed, falling back to plain rendering");
            self.notifier.show_plain(notification);
        } else {
            debug!(title = %notification.title, "rich notification shown");
        }
    }
}

/// Terminal rendering surface used by the demo binary.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_rich(&self, notification: &Notification) -> Result<(), RenderError> {
        let scope = notification
            .scope
            .map(|s| s.to_string())
            .unwrap_or_else(|| "global".to_string());
        println!("┌─ {} ({})", notification.title, scope);
        for line in notification.body.lines() {
            println!("│ {line}");
        }
        println!("└─");
        Ok(())
    }

    fn show_plain(&self, notification: &Notification) {
        println!("[{}] {}", notification.title, notification.body);
    }
}

fn build_update_message(update_asset: &str) -> String {
    format!(
        r#"What's New?<br>
<ul>
  <li>Build recovery notifications no longer miss the first build of a session.</li>
</ul>
<br>See the <a href="https://github.com/buildmood/buildmood#documentation">documentation</a> for features, usages, and configurations.
<br>The <a href="https://github.com/buildmood/buildmood/blob/master/CHANGELOG.md">changelog</a> is available for more details.
<br><br>
<div style='text-align: center'><img alt='Thanks for downloading!' src="{update_asset}"
width='256'><br/><br/><br/>
Thanks for downloading!
</div>"#
    )
}
