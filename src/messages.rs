//! Display-key bundle for user-facing text.
//!
//! Event producers attach a stable key rather than final copy; the
//! notification dispatcher resolves keys right before display. Unknown keys
//! pass through verbatim so callers may also send literal text.

pub mod keys {
    pub const TASK_FAILURE: &str = "user.event.task.failure.name";
    pub const TASK_RECOVERED: &str = "user.event.task.success.name";
    pub const ASSETS_REFRESH: &str = "user.event.assets.refresh.name";
}

/// Resolve a display key to human-readable text.
pub fn resolve(key: &str) -> &str {
    match key {
        keys::TASK_FAILURE => "Build failure",
        keys::TASK_RECOVERED => "Build recovered",
        keys::ASSETS_REFRESH => "Refreshing visual assets",
        other => other,
    }
}
