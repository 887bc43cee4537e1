use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying the originating project/session.
///
/// Subscriptions and trackers are keyed by scope; the host assigns one
/// scope per open project and disposes it on project close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Allocate a fresh scope id, unique within this process.
    pub fn next() -> Self {
        ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// Topic tag for user events. Replaces reflection-typed message topics
/// with an explicit enum the handler registry can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEventKind {
    /// A build/task outcome was observed (failure or recovery).
    Task,
    /// Cached visual assets should be refreshed (plugin version changed).
    AssetUpdate,
}

/// Sentiment of a user event, used to pick status transitions and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEventCategory {
    Positive,
    Negative,
    Neutral,
}

/// Immutable user-facing event flowing over the bus.
///
/// `message` may be a display key (see [`crate::messages`]) that the
/// notification dispatcher resolves before showing anything. The bus keeps
/// no history; an event is dropped once every current subscriber has seen it.
#[derive(Debug, Clone)]
pub struct UserEvent {
    pub kind: UserEventKind,
    pub category: UserEventCategory,
    pub message: String,
    pub scope: ScopeId,
}

impl UserEvent {
    pub fn new(
        kind: UserEventKind,
        category: UserEventCategory,
        message: impl Into<String>,
        scope: ScopeId,
    ) -> Self {
        Self {
            kind,
            category,
            message: message.into(),
            scope,
        }
    }
}

impl fmt::Display for UserEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?} ({}) [{}]",
            self.kind, self.category, self.message, self.scope
        )
    }
}
