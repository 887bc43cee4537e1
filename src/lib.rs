//! BuildMood - build-outcome tracking and user-facing notification core
//!
//! This crate turns independently-firing IDE build callbacks into a coherent,
//! de-duplicated stream of user-facing events: a per-project state machine
//! derives "build failed" and "build recovered" signals, a synchronous event
//! bus fans them out to project-scoped subscribers, and a notification
//! dispatcher renders them with a rich-then-plain fallback. Host concerns
//! (build system, lifecycle, durable storage, asset catalog, UI surface) are
//! ports the embedding host implements.

pub mod assets;
pub mod bus;
pub mod cli;
pub mod config;
pub mod events;
pub mod messages;
pub mod notify;
pub mod onboarding;
pub mod plugin;
pub mod schedule;
pub mod tracker;

// Re-exports for ergonomics
pub use bus::{EventBus, SubscriptionHandle};
pub use events::{ScopeId, UserEvent, UserEventCategory, UserEventKind};
pub use plugin::PluginCore;
pub use tracker::{BuildOutcome, BuildStatus, BuildStatusTracker};
