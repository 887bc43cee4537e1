use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

use buildmood::assets::StaticAssetCatalog;
use buildmood::bus::EventBus;
use buildmood::cli::CliArgs;
use buildmood::config::{ConfigStore, TomlConfigStore};
use buildmood::events::ScopeId;
use buildmood::notify::ConsoleNotifier;
use buildmood::onboarding::StaticPluginHost;
use buildmood::plugin::PluginCore;

fn main() -> Result<()> {
    // Initialize tracing with env filter
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = CliArgs::parse();

    let store: Arc<dyn ConfigStore> = match args.config {
        Some(path) => Arc::new(TomlConfigStore::new(path)),
        None => Arc::new(TomlConfigStore::at_default_location()?),
    };
    let version = args
        .plugin_version
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let core = PluginCore::new(
        Arc::new(EventBus::new()),
        Arc::new(StaticPluginHost::new(version)),
        store,
        Arc::new(ConsoleNotifier),
        Arc::new(StaticAssetCatalog::with_defaults()),
    )
    .with_display_delay(Duration::from_millis(100));

    let scope = ScopeId::next();
    core.scope_opened(scope);
    core.scope_initialized(scope);

    for outcome in &args.outcomes {
        info!(?outcome, "replaying build outcome");
        core.build_started(scope);
        core.build_finished(scope, *outcome);
    }

    if let Some(status) = core.build_status(scope) {
        info!(?status, "final recorded build status");
    }

    // Deferred update banner fires off-thread; give it a moment before teardown.
    thread::sleep(Duration::from_millis(300));
    core.scope_closed(scope);

    Ok(())
}
