use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Disposable owner for delayed requests.
///
/// Each project scope owns one alarm; disposing it (on project close) stops
/// any not-yet-fired request scheduled against it. Clones share the same
/// disposal flag.
#[derive(Debug, Clone, Default)]
pub struct Alarm {
    disposed: Arc<AtomicBool>,
}

impl Alarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Run `runner` once after `delay`, unless `alarm` is disposed first.
///
/// A disposed alarm makes this a silent no-op; disposal after scheduling but
/// before the delay elapses prevents the callback from running. There is no
/// other cancellation API.
pub fn register_delayed_request<F>(alarm: &Alarm, delay: Duration, runner: F)
where
    F: FnOnce() + Send + 'static,
{
    if alarm.is_disposed() {
        debug!("alarm already disposed, dropping delayed request");
        return;
    }
    let disposed = Arc::clone(&alarm.disposed);
    thread::spawn(move || {
        thread::sleep(delay);
        if disposed.load(Ordering::SeqCst) {
            debug!("alarm disposed before delayed request fired");
            return;
        }
        runner();
    });
}
