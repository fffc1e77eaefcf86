//! Controller services with scripted or recorded behavior.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rijsel_app::{Interceptor, Redirector};
use rijsel_core::{LifecycleEvent, RedirectTarget};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Interceptor that records every lifecycle event it sees.
pub struct RecordingInterceptor {
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl RecordingInterceptor {
    /// The interceptor and the shared log it appends to.
    pub fn new() -> (Self, Arc<Mutex<Vec<LifecycleEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (Self { events: Arc::clone(&events) }, events)
    }

    /// Snapshot of a shared log produced by [`RecordingInterceptor::new`].
    pub fn snapshot(events: &Arc<Mutex<Vec<LifecycleEvent>>>) -> Vec<LifecycleEvent> {
        lock(events).clone()
    }
}

impl Interceptor for RecordingInterceptor {
    fn on_lifecycle_event(&mut self, event: LifecycleEvent) {
        lock(&self.events).push(event);
    }
}

/// Redirector that always answers with the same decision.
pub struct FixedRedirector {
    target: Option<RedirectTarget>,
}

impl FixedRedirector {
    /// Redirector that always sends hosts to `target`.
    pub fn to(target: impl Into<String>) -> Self {
        Self { target: Some(RedirectTarget::new(target)) }
    }

    /// Redirector that never redirects.
    pub fn none() -> Self {
        Self { target: None }
    }
}

impl Redirector for FixedRedirector {
    fn redirect(&mut self) -> Option<RedirectTarget> {
        self.target.clone()
    }
}
