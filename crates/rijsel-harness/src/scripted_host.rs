//! Scripted host implementation driven by a probe.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use rijsel_app::Host;
use rijsel_core::{BindError, FetchError, RedirectTarget, SetupError};
use tokio::sync::{Semaphore, watch};

/// One observable call into a [`ScriptedHost`], in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `retrieve_display_objects` ran.
    RetrieveDisplayObjects,
    /// A fetch future was handed to the worker pool.
    FetchStarted,
    /// `bind_model` ran.
    BindModel,
    /// `save_state` ran.
    SaveState,
    /// `redirect_to` ran with this target.
    RedirectedTo(String),
}

struct Shared {
    calls: Mutex<Vec<HostCall>>,
    fetch_results: Mutex<VecDeque<Result<(), FetchError>>>,
    bind_results: Mutex<VecDeque<Result<(), BindError>>>,
    setup_failure: Mutex<Option<SetupError>>,
    finishing: AtomicBool,
    escapes_redirection: AtomicBool,
    gated: AtomicBool,
    gate: Semaphore,
    fetch_starts: watch::Sender<u32>,
    saves: watch::Sender<u32>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn record(&self, call: HostCall) {
        lock(&self.calls).push(call);
    }
}

/// Host whose behavior is scripted from the outside through a [`Probe`].
///
/// Unscripted fetches and binds succeed. Fetches can be gated behind a
/// semaphore so tests control exactly when an in-flight sequence settles.
pub struct ScriptedHost {
    shared: Arc<Shared>,
}

impl ScriptedHost {
    /// A host with all-success behavior and the probe that scripts and
    /// observes it.
    pub fn new() -> (Self, Probe) {
        let (fetch_starts, fetch_starts_rx) = watch::channel(0);
        let (saves, saves_rx) = watch::channel(0);
        let shared = Arc::new(Shared {
            calls: Mutex::new(Vec::new()),
            fetch_results: Mutex::new(VecDeque::new()),
            bind_results: Mutex::new(VecDeque::new()),
            setup_failure: Mutex::new(None),
            finishing: AtomicBool::new(false),
            escapes_redirection: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            fetch_starts,
            saves,
        });
        let probe = Probe { shared: Arc::clone(&shared), fetch_starts_rx, saves_rx };
        (Self { shared }, probe)
    }
}

impl Host for ScriptedHost {
    fn retrieve_display_objects(&mut self) -> Result<(), SetupError> {
        self.shared.record(HostCall::RetrieveDisplayObjects);
        match lock(&self.shared.setup_failure).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fetch_model(&mut self) -> impl Future<Output = Result<(), FetchError>> + Send + 'static {
        self.shared.record(HostCall::FetchStarted);
        self.shared.fetch_starts.send_modify(|count| *count += 1);
        let shared = Arc::clone(&self.shared);
        async move {
            if shared.gated.load(Ordering::SeqCst)
                && let Ok(permit) = shared.gate.acquire().await
            {
                permit.forget();
            }
            lock(&shared.fetch_results).pop_front().unwrap_or(Ok(()))
        }
    }

    fn bind_model(&mut self) -> Result<(), BindError> {
        self.shared.record(HostCall::BindModel);
        lock(&self.shared.bind_results).pop_front().unwrap_or(Ok(()))
    }

    fn is_finishing(&self) -> bool {
        self.shared.finishing.load(Ordering::SeqCst)
    }

    fn save_state(&mut self) {
        self.shared.record(HostCall::SaveState);
        self.shared.saves.send_modify(|count| *count += 1);
    }

    fn redirect_to(&mut self, target: &RedirectTarget) {
        self.shared.record(HostCall::RedirectedTo(target.as_str().to_owned()));
    }

    fn escapes_redirection(&self) -> bool {
        self.shared.escapes_redirection.load(Ordering::SeqCst)
    }
}

/// Scripts a [`ScriptedHost`] and observes what the runtime did to it.
pub struct Probe {
    shared: Arc<Shared>,
    fetch_starts_rx: watch::Receiver<u32>,
    saves_rx: watch::Receiver<u32>,
}

impl Probe {
    /// Queue the outcome of the next scripted fetch.
    pub fn queue_fetch_result(&self, result: Result<(), FetchError>) {
        lock(&self.shared.fetch_results).push_back(result);
    }

    /// Queue the outcome of the next scripted bind.
    pub fn queue_bind_result(&self, result: Result<(), BindError>) {
        lock(&self.shared.bind_results).push_back(result);
    }

    /// Make the next display-object retrieval fail.
    pub fn fail_setup(&self, error: SetupError) {
        lock(&self.shared.setup_failure).replace(error);
    }

    /// Hold every fetch until [`release_fetch`](Self::release_fetch).
    pub fn gate_fetches(&self) {
        self.shared.gated.store(true, Ordering::SeqCst);
    }

    /// Let one gated fetch proceed.
    pub fn release_fetch(&self) {
        self.shared.gate.add_permits(1);
    }

    /// Script the host's `is_finishing` answer.
    pub fn set_finishing(&self, finishing: bool) {
        self.shared.finishing.store(finishing, Ordering::SeqCst);
    }

    /// Script the host's redirection-escape flag.
    pub fn set_escapes_redirection(&self, escapes: bool) {
        self.shared.escapes_redirection.store(escapes, Ordering::SeqCst);
    }

    /// Everything the runtime invoked on the host so far.
    pub fn calls(&self) -> Vec<HostCall> {
        lock(&self.shared.calls).clone()
    }

    /// Number of fetches handed to the worker pool so far.
    pub fn fetch_starts(&self) -> u32 {
        *self.fetch_starts_rx.borrow()
    }

    /// Wait until at least `count` fetches have started.
    pub async fn wait_for_fetch_starts(&mut self, count: u32) {
        // The host side of the channel lives in the shared state this probe
        // also owns, so the sender cannot be gone.
        if self.fetch_starts_rx.wait_for(|started| *started >= count).await.is_err() {
            tracing::warn!("scripted host vanished while waiting for fetch starts");
        }
    }

    /// Wait until at least `count` state saves ran.
    pub async fn wait_for_saves(&mut self, count: u32) {
        if self.saves_rx.wait_for(|saved| *saved >= count).await.is_err() {
            tracing::warn!("scripted host vanished while waiting for saves");
        }
    }
}
