//! Async runtime driving a coordinator against a host.
//!
//! The [`Runtime`] owns the event loop task (the interaction context): it
//! receives lifecycle events and refresh requests through a [`Handle`],
//! feeds them to the pure [`Coordinator`], and executes the returned
//! actions. Only the fetch step leaves the loop: its future is spawned onto
//! the worker pool and the loop suspends the sequence until the outcome
//! comes back. Everything else, including binding and completion callbacks,
//! runs on the loop task, so state is never shared across threads.

use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
};

use rijsel_core::{Action, Coordinator, FetchError};
use tokio::{
    sync::{mpsc, watch},
    task::{JoinError, JoinHandle},
};

use crate::{Controller, Host, ModelState};

/// Callback run on the interaction context after a successful sequence.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Create { has_prior_state: bool },
    Start,
    ViewCreated,
    Resume,
    Pause,
    Stop,
    NewIntent,
    SaveState,
    Destroy,
    Refresh { fetch: bool, completion: Option<Completion> },
    Close,
}

/// Sends lifecycle events and refresh requests into a [`Runtime`].
///
/// Cheap to clone; commands are processed in send order on the runtime's
/// loop task. Sending after the runtime stopped is a no-op.
#[derive(Clone)]
pub struct Handle {
    tx: mpsc::UnboundedSender<Command>,
}

impl Handle {
    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::debug!("runtime stopped; command dropped");
        }
    }

    /// The component was created. `has_prior_state` is the persisted marker
    /// from a previous instance.
    pub fn on_create(&self, has_prior_state: bool) {
        self.send(Command::Create { has_prior_state });
    }

    /// The component is becoming visible.
    pub fn on_start(&self) {
        self.send(Command::Start);
    }

    /// The component's presentation hierarchy exists.
    pub fn on_view_created(&self) {
        self.send(Command::ViewCreated);
    }

    /// The interacting window opens.
    pub fn on_resume(&self) {
        self.send(Command::Resume);
    }

    /// The interacting window closes.
    pub fn on_pause(&self) {
        self.send(Command::Pause);
    }

    /// The component is no longer visible.
    pub fn on_stop(&self) {
        self.send(Command::Stop);
    }

    /// The host was re-shown with a new intent.
    pub fn on_new_intent(&self) {
        self.send(Command::NewIntent);
    }

    /// The host is saving its instance state.
    pub fn on_save_state(&self) {
        self.send(Command::SaveState);
    }

    /// The component instance is being torn down. The runtime stops once
    /// any outstanding fetch settles.
    pub fn on_destroy(&self) {
        self.send(Command::Destroy);
    }

    /// Ask for a model refresh and display synchronization.
    pub fn refresh(&self, fetch: bool) {
        self.send(Command::Refresh { fetch, completion: None });
    }

    /// Ask for a refresh, running `completion` on the loop task after the
    /// sequence binds successfully. Superseded completions are discarded.
    pub fn refresh_then(&self, fetch: bool, completion: impl FnOnce() + Send + 'static) {
        self.send(Command::Refresh { fetch, completion: Some(Box::new(completion)) });
    }

    /// Stop the runtime without destroying the component.
    pub fn close(&self) {
        self.send(Command::Close);
    }
}

/// Runtime-owned completion callbacks, keyed by the IDs the state machine
/// moves around.
#[derive(Default)]
struct Completions {
    next: u64,
    slots: HashMap<u64, Completion>,
}

impl Completions {
    fn register(&mut self, completion: Option<Completion>) -> Option<rijsel_core::CompletionId> {
        let completion = completion?;
        let id = rijsel_core::CompletionId::new(self.next);
        self.next += 1;
        self.slots.insert(id.raw(), completion);
        Some(id)
    }

    fn take(&mut self, id: rijsel_core::CompletionId) -> Option<Completion> {
        self.slots.remove(&id.raw())
    }
}

enum Turn {
    Fetch(Result<Result<(), FetchError>, JoinError>),
    Command(Option<Command>),
}

/// Event loop coordinating one host component instance.
pub struct Runtime<H: Host> {
    host: H,
    controller: Controller,
    coordinator: Coordinator,
    commands: mpsc::UnboundedReceiver<Command>,
    completions: Completions,
    feed: watch::Sender<ModelState>,
    in_flight: Option<JoinHandle<Result<(), FetchError>>>,
    closing: bool,
}

impl<H: Host> Runtime<H> {
    /// Create a runtime for a host and the handle that drives it.
    pub fn new(host: H, controller: Controller) -> (Self, Handle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let (feed, _) = watch::channel(ModelState::Idle);
        let runtime = Self {
            host,
            controller,
            coordinator: Coordinator::new(),
            commands,
            completions: Completions::default(),
            feed,
            in_flight: None,
            closing: false,
        };
        (runtime, Handle { tx })
    }

    /// Subscribe to the model state feed.
    pub fn model_state(&self) -> watch::Receiver<ModelState> {
        self.feed.subscribe()
    }

    /// The coordinator's current view, for inspection.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// The host being coordinated.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run the event loop until the component is destroyed, the handle side
    /// closes, or a redirection hands control away. An outstanding fetch is
    /// always allowed to settle so counters stay consistent.
    pub async fn run(&mut self) {
        loop {
            let turn = if self.closing {
                match self.in_flight.as_mut() {
                    Some(fetch) => Turn::Fetch(fetch.await),
                    None => break,
                }
            } else {
                match self.in_flight.as_mut() {
                    Some(fetch) => tokio::select! {
                        outcome = fetch => Turn::Fetch(outcome),
                        command = self.commands.recv() => Turn::Command(command),
                    },
                    None => Turn::Command(self.commands.recv().await),
                }
            };

            match turn {
                Turn::Fetch(outcome) => {
                    self.in_flight = None;
                    let result = outcome.unwrap_or_else(|join_error| {
                        tracing::error!(%join_error, "fetch task failed abnormally");
                        Err(FetchError::Worker(join_error.to_string()))
                    });
                    let finishing = self.host.is_finishing();
                    let actions = self.coordinator.fetch_finished(result, finishing);
                    self.execute(actions);
                },
                Turn::Command(None) => self.closing = true,
                Turn::Command(Some(command)) => self.handle_command(command),
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        let finishing = self.host.is_finishing();
        let actions = match command {
            Command::Create { has_prior_state } => {
                let redirect =
                    self.controller.consult_redirector(self.host.escapes_redirection());
                self.coordinator.on_create(has_prior_state, redirect)
            },
            Command::Start => self.coordinator.on_start(),
            Command::ViewCreated => self.coordinator.on_view_created(),
            Command::Resume => self.coordinator.on_resume(finishing),
            Command::Pause => self.coordinator.on_pause(),
            Command::Stop => self.coordinator.on_stop(),
            Command::NewIntent => {
                let redirect =
                    self.controller.consult_redirector(self.host.escapes_redirection());
                self.coordinator.on_new_intent(redirect)
            },
            Command::SaveState => self.coordinator.on_save_state(),
            Command::Destroy => {
                self.closing = true;
                self.coordinator.on_destroy()
            },
            Command::Refresh { fetch, completion } => {
                let completion = self.completions.register(completion);
                self.coordinator.request_refresh(fetch, completion, false, finishing)
            },
            Command::Close => {
                self.closing = true;
                vec![]
            },
        };
        self.execute(actions);
    }

    /// Execute actions, feeding sequence outcomes straight back into the
    /// coordinator until it settles.
    fn execute(&mut self, initial: Vec<Action>) {
        let mut pending = initial;
        while !pending.is_empty() {
            for action in std::mem::take(&mut pending) {
                match action {
                    Action::NotifyInterceptor(event) => {
                        self.controller.notify_interceptor(event);
                    },
                    Action::Redirect(target) => {
                        self.host.redirect_to(&target);
                        self.closing = true;
                    },
                    Action::RetrieveDisplayObjects => {
                        if let Err(error) = self.host.retrieve_display_objects() {
                            pending.extend(self.coordinator.display_objects_failed(&error));
                        }
                    },
                    Action::PersistMarker => self.host.save_state(),
                    Action::StartFetch { fetch, completion: _ } => {
                        debug_assert!(self.in_flight.is_none(), "overlapping fetch sequences");
                        self.feed.send_replace(ModelState::Loading);
                        self.in_flight = Some(if fetch {
                            tokio::spawn(self.host.fetch_model())
                        } else {
                            tokio::spawn(std::future::ready(Ok(())))
                        });
                    },
                    Action::Bind { bind_model, completion: _ } => {
                        let result = if bind_model { self.host.bind_model() } else { Ok(()) };
                        if result.is_ok() {
                            self.feed.send_replace(ModelState::Loaded);
                        }
                        let finishing = self.host.is_finishing();
                        pending.extend(self.coordinator.bind_finished(result, finishing));
                    },
                    Action::RunCompletion(id) => self.run_completion(id),
                    Action::DiscardCompletion(id) => {
                        drop(self.completions.take(id));
                    },
                    Action::ReportError { recoverable, error } => {
                        let message = self.controller.report(recoverable, &error);
                        self.feed.send_replace(ModelState::Error(message));
                    },
                }
            }
        }
    }

    /// Run a completion callback, isolating panics from the loop.
    fn run_completion(&mut self, id: rijsel_core::CompletionId) {
        let Some(completion) = self.completions.take(id) else {
            tracing::error!(slot = id.raw(), "completion slot already released");
            return;
        };
        if catch_unwind(AssertUnwindSafe(completion)).is_err() {
            tracing::error!(slot = id.raw(), "completion callback panicked");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    };

    use rijsel_core::{BindError, RedirectTarget, SetupError};

    use super::*;

    #[derive(Default)]
    struct Counts {
        fetches: AtomicU32,
        binds: AtomicU32,
        saved: AtomicBool,
    }

    struct CountingHost {
        counts: Arc<Counts>,
    }

    impl CountingHost {
        fn new() -> (Self, Arc<Counts>) {
            let counts = Arc::new(Counts::default());
            (Self { counts: Arc::clone(&counts) }, counts)
        }
    }

    impl Host for CountingHost {
        fn retrieve_display_objects(&mut self) -> Result<(), SetupError> {
            Ok(())
        }

        fn fetch_model(
            &mut self,
        ) -> impl Future<Output = Result<(), FetchError>> + Send + 'static {
            let counts = Arc::clone(&self.counts);
            async move {
                counts.fetches.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        fn bind_model(&mut self) -> Result<(), BindError> {
            self.counts.binds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_finishing(&self) -> bool {
            false
        }

        fn save_state(&mut self) {
            self.counts.saved.store(true, Ordering::SeqCst);
        }

        fn redirect_to(&mut self, _target: &RedirectTarget) {}
    }

    #[tokio::test]
    async fn first_resume_fetches_binds_and_runs_the_completion() {
        let (host, counts) = CountingHost::new();
        let (mut runtime, handle) = Runtime::new(host, Controller::new());
        let task = tokio::spawn(async move { runtime.run().await });

        handle.on_create(false);
        handle.on_resume();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        handle.refresh_then(false, move || {
            let _ = done_tx.send(());
        });
        done_rx.await.unwrap();
        handle.on_destroy();
        task.await.unwrap();

        // The resume sequence fetches; the follow-up refresh asked not to.
        assert_eq!(counts.fetches.load(Ordering::SeqCst), 1);
        // The one-time bind setup runs only on the first sequence.
        assert_eq!(counts.binds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_all_handles_stops_the_runtime() {
        let (host, _counts) = CountingHost::new();
        let (mut runtime, handle) = Runtime::new(host, Controller::new());
        drop(handle);

        runtime.run().await;
    }

    #[tokio::test]
    async fn save_state_reaches_the_host() {
        let (host, counts) = CountingHost::new();
        let (mut runtime, handle) = Runtime::new(host, Controller::new());

        handle.on_create(false);
        handle.on_save_state();
        handle.close();
        runtime.run().await;

        assert!(counts.saved.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn model_state_feed_reaches_loaded() {
        let (host, _counts) = CountingHost::new();
        let (mut runtime, handle) = Runtime::new(host, Controller::new());
        let mut feed = runtime.model_state();
        let task = tokio::spawn(async move { runtime.run().await });

        handle.on_create(false);
        handle.on_resume();
        feed.wait_for(|state| *state == ModelState::Loaded).await.unwrap();

        handle.on_destroy();
        task.await.unwrap();
    }

    #[test]
    fn completion_slots_are_single_use() {
        let mut completions = Completions::default();
        let id = completions.register(Some(Box::new(|| {}))).unwrap();

        assert!(completions.take(id).is_some());
        assert!(completions.take(id).is_none());
    }
}
