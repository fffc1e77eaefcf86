//! The lifecycle/model coordinator state machine.
//!
//! Receives lifecycle transitions and refresh requests from a host component
//! and decides whether the externally-supplied fetch and bind operations run
//! now, later, or not at all. Uses the action pattern: every input mutates
//! the bookkeeping and returns [`Action`]s for a runtime to execute, and
//! host-dependent predicates (such as "is the component finishing") are
//! passed in as parameters. This keeps the machine pure (no I/O) and makes
//! testing straightforward.
//!
//! # State machine
//!
//! ```text
//! ┌─────────┐ redirect  ┌────────────┐
//! │ Created │──────────>│ Redirected │ (terminal for coordination)
//! └─────────┘           └────────────┘
//!      │ setup failed   ┌─────────────┐
//!      ├────────────────>│ SetupFailed │ (terminal for coordination)
//!      │                └─────────────┘
//!      ↓
//! ┌────────┐  resume/pause: Interacting <-> NotInteracting
//! │ Active │  sequences:    Idle <-> Sequencing
//! └────────┘
//!      │ destroy (reachable from any state)
//!      ↓
//! ┌───────────┐
//! │ Destroyed │ (alive = false, terminal)
//! └───────────┘
//! ```

use std::fmt;

use crate::{
    error::{BindError, FetchError, RefreshError, SetupError},
    lifecycle::LifecycleEvent,
    state::{Admission, CompletionId, CoordinatorState, PendingRefresh},
};

/// Identifies the component a redirected host must yield to.
///
/// Opaque to the coordinator; the hosting layer interprets it (splash
/// screen, sign-in flow, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// Create a target from its hosting-layer identifier.
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    /// Hosting-layer identifier of the target.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instructions produced by the coordinator for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Notify the lifecycle interceptor side channel.
    NotifyInterceptor(LifecycleEvent),

    /// Stop normal setup and hand control to the redirect target.
    Redirect(RedirectTarget),

    /// Retrieve display objects on the interaction context, once per
    /// instance. The runtime reports failure through
    /// [`Coordinator::display_objects_failed`].
    RetrieveDisplayObjects,

    /// Persist the marker distinguishing recreation from first creation.
    PersistMarker,

    /// Run the fetch step on the worker pool, then report the outcome
    /// through [`Coordinator::fetch_finished`].
    StartFetch {
        /// Whether the external fetch operation actually runs.
        fetch: bool,
        /// Completion to run once the sequence ends.
        completion: Option<CompletionId>,
    },

    /// Run the bind step on the interaction context, then report the outcome
    /// through [`Coordinator::bind_finished`].
    Bind {
        /// Whether the external bind operation runs (one-time bind setup).
        bind_model: bool,
        /// Completion to run after a successful bind.
        completion: Option<CompletionId>,
    },

    /// Run a completion callback. Panics from it must be isolated by the
    /// runtime: logged, never propagated.
    RunCompletion(CompletionId),

    /// Release a completion slot without running it.
    DiscardCompletion(CompletionId),

    /// Hand a sequence failure to the error reporter.
    ReportError {
        /// Whether the failure leaves the component usable.
        recoverable: bool,
        /// The failure.
        error: RefreshError,
    },
}

/// Sequences "fetch model, then bind model" safely across the host
/// component's lifecycle.
///
/// At most one productive sequence runs at a time per instance; deferred and
/// duplicate requests are coalesced rather than dropped or duplicated.
#[derive(Debug, Clone)]
pub struct Coordinator {
    state: CoordinatorState,
    /// The request whose sequence is currently between fetch start and bind
    /// completion. Single slot: admission queues everything else.
    in_flight: Option<PendingRefresh>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    /// Coordinator for a newly created component instance.
    pub fn new() -> Self {
        Self { state: CoordinatorState::new(), in_flight: None }
    }

    /// Read-only view of the bookkeeping flags.
    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    /// True unless setup failed or a redirection was decided.
    pub fn should_keep_on(&self) -> bool {
        self.state.should_keep_on()
    }

    /// The component was created. The host's own setup has already run.
    ///
    /// A non-`None` redirect short-circuits everything: no interceptor
    /// notification, no display-object retrieval, and all further lifecycle
    /// events are ignored except teardown bookkeeping.
    pub fn on_create(&mut self, has_prior_state: bool, redirect: Option<RedirectTarget>) -> Vec<Action> {
        if let Some(target) = redirect {
            tracing::debug!(%target, "redirection required, stopping setup");
            self.state.mark_being_redirected();
            return vec![Action::Redirect(target)];
        }

        self.state.set_first_lifecycle(!has_prior_state);
        vec![Action::NotifyInterceptor(LifecycleEvent::Create), Action::RetrieveDisplayObjects]
    }

    /// Display-object retrieval failed. Terminal for automatic coordination.
    pub fn display_objects_failed(&mut self, error: &SetupError) -> Vec<Action> {
        tracing::warn!(%error, "cannot retrieve display object references");
        self.state.stop_handling();
        vec![]
    }

    /// The component is becoming visible.
    pub fn on_start(&mut self) -> Vec<Action> {
        if !self.should_keep_on() {
            return vec![];
        }
        vec![Action::NotifyInterceptor(LifecycleEvent::Start)]
    }

    /// The component's presentation hierarchy exists.
    pub fn on_view_created(&mut self) -> Vec<Action> {
        if !self.should_keep_on() {
            return vec![];
        }
        vec![Action::NotifyInterceptor(LifecycleEvent::ViewCreated)]
    }

    /// The interacting window opens. Triggers an immediate refresh, fetching
    /// whenever the model was never retrieved or a delayed request asked for
    /// a fetch, and consuming the delayed request's completion.
    pub fn on_resume(&mut self, host_finishing: bool) -> Vec<Action> {
        if !self.should_keep_on() {
            tracing::debug!("resume ignored: coordination stopped");
            return vec![];
        }

        self.state.on_resume();
        let delayed = self.state.take_delayed();
        let fetch = !self.state.model_retrieved() || delayed.is_some_and(|request| request.fetch);
        let completion = delayed.and_then(|request| request.completion);

        let mut actions = vec![Action::NotifyInterceptor(LifecycleEvent::Resume)];
        actions.extend(self.request_refresh(fetch, completion, true, host_finishing));
        actions
    }

    /// The interacting window closes.
    pub fn on_pause(&mut self) -> Vec<Action> {
        if !self.should_keep_on() {
            return vec![];
        }
        self.state.on_pause();
        vec![Action::NotifyInterceptor(LifecycleEvent::Pause)]
    }

    /// The component is no longer visible.
    pub fn on_stop(&mut self) -> Vec<Action> {
        if !self.should_keep_on() {
            return vec![];
        }
        vec![Action::NotifyInterceptor(LifecycleEvent::Stop)]
    }

    /// The host was re-shown with a new intent; the redirection decision is
    /// re-evaluated.
    pub fn on_new_intent(&mut self, redirect: Option<RedirectTarget>) -> Vec<Action> {
        if let Some(target) = redirect {
            tracing::debug!(%target, "redirection required on new intent");
            self.state.mark_being_redirected();
            return vec![Action::Redirect(target)];
        }
        vec![]
    }

    /// The host is saving its instance state.
    pub fn on_save_state(&mut self) -> Vec<Action> {
        vec![Action::PersistMarker]
    }

    /// The component instance is being torn down. Aliveness is terminal.
    pub fn on_destroy(&mut self) -> Vec<Action> {
        self.state.on_destroy();
        if !self.should_keep_on() {
            return vec![];
        }
        vec![Action::NotifyInterceptor(LifecycleEvent::Destroy)]
    }

    /// Ask for a model refresh and display synchronization.
    ///
    /// Decision order: dead or finishing components drop the request
    /// silently; a component that is not interacting delays it until the
    /// next resume (unless `immediate`); a running sequence queues it until
    /// the sequence ends; otherwise the fetch step starts now.
    pub fn request_refresh(
        &mut self,
        fetch: bool,
        completion: Option<CompletionId>,
        immediate: bool,
        host_finishing: bool,
    ) -> Vec<Action> {
        let request = PendingRefresh { fetch, completion };
        match self.state.admit(request, immediate, host_finishing) {
            Admission::Dropped => {
                tracing::debug!("refresh dropped: the instance or its host is finished");
                Self::discard(completion)
            },
            Admission::Delayed { displaced } => {
                tracing::debug!("refresh delayed: the component is not interacting");
                Self::discard(displaced)
            },
            Admission::Queued { displaced } => {
                tracing::debug!("refresh queued: a sequence is already running");
                Self::discard(displaced)
            },
            Admission::Admitted { displaced } => {
                self.in_flight = Some(request);
                let mut actions = Self::discard(displaced);
                actions.push(Action::StartFetch { fetch, completion });
                actions
            },
        }
    }

    /// Outcome of the fetch step, marshalled back onto the interaction
    /// context.
    ///
    /// Success while the component died mid-fetch is swallowed: no bind, no
    /// completion, counters still settled. Failure drains the queued request
    /// and is reported upstream unless the component is already dead.
    pub fn fetch_finished(
        &mut self,
        result: Result<(), FetchError>,
        host_finishing: bool,
    ) -> Vec<Action> {
        let Some(request) = self.in_flight.take() else {
            debug_assert!(false, "fetch outcome with no sequence in flight");
            tracing::error!("fetch outcome with no sequence in flight; ignoring");
            return vec![];
        };

        match result {
            Ok(()) => {
                if !self.sequence_may_continue(host_finishing) {
                    tracing::debug!("component went away during fetch; abandoning the sequence");
                    return self.abandon_sequence(request);
                }
                self.state.mark_model_retrieved();
                self.in_flight = Some(request);
                vec![Action::Bind {
                    bind_model: self.state.resumed_for_first_time(),
                    completion: request.completion,
                }]
            },
            Err(error) => {
                let mut actions = self.settle_sequence(request.completion, host_finishing);
                if self.sequence_may_continue(host_finishing) {
                    tracing::warn!(%error, "cannot retrieve the model");
                    actions.push(Action::ReportError {
                        recoverable: true,
                        error: RefreshError::Fetch(error),
                    });
                } else {
                    tracing::debug!(%error, "fetch failure swallowed: the component went away");
                }
                actions
            },
        }
    }

    /// Outcome of the bind step.
    ///
    /// Success runs the completion, settles the counter, and replays any
    /// queued request. Failure aborts the sequence without running the
    /// completion and is reported upstream unless the component died.
    pub fn bind_finished(
        &mut self,
        result: Result<(), BindError>,
        host_finishing: bool,
    ) -> Vec<Action> {
        let Some(request) = self.in_flight.take() else {
            debug_assert!(false, "bind outcome with no sequence in flight");
            tracing::error!("bind outcome with no sequence in flight; ignoring");
            return vec![];
        };

        match result {
            Ok(()) => {
                self.state.mark_not_resumed_for_first_time();
                let mut actions: Vec<Action> =
                    request.completion.map(Action::RunCompletion).into_iter().collect();
                self.state.end_sequence();
                actions.extend(self.drain_queued(host_finishing));
                actions
            },
            Err(error) => {
                tracing::warn!(%error, "cannot bind the model");
                let mut actions = self.settle_sequence(request.completion, host_finishing);
                if self.sequence_may_continue(host_finishing) {
                    actions.push(Action::ReportError {
                        recoverable: true,
                        error: RefreshError::Bind(error),
                    });
                }
                actions
            },
        }
    }

    /// Settle a dead sequence: counter down, everything discarded.
    fn abandon_sequence(&mut self, request: PendingRefresh) -> Vec<Action> {
        self.state.end_sequence();
        let mut actions = Self::discard(request.completion);
        if let Some(queued) = self.state.take_queued() {
            actions.extend(Self::discard(queued.completion));
        }
        actions
    }

    /// Settle a failed sequence: counter down, its completion discarded, the
    /// queued request drained.
    fn settle_sequence(
        &mut self,
        completion: Option<CompletionId>,
        host_finishing: bool,
    ) -> Vec<Action> {
        self.state.end_sequence();
        let mut actions = Self::discard(completion);
        actions.extend(self.drain_queued(host_finishing));
        actions
    }

    /// Replay the queued request now that the sequence ended, or discard it
    /// when the component can no longer be driven.
    fn drain_queued(&mut self, host_finishing: bool) -> Vec<Action> {
        let Some(queued) = self.state.take_queued() else {
            return vec![];
        };
        if self.sequence_may_continue(host_finishing) {
            tracing::debug!("replaying the queued refresh");
            self.request_refresh(queued.fetch, queued.completion, true, host_finishing)
        } else {
            Self::discard(queued.completion)
        }
    }

    /// Whether the outcome of a sequence may still be acted on: the
    /// instance is alive, its host is not finishing, and no redirection or
    /// setup failure stopped handling in the meantime.
    fn sequence_may_continue(&self, host_finishing: bool) -> bool {
        self.state.is_alive_with_host(host_finishing) && self.state.should_keep_on()
    }

    fn discard(completion: Option<CompletionId>) -> Vec<Action> {
        completion.map(Action::DiscardCompletion).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive create and resume up to the first `StartFetch`.
    fn active_coordinator() -> Coordinator {
        let mut coordinator = Coordinator::new();
        let _ = coordinator.on_create(false, None);
        let _ = coordinator.on_resume(false);
        coordinator
    }

    /// Finish the in-flight sequence successfully.
    fn complete_sequence(coordinator: &mut Coordinator) -> Vec<Action> {
        let mut actions = coordinator.fetch_finished(Ok(()), false);
        actions.extend(coordinator.bind_finished(Ok(()), false));
        actions
    }

    #[test]
    fn create_notifies_interceptor_and_retrieves_display_objects() {
        let mut coordinator = Coordinator::new();
        let actions = coordinator.on_create(false, None);

        assert_eq!(actions, vec![
            Action::NotifyInterceptor(LifecycleEvent::Create),
            Action::RetrieveDisplayObjects,
        ]);
        assert!(coordinator.state().is_first_lifecycle());
    }

    #[test]
    fn recreation_is_not_a_first_lifecycle() {
        let mut coordinator = Coordinator::new();
        let _ = coordinator.on_create(true, None);

        assert!(!coordinator.state().is_first_lifecycle());
    }

    #[test]
    fn redirection_short_circuits_creation() {
        let mut coordinator = Coordinator::new();
        let target = RedirectTarget::new("sign-in");

        let actions = coordinator.on_create(false, Some(target.clone()));

        assert_eq!(actions, vec![Action::Redirect(target)]);
        assert!(!coordinator.should_keep_on());
    }

    #[test]
    fn redirected_instances_ignore_later_lifecycle_events() {
        let mut coordinator = Coordinator::new();
        let _ = coordinator.on_create(false, Some(RedirectTarget::new("splash")));

        assert_eq!(coordinator.on_start(), vec![]);
        assert_eq!(coordinator.on_resume(false), vec![]);
        assert_eq!(coordinator.on_pause(), vec![]);
        assert_eq!(coordinator.on_stop(), vec![]);
        assert_eq!(coordinator.on_destroy(), vec![]);
        assert!(!coordinator.state().is_alive());
    }

    #[test]
    fn setup_failure_stops_handling_permanently() {
        let mut coordinator = Coordinator::new();
        let _ = coordinator.on_create(false, None);
        let _ = coordinator.display_objects_failed(&SetupError::new("inflation failed"));

        assert!(!coordinator.should_keep_on());
        assert_eq!(coordinator.on_resume(false), vec![]);
    }

    #[test]
    fn first_resume_fetches_and_binds() {
        let mut coordinator = active_coordinator();

        // Resume already emitted NotifyInterceptor(Resume) + StartFetch.
        let actions = coordinator.fetch_finished(Ok(()), false);
        assert_eq!(actions, vec![Action::Bind { bind_model: true, completion: None }]);

        let actions = coordinator.bind_finished(Ok(()), false);
        assert_eq!(actions, vec![]);
        assert!(coordinator.state().model_retrieved());
        assert!(!coordinator.state().resumed_for_first_time());
        assert_eq!(coordinator.state().refreshing_count(), 0);
    }

    #[test]
    fn resume_skips_the_fetch_once_the_model_is_retrieved() {
        let mut coordinator = active_coordinator();
        let _ = complete_sequence(&mut coordinator);
        let _ = coordinator.on_pause();

        let actions = coordinator.on_resume(false);

        assert_eq!(actions, vec![
            Action::NotifyInterceptor(LifecycleEvent::Resume),
            Action::StartFetch { fetch: false, completion: None },
        ]);
    }

    #[test]
    fn later_binds_skip_the_one_time_bind_setup() {
        let mut coordinator = active_coordinator();
        let _ = complete_sequence(&mut coordinator);

        let _ = coordinator.request_refresh(true, None, false, false);
        let actions = coordinator.fetch_finished(Ok(()), false);

        assert_eq!(actions, vec![Action::Bind { bind_model: false, completion: None }]);
    }

    #[test]
    fn refresh_while_not_interacting_is_delayed_until_resume() {
        let mut coordinator = Coordinator::new();
        let _ = coordinator.on_create(false, None);

        let actions =
            coordinator.request_refresh(true, Some(CompletionId::new(1)), false, false);

        // P2: nothing starts before the next resume.
        assert_eq!(actions, vec![]);
        assert!(!coordinator.state().is_refreshing());

        let actions = coordinator.on_resume(false);
        assert_eq!(actions, vec![
            Action::NotifyInterceptor(LifecycleEvent::Resume),
            Action::StartFetch { fetch: true, completion: Some(CompletionId::new(1)) },
        ]);
    }

    #[test]
    fn pause_then_refresh_is_replayed_on_next_resume() {
        let mut coordinator = active_coordinator();
        let _ = complete_sequence(&mut coordinator);
        let _ = coordinator.on_pause();

        assert_eq!(coordinator.request_refresh(true, None, false, false), vec![]);

        let actions = coordinator.on_resume(false);
        assert_eq!(actions, vec![
            Action::NotifyInterceptor(LifecycleEvent::Resume),
            Action::StartFetch { fetch: true, completion: None },
        ]);
    }

    #[test]
    fn concurrent_refreshes_coalesce_into_one_queued_sequence() {
        let mut coordinator = active_coordinator();

        // P3: two requests while the resume sequence is running.
        assert_eq!(coordinator.request_refresh(true, None, false, false), vec![]);
        assert_eq!(coordinator.request_refresh(true, None, false, false), vec![]);
        assert_eq!(coordinator.state().refreshing_count(), 1);

        let _ = coordinator.fetch_finished(Ok(()), false);
        let actions = coordinator.bind_finished(Ok(()), false);

        // Exactly one replay.
        assert_eq!(actions, vec![Action::StartFetch { fetch: true, completion: None }]);
        let _ = coordinator.fetch_finished(Ok(()), false);
        let _ = coordinator.bind_finished(Ok(()), false);
        assert_eq!(coordinator.state().refreshing_count(), 0);
        assert_eq!(coordinator.state().queued(), None);
    }

    #[test]
    fn a_queued_fetch_is_never_weakened_by_a_later_request() {
        let mut coordinator = active_coordinator();

        let _ = coordinator.request_refresh(true, None, false, false);
        let _ = coordinator.request_refresh(false, None, false, false);

        let _ = coordinator.fetch_finished(Ok(()), false);
        let actions = coordinator.bind_finished(Ok(()), false);

        assert_eq!(actions, vec![Action::StartFetch { fetch: true, completion: None }]);
    }

    #[test]
    fn destroyed_instances_never_fetch_again() {
        let mut coordinator = active_coordinator();
        let _ = complete_sequence(&mut coordinator);
        let _ = coordinator.on_destroy();

        // P4: nothing but a completion discard may come back.
        let actions =
            coordinator.request_refresh(true, Some(CompletionId::new(9)), true, false);
        assert_eq!(actions, vec![Action::DiscardCompletion(CompletionId::new(9))]);
        assert!(!coordinator.state().is_alive());
    }

    #[test]
    fn finishing_hosts_drop_refreshes() {
        let mut coordinator = active_coordinator();
        let _ = complete_sequence(&mut coordinator);

        assert_eq!(coordinator.request_refresh(true, None, true, true), vec![]);
    }

    #[test]
    fn death_during_fetch_swallows_the_sequence() {
        let mut coordinator = active_coordinator();
        let _ = coordinator.on_destroy();

        let actions = coordinator.fetch_finished(Ok(()), false);

        assert_eq!(actions, vec![]);
        assert_eq!(coordinator.state().refreshing_count(), 0);
        assert!(!coordinator.state().model_retrieved());
    }

    #[test]
    fn death_during_fetch_discards_the_queued_request() {
        let mut coordinator = active_coordinator();
        let _ = coordinator.request_refresh(true, Some(CompletionId::new(4)), false, false);
        let _ = coordinator.on_destroy();

        let actions = coordinator.fetch_finished(Ok(()), false);

        assert_eq!(actions, vec![Action::DiscardCompletion(CompletionId::new(4))]);
        assert_eq!(coordinator.state().queued(), None);
    }

    #[test]
    fn fetch_failure_is_reported_and_leaves_the_model_unretrieved() {
        let mut coordinator = active_coordinator();

        let error = FetchError::connectivity("offline");
        let actions = coordinator.fetch_finished(Err(error.clone()), false);

        assert_eq!(actions, vec![Action::ReportError {
            recoverable: true,
            error: RefreshError::Fetch(error),
        }]);
        assert!(!coordinator.state().model_retrieved());
        assert_eq!(coordinator.state().refreshing_count(), 0);
    }

    #[test]
    fn fetch_failure_on_a_dead_component_is_swallowed() {
        let mut coordinator = active_coordinator();
        let _ = coordinator.on_destroy();

        let actions = coordinator.fetch_finished(Err(FetchError::unavailable("late")), false);

        assert_eq!(actions, vec![]);
        assert_eq!(coordinator.state().refreshing_count(), 0);
    }

    #[test]
    fn fetch_failure_replays_the_queued_request() {
        let mut coordinator = active_coordinator();
        let _ = coordinator.request_refresh(true, None, false, false);

        let actions = coordinator.fetch_finished(Err(FetchError::unavailable("flaky")), false);

        assert_eq!(actions, vec![
            Action::StartFetch { fetch: true, completion: None },
            Action::ReportError {
                recoverable: true,
                error: RefreshError::Fetch(FetchError::unavailable("flaky")),
            },
        ]);
    }

    #[test]
    fn bind_failure_aborts_without_running_the_completion() {
        let mut coordinator = Coordinator::new();
        let _ = coordinator.on_create(false, None);
        let _ = coordinator.request_refresh(true, Some(CompletionId::new(2)), true, false);
        let _ = coordinator.fetch_finished(Ok(()), false);

        let error = BindError::new("widget gone");
        let actions = coordinator.bind_finished(Err(error.clone()), false);

        assert_eq!(actions, vec![
            Action::DiscardCompletion(CompletionId::new(2)),
            Action::ReportError { recoverable: true, error: RefreshError::Bind(error) },
        ]);
        // The one-time bind setup is still owed.
        assert!(coordinator.state().resumed_for_first_time());
    }

    #[test]
    fn successful_bind_runs_the_completion_before_draining() {
        let mut coordinator = Coordinator::new();
        let _ = coordinator.on_create(false, None);
        let _ = coordinator.on_resume(false);
        let _ = coordinator.request_refresh(true, Some(CompletionId::new(5)), false, false);

        let _ = coordinator.fetch_finished(Ok(()), false);
        let actions = coordinator.bind_finished(Ok(()), false);

        // Resume's sequence had no completion; the queued one replays after.
        assert_eq!(actions, vec![Action::StartFetch {
            fetch: true,
            completion: Some(CompletionId::new(5)),
        }]);

        let _ = coordinator.fetch_finished(Ok(()), false);
        let actions = coordinator.bind_finished(Ok(()), false);
        assert_eq!(actions, vec![Action::RunCompletion(CompletionId::new(5))]);
    }

    #[test]
    fn destroy_notifies_the_interceptor_once() {
        let mut coordinator = active_coordinator();
        let _ = complete_sequence(&mut coordinator);

        let actions = coordinator.on_destroy();
        assert_eq!(actions, vec![Action::NotifyInterceptor(LifecycleEvent::Destroy)]);
    }

    #[test]
    fn redirection_during_a_fetch_abandons_the_bind() {
        let mut coordinator = active_coordinator();
        let _ = coordinator.on_new_intent(Some(RedirectTarget::new("splash")));

        let actions = coordinator.fetch_finished(Ok(()), false);

        assert_eq!(actions, vec![]);
        assert_eq!(coordinator.state().refreshing_count(), 0);
        assert!(!coordinator.state().model_retrieved());
    }

    #[test]
    fn new_intent_can_decide_a_late_redirection() {
        let mut coordinator = active_coordinator();
        let _ = complete_sequence(&mut coordinator);

        let target = RedirectTarget::new("sign-in");
        let actions = coordinator.on_new_intent(Some(target.clone()));

        assert_eq!(actions, vec![Action::Redirect(target)]);
        assert!(!coordinator.should_keep_on());
    }

    #[test]
    fn save_state_persists_the_marker() {
        let mut coordinator = active_coordinator();
        assert_eq!(coordinator.on_save_state(), vec![Action::PersistMarker]);
    }
}
