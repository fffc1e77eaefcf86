//! Per-instance coordination bookkeeping.
//!
//! [`CoordinatorState`] gathers the flags and pending requests of one host
//! component instance. It is exclusively owned by one [`crate::Coordinator`],
//! created when the hosting component is created and destroyed with it. No
//! behavior beyond bookkeeping lives here; the decision logic belongs to the
//! coordinator.

/// Identifies a completion callback owned by the runtime.
///
/// The state machine never holds callbacks; it moves opaque slot IDs around
/// so it stays `Debug`/`Eq` and deterministic to test. The runtime maps IDs
/// back to the closures it registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionId(u64);

impl CompletionId {
    /// Create an ID from a raw slot number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw slot number.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A refresh request waiting in one of the deferral slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRefresh {
    /// Whether the fetch step should actually run.
    pub fetch: bool,
    /// Completion to run once the sequence ends.
    pub completion: Option<CompletionId>,
}

impl PendingRefresh {
    /// Merge a later request into this slot.
    ///
    /// `fetch` is OR-combined so a pending fetch is never weakened by a later
    /// non-fetching request. The most recent completion wins; a later request
    /// without a completion leaves an earlier one in place. Returns the
    /// displaced completion, if any, so the caller can release its slot.
    pub fn merge(&mut self, later: PendingRefresh) -> Option<CompletionId> {
        self.fetch |= later.fetch;
        match later.completion {
            Some(completion) => self.completion.replace(completion),
            None => None,
        }
    }
}

/// Outcome of admitting a refresh request, in decision order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Dropped silently: the instance or its hosting component is finished.
    Dropped,

    /// Stored in the delayed slot until the next resume.
    Delayed {
        /// Completion displaced while merging into the slot.
        displaced: Option<CompletionId>,
    },

    /// Stored in the queued slot until the running sequence ends.
    Queued {
        /// Completion displaced while merging into the slot.
        displaced: Option<CompletionId>,
    },

    /// Admitted: a fetch+bind sequence starts now.
    Admitted {
        /// Completion of a cleared delayed request, to be discarded.
        displaced: Option<CompletionId>,
    },
}

/// Flags and pending requests of one host component instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorState {
    /// Becomes false permanently once teardown begins.
    alive: bool,
    /// True between resume and pause.
    interacting: bool,
    /// True only on the very first creation of the instance.
    first_lifecycle: bool,
    /// True once the first successful (or skipped) fetch completed.
    model_retrieved: bool,
    /// True until the first bind completion.
    resumed_for_first_time: bool,
    /// Number of in-flight fetch+bind sequences. Reentrancy guard.
    refreshing_count: u32,
    /// Request that arrived while not interacting; replayed on next resume.
    delayed: Option<PendingRefresh>,
    /// Request that arrived while a sequence was running; replayed when it
    /// ends.
    queued: Option<PendingRefresh>,
    /// Redirection decided at creation; lifecycle events are ignored from
    /// then on, except teardown bookkeeping.
    being_redirected: bool,
    /// Initial setup failed; suppresses all further handling.
    stop_handling: bool,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorState {
    /// Fresh state for a newly created component instance.
    pub fn new() -> Self {
        Self {
            alive: true,
            interacting: false,
            first_lifecycle: true,
            model_retrieved: false,
            resumed_for_first_time: true,
            refreshing_count: 0,
            delayed: None,
            queued: None,
            being_redirected: false,
            stop_handling: false,
        }
    }

    /// True until teardown begins. Never becomes true again once false.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// True while both the instance and its hosting component can still be
    /// driven.
    pub fn is_alive_with_host(&self, host_finishing: bool) -> bool {
        self.alive && !host_finishing
    }

    /// True between resume and pause.
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// True only on the very first creation of the component instance
    /// (false across configuration-change recreation).
    pub fn is_first_lifecycle(&self) -> bool {
        self.first_lifecycle
    }

    pub(crate) fn set_first_lifecycle(&mut self, first: bool) {
        self.first_lifecycle = first;
    }

    /// True once the first successful (or skipped) fetch has completed.
    pub fn model_retrieved(&self) -> bool {
        self.model_retrieved
    }

    pub(crate) fn mark_model_retrieved(&mut self) {
        self.model_retrieved = true;
    }

    /// True until the first bind completion; later binds skip the one-time
    /// bind setup.
    pub fn resumed_for_first_time(&self) -> bool {
        self.resumed_for_first_time
    }

    pub(crate) fn mark_not_resumed_for_first_time(&mut self) {
        self.resumed_for_first_time = false;
    }

    /// Number of in-flight fetch+bind sequences.
    pub fn refreshing_count(&self) -> u32 {
        self.refreshing_count
    }

    /// True while a fetch+bind sequence is running.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing_count > 0
    }

    /// True unless setup failed or a redirection was decided.
    pub fn should_keep_on(&self) -> bool {
        !self.stop_handling && !self.being_redirected
    }

    /// The delayed request, if any.
    pub fn delayed(&self) -> Option<PendingRefresh> {
        self.delayed
    }

    /// The queued request, if any.
    pub fn queued(&self) -> Option<PendingRefresh> {
        self.queued
    }

    pub(crate) fn on_resume(&mut self) {
        self.interacting = true;
    }

    pub(crate) fn on_pause(&mut self) {
        self.interacting = false;
    }

    pub(crate) fn on_destroy(&mut self) {
        self.alive = false;
    }

    pub(crate) fn mark_being_redirected(&mut self) {
        self.being_redirected = true;
    }

    pub(crate) fn stop_handling(&mut self) {
        self.stop_handling = true;
    }

    pub(crate) fn begin_sequence(&mut self) {
        self.refreshing_count += 1;
    }

    pub(crate) fn end_sequence(&mut self) {
        debug_assert!(self.refreshing_count > 0, "sequence counter underflow");
        if self.refreshing_count == 0 {
            tracing::error!("sequence counter underflow; clamping at zero");
            return;
        }
        self.refreshing_count -= 1;
    }

    /// Decide what to do with a refresh request.
    ///
    /// Evaluated in order: dead, finishing, or stopped components drop the
    /// request; a component that is not interacting delays it (unless
    /// `immediate`); a running sequence queues it; otherwise the request is
    /// admitted and any delayed request is cleared.
    pub(crate) fn admit(
        &mut self,
        request: PendingRefresh,
        immediate: bool,
        host_finishing: bool,
    ) -> Admission {
        if !self.is_alive_with_host(host_finishing) || !self.should_keep_on() {
            return Admission::Dropped;
        }
        if !self.interacting && !immediate {
            let displaced = Self::merge_into(&mut self.delayed, request);
            return Admission::Delayed { displaced };
        }
        if self.is_refreshing() {
            let displaced = Self::merge_into(&mut self.queued, request);
            return Admission::Queued { displaced };
        }
        let displaced = self.delayed.take().and_then(|delayed| delayed.completion);
        self.begin_sequence();
        Admission::Admitted { displaced }
    }

    pub(crate) fn take_delayed(&mut self) -> Option<PendingRefresh> {
        self.delayed.take()
    }

    pub(crate) fn take_queued(&mut self) -> Option<PendingRefresh> {
        self.queued.take()
    }

    fn merge_into(
        slot: &mut Option<PendingRefresh>,
        request: PendingRefresh,
    ) -> Option<CompletionId> {
        match slot {
            Some(existing) => existing.merge(request),
            None => {
                *slot = Some(request);
                None
            },
        }
    }
}
