//! Typed publish/subscribe event bus for Rijsel
//!
//! Components broadcast [`Envelope`]s carrying an action name, a category
//! set, and a typed payload; subscribers declare a [`Filter`] and only see
//! matching envelopes. Publishing never blocks: slow subscribers observe a
//! logged lag and keep going from the oldest retained envelope.
//!
//! One [`Bus`] instance covers one payload type; cross-component buses are
//! plain values passed to whoever needs them, not process-wide globals.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use tokio::sync::broadcast;

/// A published event: an action name, a category set, and a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    /// What happened. Matched exactly against filter actions.
    pub action: String,
    /// Refinements of the action. A subscriber sees this envelope only if
    /// its filter declares every category listed here.
    pub categories: Vec<String>,
    /// The typed payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Envelope with no categories.
    pub fn new(action: impl Into<String>, payload: T) -> Self {
        Self { action: action.into(), categories: Vec::new(), payload }
    }

    /// Add a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }
}

/// Subscription predicate: accepted actions plus declared categories.
///
/// An envelope matches when its action is one of the filter's actions and
/// every envelope category appears in the filter. A filter with no
/// categories therefore matches only envelopes with no categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    actions: Vec<String>,
    categories: Vec<String>,
}

impl Filter {
    /// Filter accepting a single action and no categories.
    pub fn for_action(action: impl Into<String>) -> Self {
        Self { actions: vec![action.into()], categories: Vec::new() }
    }

    /// Accept an additional action.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Declare a category this subscriber understands.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Whether an envelope passes this filter.
    pub fn matches<T>(&self, envelope: &Envelope<T>) -> bool {
        self.actions.iter().any(|action| *action == envelope.action)
            && envelope
                .categories
                .iter()
                .all(|category| self.categories.contains(category))
    }
}

/// Broadcast bus for one payload type.
///
/// Cloning shares the channel; all clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct Bus<T> {
    tx: broadcast::Sender<Envelope<T>>,
}

impl<T: Clone> Bus<T> {
    /// Bus retaining up to `capacity` envelopes per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an envelope to all current subscribers.
    ///
    /// Returns how many subscribers the envelope reached before filtering.
    /// Publishing with no subscribers is a no-op.
    pub fn publish(&self, envelope: Envelope<T>) -> usize {
        match self.tx.send(envelope) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!("event published with no subscribers");
                0
            },
        }
    }

    /// Subscribe with a filter. Only envelopes published after this call are
    /// observed.
    pub fn subscribe(&self, filter: Filter) -> Subscription<T> {
        Subscription { rx: self.tx.subscribe(), filter }
    }
}

/// One subscriber's filtered view of a [`Bus`].
pub struct Subscription<T> {
    rx: broadcast::Receiver<Envelope<T>>,
    filter: Filter,
}

impl<T: Clone> Subscription<T> {
    /// Receive the next matching envelope.
    ///
    /// Non-matching envelopes are skipped. When the subscriber fell behind,
    /// the lag is logged and reception resumes from the oldest retained
    /// envelope. Returns `None` once the bus is dropped and the backlog is
    /// drained.
    pub async fn recv(&mut self) -> Option<Envelope<T>> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if self.filter.matches(&envelope) => return Some(envelope),
                Ok(_) => {},
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged behind the bus");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
