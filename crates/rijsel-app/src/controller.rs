//! Controller services injected into the runtime.
//!
//! A [`Controller`] is an explicit registry of the three collaboration
//! points the runtime consults: a [`Redirector`] deciding whether a freshly
//! created component must yield to another one, an [`Interceptor`] observing
//! every lifecycle event, and an [`ErrorReporter`] turning sequence failures
//! into displayable messages. Each runtime receives its own controller; there
//! is no ambient global registry.

use std::panic::{AssertUnwindSafe, catch_unwind};

use rijsel_core::{LifecycleEvent, RedirectTarget, RefreshError};

/// Decides whether a component must yield to another one.
///
/// Consulted once at creation and again whenever the host is re-shown with a
/// new intent. Hosts that escape redirection are never submitted.
pub trait Redirector: Send {
    /// The target to yield to, or `None` to proceed normally.
    fn redirect(&mut self) -> Option<RedirectTarget>;
}

/// Fire-and-forget observer of lifecycle events.
///
/// Notified on the interaction context; must not block.
pub trait Interceptor: Send {
    /// A lifecycle event reached the coordinator.
    fn on_lifecycle_event(&mut self, event: LifecycleEvent);
}

/// Turns a sequence failure into a displayable message.
pub trait ErrorReporter: Send {
    /// Pick the message for this failure.
    ///
    /// `recoverable` tells whether the component stays usable. Panics are
    /// caught by the controller and replaced with the generic message.
    fn report(&mut self, recoverable: bool, error: &RefreshError) -> MessageId;
}

/// Displayable message identifiers, resolved by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MessageId {
    /// The model could not be retrieved.
    ModelUnavailable,

    /// The model could not be retrieved because of a connectivity problem.
    ConnectivityProblem,

    /// The retrieved model could not be bound to the presentation.
    BindFailure,

    /// Fallback for anything unclassified.
    Unexpected,
}

/// Default reporter: classifies by error kind and connectivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorReporter;

impl ErrorReporter for DefaultErrorReporter {
    fn report(&mut self, recoverable: bool, error: &RefreshError) -> MessageId {
        tracing::warn!(%error, recoverable, "refresh sequence failed");
        match error {
            RefreshError::Fetch(fetch) if fetch.is_connectivity() => {
                MessageId::ConnectivityProblem
            },
            RefreshError::Fetch(_) => MessageId::ModelUnavailable,
            RefreshError::Bind(_) => MessageId::BindFailure,
        }
    }
}

/// Registry of the services a runtime consults.
///
/// Redirector and interceptor are optional; the reporter defaults to
/// [`DefaultErrorReporter`].
pub struct Controller {
    redirector: Option<Box<dyn Redirector>>,
    interceptor: Option<Box<dyn Interceptor>>,
    reporter: Box<dyn ErrorReporter>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Controller with no redirector, no interceptor, and the default
    /// reporter.
    pub fn new() -> Self {
        Self { redirector: None, interceptor: None, reporter: Box::new(DefaultErrorReporter) }
    }

    /// Install a redirector.
    #[must_use]
    pub fn with_redirector(mut self, redirector: impl Redirector + 'static) -> Self {
        self.redirector = Some(Box::new(redirector));
        self
    }

    /// Install an interceptor.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor = Some(Box::new(interceptor));
        self
    }

    /// Replace the error reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Consult the redirector for a host, honoring the escape flag.
    pub(crate) fn consult_redirector(&mut self, escapes: bool) -> Option<RedirectTarget> {
        if escapes {
            return None;
        }
        self.redirector.as_mut().and_then(|redirector| redirector.redirect())
    }

    /// Notify the interceptor, if any.
    pub(crate) fn notify_interceptor(&mut self, event: LifecycleEvent) {
        if let Some(interceptor) = self.interceptor.as_mut() {
            interceptor.on_lifecycle_event(event);
        }
    }

    /// Ask the reporter for a message, falling back to the generic one when
    /// it misbehaves.
    pub(crate) fn report(&mut self, recoverable: bool, error: &RefreshError) -> MessageId {
        let reporter = self.reporter.as_mut();
        match catch_unwind(AssertUnwindSafe(|| reporter.report(recoverable, error))) {
            Ok(message) => message,
            Err(_) => {
                tracing::error!("error reporter panicked; using the generic message");
                MessageId::Unexpected
            },
        }
    }
}
