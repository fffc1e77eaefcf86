//! Host trait abstracting the component being coordinated.
//!
//! The [`Host`] trait decouples the coordination runtime from any concrete
//! presentation framework. The hosting layer implements it for its component
//! type (screen, panel, page); the generic [`crate::Runtime`] handles all
//! sequencing. The same runtime code drives production hosts and the
//! scripted hosts used in tests.

use std::future::Future;

use rijsel_core::{BindError, FetchError, RedirectTarget, SetupError};

/// Component whose model retrieval and binding are coordinated.
///
/// All methods except [`fetch_model`](Host::fetch_model) run on the
/// interaction context (the runtime's event loop task). `fetch_model`
/// produces a future that the runtime moves onto the worker pool, so it
/// must not borrow the host.
pub trait Host: Send + 'static {
    /// Extract the key display objects from the presentation, once per
    /// instance, right after creation.
    ///
    /// # Errors
    ///
    /// A failure permanently stops automatic coordination for this
    /// instance.
    fn retrieve_display_objects(&mut self) -> Result<(), SetupError>;

    /// Produce the model this component presents.
    ///
    /// The returned future runs on the worker pool. There is no timeout;
    /// the implementation owns its own deadline policy.
    fn fetch_model(&mut self) -> impl Future<Output = Result<(), FetchError>> + Send + 'static;

    /// Bind the presentation to the retrieved model. Runs once per
    /// instance, on the first successful sequence.
    ///
    /// # Errors
    ///
    /// A failure aborts the sequence; the completion callback is not run.
    fn bind_model(&mut self) -> Result<(), BindError>;

    /// Whether the hosting component is on its way out. Consulted before
    /// every coordination decision.
    fn is_finishing(&self) -> bool;

    /// Persist the marker distinguishing recreation from first creation.
    /// The next instance reads it back as `has_prior_state`.
    fn save_state(&mut self);

    /// Hand control to the redirect target. The instance yields; no further
    /// coordination happens.
    fn redirect_to(&mut self, target: &RedirectTarget);

    /// Whether this component is exempt from redirection checks, such as
    /// the target a redirector sends other components to.
    fn escapes_redirection(&self) -> bool {
        false
    }
}
