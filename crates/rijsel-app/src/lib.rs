//! Host integration layer for Rijsel
//!
//! Connects the pure coordination core to a concrete component: the [`Host`]
//! trait abstracts the component being coordinated, the [`Controller`] holds
//! the injected redirection/interception/error-reporting services, and the
//! [`Runtime`] drives the event loop that executes the coordinator's
//! actions. Presentation layers observe progress through the [`ModelState`]
//! feed instead of talking to the coordinator directly.
//!
//! # Components
//!
//! - [`Host`]: the component whose fetch/bind workflow is coordinated
//! - [`Controller`]: injected redirector, interceptor, and error reporter
//! - [`Runtime`] / [`Handle`]: async event loop and its command channel
//! - [`ModelState`]: coarse model state published over a watch channel

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod controller;
mod host;
mod model_state;
mod runtime;

pub use controller::{
    Controller, DefaultErrorReporter, ErrorReporter, Interceptor, MessageId, Redirector,
};
pub use host::Host;
pub use model_state::ModelState;
pub use runtime::{Completion, Handle, Runtime};
