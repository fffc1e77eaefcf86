//! Deterministic test harness for Rijsel
//!
//! Provides scripted collaborators for exercising the full runtime without
//! a presentation framework: a [`ScriptedHost`] whose fetches and binds are
//! queued and gated from the outside, a [`Probe`] that scripts the host and
//! observes every call the runtime makes, and recording/fixed controller
//! services. The same scenarios that document the coordination semantics
//! run against these under `tests/`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod recording;
mod scripted_host;

pub use recording::{FixedRedirector, RecordingInterceptor};
pub use scripted_host::{HostCall, Probe, ScriptedHost};
