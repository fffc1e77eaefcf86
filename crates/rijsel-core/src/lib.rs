//! Core coordination layer for Rijsel
//!
//! Pure state machines governing the "retrieve model, then bind model"
//! workflow across an unreliable, interruptible component lifecycle. The
//! coordinator decides when a background fetch may run, when it must be
//! deferred or coalesced, and when binding may proceed - completely decoupled
//! from I/O, UI toolkits, and any async runtime.
//!
//! # Components
//!
//! - [`Coordinator`]: lifecycle-driven fetch/bind sequencing state machine
//! - [`CoordinatorState`]: per-instance bookkeeping (flags, pending requests)
//! - [`Action`]: instructions produced for a runtime to execute
//! - [`LifecycleEvent`]: lifecycle transitions forwarded by a host component

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod coordinator;
mod error;
mod lifecycle;
mod state;

pub use coordinator::{Action, Coordinator, RedirectTarget};
pub use error::{BindError, FetchError, RefreshError, SetupError};
pub use lifecycle::LifecycleEvent;
pub use state::{Admission, CompletionId, CoordinatorState, PendingRefresh};
