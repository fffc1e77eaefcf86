//! Error types for the coordination core.
//!
//! The taxonomy follows the sequence boundaries: a fetch step fails with
//! [`FetchError`], a bind step fails with [`BindError`], and one-time setup
//! fails with [`SetupError`]. A component dying mid-flight is deliberately
//! NOT an error - staleness is detected and swallowed by the coordinator.
//!
//! Errors carried through the state machine are `Clone + PartialEq` so action
//! sequences stay comparable in tests.

use thiserror::Error;

/// The fetch step could not produce the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Signaled by fetch implementations when the model cannot be produced.
    #[error("model unavailable (code {code}): {reason}")]
    ModelUnavailable {
        /// Implementation-defined classification code.
        code: u32,
        /// Whether the failure was caused by a connectivity problem.
        connectivity: bool,
        /// Human-readable description.
        reason: String,
    },

    /// The worker running the fetch step failed abnormally.
    #[error("fetch worker failed: {0}")]
    Worker(String),
}

impl FetchError {
    /// Generic model-unavailable failure with code 0.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable { code: 0, connectivity: false, reason: reason.into() }
    }

    /// Connectivity-caused model-unavailable failure with code 0.
    pub fn connectivity(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable { code: 0, connectivity: true, reason: reason.into() }
    }

    /// True when the failure was caused by a connectivity problem.
    ///
    /// Error reporters use this to pick a dedicated message.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ModelUnavailable { connectivity: true, .. })
    }
}

/// The bind step failed on the interaction context.
///
/// Aborts the running sequence; the completion callback is not invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot bind model: {reason}")]
pub struct BindError {
    /// Human-readable description.
    pub reason: String,
}

impl BindError {
    /// Create a bind failure with the given description.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Display-object retrieval at creation failed.
///
/// Terminal for the instance's automatic coordination: the coordinator stops
/// handling lifecycle events permanently and manual intervention is required.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot retrieve display objects: {reason}")]
pub struct SetupError {
    /// Human-readable description.
    pub reason: String,
}

impl SetupError {
    /// Create a setup failure with the given description.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// A failure surfaced by a fetch+bind sequence to the error reporter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// The fetch step failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The bind step failed.
    #[error(transparent)]
    Bind(#[from] BindError),
}

impl RefreshError {
    /// True when the underlying failure was caused by a connectivity problem.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Fetch(fetch) if fetch.is_connectivity())
    }
}
