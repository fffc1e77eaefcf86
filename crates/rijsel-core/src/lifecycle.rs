//! Lifecycle transitions forwarded into the coordinator.
//!
//! A host component divides its work-flow into typical phases: set up the
//! presentation and extract its key objects, retrieve the model they
//! represent, bind the presentation to the retrieved model, and refresh the
//! binding when the component comes back to the foreground. The coordinator
//! only consumes the transitions; it never drives the host.

use std::fmt;

/// Lifecycle transitions of a host component, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The component instance has been created.
    Create,

    /// The component is becoming visible.
    Start,

    /// The component's presentation hierarchy exists.
    ViewCreated,

    /// The interacting window opens: the user can see and touch the
    /// component.
    Resume,

    /// The interacting window closes.
    Pause,

    /// The component is no longer visible.
    Stop,

    /// The component instance is being torn down. Terminal.
    Destroy,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Start => "start",
            Self::ViewCreated => "view-created",
            Self::Resume => "resume",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Destroy => "destroy",
        };
        f.write_str(name)
    }
}
