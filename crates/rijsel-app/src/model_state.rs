//! Observable model state for presentation layers.
//!
//! The runtime publishes the coarse state of the current model over a watch
//! channel. Presentation layers subscribe to show a loading indicator, the
//! bound content, or an error message; they never talk to the coordinator
//! directly.

use crate::MessageId;

/// Coarse state of the model as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelState {
    /// No sequence has run yet.
    #[default]
    Idle,

    /// A fetch+bind sequence is running.
    Loading,

    /// The model is retrieved and bound.
    Loaded,

    /// The last sequence failed with a displayable message.
    Error(MessageId),
}

impl ModelState {
    /// True while a sequence is running.
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}
