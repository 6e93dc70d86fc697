//! Receivers of parsed top-level elements.

use ironxso_schema::{ParseError, Xso};
use parking_lot::Mutex;
use std::sync::Arc;

/// Trait for receiving the instances parsed from top-level elements.
pub trait XsoHandler: Send + Sync {
    /// Called when a top-level element of the registered type is complete.
    ///
    /// # Arguments
    /// * `xso` - The parsed instance
    fn on_xso(&self, xso: Xso);

    /// Called when a top-level element of the registered type fails to
    /// parse. The error is also returned to the caller feeding the stream.
    ///
    /// # Arguments
    /// * `error` - The parse error
    fn on_error(&self, _error: &ParseError) {}
}

/// Wrapper to convert a closure into an [`XsoHandler`].
pub struct FnHandler<F> {
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(Xso) + Send + Sync,
{
    /// Creates a new function handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> XsoHandler for FnHandler<F>
where
    F: Fn(Xso) + Send + Sync,
{
    fn on_xso(&self, xso: Xso) {
        (self.handler)(xso);
    }
}

/// Handler that queues every instance for later retrieval.
///
/// Clones share one queue, so a clone can be registered while the original
/// is kept for draining.
#[derive(Debug, Clone, Default)]
pub struct QueueHandler {
    queue: Arc<Mutex<Vec<Xso>>>,
}

impl QueueHandler {
    /// Creates a handler with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all queued instances, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Xso> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Number of queued instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl XsoHandler for QueueHandler {
    fn on_xso(&self, xso: Xso) {
        self.queue.lock().push(xso);
    }
}
