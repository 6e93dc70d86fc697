//! The incremental parse abstraction.
//!
//! A [`Process`] consumes one [`Event`] per call and is suspended between
//! calls. Nested parses are ordinary processes owned by their parent, so the
//! chain of active processes mirrors the chain of open elements.

use crate::event::Event;

/// Outcome of feeding one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// More events are needed.
    Continue,
    /// The process completed with a value. It must not be fed again.
    Done(T),
}

impl<T> Step<T> {
    /// Returns true if the process completed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Maps the completed value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Step<U> {
        match self {
            Self::Continue => Step::Continue,
            Self::Done(v) => Step::Done(f(v)),
        }
    }
}

/// An incremental consumer of the event vocabulary.
///
/// Returning `Err` from [`Process::feed`] finishes the process just like
/// returning [`Step::Done`] does.
pub trait Process {
    /// Value produced on completion.
    type Output;
    /// Failure type. Stream-level errors must convert into it.
    type Error: From<crate::error::Error>;

    /// Feeds the next event.
    ///
    /// # Errors
    /// Returns the process's error if the event cannot be consumed.
    fn feed(&mut self, event: Event) -> Result<Step<Self::Output>, Self::Error>;

    /// Requests early termination. Called instead of further events when the
    /// stream is closed; the process releases whatever it holds.
    fn close(&mut self) {}
}

impl<P: Process + ?Sized> Process for Box<P> {
    type Output = P::Output;
    type Error = P::Error;

    fn feed(&mut self, event: Event) -> Result<Step<Self::Output>, Self::Error> {
        (**self).feed(event)
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// Feeds a complete event sequence into a process.
///
/// # Errors
/// Returns the process's error, or [`crate::Error::Incomplete`] if the
/// events run out before the process completes.
pub fn run<P, I>(process: &mut P, events: I) -> Result<P::Output, P::Error>
where
    P: Process,
    I: IntoIterator<Item = Event>,
{
    for event in events {
        if let Step::Done(value) = process.feed(event)? {
            return Ok(value);
        }
    }
    process.close();
    Err(crate::error::Error::Incomplete.into())
}
