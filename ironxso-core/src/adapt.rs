//! Event adaptation: subtree guards, capture, skipping, replay and the
//! push-to-pull driver.
//!
//! All adapters count start/end nesting themselves, so whatever happens to
//! the process they wrap, the enclosing stream stays aligned on element
//! boundaries.

use crate::error::{Error, Result};
use crate::event::{Event, EventSink};
use crate::process::{Process, Step};

/// Tracks start/end balance for one subtree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Depth(usize);

impl Depth {
    fn track(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Start { .. } => self.0 += 1,
            Event::End => {
                self.0 = self
                    .0
                    .checked_sub(1)
                    .ok_or(Error::UnbalancedEnd { depth: 0 })?;
            }
            Event::Text(_) => {}
        }
        Ok(())
    }

    fn is_closed(self) -> bool {
        self.0 == 0
    }
}

/// Wraps a nested parse so its whole subtree is consumed before any outcome
/// is reported.
///
/// The guard must be fed the subtree's start event first. If the inner
/// process fails (including on that start event), the error is held back and
/// the remaining events of the subtree are swallowed; the error is returned
/// together with the matching end event.
#[derive(Debug)]
pub struct Guard<P: Process> {
    inner: Option<P>,
    depth: Depth,
    error: Option<P::Error>,
    output: Option<P::Output>,
    finished: bool,
}

impl<P: Process> Guard<P> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner: Some(inner),
            depth: Depth::default(),
            error: None,
            output: None,
            finished: false,
        }
    }

    /// Returns true once the inner process has failed and the guard is only
    /// draining.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.error.is_some()
    }
}

impl<P: Process> Process for Guard<P> {
    type Output = P::Output;
    type Error = P::Error;

    fn feed(&mut self, event: Event) -> std::result::Result<Step<P::Output>, P::Error> {
        if self.finished {
            return Err(Error::Closed.into());
        }
        self.depth.track(&event)?;

        if let Some(inner) = self.inner.as_mut() {
            match inner.feed(event) {
                Ok(Step::Continue) => {}
                Ok(Step::Done(value)) => {
                    self.output = Some(value);
                    self.inner = None;
                }
                Err(e) => {
                    tracing::trace!("guarded process failed, draining subtree");
                    self.error = Some(e);
                    self.inner = None;
                }
            }
        }

        if !self.depth.is_closed() {
            return Ok(Step::Continue);
        }
        self.finished = true;
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        match self.output.take() {
            Some(value) => Ok(Step::Done(value)),
            None => {
                if let Some(mut inner) = self.inner.take() {
                    inner.close();
                }
                Err(Error::Incomplete.into())
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            inner.close();
        }
        self.finished = true;
    }
}

/// Forwards every event to an inner process while recording it.
///
/// On success the output is paired with the recorded events. The buffer is
/// cleared when the inner process fails or the relay is closed early, so
/// only complete captures are ever handed out.
#[derive(Debug)]
pub struct CaptureRelay<P: Process> {
    inner: P,
    buffer: Vec<Event>,
}

impl<P: Process> CaptureRelay<P> {
    /// Wraps `inner` with an empty buffer.
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    /// The events recorded so far.
    #[must_use]
    pub fn captured(&self) -> &[Event] {
        &self.buffer
    }
}

impl<P: Process> Process for CaptureRelay<P> {
    type Output = (P::Output, Vec<Event>);
    type Error = P::Error;

    fn feed(&mut self, event: Event) -> std::result::Result<Step<Self::Output>, P::Error> {
        // EventSink::event merges adjacent text fragments
        if let Err(e) = self.buffer.event(&event) {
            self.buffer.clear();
            return Err(e.into());
        }
        match self.inner.feed(event) {
            Ok(Step::Continue) => Ok(Step::Continue),
            Ok(Step::Done(value)) => Ok(Step::Done((value, std::mem::take(&mut self.buffer)))),
            Err(e) => {
                self.buffer.clear();
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        self.buffer.clear();
        self.inner.close();
    }
}

/// Discards one complete subtree.
///
/// Fed the subtree's start event first; completes on the matching end.
#[derive(Debug, Default, Clone)]
pub struct DropConsumer {
    depth: Depth,
}

impl DropConsumer {
    /// Creates a consumer that has not seen the subtree start yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Process for DropConsumer {
    type Output = ();
    type Error = Error;

    fn feed(&mut self, event: Event) -> Result<Step<()>> {
        self.depth.track(&event)?;
        if self.depth.is_closed() {
            Ok(Step::Done(()))
        } else {
            Ok(Step::Continue)
        }
    }
}

/// Re-emits a recorded event sequence into a sink.
///
/// # Errors
/// Returns the first sink error.
pub fn replay<'a, S, I>(events: I, sink: &mut S) -> Result<()>
where
    S: EventSink + ?Sized,
    I: IntoIterator<Item = &'a Event>,
{
    for event in events {
        sink.event(event)?;
    }
    Ok(())
}

/// Bridges a push-style event source to one pull-style process at a time.
///
/// A fresh process is created from the caller's factory for each top-level
/// element. When a process fails mid-element, the driver swallows the rest
/// of that element so the next top-level element starts cleanly.
#[derive(Debug)]
pub struct PushDriver<P: Process> {
    active: Option<P>,
    depth: usize,
    skipping: bool,
}

impl<P: Process> Default for PushDriver<P> {
    fn default() -> Self {
        Self {
            active: None,
            depth: 0,
            skipping: false,
        }
    }
}

impl<P: Process> PushDriver<P> {
    /// Creates an idle driver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no process is active and no subtree is being skipped.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && !self.skipping
    }

    /// Current element nesting depth of the driven stream.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Delivers one event, creating a process with `factory` if none is
    /// active. Returns the output of a process that completed on this event.
    ///
    /// # Errors
    /// Returns the active process's error; the process is discarded.
    pub fn feed<F>(
        &mut self,
        event: Event,
        factory: F,
    ) -> std::result::Result<Option<P::Output>, P::Error>
    where
        F: FnOnce() -> P,
    {
        match &event {
            Event::Start { .. } => self.depth += 1,
            Event::End => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or(Error::UnbalancedEnd { depth: 0 })?;
            }
            Event::Text(_) => {}
        }

        if self.skipping {
            if self.depth == 0 {
                self.skipping = false;
            }
            return Ok(None);
        }

        let process = self.active.get_or_insert_with(factory);
        match process.feed(event) {
            Ok(Step::Continue) => Ok(None),
            Ok(Step::Done(value)) => {
                self.active = None;
                Ok(Some(value))
            }
            Err(e) => {
                self.active = None;
                self.skipping = self.depth > 0;
                Err(e)
            }
        }
    }

    /// Propagates a close request into the active process.
    pub fn close(&mut self) {
        if let Some(mut process) = self.active.take() {
            process.close();
        }
        self.skipping = false;
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Attributes;
    use crate::process::run;
    use crate::tag::Tag;

    fn start(local: &str) -> Event {
        Event::start(local, Attributes::new())
    }

    /// Counts text fragments of one element and fails on a `boom` child.
    #[derive(Default)]
    struct Probe {
        depth: usize,
        texts: usize,
        fail_on_start: bool,
    }

    impl Process for Probe {
        type Output = usize;
        type Error = Error;

        fn feed(&mut self, event: Event) -> Result<Step<usize>> {
            match event {
                Event::Start { tag, .. } => {
                    if self.fail_on_start || tag == Tag::local("boom") {
                        return Err(Error::xml("boom"));
                    }
                    self.depth += 1;
                }
                Event::Text(_) => self.texts += 1,
                Event::End => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Ok(Step::Done(self.texts));
                    }
                }
            }
            Ok(Step::Continue)
        }
    }

    #[test]
    fn test_drop_consumer_skips_nested_subtree() {
        let mut consumer = DropConsumer::new();
        let events = vec![
            start("a"),
            start("b"),
            Event::text("x"),
            Event::End,
            start("c"),
            Event::End,
            Event::End,
        ];
        let mut iter = events.into_iter();
        for _ in 0..6 {
            let step = consumer.feed(iter.next().unwrap()).unwrap();
            assert_eq!(step, Step::Continue);
        }
        assert_eq!(consumer.feed(iter.next().unwrap()).unwrap(), Step::Done(()));
    }

    #[test]
    fn test_guard_drains_after_inner_error() {
        let mut guard = Guard::new(Probe::default());
        assert_eq!(guard.feed(start("a")).unwrap(), Step::Continue);
        assert_eq!(guard.feed(start("boom")).unwrap(), Step::Continue);
        assert!(guard.is_draining());
        assert_eq!(guard.feed(Event::text("ignored")).unwrap(), Step::Continue);
        assert_eq!(guard.feed(Event::End).unwrap(), Step::Continue);
        assert!(guard.feed(Event::End).is_err());
        assert_eq!(guard.feed(start("late")), Err(Error::Closed));
    }

    #[test]
    fn test_guard_drains_when_start_fails() {
        let mut guard = Guard::new(Probe {
            fail_on_start: true,
            ..Probe::default()
        });
        assert_eq!(guard.feed(start("a")).unwrap(), Step::Continue);
        assert_eq!(guard.feed(start("b")).unwrap(), Step::Continue);
        assert_eq!(guard.feed(Event::End).unwrap(), Step::Continue);
        assert_eq!(guard.feed(Event::End), Err(Error::xml("boom")));
    }

    #[test]
    fn test_guard_passes_output_through() {
        let mut guard = Guard::new(Probe::default());
        let out = run(
            &mut guard,
            vec![start("a"), Event::text("1"), Event::text("2"), Event::End],
        )
        .unwrap();
        assert_eq!(out, 2);
    }

    #[test]
    fn test_capture_relay_keeps_completed_capture() {
        let mut relay = CaptureRelay::new(DropConsumer::new());
        let events = vec![start("a"), Event::text("x"), start("b"), Event::End, Event::End];
        let ((), captured) = run(&mut relay, events.clone()).unwrap();
        assert_eq!(captured, events);
    }

    #[test]
    fn test_capture_relay_clears_on_error() {
        let mut relay = CaptureRelay::new(Probe::default());
        relay.feed(start("a")).unwrap();
        relay.feed(Event::text("x")).unwrap();
        assert_eq!(relay.captured().len(), 2);
        assert!(relay.feed(start("boom")).is_err());
        assert!(relay.captured().is_empty());
    }

    #[test]
    fn test_capture_relay_clears_on_close() {
        let mut relay = CaptureRelay::new(Probe::default());
        relay.feed(start("a")).unwrap();
        relay.close();
        assert!(relay.captured().is_empty());
    }

    #[test]
    fn test_replay_reproduces_events() {
        let events = vec![start("a"), Event::text("x"), Event::End];
        let mut sink: Vec<Event> = Vec::new();
        replay(&events, &mut sink).unwrap();
        assert_eq!(sink, events);
    }

    #[test]
    fn test_push_driver_restarts_per_element() {
        let mut driver: PushDriver<Probe> = PushDriver::new();
        let mut outputs = Vec::new();
        let events = vec![
            start("a"),
            Event::text("x"),
            Event::End,
            start("b"),
            Event::End,
        ];
        for event in events {
            if let Some(out) = driver.feed(event, Probe::default).unwrap() {
                outputs.push(out);
            }
        }
        assert_eq!(outputs, vec![1, 0]);
        assert!(driver.is_idle());
    }

    #[test]
    fn test_push_driver_skips_rest_of_failed_element() {
        let mut driver: PushDriver<Probe> = PushDriver::new();
        driver.feed(start("a"), Probe::default).unwrap();
        assert!(driver.feed(start("boom"), Probe::default).is_err());
        // remainder of <a> is swallowed
        assert_eq!(driver.feed(Event::End, Probe::default).unwrap(), None);
        assert_eq!(driver.feed(Event::End, Probe::default).unwrap(), None);
        assert!(driver.is_idle());
        driver.feed(start("c"), Probe::default).unwrap();
        assert_eq!(driver.feed(Event::End, Probe::default).unwrap(), Some(0));
    }

    #[test]
    fn test_unbalanced_end_is_rejected() {
        let mut consumer = DropConsumer::new();
        assert_eq!(
            consumer.feed(Event::End),
            Err(Error::UnbalancedEnd { depth: 0 })
        );
    }
}
