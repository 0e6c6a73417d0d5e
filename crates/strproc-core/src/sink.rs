//! # Sink Stage
//!
//! Terminal stage that swallows every item. An optional observer sees each
//! item before it is dropped (a console printer, a counter, a collector).
//!
//! Only a discarding sink declares `UNBOUNDED_INPUT`; a pipeline ending in an
//! observing sink still gets a trailing buffer.

use crate::{PipelineError, Stage, StageFlags, StageState};
use std::marker::PhantomData;

/// Consumes items and never produces output.
pub struct Sink<T, F = fn(&T)> {
    observer: F,
    flags: StageFlags,
    swallowed: usize,
    _item: PhantomData<fn(T)>,
}

fn ignore<T>(_: &T) {}

impl<T> Sink<T> {
    /// A sink that silently drops every item.
    #[must_use]
    pub fn discard() -> Self {
        Self {
            observer: ignore::<T> as fn(&T),
            flags: StageFlags::NO_OUTPUT | StageFlags::UNBOUNDED_INPUT,
            swallowed: 0,
            _item: PhantomData,
        }
    }
}

impl<T, F: FnMut(&T)> Sink<T, F> {
    /// A sink that calls `observer` for every item it drops.
    #[must_use]
    pub fn with_observer(observer: F) -> Self {
        Self {
            observer,
            flags: StageFlags::NO_OUTPUT,
            swallowed: 0,
            _item: PhantomData,
        }
    }

    /// Number of items consumed so far.
    #[must_use]
    pub fn swallowed(&self) -> usize {
        self.swallowed
    }
}

impl<T, F: FnMut(&T)> Stage<T> for Sink<T, F> {
    fn input(&mut self, item: T) -> Result<(), PipelineError> {
        (self.observer)(&item);
        self.swallowed = self.swallowed.saturating_add(1);
        Ok(())
    }

    fn output(&mut self) -> Result<T, PipelineError> {
        Err(PipelineError::output_empty())
    }

    fn state(&self) -> Result<StageState, PipelineError> {
        Ok(StageState::CanInput)
    }

    fn flags(&self) -> StageFlags {
        self.flags
    }

    fn kind(&self) -> &'static str {
        "sink"
    }
}

impl<T, F> std::fmt::Debug for Sink<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("swallowed", &self.swallowed)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_reports_output() {
        let mut sink = Sink::discard();
        for i in 0..10 {
            sink.input(i).expect("input");
            let state = sink.state().expect("state");
            assert!(!state.has_output());
            assert!(state.can_input());
        }
        assert_eq!(sink.swallowed(), 10);
        assert_eq!(sink.output(), Err(PipelineError::output_empty()));
    }

    #[test]
    fn observer_sees_every_item() {
        let mut total = 0;
        {
            let mut sink = Sink::with_observer(|n: &u32| total += *n);
            sink.input(2).expect("input");
            sink.input(3).expect("input");
        }
        assert_eq!(total, 5);
    }

    #[test]
    fn declares_no_output() {
        let sink: Sink<String> = Sink::discard();
        assert!(sink.flags().contains(StageFlags::NO_OUTPUT));
        assert!(sink.flags().contains(StageFlags::UNBOUNDED_INPUT));
    }

    #[test]
    fn observing_sink_is_not_unbounded() {
        let sink = Sink::with_observer(|_: &String| {});
        assert_eq!(sink.flags(), StageFlags::NO_OUTPUT);
    }
}
