//! # Buffer Stage
//!
//! Unbounded FIFO queue. Used between stages, as the implicit pipeline tail,
//! or as a terminal accumulator.

use crate::{PipelineError, Stage, StageFlags, StageState};
use std::collections::VecDeque;

/// Unbounded first-in first-out stage.
#[derive(Debug, Clone)]
pub struct Buffer<T> {
    queue: VecDeque<T>,
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<T> Buffer<T> {
    /// Create a new empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Stage<T> for Buffer<T> {
    fn input(&mut self, item: T) -> Result<(), PipelineError> {
        self.queue.push_back(item);
        Ok(())
    }

    fn output(&mut self) -> Result<T, PipelineError> {
        self.queue.pop_front().ok_or_else(PipelineError::output_empty)
    }

    fn state(&self) -> Result<StageState, PipelineError> {
        Ok(if self.queue.is_empty() {
            StageState::CanInput
        } else {
            StageState::HasOutputAndCanInput
        })
    }

    fn flags(&self) -> StageFlags {
        StageFlags::UNBOUNDED_INPUT
    }

    fn kind(&self) -> &'static str {
        "buffer"
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_arrival_order() {
        let mut buffer = Buffer::new();
        for item in ["a", "b", "c"] {
            buffer.input(item).expect("input");
        }

        let drained: Vec<_> = (0..3).map(|_| buffer.output().expect("output")).collect();
        assert_eq!(drained, vec!["a", "b", "c"]);
    }

    #[test]
    fn always_accepts_input() {
        let mut buffer = Buffer::new();
        assert_eq!(buffer.state().expect("state"), StageState::CanInput);

        for i in 0..1000 {
            buffer.input(i).expect("input");
        }
        let state = buffer.state().expect("state");
        assert!(state.has_output());
        assert!(state.can_input());
        assert_eq!(buffer.len(), 1000);
    }

    #[test]
    fn empty_output_is_backpressure() {
        let mut buffer: Buffer<String> = Buffer::new();
        let result = buffer.output();
        assert_eq!(result, Err(PipelineError::output_empty()));
    }

    #[test]
    fn declares_unbounded_input() {
        let buffer: Buffer<u8> = Buffer::new();
        assert_eq!(buffer.flags(), StageFlags::UNBOUNDED_INPUT);
    }
}
