//! # Pipeline
//!
//! A composite stage that owns an ordered chain of stages and moves items
//! through it with the draining algorithm.
//!
//! ## Construction
//!
//! A [`Buffer`] is appended to the chain unless the last supplied stage
//! already declares `UNBOUNDED_INPUT`, so fully processed items always have
//! somewhere to wait for the caller.
//!
//! ## Draining
//!
//! ```text
//! cursor = len - 1
//! while cursor > 0:
//!     cursor -= 1
//!     if stages[cursor] has output:
//!         stages[cursor + 1].input(stages[cursor].output())
//!         cursor = len - 1          # restart from the tail
//! ```
//!
//! Restarting from the tail after every hand-off drains downstream stages
//! first, so an item never meets a full single-slot stage on its way right.
//! The loop stops at the first sweep that finds nothing to move.
//! Do not turn this into one left-to-right pass: observers on intermediate
//! stages would see a different interleaving.

use crate::{Buffer, PipelineError, Stage, StageFlags, StageState};

/// A chain of stages drained to quiescence after every input.
pub struct Pipeline<T> {
    stages: Vec<Box<dyn Stage<T>>>,
}

impl<T: 'static> Pipeline<T> {
    /// Build a pipeline from an ordered stage list.
    ///
    /// Appends a [`Buffer`] tail unless the last stage declares
    /// `UNBOUNDED_INPUT`. An empty list yields a single buffer.
    #[must_use]
    pub fn new(mut stages: Vec<Box<dyn Stage<T>>>) -> Self {
        let needs_tail = stages
            .last()
            .is_none_or(|last| !last.flags().contains(StageFlags::UNBOUNDED_INPUT));

        if needs_tail {
            stages.push(Box::new(Buffer::new()));
        }

        tracing::debug!(
            stages = stages.len(),
            appended_buffer = needs_tail,
            "pipeline constructed"
        );

        Self { stages }
    }

    /// Start a [`PipelineBuilder`].
    #[must_use]
    pub fn builder() -> PipelineBuilder<T> {
        PipelineBuilder::new()
    }

    /// Number of stages, including an appended buffer.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Flags of every stage, head first.
    #[must_use]
    pub fn stage_flags(&self) -> Vec<StageFlags> {
        self.stages.iter().map(|s| s.flags()).collect()
    }

    /// Kind names of every stage, head first.
    #[must_use]
    pub fn stage_kinds(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Move items rightward until no stage before the tail has output.
    ///
    /// Returns the number of hand-offs performed. Calling this on a
    /// quiescent pipeline performs none and returns 0.
    pub fn drain(&mut self) -> Result<usize, PipelineError> {
        let last = self.last_index();
        let mut cursor = last;
        let mut moved = 0usize;

        while cursor > 0 {
            cursor -= 1;

            if self.stages[cursor].state()?.has_output() {
                let item = self.stages[cursor].output()?;
                self.stages[cursor + 1].input(item)?;
                moved = moved.saturating_add(1);

                tracing::trace!(
                    from = self.stages[cursor].kind(),
                    to = self.stages[cursor + 1].kind(),
                    position = cursor,
                    "item handed off"
                );

                cursor = last;
            }
        }

        if moved > 0 {
            tracing::debug!(moved, "drain reached quiescence");
        }
        Ok(moved)
    }

    /// Check that no stage before the tail holds pullable output.
    pub fn is_quiescent(&self) -> Result<bool, PipelineError> {
        let last = self.last_index();
        for stage in &self.stages[..last] {
            if stage.state()?.has_output() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Lazily pull every item currently available at the tail.
    ///
    /// The iterator ends when the tail runs dry. Iterating again after
    /// further inputs yields the newly available items.
    pub fn outputs(&mut self) -> Outputs<'_, T> {
        Outputs {
            pipeline: self,
            failed: false,
        }
    }

    fn last_index(&self) -> usize {
        self.stages.len() - 1
    }
}

impl<T: 'static> Stage<T> for Pipeline<T> {
    fn input(&mut self, item: T) -> Result<(), PipelineError> {
        self.stages[0].input(item)?;
        self.drain()?;
        Ok(())
    }

    fn output(&mut self) -> Result<T, PipelineError> {
        let last = self.last_index();
        self.stages[last].output()
    }

    fn eof(&mut self) -> Result<(), PipelineError> {
        for stage in &mut self.stages {
            stage.eof()?;
        }
        self.drain()?;
        Ok(())
    }

    fn state(&self) -> Result<StageState, PipelineError> {
        let last = self.last_index();
        let has_output = self.stages[last].state()?.has_output();
        let head = self.stages[0].state()?;

        match StageState::from_parts(has_output, head.can_input()) {
            Some(StageState::CanInput) => {
                for stage in &self.stages {
                    if stage.state()?.is_pending() {
                        return Ok(StageState::CanInputPending);
                    }
                }
                Ok(StageState::CanInput)
            }
            Some(state) => Ok(state),
            None => {
                tracing::warn!(
                    head = self.stages[0].kind(),
                    tail = self.stages[last].kind(),
                    "pipeline stuck: tail empty and head refuses input"
                );
                Err(PipelineError::Deadlock)
            }
        }
    }

    fn flags(&self) -> StageFlags {
        StageFlags::HAS_SUB_PIPELINE
    }

    fn kind(&self) -> &'static str {
        "pipeline"
    }
}

impl<T> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.stages.iter().map(|s| s.kind()).collect();
        f.debug_struct("Pipeline").field("stages", &kinds).finish()
    }
}

// =============================================================================
// OUTPUT ITERATION
// =============================================================================

/// Iterator over the items currently available at a pipeline's tail.
///
/// Yields `Err` once and then ends if the tail misbehaves.
pub struct Outputs<'a, T> {
    pipeline: &'a mut Pipeline<T>,
    failed: bool,
}

impl<T: 'static> Iterator for Outputs<'_, T> {
    type Item = Result<T, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let last = self.pipeline.last_index();
        let tail = &mut self.pipeline.stages[last];
        let result = match tail.state() {
            Ok(state) if state.has_output() => tail.output(),
            Ok(_) => return None,
            Err(e) => Err(e),
        };

        self.failed = result.is_err();
        Some(result)
    }
}

impl<'a, T: 'static> IntoIterator for &'a mut Pipeline<T> {
    type Item = Result<T, PipelineError>;
    type IntoIter = Outputs<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Incremental construction of a [`Pipeline`].
pub struct PipelineBuilder<T> {
    stages: Vec<Box<dyn Stage<T>>>,
}

impl<T: 'static> Default for PipelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> PipelineBuilder<T> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage.
    #[must_use]
    pub fn stage(mut self, stage: impl Stage<T> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append an already boxed stage.
    #[must_use]
    pub fn boxed(mut self, stage: Box<dyn Stage<T>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Finish construction.
    #[must_use]
    pub fn build(self) -> Pipeline<T> {
        Pipeline::new(self.stages)
    }
}

// =============================================================================
// TESTS
// =============================================================================
