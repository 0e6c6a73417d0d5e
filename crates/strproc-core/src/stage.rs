//! # Stage Contract
//!
//! Every processing unit, including a whole [`Pipeline`](crate::Pipeline),
//! implements [`Stage`]. Callers consult [`Stage::state`] before moving an
//! item; the contract methods fail with
//! [`PipelineError::Backpressure`] when that check is skipped.

use crate::{PipelineError, StageFlags, StageState};

/// The uniform capability contract of a pipeline stage.
pub trait Stage<T> {
    /// Accept one item for processing.
    ///
    /// Only call when [`Stage::state`] reports `can_input()`.
    fn input(&mut self, item: T) -> Result<(), PipelineError>;

    /// Remove and return one produced item.
    ///
    /// Only call when [`Stage::state`] reports `has_output()`.
    fn output(&mut self) -> Result<T, PipelineError>;

    /// Signal that no more items will be supplied.
    ///
    /// Stages holding partial results flush them here.
    fn eof(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Readiness of the stage. Has no side effects.
    fn state(&self) -> Result<StageState, PipelineError>;

    /// Static capabilities of the stage kind.
    fn flags(&self) -> StageFlags;

    /// Short kind name used in logs and listings.
    fn kind(&self) -> &'static str;
}

impl<T, S: Stage<T> + ?Sized> Stage<T> for Box<S> {
    fn input(&mut self, item: T) -> Result<(), PipelineError> {
        (**self).input(item)
    }

    fn output(&mut self) -> Result<T, PipelineError> {
        (**self).output()
    }

    fn eof(&mut self) -> Result<(), PipelineError> {
        (**self).eof()
    }

    fn state(&self) -> Result<StageState, PipelineError> {
        (**self).state()
    }

    fn flags(&self) -> StageFlags {
        (**self).flags()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}
