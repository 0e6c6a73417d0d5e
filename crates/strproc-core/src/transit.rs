//! # Transit Stage
//!
//! A single-slot stage. Each accepted item is passed through a
//! [`Transform`] and parked until the next `output()` call.
//!
//! | Slot | `state()` | `input()` | `output()` |
//! |------|-----------|-----------|------------|
//! | empty | `CanInput` | stores `transform(x)` | `Backpressure` |
//! | full | `HasOutput` | `Backpressure`, slot untouched | returns and clears |

use crate::{PipelineError, Stage, StageFlags, StageState};

/// An item-to-item transformation run by a [`Transit`] stage.
pub trait Transform<T> {
    /// Transform one item.
    ///
    /// Returns `PipelineError::UnsupportedTransform` for items the transform
    /// cannot handle.
    fn apply(&mut self, item: T) -> Result<T, PipelineError>;

    /// Short kind name used in logs and listings.
    fn kind(&self) -> &'static str;
}

/// Single-slot stage applying a [`Transform`] on input.
#[derive(Debug, Clone)]
pub struct Transit<T, X> {
    slot: Option<T>,
    transform: X,
}

impl<T, X: Transform<T>> Transit<T, X> {
    /// Create an empty stage around a transform.
    #[must_use]
    pub fn new(transform: X) -> Self {
        Self {
            slot: None,
            transform,
        }
    }

    /// Access the transform.
    #[must_use]
    pub fn transform(&self) -> &X {
        &self.transform
    }

    /// Check if the slot holds an item.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slot.is_some()
    }

    /// Peek at the held item without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref()
    }
}

impl<T, X: Transform<T>> Stage<T> for Transit<T, X> {
    fn input(&mut self, item: T) -> Result<(), PipelineError> {
        if self.slot.is_some() {
            tracing::warn!(kind = self.transform.kind(), "input refused: slot occupied");
            return Err(PipelineError::input_full());
        }
        self.slot = Some(self.transform.apply(item)?);
        Ok(())
    }

    fn output(&mut self) -> Result<T, PipelineError> {
        self.slot.take().ok_or_else(PipelineError::output_empty)
    }

    fn state(&self) -> Result<StageState, PipelineError> {
        Ok(if self.slot.is_some() {
            StageState::HasOutput
        } else {
            StageState::CanInput
        })
    }

    fn flags(&self) -> StageFlags {
        StageFlags::TRANSIT_SINGLE_ITEM
    }

    fn kind(&self) -> &'static str {
        self.transform.kind()
    }
}

// =============================================================================
// TESTS
// =============================================================================
