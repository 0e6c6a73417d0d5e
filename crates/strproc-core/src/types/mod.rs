//! # Core Type Definitions
//!
//! This module contains the vocabulary shared by every stage:
//! - Readiness reporting (`StageState`)
//! - Static capability declaration (`StageFlags`)
//! - Error types (`PipelineError`)
//!
//! ## Readiness Guarantees
//!
//! `StageState` has no "neither" value. A stage that can neither produce nor
//! accept is broken, and the only place that condition can arise (a composite
//! pipeline) reports it as [`PipelineError::Deadlock`] instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use thiserror::Error;

// =============================================================================
// STAGE STATE
// =============================================================================

/// Readiness a stage reports after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageState {
    /// An item is ready to be pulled; the stage refuses new input.
    HasOutput,
    /// An item is ready to be pulled and the stage still accepts input.
    HasOutputAndCanInput,
    /// Nothing to pull; the stage accepts input.
    CanInput,
    /// Nothing to pull yet; the stage accepts input and holds a partial
    /// result that further input or `eof()` will complete.
    CanInputPending,
}

impl StageState {
    /// Check if an item can be pulled with `output()`.
    #[must_use]
    pub const fn has_output(self) -> bool {
        matches!(self, Self::HasOutput | Self::HasOutputAndCanInput)
    }

    /// Check if `input()` may be called.
    #[must_use]
    pub const fn can_input(self) -> bool {
        !matches!(self, Self::HasOutput)
    }

    /// Check if the stage is holding an incomplete result.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::CanInputPending)
    }

    /// Combine the two readiness categories into a state.
    ///
    /// Returns `None` for the invalid "neither" combination.
    #[must_use]
    pub const fn from_parts(has_output: bool, can_input: bool) -> Option<Self> {
        match (has_output, can_input) {
            (true, true) => Some(Self::HasOutputAndCanInput),
            (true, false) => Some(Self::HasOutput),
            (false, true) => Some(Self::CanInput),
            (false, false) => None,
        }
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HasOutput => "has-output",
            Self::HasOutputAndCanInput => "has-output+can-input",
            Self::CanInput => "can-input",
            Self::CanInputPending => "can-input (pending)",
        };
        f.write_str(name)
    }
}

// =============================================================================
// STAGE FLAGS
// =============================================================================

/// Static capability set declared by a stage kind.
///
/// Flags describe the kind, not the instance: two stages of the same kind
/// always report the same flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StageFlags(u8);

impl StageFlags {
    /// No capabilities declared.
    pub const NONE: Self = Self(0);
    /// Capacity exactly one; input while full is a backpressure error.
    pub const TRANSIT_SINGLE_ITEM: Self = Self(1);
    /// Unbounded capacity; input never reports backpressure.
    pub const UNBOUNDED_INPUT: Self = Self(1 << 1);
    /// Consumes items and never produces output.
    pub const NO_OUTPUT: Self = Self(1 << 2);
    /// Composite stage wrapping its own pipeline.
    pub const HAS_SUB_PIPELINE: Self = Self(1 << 3);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::TRANSIT_SINGLE_ITEM, "transit-single-item"),
        (Self::UNBOUNDED_INPUT, "unbounded-input"),
        (Self::NO_OUTPUT, "no-output"),
        (Self::HAS_SUB_PIPELINE, "has-sub-pipeline"),
    ];

    /// Union of two flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Kebab-case names of the set flags, in declaration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for StageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for StageFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&self.names().join("|"))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Message carried by a backpressure error raised on a full single-slot stage.
pub const INPUT_FULL_MESSAGE: &str = "item discarded, buffer already full";

/// Message carried by a backpressure error raised on an empty stage.
pub const OUTPUT_EMPTY_MESSAGE: &str = "no output available";

/// Errors that can occur while driving stages.
///
/// - No silent failures and no internal retries
/// - Every error surfaces to the direct caller of the failing operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// `input()` on a full single-slot stage, or `output()` on an empty one.
    #[error("Backpressure: {0}")]
    Backpressure(String),

    /// The pipeline tail has no output and its head cannot accept input.
    #[error("Pipeline deadlock: tail has no output and head cannot accept input")]
    Deadlock,

    /// A transform could not process the given item.
    #[error("Unsupported transform: {0}")]
    UnsupportedTransform(String),

    /// A pipeline description could not be parsed or validated.
    #[error("Invalid pipeline config: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl PipelineError {
    /// Backpressure raised by `input()` on a full stage.
    #[must_use]
    pub fn input_full() -> Self {
        Self::Backpressure(INPUT_FULL_MESSAGE.to_string())
    }

    /// Backpressure raised by `output()` on an empty stage.
    #[must_use]
    pub fn output_empty() -> Self {
        Self::Backpressure(OUTPUT_EMPTY_MESSAGE.to_string())
    }

    /// Check if this is a backpressure error.
    #[must_use]
    pub fn is_backpressure(&self) -> bool {
        matches!(self, Self::Backpressure(_))
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
