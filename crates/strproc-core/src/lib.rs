//! # strproc-core
//!
//! The stream-transform engine for strproc - THE LOGIC.
//!
//! A [`Pipeline`] chains [`Stage`]s. Every stage reports its readiness through
//! [`StageState`] and declares its capacity class through [`StageFlags`];
//! the pipeline moves items head to tail, draining downstream stages first,
//! until nothing more can move.
//!
//! ## Stage Kinds
//!
//! - [`Transit`]: one slot, runs a [`Transform`] on input
//! - [`Buffer`]: unbounded FIFO
//! - [`Sink`]: swallows items, optionally reporting them to an observer
//! - [`SplitLines`]: chunk-to-line splitter holding partial lines until `eof()`
//! - [`Pipeline`]: a whole chain, usable as a stage in another chain
//!
//! ## Example
//!
//! ```
//! use strproc_core::transform::{ExpandTabs, StripControlChars, Uppercase};
//! use strproc_core::{Pipeline, Stage, Transit};
//!
//! let mut pipeline = Pipeline::builder()
//!     .stage(Transit::new(StripControlChars::new()))
//!     .stage(Transit::new(ExpandTabs::new(8)))
//!     .stage(Transit::new(Uppercase))
//!     .build();
//!
//! pipeline.input("Hello\x01\tworld\x03".to_string())?;
//! assert_eq!(pipeline.output()?, "HELLO        WORLD");
//! # Ok::<(), strproc_core::PipelineError>(())
//! ```
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous: every call drains to quiescence before
//!   returning
//! - No shared mutable state between pipelines
//! - Side effects only through caller-supplied observers

// =============================================================================
// MODULES
// =============================================================================

pub mod buffer;
pub mod config;
pub mod pipeline;
pub mod primitives;
pub mod sink;
pub mod split;
pub mod stage;
pub mod transform;
pub mod transit;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{PipelineError, StageFlags, StageState};

// =============================================================================
// RE-EXPORTS: Stages
// =============================================================================

pub use buffer::Buffer;
pub use pipeline::{Outputs, Pipeline, PipelineBuilder};
pub use sink::Sink;
pub use split::SplitLines;
pub use stage::Stage;
pub use transit::{Transform, Transit};

// =============================================================================
// RE-EXPORTS: Config
// =============================================================================

pub use config::{Observer, PipelineConfig, STAGE_KINDS, StageSpec};
