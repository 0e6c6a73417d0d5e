//! # Line Splitter Stage
//!
//! Turns arbitrary text chunks into lines. Complete lines queue up in
//! arrival order; text after the last `\n` is held until more input or
//! `eof()` completes it.

use crate::{PipelineError, Stage, StageFlags, StageState};
use std::collections::VecDeque;

/// Splits incoming chunks on `\n`, dropping a `\r` before each `\n`.
#[derive(Debug, Clone, Default)]
pub struct SplitLines {
    lines: VecDeque<String>,
    partial: String,
}

impl SplitLines {
    /// Create an empty splitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text received after the last line break.
    #[must_use]
    pub fn partial(&self) -> &str {
        &self.partial
    }

    fn push_line(&mut self, mut line: String) {
        if line.ends_with('\r') {
            line.pop();
        }
        self.lines.push_back(line);
    }
}

impl Stage<String> for SplitLines {
    fn input(&mut self, item: String) -> Result<(), PipelineError> {
        let mut rest = item.as_str();
        while let Some(pos) = rest.find('\n') {
            let mut line = std::mem::take(&mut self.partial);
            line.push_str(&rest[..pos]);
            self.push_line(line);
            rest = &rest[pos + 1..];
        }
        self.partial.push_str(rest);
        Ok(())
    }

    fn output(&mut self) -> Result<String, PipelineError> {
        self.lines.pop_front().ok_or_else(PipelineError::output_empty)
    }

    fn eof(&mut self) -> Result<(), PipelineError> {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            tracing::debug!(len = line.len(), "flushing partial line at eof");
            self.push_line(line);
        }
        Ok(())
    }

    fn state(&self) -> Result<StageState, PipelineError> {
        Ok(if !self.lines.is_empty() {
            StageState::HasOutputAndCanInput
        } else if !self.partial.is_empty() {
            StageState::CanInputPending
        } else {
            StageState::CanInput
        })
    }

    fn flags(&self) -> StageFlags {
        StageFlags::UNBOUNDED_INPUT
    }

    fn kind(&self) -> &'static str {
        "split-lines"
    }
}

// =============================================================================
// TESTS
// =============================================================================
