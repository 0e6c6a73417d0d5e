//! # Built-in Transforms
//!
//! Pure item transforms for [`Transit`](crate::Transit) stages.
//!
//! - [`Identity`]: forwards unchanged
//! - [`Uppercase`]: Unicode uppercasing
//! - [`StripControlChars`]: deletes C0 control characters except tab, LF, CR
//! - [`ExpandTabs`]: replaces each tab with a fixed number of spaces
//! - [`Inspect`]: hands each item to an observer, then forwards it
//! - [`Map`]: caller-supplied fallible function

use crate::primitives::{
    C0_CONTROL_COUNT, DEFAULT_SPACES_PER_TAB, KEPT_CONTROL_CHARS, MAX_SPACES_PER_TAB,
};
use crate::{PipelineError, Transform};

// =============================================================================
// IDENTITY
// =============================================================================

/// Forwards every item unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> Transform<T> for Identity {
    fn apply(&mut self, item: T) -> Result<T, PipelineError> {
        Ok(item)
    }

    fn kind(&self) -> &'static str {
        "identity"
    }
}

// =============================================================================
// UPPERCASE
// =============================================================================

/// Uppercases text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl Transform<String> for Uppercase {
    fn apply(&mut self, item: String) -> Result<String, PipelineError> {
        Ok(item.to_uppercase())
    }

    fn kind(&self) -> &'static str {
        "uppercase"
    }
}

// =============================================================================
// STRIP CONTROL CHARS
// =============================================================================

/// Deletes C0 control characters, keeping tab, line feed and carriage return.
///
/// The deletion table is built once per instance.
#[derive(Debug, Clone)]
pub struct StripControlChars {
    delete: [bool; C0_CONTROL_COUNT],
}

impl Default for StripControlChars {
    fn default() -> Self {
        Self::new()
    }
}

impl StripControlChars {
    /// Create a stripper with the standard kept set.
    #[must_use]
    pub fn new() -> Self {
        let mut delete = [true; C0_CONTROL_COUNT];
        for kept in KEPT_CONTROL_CHARS {
            delete[kept as usize] = false;
        }
        Self { delete }
    }

    /// Check if a character is removed by this stripper.
    #[must_use]
    pub fn deletes(&self, c: char) -> bool {
        self.delete.get(c as usize).copied().unwrap_or(false)
    }
}

impl Transform<String> for StripControlChars {
    fn apply(&mut self, item: String) -> Result<String, PipelineError> {
        if !item.chars().any(|c| self.deletes(c)) {
            return Ok(item);
        }
        Ok(item.chars().filter(|c| !self.deletes(*c)).collect())
    }

    fn kind(&self) -> &'static str {
        "strip-control"
    }
}

// =============================================================================
// EXPAND TABS
// =============================================================================

/// Replaces every tab with `spaces` spaces.
///
/// This is plain substitution, not tab-stop alignment.
#[derive(Debug, Clone)]
pub struct ExpandTabs {
    replacement: String,
}

impl Default for ExpandTabs {
    fn default() -> Self {
        Self::new(DEFAULT_SPACES_PER_TAB)
    }
}

impl ExpandTabs {
    /// Create an expander producing `spaces` spaces per tab.
    ///
    /// Widths above `MAX_SPACES_PER_TAB` are clamped to it.
    #[must_use]
    pub fn new(spaces: usize) -> Self {
        Self {
            replacement: " ".repeat(spaces.min(MAX_SPACES_PER_TAB)),
        }
    }

    /// Configured spaces per tab.
    #[must_use]
    pub fn spaces(&self) -> usize {
        self.replacement.len()
    }
}

impl Transform<String> for ExpandTabs {
    fn apply(&mut self, item: String) -> Result<String, PipelineError> {
        if !item.contains('\t') {
            return Ok(item);
        }
        Ok(item.replace('\t', &self.replacement))
    }

    fn kind(&self) -> &'static str {
        "expand-tabs"
    }
}

// =============================================================================
// INSPECT (print-and-forward)
// =============================================================================

/// Hands each item to an observer, then forwards it unchanged.
pub struct Inspect<F> {
    observer: F,
}

impl<F> Inspect<F> {
    /// Create an inspector calling `observer` once per item.
    #[must_use]
    pub fn new(observer: F) -> Self {
        Self { observer }
    }
}

impl<T, F: FnMut(&T)> Transform<T> for Inspect<F> {
    fn apply(&mut self, item: T) -> Result<T, PipelineError> {
        (self.observer)(&item);
        Ok(item)
    }

    fn kind(&self) -> &'static str {
        "print"
    }
}

impl<F> std::fmt::Debug for Inspect<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspect").finish_non_exhaustive()
    }
}

// =============================================================================
// MAP
// =============================================================================

/// Applies a caller-supplied fallible function.
///
/// The function reports items it cannot process with
/// `PipelineError::UnsupportedTransform`; the error reaches the caller of
/// `input()` unchanged.
pub struct Map<F> {
    func: F,
}

impl<F> Map<F> {
    /// Wrap a function.
    #[must_use]
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<T, F: FnMut(T) -> Result<T, PipelineError>> Transform<T> for Map<F> {
    fn apply(&mut self, item: T) -> Result<T, PipelineError> {
        (self.func)(item)
    }

    fn kind(&self) -> &'static str {
        "map"
    }
}

impl<F> std::fmt::Debug for Map<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map").finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
