//! # Stage Primitives
//!
//! Fixed constants shared by the built-in stages and the config layer.

/// Spaces substituted for each tab when no width is configured.
pub const DEFAULT_SPACES_PER_TAB: usize = 4;

/// Largest accepted tab width.
pub const MAX_SPACES_PER_TAB: usize = 64;

/// C0 control characters that survive control-character stripping.
pub const KEPT_CONTROL_CHARS: [char; 3] = ['\t', '\n', '\r'];

/// Number of code points in the C0 control block (`U+0000..U+001F`).
pub const C0_CONTROL_COUNT: usize = 32;

/// Maximum depth of nested pipelines in a config.
pub const MAX_NESTING_DEPTH: usize = 16;

/// Prefix used by print stages when none is configured.
pub const DEFAULT_PRINT_PREFIX: &str = "print: ";
