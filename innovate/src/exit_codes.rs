//! Stable exit codes for innovate CLI commands.

/// Every step was applied (or was an inert `[EDIT]`).
pub const OK: i32 = 0;
/// Invalid config or input, or the text generator failed. No steps ran.
pub const INVALID: i32 = 1;
/// The sequence ran to the end but at least one step failed.
pub const STEP_FAILURES: i32 = 2;
