//! Step-language interpreter for model-generated build scripts.
//!
//! A text generator answers a request with a loosely formatted script of
//! bracketed steps (`[CMD]`, `[CD]`, `[CREATE]`, `[APPEND]`, `[EDIT]`). This
//! crate turns that text into typed steps and applies them, one by one, to a
//! project directory. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (grammar, parsing, payload
//!   normalization, run reports). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, shell commands, run log,
//!   text generator). Isolated behind small seams to enable fakes in tests.
//!
//! Orchestration modules ([`execute`], [`generate`]) coordinate core logic with
//! I/O to implement CLI commands.

pub mod core;
pub mod execute;
pub mod exit_codes;
pub mod generate;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
