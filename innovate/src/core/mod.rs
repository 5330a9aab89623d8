//! Deterministic, pure logic for the step language.
//!
//! Core modules must be free of I/O side effects. They turn model output into
//! typed steps and describe outcomes, returning deterministic values suitable
//! for tests.

pub mod normalize;
pub mod parser;
pub mod report;
pub mod step;
