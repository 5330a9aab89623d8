//! I/O helpers for running step scripts.

pub mod config;
pub mod context;
pub mod generator;
pub mod process;
pub mod prompt;
pub mod run_log;
pub mod workspace;
