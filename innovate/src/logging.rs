//! Developer tracing for innovate, kept apart from the run log.
//!
//! A CLI run writes two streams to stderr:
//!
//! - **Run log** (`io/run_log`): one `[YYYY-MM-DD HH:MM:SS] message` record per
//!   step event (`--- Step N [KIND] arg`, `Running command: ...`,
//!   `[ERROR] Step N failed: ...`). Records are appended to `log_path`
//!   (`agent.log` in the invocation directory by default) and echoed to stderr
//!   by the binary. This is product output and `RUST_LOG` never filters it.
//!
//! - **Tracing** (this module): events and spans from the `#[instrument]`ed
//!   functions, such as `execute_steps`, `run_command` and the generator.
//!   Filtered by `RUST_LOG`. With the default filter a normal run only adds
//!   warnings, e.g. a step failure or a command killed on timeout. Nothing here
//!   is written to `agent.log`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. Call once, before any step runs.
///
/// # Example
/// ```bash
/// RUST_LOG=innovate::io::process=debug innovate run steps.txt
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .init();
}
