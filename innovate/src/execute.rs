//! Sequential step executor.
//!
//! Steps are applied one at a time, in source order, against an
//! [`ExecutionContext`]. A step that fails is logged and recorded in the
//! [`RunReport`]; the next step runs regardless. The context's current
//! directory is restored to its entry value once the sequence ends.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, instrument, warn};

use crate::core::normalize::{NormalizeOptions, normalize_block};
use crate::core::parser::parse_steps;
use crate::core::report::{RunReport, StepReport, StepStatus};
use crate::core::step::{Step, StepKind};
use crate::io::config::InnovateConfig;
use crate::io::context::ExecutionContext;
use crate::io::process::{run_command, shell_command};
use crate::io::run_log::RunLog;

/// Knobs for applying steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Shell program and leading arguments for `[CMD]`.
    pub shell: Vec<String>,
    /// `None` waits for commands indefinitely.
    pub command_timeout: Option<Duration>,
    pub command_output_limit_bytes: usize,
    pub normalize: NormalizeOptions,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self::from_config(&InnovateConfig::default())
    }
}

impl ExecuteOptions {
    pub fn from_config(cfg: &InnovateConfig) -> Self {
        Self {
            shell: cfg.shell.clone(),
            command_timeout: cfg.command_timeout_secs.map(Duration::from_secs),
            command_output_limit_bytes: cfg.command_output_limit_bytes,
            normalize: NormalizeOptions {
                append_provenance_footer: cfg.append_provenance_footer,
            },
        }
    }
}

/// Parse `text` and execute every step it contains.
pub fn run_step_text(
    text: &str,
    ctx: &mut ExecutionContext,
    log: &mut RunLog,
    options: &ExecuteOptions,
) -> RunReport {
    let parsed = parse_steps(text);
    log.record(format!(
        "Parsed {} steps ({} bytes ignored)",
        parsed.steps.len(),
        parsed.ignored_bytes
    ));
    execute_steps(&parsed.steps, ctx, log, options)
}

/// Apply `steps` in order. Never fails: per-step errors land in the report.
#[instrument(skip_all, fields(steps = steps.len(), root = %ctx.root().display()))]
pub fn execute_steps(
    steps: &[Step],
    ctx: &mut ExecutionContext,
    log: &mut RunLog,
    options: &ExecuteOptions,
) -> RunReport {
    let entry_dir = ctx.current_dir().to_path_buf();
    let mut report = RunReport::default();

    for (offset, step) in steps.iter().enumerate() {
        let index = offset + 1;
        log.record(format!("--- Step {index} [{}] {}", step.kind, step.argument));

        let status = match apply_step(step, ctx, log, options) {
            Ok(Some(detail)) => {
                log.record(detail.clone());
                StepStatus::Applied { detail }
            }
            Ok(None) => {
                log.record(format!("[WARN] Unsupported step type: {}", step.kind));
                StepStatus::Unsupported
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(index, kind = %step.kind, %reason, "step failed");
                log.record(format!("[ERROR] Step {index} failed: {reason}"));
                StepStatus::Failed { reason }
            }
        };

        report.steps.push(StepReport {
            index,
            kind: step.kind,
            argument: step.argument.clone(),
            status,
        });
    }

    ctx.restore(entry_dir);
    info!(
        attempted = report.attempted(),
        failed = report.failures().count(),
        "step sequence finished"
    );
    report
}

/// Apply one step. `Ok(None)` means the kind has no effect.
fn apply_step(
    step: &Step,
    ctx: &mut ExecutionContext,
    log: &mut RunLog,
    options: &ExecuteOptions,
) -> Result<Option<String>> {
    match step.kind {
        StepKind::RunCommand => run_shell_step(&step.argument, ctx.current_dir(), log, options),
        StepKind::ChangeDir => {
            let dir = ctx.change_dir(&step.argument)?;
            Ok(Some(format!("Changed working directory to {}", dir.display())))
        }
        StepKind::CreateFile => {
            let target = require_path(step)?;
            let content = normalized_payload(step, options.normalize);
            create_file(&ctx.resolve(target), &content)?;
            Ok(Some(format!("Created file: {target}")))
        }
        StepKind::AppendFile => {
            let target = require_path(step)?;
            let content = normalized_payload(step, options.normalize);
            append_file(&ctx.resolve(target), &content)?;
            Ok(Some(format!("Appended to file: {target}")))
        }
        StepKind::EditFile => Ok(None),
    }
}

fn normalized_payload(step: &Step, options: NormalizeOptions) -> String {
    normalize_block(step.payload.as_deref().unwrap_or_default(), options)
}

fn require_path(step: &Step) -> Result<&str> {
    let target = step.target_path();
    if target.is_empty() {
        bail!("missing file path for [{}]", step.kind);
    }
    Ok(target)
}

fn run_shell_step(
    command: &str,
    workdir: &Path,
    log: &mut RunLog,
    options: &ExecuteOptions,
) -> Result<Option<String>> {
    if command.trim().is_empty() {
        bail!("missing command");
    }
    log.record(format!("Running command: {command}"));

    let cmd = shell_command(&options.shell, command, workdir)?;
    let output = run_command(
        cmd,
        None,
        options.command_timeout,
        options.command_output_limit_bytes,
    )
    .with_context(|| format!("run `{command}`"))?;

    if let Some(rendered) = output.render("command") {
        log.record(format!("Command output:\n{rendered}"));
    }
    if output.timed_out {
        return Err(anyhow!(
            "command timed out after {:?}",
            options.command_timeout.unwrap_or_default()
        ));
    }
    debug!(exit_code = ?output.status.code(), "command finished");
    Ok(Some(format!(
        "Command exited with code {}",
        output.exit_code_label()
    )))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    Ok(())
}

fn create_file(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, format!("{content}\n")).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn append_file(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    write!(file, "\n{content}\n").with_context(|| format!("append {}", path.display()))?;
    Ok(())
}
