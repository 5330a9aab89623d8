//! Helpers for running child processes with bounded output and an optional timeout.
//!
//! stdout and stderr go to anonymous temp files rather than pipes. A command is
//! finished as soon as the spawned process exits, even when it leaves
//! background descendants behind that still hold those files open.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn stdout_truncated_notice(&self, label: &str) -> String {
        if self.stdout_truncated > 0 {
            format!(
                "\n[{label} stdout truncated {} bytes]\n",
                self.stdout_truncated
            )
        } else {
            String::new()
        }
    }

    pub fn stderr_truncated_notice(&self, label: &str) -> String {
        if self.stderr_truncated > 0 {
            format!(
                "\n[{label} stderr truncated {} bytes]\n",
                self.stderr_truncated
            )
        } else {
            String::new()
        }
    }

    /// Exit code as text; `signal` when the process was killed by one.
    pub fn exit_code_label(&self) -> String {
        self.status
            .code()
            .map_or_else(|| "signal".to_string(), |code| code.to_string())
    }

    /// Render stdout/stderr for a log, or `None` when both are empty.
    pub fn render(&self, label: &str) -> Option<String> {
        if self.stdout.is_empty() && self.stderr.is_empty() {
            return None;
        }
        let mut buf = String::new();
        if !self.stdout.is_empty() {
            buf.push_str("=== stdout ===\n");
            buf.push_str(String::from_utf8_lossy(&self.stdout).trim_end());
            buf.push_str(&self.stdout_truncated_notice(label));
        }
        if !self.stderr.is_empty() {
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str("=== stderr ===\n");
            buf.push_str(String::from_utf8_lossy(&self.stderr).trim_end());
            buf.push_str(&self.stderr_truncated_notice(label));
        }
        Some(buf.trim_end().to_string())
    }
}

/// Build a command that runs `script` through `shell` (e.g. `["sh", "-c"]`) in `workdir`.
pub fn shell_command(shell: &[String], script: &str, workdir: &Path) -> Result<Command> {
    let (program, args) = shell
        .split_first()
        .ok_or_else(|| anyhow!("shell must be a non-empty array"))?;
    let mut cmd = Command::new(program);
    cmd.args(args).arg(script).current_dir(workdir);
    Ok(cmd)
}

/// Run a command and capture stdout/stderr.
///
/// Returns once the spawned process exits; descendants it started in the
/// background are not waited for. `output_limit_bytes` bounds the amount of
/// stdout/stderr kept in memory. With `timeout: None` this blocks until the
/// process exits. With a timeout the process runs in its own process group,
/// and the whole group is killed when the timeout fires.
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs()), output_limit_bytes))]
pub fn run_command(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    let mut stdout_file = tempfile::tempfile().context("create stdout capture file")?;
    let mut stderr_file = tempfile::tempfile().context("create stderr capture file")?;
    cmd.stdout(Stdio::from(
        stdout_file.try_clone().context("share stdout capture file")?,
    ))
    .stderr(Stdio::from(
        stderr_file.try_clone().context("share stderr capture file")?,
    ));
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    if timeout.is_some() {
        isolate_process_group(&mut cmd);
    }

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    if let Some(input) = stdin {
        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        let input = input.to_vec();
        // Detached: a child that never reads its input must not stall the wait below.
        thread::spawn(move || {
            if let Err(e) = child_stdin.write_all(&input) {
                warn!(err = %e, "failed to write child stdin");
            }
        });
    }

    let mut timed_out = false;
    let status = match timeout {
        None => child.wait().context("wait for command")?,
        Some(limit) => match child.wait_timeout(limit).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
                timed_out = true;
                kill_process_group(&mut child)?;
                child.wait().context("wait command after kill")?
            }
        },
    };

    let (stdout, stdout_truncated) =
        read_captured(&mut stdout_file, output_limit_bytes).context("read stdout")?;
    let (stderr, stderr_truncated) =
        read_captured(&mut stderr_file, output_limit_bytes).context("read stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

#[cfg(unix)]
fn isolate_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_cmd: &mut Command) {}

/// Kill the child and everything in its process group.
///
/// Falls back to killing only the child when the group kill is unavailable.
fn kill_process_group(child: &mut Child) -> Result<()> {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        match Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => warn!(exit_code = ?status.code(), "process group kill failed"),
            Err(e) => warn!(err = %e, "could not run kill for process group"),
        }
    }
    child.kill().context("kill command")
}

/// Read a capture file from the start. Bytes a background process appends later are not seen.
fn read_captured(file: &mut File, limit: usize) -> Result<(Vec<u8>, usize)> {
    file.seek(SeekFrom::Start(0)).context("rewind capture file")?;
    read_stream_limited(file, limit)
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
