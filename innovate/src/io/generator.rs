//! Text generator abstraction.
//!
//! The [`Generator`] trait decouples the generate flow from the model backend.
//! The shipped backend, [`CommandGenerator`], pipes the prompt into an external
//! command and reads the reply from its stdout. Tests use scripted generators
//! that return predetermined replies without spawning processes.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::config::GeneratorConfig;
use crate::io::process::run_command;

/// Bytes of stderr quoted in a failure message.
const STDERR_TAIL_BYTES: usize = 2_000;

/// Abstraction over text generation backends.
pub trait Generator {
    /// Return the model's reply to `prompt`.
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator that runs an external command (e.g. `llm`, `ollama run <model>`).
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    pub command: Vec<String>,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

impl CommandGenerator {
    pub fn from_config(cfg: &GeneratorConfig) -> Self {
        Self {
            command: cfg.command.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            output_limit_bytes: cfg.output_limit_bytes,
        }
    }
}

impl Generator for CommandGenerator {
    #[instrument(skip_all, fields(program = ?self.command.first(), timeout_secs = self.timeout.as_secs()))]
    fn generate(&self, prompt: &str) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("generator command must be a non-empty array"))?;
        info!("requesting generation");

        let mut cmd = Command::new(program);
        cmd.args(args);
        let output = run_command(
            cmd,
            Some(prompt.as_bytes()),
            Some(self.timeout),
            self.output_limit_bytes,
        )
        .with_context(|| format!("run generator {program}"))?;

        if output.timed_out {
            warn!("generator timed out");
            return Err(anyhow!("generator timed out after {:?}", self.timeout));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "generator failed");
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "generator exited with status {}: {}",
                output.exit_code_label(),
                tail(stderr.trim(), STDERR_TAIL_BYTES)
            ));
        }
        if output.stdout_truncated > 0 {
            warn!(
                truncated = output.stdout_truncated,
                "generator reply truncated"
            );
        }

        let reply = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = reply.len(), "generation completed");
        Ok(reply)
    }
}

fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_respects_char_boundaries() {
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("aé", 1), "");
    }

    #[cfg(unix)]
    fn generator(command: &[&str]) -> CommandGenerator {
        CommandGenerator {
            command: command.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(10),
            output_limit_bytes: 10_000,
        }
    }

    #[cfg(unix)]
    #[test]
    fn prompt_goes_to_stdin_and_reply_comes_from_stdout() {
        let reply = generator(&["cat"])
            .generate("[CMD] echo hi\n")
            .expect("generate");
        assert_eq!(reply, "[CMD] echo hi\n");
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_status_and_stderr() {
        let err = generator(&["sh", "-c", "cat >/dev/null; echo 'quota exceeded' >&2; exit 3"])
            .generate("prompt")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("status 3"), "{msg}");
        assert!(msg.contains("quota exceeded"), "{msg}");
    }

    #[cfg(unix)]
    #[test]
    fn missing_program_is_an_error() {
        let err = generator(&["innovate-no-such-model-cli"])
            .generate("prompt")
            .unwrap_err();
        assert!(format!("{err:#}").contains("run generator innovate-no-such-model-cli"));
    }

    #[test]
    fn from_config_copies_settings() {
        let cfg = GeneratorConfig::default();
        let generator = CommandGenerator::from_config(&cfg);
        assert_eq!(generator.command, vec!["llm"]);
        assert_eq!(generator.timeout, Duration::from_secs(600));
    }
}
