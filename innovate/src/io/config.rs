//! Innovate configuration, read from `innovate.toml` when present.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// Innovate configuration (TOML).
///
/// Every field is optional in the file; missing fields fall back to the
/// defaults below, and a missing file is the same as an empty one.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InnovateConfig {
    /// Run log file, resolved against the invocation directory.
    pub log_path: String,

    /// Parent directory for generated project folders.
    pub projects_dir: String,

    /// Shell used for `[CMD]` steps; the command text is passed as the last argument.
    pub shell: Vec<String>,

    /// Kill a `[CMD]` step after this many seconds. Unset means wait indefinitely.
    pub command_timeout_secs: Option<u64>,

    /// Truncate captured `[CMD]` stdout/stderr beyond this many bytes.
    pub command_output_limit_bytes: usize,

    /// Append a provenance footer to every file written by CREATE/APPEND.
    pub append_provenance_footer: bool,

    /// Write `innovate/credits.txt` into each new project folder.
    pub write_credits_file: bool,

    pub generator: GeneratorConfig,
}

/// External text-generation command.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program and arguments. The prompt is written to its stdin; stdout is the reply.
    pub command: Vec<String>,

    pub timeout_secs: u64,

    pub output_limit_bytes: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: vec!["llm".to_string()],
            timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl Default for InnovateConfig {
    fn default() -> Self {
        Self {
            log_path: "agent.log".to_string(),
            projects_dir: "projects".to_string(),
            shell: default_shell(),
            command_timeout_secs: None,
            command_output_limit_bytes: 100_000,
            append_provenance_footer: false,
            write_credits_file: true,
            generator: GeneratorConfig::default(),
        }
    }
}

#[cfg(windows)]
fn default_shell() -> Vec<String> {
    vec!["cmd".to_string(), "/C".to_string()]
}

#[cfg(not(windows))]
fn default_shell() -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string()]
}

impl InnovateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_path.trim().is_empty() {
            return Err(anyhow!("log_path must not be empty"));
        }
        if self.projects_dir.trim().is_empty() {
            return Err(anyhow!("projects_dir must not be empty"));
        }
        if self.shell.is_empty() || self.shell[0].trim().is_empty() {
            return Err(anyhow!("shell must be a non-empty array"));
        }
        if self.command_timeout_secs == Some(0) {
            return Err(anyhow!("command_timeout_secs must be > 0 when set"));
        }
        if self.command_output_limit_bytes == 0 {
            return Err(anyhow!("command_output_limit_bytes must be > 0"));
        }
        if self.generator.command.is_empty() || self.generator.command[0].trim().is_empty() {
            return Err(anyhow!("generator.command must be a non-empty array"));
        }
        if self.generator.timeout_secs == 0 {
            return Err(anyhow!("generator.timeout_secs must be > 0"));
        }
        if self.generator.output_limit_bytes == 0 {
            return Err(anyhow!("generator.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `InnovateConfig::default()`.
pub fn load_config(path: &Path) -> Result<InnovateConfig> {
    if !path.exists() {
        let cfg = InnovateConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: InnovateConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
