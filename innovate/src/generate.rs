//! The generate flow: request to prompt, prompt to step script, script to files.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::core::report::RunReport;
use crate::execute::{ExecuteOptions, run_step_text};
use crate::io::config::InnovateConfig;
use crate::io::context::ExecutionContext;
use crate::io::generator::Generator;
use crate::io::prompt::render_planner_prompt;
use crate::io::run_log::RunLog;
use crate::io::workspace::create_project_dir;

/// Inputs for one generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    /// Directory the projects folder is resolved against.
    pub base_dir: &'a Path,
    pub request: &'a str,
    pub config: &'a InnovateConfig,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub project_dir: PathBuf,
    pub report: RunReport,
}

/// The text generator could not produce a reply. No steps were run.
///
/// Returned inside `anyhow::Error`; find it with `downcast_ref`.
#[derive(Debug)]
pub struct UpstreamError {
    source: anyhow::Error,
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text generation failed: {:#}", self.source)
    }
}

impl Error for UpstreamError {}

/// Create a project folder, ask `generator` for a step script, and run it there.
#[instrument(skip_all, fields(base_dir = %request.base_dir.display()))]
pub fn run_generation<G: Generator>(
    generator: &G,
    request: &GenerationRequest<'_>,
    log: &mut RunLog,
) -> Result<GenerationOutcome> {
    log.record(format!("Prompt: {}", request.request));
    let prompt = render_planner_prompt(request.request)?;

    let projects_dir = request.base_dir.join(&request.config.projects_dir);
    let project_dir = create_project_dir(&projects_dir, request.config.write_credits_file)
        .context("create project folder")?;
    log.record(format!("Working in project folder: {}", project_dir.display()));

    let raw = match generator.generate(&prompt) {
        Ok(raw) => raw,
        Err(source) => {
            let err = UpstreamError { source };
            log.record(format!("[ERROR] {err}"));
            return Err(err.into());
        }
    };
    log.record(format!("Generated Raw Output:\n{raw}"));

    let mut ctx = ExecutionContext::new(&project_dir)?;
    let options = ExecuteOptions::from_config(request.config);
    let report = run_step_text(&raw, &mut ctx, log, &options);
    info!(
        project = %project_dir.display(),
        steps = report.attempted(),
        success = report.is_success(),
        "generation finished"
    );

    Ok(GenerationOutcome {
        project_dir,
        report,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::anyhow;

    use super::*;
    use crate::test_support::ScriptedGenerator;

    fn config() -> InnovateConfig {
        InnovateConfig {
            write_credits_file: false,
            ..InnovateConfig::default()
        }
    }

    #[test]
    fn runs_generated_steps_inside_new_project_folder() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::replying(
            "Sure!\n[CD] site\n[CREATE] index.html:\n```html\n<h1>Hi</h1>\n```\n",
        );
        let cfg = config();
        let request = GenerationRequest {
            base_dir: temp.path(),
            request: "make a landing page",
            config: &cfg,
        };
        let mut log = RunLog::in_memory();

        let outcome = run_generation(&generator, &request, &mut log).expect("generate");

        assert!(outcome.report.is_success());
        assert_eq!(outcome.report.attempted(), 2);
        assert!(outcome.project_dir.starts_with(
            fs::canonicalize(temp.path().join("projects")).expect("canonicalize")
        ));
        assert_eq!(
            fs::read_to_string(outcome.project_dir.join("site/index.html")).expect("read"),
            "<h1>Hi</h1>\n"
        );

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("User prompt: make a landing page"));

        let messages = log.messages();
        assert_eq!(messages[0], "Prompt: make a landing page");
        assert!(messages[1].starts_with("Working in project folder: "));
        assert!(messages[2].starts_with("Generated Raw Output:\nSure!"));
        assert_eq!(messages[3], "Parsed 2 steps (7 bytes ignored)");
    }

    #[test]
    fn upstream_failure_runs_no_steps() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::new(vec![Err(anyhow!("rate limited"))]);
        let cfg = config();
        let request = GenerationRequest {
            base_dir: temp.path(),
            request: "anything",
            config: &cfg,
        };
        let mut log = RunLog::in_memory();

        let err = run_generation(&generator, &request, &mut log).unwrap_err();

        let upstream = err.downcast_ref::<UpstreamError>().expect("upstream error");
        assert_eq!(upstream.to_string(), "text generation failed: rate limited");
        assert!(
            log.messages()
                .last()
                .is_some_and(|m| m.starts_with("[ERROR] text generation failed"))
        );
        assert!(!log.messages().iter().any(|m| m.starts_with("--- Step")));
    }

    #[test]
    fn credits_file_is_written_by_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::replying("");
        let cfg = InnovateConfig::default();
        let request = GenerationRequest {
            base_dir: temp.path(),
            request: "nothing",
            config: &cfg,
        };
        let mut log = RunLog::in_memory();

        let outcome = run_generation(&generator, &request, &mut log).expect("generate");

        assert!(outcome.project_dir.join("innovate/credits.txt").is_file());
        assert_eq!(outcome.report.attempted(), 0);
    }

    #[test]
    fn empty_request_is_rejected_before_any_folder_is_made() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::new(Vec::new());
        let cfg = config();
        let request = GenerationRequest {
            base_dir: temp.path(),
            request: "  ",
            config: &cfg,
        };
        let mut log = RunLog::in_memory();

        assert!(run_generation(&generator, &request, &mut log).is_err());
        assert!(!temp.path().join("projects").exists());
        assert!(generator.prompts().is_empty());
    }
}
