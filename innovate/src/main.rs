//! `innovate` command line: run step scripts, or generate and run them.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use innovate::core::report::RunReport;
use innovate::execute::{ExecuteOptions, run_step_text};
use innovate::exit_codes;
use innovate::generate::{GenerationRequest, run_generation};
use innovate::io::config::{InnovateConfig, load_config};
use innovate::io::context::ExecutionContext;
use innovate::io::generator::CommandGenerator;
use innovate::io::run_log::RunLog;
use innovate::logging;

#[derive(Parser)]
#[command(
    name = "innovate",
    version,
    about = "Turn model-generated step scripts into files and commands"
)]
struct Cli {
    /// Config file. A missing file means built-in defaults.
    #[arg(long, global = true, default_value = "innovate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a step script read from FILE, or from stdin when FILE is absent or `-`.
    Run {
        file: Option<PathBuf>,
        /// Directory the steps start in (defaults to the current directory).
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Print the run report as JSON on stdout.
        #[arg(long)]
        report: bool,
    },
    /// Ask the text generator for a step script and run it in a new project folder.
    Generate {
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,
        /// Print the run report as JSON on stdout.
        #[arg(long)]
        report: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("resolve current directory")?;
    let cfg = load_config(&cwd.join(&cli.config))?;
    debug!(config = %cli.config.display(), "config loaded");

    let mut log = RunLog::to_file(cwd.join(&cfg.log_path)).with_echo(true);
    match cli.command {
        Command::Run { file, dir, report } => {
            cmd_run(&cfg, &cwd, file.as_deref(), dir.as_deref(), report, &mut log)
        }
        Command::Generate { request, report } => {
            cmd_generate(&cfg, &cwd, &request.join(" "), report, &mut log)
        }
    }
}

fn cmd_run(
    cfg: &InnovateConfig,
    cwd: &Path,
    file: Option<&Path>,
    dir: Option<&Path>,
    print_report: bool,
    log: &mut RunLog,
) -> Result<i32> {
    let text = read_script(file)?;
    let root = dir.map_or_else(|| cwd.to_path_buf(), |d| cwd.join(d));
    let mut ctx = ExecutionContext::new(&root)?;
    let report = run_step_text(&text, &mut ctx, log, &ExecuteOptions::from_config(cfg));
    finish(&report, print_report, None)
}

fn cmd_generate(
    cfg: &InnovateConfig,
    cwd: &Path,
    request: &str,
    print_report: bool,
    log: &mut RunLog,
) -> Result<i32> {
    let generator = CommandGenerator::from_config(&cfg.generator);
    let outcome = run_generation(
        &generator,
        &GenerationRequest {
            base_dir: cwd,
            request,
            config: cfg,
        },
        log,
    )?;
    finish(&outcome.report, print_report, Some(&outcome.project_dir))
}

fn read_script(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("read step script from stdin")?;
            Ok(text)
        }
    }
}

fn finish(report: &RunReport, print_report: bool, project: Option<&Path>) -> Result<i32> {
    if print_report {
        let mut payload = serde_json::to_string_pretty(report).context("serialize report")?;
        payload.push('\n');
        print!("{payload}");
    } else {
        if let Some(project) = project {
            println!("project: {}", project.display());
        }
        println!(
            "steps: attempted={} failed={}",
            report.attempted(),
            report.failures().count()
        );
    }
    Ok(if report.is_success() {
        exit_codes::OK
    } else {
        exit_codes::STEP_FAILURES
    })
}
