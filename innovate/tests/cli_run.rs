//! CLI tests for `innovate run` and `innovate generate`.
//!
//! Spawns the innovate binary and verifies exit codes and the files and run
//! log it leaves behind.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use innovate::exit_codes;

fn innovate() -> Command {
    Command::new(env!("CARGO_BIN_EXE_innovate"))
}

#[test]
fn run_file_applies_steps_and_writes_log() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("steps.txt"),
        "[CREATE] out/hello.txt:\n```text\nhello\n```\n",
    )
    .expect("write steps");

    let status = innovate()
        .current_dir(temp.path())
        .args(["run", "steps.txt"])
        .status()
        .expect("innovate run");

    assert_eq!(status.code(), Some(exit_codes::OK));
    assert_eq!(
        fs::read_to_string(temp.path().join("out/hello.txt")).expect("read"),
        "text\nhello\n"
    );
    let log = fs::read_to_string(temp.path().join("agent.log")).expect("read log");
    assert!(log.contains("--- Step 1 [CREATE] out/hello.txt:"));
}

#[test]
fn run_reads_stdin_and_reports_failures() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("blocker"), "x").expect("write blocker");
    fs::create_dir(temp.path().join("work")).expect("mkdir work");

    let mut child = innovate()
        .current_dir(temp.path())
        .args(["run", "-", "--dir", "work", "--report"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn innovate");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"[CREATE] ../blocker/x.txt:\n```\nx\n```\n[CREATE] ok.txt:\n```\nok\n```\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait innovate");

    assert_eq!(output.status.code(), Some(exit_codes::STEP_FAILURES));
    assert!(temp.path().join("work/ok.txt").is_file());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["steps"][0]["status"], "failed");
    assert_eq!(report["steps"][1]["status"], "applied");
}

#[test]
fn invalid_config_exits_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("innovate.toml"), "shell = []\n").expect("write config");

    let output = innovate()
        .current_dir(temp.path())
        .args(["run", "missing.txt"])
        .output()
        .expect("innovate run");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("shell must be a non-empty array"));
}

#[test]
fn missing_script_file_exits_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");

    let status = innovate()
        .current_dir(temp.path())
        .args(["run", "nope.txt"])
        .stderr(Stdio::null())
        .status()
        .expect("innovate run");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[cfg(unix)]
#[test]
fn generate_uses_configured_command_and_runs_its_reply() {
    let temp = tempfile::tempdir().expect("tempdir");
    let reply = temp.path().join("reply.txt");
    fs::write(&reply, "[CREATE] index.html:\n```html\n<p>hi</p>\n```\n").expect("write reply");
    fs::write(
        temp.path().join("innovate.toml"),
        format!(
            "write_credits_file = false\n\n[generator]\ncommand = [\"sh\", \"-c\", \"cat >/dev/null; cat '{}'\"]\n",
            reply.display()
        ),
    )
    .expect("write config");

    let output = innovate()
        .current_dir(temp.path())
        .args(["generate", "a", "tiny", "page"])
        .output()
        .expect("innovate generate");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let projects: Vec<_> = fs::read_dir(temp.path().join("projects"))
        .expect("projects dir")
        .map(|entry| entry.expect("entry").path())
        .collect();
    assert_eq!(projects.len(), 1);
    assert_eq!(
        fs::read_to_string(projects[0].join("index.html")).expect("read"),
        "<p>hi</p>\n"
    );
    let log = fs::read_to_string(temp.path().join("agent.log")).expect("read log");
    assert!(log.contains("] Prompt: a tiny page\n"));
}

#[cfg(unix)]
#[test]
fn generate_upstream_failure_exits_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("innovate.toml"),
        "[generator]\ncommand = [\"sh\", \"-c\", \"cat >/dev/null; echo 'no api key' >&2; exit 1\"]\n",
    )
    .expect("write config");

    let output = innovate()
        .current_dir(temp.path())
        .args(["generate", "anything"])
        .output()
        .expect("innovate generate");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("text generation failed"), "{stderr}");
    assert!(stderr.contains("no api key"), "{stderr}");
}
