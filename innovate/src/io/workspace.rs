//! Project folder creation for the generate flow.
//!
//! Each request gets a fresh folder under the projects directory named
//! `project_<YYYYmmdd_HHMMSS>_<5 lowercase alphanumerics>`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use rand::{Rng, distributions::Alphanumeric};
use tracing::debug;

const SHORT_ID_LEN: usize = 5;

/// Create a new, empty project folder under `base_dir` and return its absolute path.
pub fn create_project_dir(base_dir: &Path, write_credits: bool) -> Result<PathBuf> {
    fs::create_dir_all(base_dir)
        .with_context(|| format!("create projects dir {}", base_dir.display()))?;

    let name = build_project_dir_name(&generate_timestamp(), &generate_short_id());
    let root = base_dir.join(&name);
    if root.exists() {
        bail!("project folder {} already exists", root.display());
    }
    fs::create_dir(&root).with_context(|| format!("create project folder {}", root.display()))?;
    let root = fs::canonicalize(&root)
        .with_context(|| format!("resolve project folder {}", root.display()))?;

    if write_credits {
        write_credits_file(&root)?;
    }

    debug!(project = %root.display(), "created project folder");
    Ok(root)
}

pub fn build_project_dir_name(timestamp: &str, short_id: &str) -> String {
    format!("project_{timestamp}_{short_id}")
}

fn write_credits_file(root: &Path) -> Result<()> {
    let dir = root.join("innovate");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join("credits.txt");
    let contents = format!(
        "Generated by innovate {}\nCreated at: {}\n",
        env!("CARGO_PKG_VERSION"),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn generate_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn generate_short_id() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(SHORT_ID_LEN)
        .collect::<String>()
        .to_lowercase()
}
