//! Working-directory state threaded through a step sequence.
//!
//! The process working directory is never changed. Every path a step names is
//! resolved against [`ExecutionContext::current_dir`] instead, so several
//! sequences can run side by side (or in tests) without touching global state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Root and current directory for one step sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    root: PathBuf,
    current_dir: PathBuf,
}

impl ExecutionContext {
    /// Start at `root`, which must be an existing directory.
    pub fn new(root: &Path) -> Result<Self> {
        let root = fs::canonicalize(root)
            .with_context(|| format!("resolve root directory {}", root.display()))?;
        if !root.is_dir() {
            bail!("root {} is not a directory", root.display());
        }
        Ok(Self {
            current_dir: root.clone(),
            root,
        })
    }

    /// Directory the context was created in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Resolve a step path against the current directory. Absolute paths win.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }

    /// Make `target` the current directory, creating it and any missing parents.
    ///
    /// An existing directory is fine; only a blocked creation (a file in the
    /// way, permissions, an invalid name) is an error.
    pub fn change_dir(&mut self, target: &str) -> Result<&Path> {
        if target.trim().is_empty() {
            bail!("missing directory argument");
        }
        let resolved = self.resolve(target.trim());
        fs::create_dir_all(&resolved)
            .with_context(|| format!("create directory {}", resolved.display()))?;
        let canonical = fs::canonicalize(&resolved)
            .with_context(|| format!("resolve directory {}", resolved.display()))?;
        debug!(from = %self.current_dir.display(), to = %canonical.display(), "changing directory");
        self.current_dir = canonical;
        Ok(&self.current_dir)
    }

    /// Reactivate a directory recorded earlier (e.g. on sequence entry).
    pub fn restore(&mut self, dir: PathBuf) {
        self.current_dir = dir;
    }
}
