//! Test-only helpers: a scripted text generator and step-script fixtures.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::io::context::ExecutionContext;
use crate::io::generator::Generator;

/// Generator that replays canned replies and records every prompt it was given.
pub struct ScriptedGenerator {
    replies: RefCell<VecDeque<Result<String>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Generator that answers once with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted generator has no replies left")))
    }
}

/// The canonical three-step script: enter `app`, write `main.py`, echo.
pub const EXAMPLE_SCRIPT: &str =
    "[CD] app\n[CREATE] main.py:\n```python\nprint(\"hi\")\n```\n[CMD] echo done\n";

/// Fresh temp directory with an execution context rooted at it.
///
/// Keep the returned `TempDir` alive for as long as the context is used.
pub fn temp_context() -> Result<(tempfile::TempDir, ExecutionContext)> {
    let temp = tempfile::tempdir()?;
    let ctx = ExecutionContext::new(temp.path())?;
    Ok((temp, ctx))
}
