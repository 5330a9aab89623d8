//! Planner prompt sent to the text generator.

use anyhow::{Result, bail};
use minijinja::{Environment, context};

const PLANNER_TEMPLATE: &str = include_str!("prompts/planner.md");

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("planner", PLANNER_TEMPLATE)
            .expect("planner template should be valid");
        Self { env }
    }

    fn render_planner(&self, request: &str) -> Result<String> {
        let template = self.env.get_template("planner")?;
        let rendered = template.render(context! { request => request })?;
        Ok(rendered)
    }
}

/// Render the planner prompt: step-format instructions followed by the user's request.
pub fn render_planner_prompt(request: &str) -> Result<String> {
    let request = request.trim();
    if request.is_empty() {
        bail!("request must not be empty");
    }
    PromptEngine::new().render_planner(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_the_request() {
        let prompt = render_planner_prompt("  build a todo app in flask \n").expect("render");
        assert!(prompt.ends_with("User prompt: build a todo app in flask"));
    }

    #[test]
    fn prompt_lists_every_effectful_tag() {
        let prompt = render_planner_prompt("x").expect("render");
        for tag in ["[CMD]", "[CD]", "[CREATE]", "[APPEND]"] {
            assert!(prompt.contains(tag), "missing {tag}");
        }
        assert!(!prompt.contains("[EDIT]"));
        assert!(prompt.contains("```\nfile contents\n```"));
    }

    #[test]
    fn request_is_not_html_escaped() {
        let prompt = render_planner_prompt("print <b>\"hi\"</b> & exit").expect("render");
        assert!(prompt.ends_with("print <b>\"hi\"</b> & exit"));
    }

    #[test]
    fn empty_request_is_rejected() {
        assert!(render_planner_prompt("   ").is_err());
    }
}
