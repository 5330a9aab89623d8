//! Step grammar: the instruction kinds a generated step script can contain.
//!
//! Each kind maps to one bracketed tag (`[CMD]`, `[CD]`, ...). Tags are
//! case-sensitive; anything else in square brackets is not a step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Instruction kind, one per recognised tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// `[CMD]`: run the argument through the configured shell.
    RunCommand,
    /// `[CD]`: switch (and create if needed) the working directory.
    ChangeDir,
    /// `[CREATE]`: write the payload to a file, replacing it.
    CreateFile,
    /// `[APPEND]`: append the payload to a file.
    AppendFile,
    /// `[EDIT]`: recognised but has no effect.
    EditFile,
}

impl StepKind {
    pub const ALL: [StepKind; 5] = [
        StepKind::RunCommand,
        StepKind::ChangeDir,
        StepKind::CreateFile,
        StepKind::AppendFile,
        StepKind::EditFile,
    ];

    /// Tag text as it appears between the brackets.
    pub fn tag(self) -> &'static str {
        match self {
            StepKind::RunCommand => "CMD",
            StepKind::ChangeDir => "CD",
            StepKind::CreateFile => "CREATE",
            StepKind::AppendFile => "APPEND",
            StepKind::EditFile => "EDIT",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One parsed instruction. Steps have no identity beyond their position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    /// Rest of the tag line, trimmed. A shell command or a path.
    pub argument: String,
    /// Raw fenced-block body, when one followed the tag line.
    pub payload: Option<String>,
}

impl Step {
    pub fn new(kind: StepKind, argument: impl Into<String>, payload: Option<String>) -> Self {
        Self {
            kind,
            argument: argument.into(),
            payload,
        }
    }

    /// File path named by the argument, without the trailing `:` marker.
    pub fn target_path(&self) -> &str {
        self.argument.trim().trim_end_matches(':').trim_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_tag() {
        for kind in StepKind::ALL {
            assert_eq!(StepKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn from_tag_is_case_sensitive() {
        assert_eq!(StepKind::from_tag("cmd"), None);
        assert_eq!(StepKind::from_tag("Create"), None);
        assert_eq!(StepKind::from_tag("DELETE"), None);
    }

    #[test]
    fn target_path_strips_trailing_colons() {
        let step = Step::new(StepKind::CreateFile, "src/main.py:", None);
        assert_eq!(step.target_path(), "src/main.py");

        let step = Step::new(StepKind::AppendFile, " notes.md :: ", None);
        assert_eq!(step.target_path(), "notes.md");

        let step = Step::new(StepKind::CreateFile, "plain.txt", None);
        assert_eq!(step.target_path(), "plain.txt");
    }
}
