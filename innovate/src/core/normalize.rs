//! Payload cleanup applied before CREATE/APPEND write to disk.
//!
//! Models usually open a fenced block with a language hint (```` ```python ````),
//! which the parser keeps as the first payload line. That line is dropped when
//! it is exactly one of [`LANGUAGE_HINTS`]; every other line is kept verbatim.

/// First-line tokens treated as a language hint (compared trimmed, ASCII case-insensitive).
pub const LANGUAGE_HINTS: &[&str] = &[
    "python",
    "html",
    "javascript",
    "js",
    "ts",
    "typescript",
    "bash",
    "sh",
    "json",
    "css",
    "tsx",
    "jsx",
    "java",
    "c",
    "cpp",
    "csharp",
    "go",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "sql",
];

/// Footer line appended when the provenance footer policy is on.
///
/// Always a `#` line, whatever the file type. It is a comment in shell or
/// Python but shows up as text in HTML and makes a JSON file invalid.
pub const PROVENANCE_FOOTER: &str = "# Generated by innovate";

/// Normalization policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Append [`PROVENANCE_FOOTER`] after a blank line. Off by default; the
    /// default provenance policy is a credits file in the project folder.
    pub append_provenance_footer: bool,
}

/// Return the content to write for a raw fenced-block payload.
pub fn normalize_block(block: &str, options: NormalizeOptions) -> String {
    let trimmed = block.trim();
    let mut lines = trimmed.lines();
    let body = match lines.next() {
        Some(first) if is_language_hint(first) => lines.collect::<Vec<_>>().join("\n"),
        _ => trimmed.to_string(),
    };

    if options.append_provenance_footer {
        format!("{body}\n\n{PROVENANCE_FOOTER}")
    } else {
        body
    }
}

pub fn is_language_hint(line: &str) -> bool {
    let token = line.trim().to_ascii_lowercase();
    LANGUAGE_HINTS.contains(&token.as_str())
}
