//! Completion candidates and their formatting

use serde::Serialize;

/// What a candidate completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// Long or short option name, e.g. `--port`
    OptionName,

    /// Subcommand or alias
    Subcommand,

    /// One more character appended to a short-flag cluster
    ShortFlag,

    /// The program name itself, as the first word
    ProgramName,
}

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionCandidate {
    /// Text to insert at the cursor
    pub suffix: String,

    /// Full name the candidate completes
    pub name: String,

    pub kind: CandidateKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CompletionCandidate {
    pub fn new(suffix: impl Into<String>, name: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            suffix: suffix.into(),
            name: name.into(),
            kind,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    /// Whether accepting this candidate finishes a word
    pub fn ends_word(&self) -> bool {
        self.kind != CandidateKind::ShortFlag
    }
}

/// Remaining text of `name` after `prefix`, or `None` if `name` does not
/// extend `prefix`. Exact matches yield `None` as there is nothing to insert.
pub fn suffix_after<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

/// Character of a `-c` style name, if it is one
pub fn short_char(name: &str) -> Option<char> {
    let rest = name.strip_prefix('-')?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '-' => Some(c),
        _ => None,
    }
}

/// Whether `token` is a short-flag cluster (`-x`, `-xyz` or a lone `-`)
pub fn is_short_group(token: &str) -> bool {
    token.starts_with('-') && !token.starts_with("--")
}
