//! Hinter for reedline - inline hints from history, then from the grammar

use nu_ansi_term::{Color, Style};
use reedline::{Hinter, History, SearchQuery};

use super::completion::CompletionEngine;

/// Shows the rest of the newest matching history entry, or the only
/// possible completion when history has nothing
pub struct CmdtreeHinter {
    engine: CompletionEngine,
    style: Style,
    current_hint: String,
}

impl CmdtreeHinter {
    /// Create a new hinter
    ///
    /// # Arguments
    /// * `engine` - Engine used when history has no match
    pub fn new(engine: CompletionEngine) -> Self {
        Self {
            engine,
            style: Style::new().italic().fg(Color::DarkGray),
            current_hint: String::new(),
        }
    }

    fn history_hint(line: &str, history: &dyn History) -> Option<String> {
        let item = history
            .search(SearchQuery::last_with_prefix(line.to_string(), None))
            .ok()?
            .into_iter()
            .next()?;
        item.command_line
            .strip_prefix(line)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }

    fn grammar_hint(&self, line: &str) -> Option<String> {
        let mut candidates = self.engine.complete(line, true);
        if candidates.len() != 1 {
            return None;
        }
        candidates.pop().map(|candidate| candidate.suffix)
    }
}

impl Hinter for CmdtreeHinter {
    fn handle(
        &mut self,
        line: &str,
        pos: usize,
        history: &dyn History,
        use_ansi_coloring: bool,
        _cwd: &str,
    ) -> String {
        self.current_hint.clear();

        if pos != line.len() || line.trim().is_empty() {
            return String::new();
        }

        let Some(hint) = Self::history_hint(line, history).or_else(|| self.grammar_hint(line))
        else {
            return String::new();
        };
        self.current_hint = hint;

        if use_ansi_coloring {
            self.style.paint(self.current_hint.as_str()).to_string()
        } else {
            self.current_hint.clone()
        }
    }

    /// Leading whitespace plus the first word of the hint
    fn next_hint_token(&self) -> String {
        let trimmed = self.current_hint.trim_start();
        let leading = self.current_hint.len() - trimmed.len();
        let word = trimmed.split_whitespace().next().unwrap_or_default();
        self.current_hint[..leading + word.len()].to_string()
    }

    fn complete_hint(&self) -> String {
        self.current_hint.clone()
    }
}
