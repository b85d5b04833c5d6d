//! Completer for reedline - provides completion suggestions

use reedline::{Completer, Span, Suggestion};

use super::completion::{CompletionCandidate, CompletionEngine};

/// Grammar-driven completer for reedline
pub struct CmdtreeCompleter {
    engine: CompletionEngine,
    /// Attach option and subcommand help to suggestions
    show_descriptions: bool,
}

impl CmdtreeCompleter {
    /// Create a new completer
    ///
    /// # Arguments
    /// * `engine` - Completion engine for the loaded grammar
    /// * `show_descriptions` - Whether suggestions carry help text
    pub fn new(engine: CompletionEngine, show_descriptions: bool) -> Self {
        Self {
            engine,
            show_descriptions,
        }
    }

    fn suggestion(&self, candidate: CompletionCandidate, at: usize) -> Suggestion {
        let description = match (&candidate.description, self.show_descriptions) {
            (Some(help), true) => Some(format!("{}  {help}", candidate.name)),
            (None, true) => Some(candidate.name.clone()),
            (_, false) => None,
        };

        Suggestion {
            append_whitespace: candidate.ends_word(),
            value: candidate.suffix,
            description,
            span: Span::new(at, at),
            ..Default::default()
        }
    }
}

impl Completer for CmdtreeCompleter {
    /// Suggestions insert the missing suffix at the cursor
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let (at, candidates) = self.engine.complete_at(line, pos);
        candidates
            .into_iter()
            .map(|candidate| self.suggestion(candidate, at))
            .collect()
    }
}
