//! Prompt for the interactive completion shell

use std::borrow::Cow;

use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, PromptViMode,
};

/// Shows the grammar's root command, e.g. `myapp> `
pub struct CmdtreePrompt {
    name: String,
}

impl CmdtreePrompt {
    /// Create a new prompt
    ///
    /// # Arguments
    /// * `name` - Root command name shown before the indicator
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Prompt for CmdtreePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    /// `> ` in emacs mode; vi normal mode shows `: `
    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<'_, str> {
        match prompt_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => ": ".into(),
            _ => "> ".into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({prefix}search: {}) ", history_search.term).into()
    }
}
