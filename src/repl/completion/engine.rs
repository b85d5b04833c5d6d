//! Completion engine - orchestrates the completion flow
//!
//! tokenize → skip the program name → walk the tokens → produce candidates
//! for the live token from the command the walk ended on.

use std::sync::Arc;

use tracing::debug;

use super::candidate::{
    CandidateKind, CompletionCandidate, is_short_group, short_char, suffix_after,
};
use super::provider::{GrammarProvider, StaticGrammarProvider};
use super::state::{WalkAbort, WalkMode, WalkState, Walker};
use super::tokenizer::{TokenizedLine, tokenize};
use crate::grammar::Grammar;

/// What a finished line would invoke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Command names from the root down to the invoked command
    pub path: Vec<String>,

    /// Canonical names of the options given, in order
    pub options: Vec<String>,

    /// Positional words
    pub arguments: Vec<String>,
}

/// Main completion engine
#[derive(Clone)]
pub struct CompletionEngine {
    provider: Arc<dyn GrammarProvider>,
    /// Expected first word of every line, if any
    program_name: Option<String>,
}

impl CompletionEngine {
    /// Create a new completion engine
    ///
    /// # Arguments
    /// * `provider` - Grammar queries used by the walk
    pub fn new(provider: Arc<dyn GrammarProvider>) -> Self {
        Self {
            provider,
            program_name: None,
        }
    }

    /// Engine over an in-memory grammar
    pub fn from_grammar(grammar: Arc<Grammar>, use_aliases: bool) -> Self {
        Self::new(Arc::new(StaticGrammarProvider::new(grammar, use_aliases)))
    }

    /// Require every line to start with `name`
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    /// Expected first word, if any
    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }

    /// Grammar queries used by the walk
    pub fn provider(&self) -> &Arc<dyn GrammarProvider> {
        &self.provider
    }

    /// Complete `text`
    ///
    /// # Arguments
    /// * `text` - The whole input line
    /// * `cursor_at_end` - Whether the cursor is at the end of `text`
    ///
    /// # Returns
    /// * `Vec<CompletionCandidate>` - Candidates in order; empty when nothing applies
    pub fn complete(&self, text: &str, cursor_at_end: bool) -> Vec<CompletionCandidate> {
        match self.try_complete(text, cursor_at_end) {
            Ok(candidates) => candidates,
            Err(abort) => {
                debug!("No completions for {:?}: {}", text, abort);
                Vec::new()
            }
        }
    }

    /// Complete the input at a byte cursor position
    ///
    /// # Returns
    /// * `(usize, Vec<CompletionCandidate>)` - Where to insert the suffixes, and the candidates
    pub fn complete_at(&self, line: &str, pos: usize) -> (usize, Vec<CompletionCandidate>) {
        let pos = pos.min(line.len());
        let candidates = self.complete(line, pos == line.len());
        (pos, candidates)
    }

    /// Resolve a finished line to the command it invokes
    pub fn resolve(&self, text: &str) -> Result<Resolution, WalkAbort> {
        let line = tokenize(text, false)?;
        let tokens = match &self.program_name {
            Some(program) => match line.tokens().split_first() {
                Some((first, rest)) if first == program => rest,
                Some((first, _)) => {
                    return Err(WalkAbort::ProgramMismatch {
                        expected: program.clone(),
                        found: first.clone(),
                    });
                }
                None => {
                    return Err(WalkAbort::MissingProgramName {
                        expected: program.clone(),
                    });
                }
            },
            None => line.tokens(),
        };

        let state = Walker::new(self.provider.as_ref(), WalkMode::Resolve).walk(tokens, false)?;
        state.finish()?;

        Ok(Resolution {
            path: self
                .provider
                .path(state.node)
                .into_iter()
                .map(str::to_string)
                .collect(),
            options: state.options_seen.iter().map(|name| name.to_string()).collect(),
            arguments: state.arguments,
        })
    }

    fn try_complete(
        &self,
        text: &str,
        cursor_at_end: bool,
    ) -> Result<Vec<CompletionCandidate>, WalkAbort> {
        let line = tokenize(text, cursor_at_end)?;

        let mut start = 0;
        if let Some(program) = &self.program_name {
            match line.tokens().first() {
                None => return Ok(complete_program_name(program, "")),
                Some(first) if line.is_live(0) => return Ok(complete_program_name(program, first)),
                Some(first) if first == program => start = 1,
                Some(first) => {
                    return Err(WalkAbort::ProgramMismatch {
                        expected: program.clone(),
                        found: first.clone(),
                    });
                }
            }
        }

        let state = Walker::new(self.provider.as_ref(), WalkMode::Complete)
            .walk(&line.tokens()[start..], line.has_live_token())?;
        state.finish()?;

        Ok(self.candidates(&state, &line))
    }

    fn candidates(&self, state: &WalkState<'_>, line: &TokenizedLine) -> Vec<CompletionCandidate> {
        let live = line.live_token();
        let available = self
            .provider
            .options_of(state.node)
            .into_iter()
            .filter(|(_, option)| state.is_available(option));

        if is_short_group(live) {
            if !state.short_continuable {
                return Vec::new();
            }
            return available
                .filter_map(|(name, option)| {
                    short_char(name).map(|flag| {
                        CompletionCandidate::new(flag.to_string(), name, CandidateKind::ShortFlag)
                            .with_description(option.help())
                    })
                })
                .collect();
        }

        let options = available.filter_map(|(name, option)| {
            suffix_after(name, live).map(|suffix| {
                CompletionCandidate::new(suffix, name, CandidateKind::OptionName)
                    .with_description(option.help())
            })
        });
        let subcommands = self
            .provider
            .subcommands_of(state.node)
            .into_iter()
            .filter_map(|name| {
                suffix_after(name, live).map(|suffix| {
                    CompletionCandidate::new(suffix, name, CandidateKind::Subcommand)
                        .with_description(self.provider.describe_subcommand(state.node, name))
                })
            });

        options.chain(subcommands).collect()
    }
}

fn complete_program_name(program: &str, prefix: &str) -> Vec<CompletionCandidate> {
    suffix_after(program, prefix)
        .map(|suffix| CompletionCandidate::new(suffix, program, CandidateKind::ProgramName))
        .into_iter()
        .collect()
}
