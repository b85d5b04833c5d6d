//! Token walk state machine
//!
//! Tokens are classified left to right against the command reached so far:
//! pending option values are skipped, `--long` and `-xyz` tokens are matched
//! against the command's options, and exact subcommand names descend into
//! the child. Anything that cannot be classified ends the walk with a
//! [`WalkAbort`], unless it is the live token, which may still be edited.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

use super::candidate::is_short_group;
use super::provider::GrammarProvider;
use crate::error::TokenizeError;
use crate::grammar::{NodeId, OptionDescriptor, OptionId};

/// Reason a walk stopped without a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkAbort {
    /// Unterminated quote or escape
    Tokenize(TokenizeError),

    /// The line is empty but a program name was expected first
    MissingProgramName { expected: String },

    /// The first word is not the program name
    ProgramMismatch { expected: String, found: String },

    /// `--name` (or `--name=value`) that the command does not accept
    UnknownOption { token: String },

    /// Character of a short cluster that the command does not accept
    UnknownShortFlag { token: String, flag: char },

    /// Word that is neither an option, a value nor a subcommand
    UnexpectedArgument { token: String },

    /// The line ended while an option still expected values
    MissingValues { option: String, remaining: usize },
}

impl fmt::Display for WalkAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkAbort::Tokenize(e) => write!(f, "{e}"),
            WalkAbort::MissingProgramName { expected } => {
                write!(f, "expected '{expected}' as the first word")
            }
            WalkAbort::ProgramMismatch { expected, found } => {
                write!(f, "expected '{expected}' as the first word, found '{found}'")
            }
            WalkAbort::UnknownOption { token } => write!(f, "no such option: {token}"),
            WalkAbort::UnknownShortFlag { token, flag } => {
                write!(f, "no such option: -{flag} (in '{token}')")
            }
            WalkAbort::UnexpectedArgument { token } => {
                write!(f, "unexpected argument '{token}'")
            }
            WalkAbort::MissingValues { option, remaining } => {
                write!(f, "option '{option}' expects {remaining} more value(s)")
            }
        }
    }
}

impl std::error::Error for WalkAbort {}

impl From<TokenizeError> for WalkAbort {
    fn from(err: TokenizeError) -> Self {
        WalkAbort::Tokenize(err)
    }
}

/// How unclassifiable positional words are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkMode {
    /// Completing a partial line: positional words abort
    Complete,

    /// Resolving a finished line: positional words of leaf commands are collected
    Resolve,
}

/// State reached after classifying every token
#[derive(Debug, Clone)]
pub(crate) struct WalkState<'p> {
    /// Command reached so far
    pub node: NodeId,

    /// Single-use options already given in the current command scope
    pub used: HashSet<OptionId>,

    /// Value tokens still owed to the last option
    pub pending_values: usize,

    /// Option owed those values
    pub pending_option: Option<&'p str>,

    /// Whether the last token was a cluster of zero-arity short flags
    pub short_continuable: bool,

    /// Canonical names of the options given, in order
    pub options_seen: Vec<&'p str>,

    /// Positional words collected in resolve mode
    pub arguments: Vec<String>,
}

impl WalkState<'_> {
    /// Fail if the line ended while values were still owed
    pub fn finish(&self) -> Result<(), WalkAbort> {
        if self.pending_values > 0 {
            return Err(WalkAbort::MissingValues {
                option: self.pending_option.unwrap_or_default().to_string(),
                remaining: self.pending_values,
            });
        }
        Ok(())
    }

    /// Whether an option may still be offered
    pub fn is_available(&self, option: &OptionDescriptor) -> bool {
        !self.used.contains(&option.id())
    }
}

/// Classifies tokens one at a time
pub(crate) struct Walker<'p> {
    provider: &'p dyn GrammarProvider,
    mode: WalkMode,
    state: WalkState<'p>,
}

impl<'p> Walker<'p> {
    pub fn new(provider: &'p dyn GrammarProvider, mode: WalkMode) -> Self {
        Self {
            provider,
            mode,
            state: WalkState {
                node: provider.root(),
                used: HashSet::new(),
                pending_values: 0,
                pending_option: None,
                short_continuable: false,
                options_seen: Vec::new(),
                arguments: Vec::new(),
            },
        }
    }

    /// Walk `tokens`; when `last_is_live` the final token is the one being typed
    pub fn walk(
        mut self,
        tokens: &[String],
        last_is_live: bool,
    ) -> Result<WalkState<'p>, WalkAbort> {
        for (index, token) in tokens.iter().enumerate() {
            let live = last_is_live && index + 1 == tokens.len();
            self.step(token, live)?;
        }
        Ok(self.state)
    }

    fn step(&mut self, token: &str, live: bool) -> Result<(), WalkAbort> {
        trace!(token, live, node = self.state.node.index(), "walk step");

        if self.state.pending_values > 0 {
            self.state.pending_values -= 1;
            if self.state.pending_values == 0 {
                self.state.pending_option = None;
            }
            // A value token ends the cluster run as well, so `-d --port -`
            // offers no more short flags.
            self.state.short_continuable = false;
            return Ok(());
        }

        if token.starts_with("--") {
            self.state.short_continuable = false;
            return self.long_option(token, live);
        }

        if is_short_group(token) {
            return self.short_cluster(token);
        }

        self.state.short_continuable = false;

        if let Some(child) = self.provider.resolve_subcommand(self.state.node, token) {
            self.descend(child);
            return Ok(());
        }

        if live {
            return Ok(());
        }

        // Groups only take subcommands
        if self.mode == WalkMode::Resolve && !self.provider.is_group(self.state.node) {
            self.state.arguments.push(token.to_string());
            return Ok(());
        }

        Err(WalkAbort::UnexpectedArgument {
            token: token.to_string(),
        })
    }

    fn long_option(&mut self, token: &str, live: bool) -> Result<(), WalkAbort> {
        let (name, embedded) = match token.split_once('=') {
            Some((name, _value)) => (name, true),
            None => (token, false),
        };

        match self.provider.option(self.state.node, name) {
            Some(option) if !embedded || option.takes_values() => {
                self.accept(option);
                if option.takes_values() {
                    self.expect_values(option, option.arity() - usize::from(embedded));
                }
                Ok(())
            }
            // Still being typed
            _ if live => Ok(()),
            _ => Err(WalkAbort::UnknownOption {
                token: token.to_string(),
            }),
        }
    }

    fn short_cluster(&mut self, token: &str) -> Result<(), WalkAbort> {
        let body = &token[1..];

        for (offset, flag) in body.char_indices() {
            let Some(option) = self.provider.short_option(self.state.node, flag) else {
                return Err(WalkAbort::UnknownShortFlag {
                    token: token.to_string(),
                    flag,
                });
            };
            self.accept(option);

            if option.takes_values() {
                let attached = offset + flag.len_utf8() < body.len();
                self.expect_values(option, option.arity() - usize::from(attached));
                self.state.short_continuable = false;
                return Ok(());
            }
        }

        self.state.short_continuable = true;
        Ok(())
    }

    fn accept(&mut self, option: &'p OptionDescriptor) {
        if option.is_single_use() {
            self.state.used.insert(option.id());
        }
        self.state.options_seen.push(option.canonical_name());
    }

    fn expect_values(&mut self, option: &'p OptionDescriptor, count: usize) {
        self.state.pending_values = count;
        self.state.pending_option = (count > 0).then(|| option.canonical_name());
    }

    fn descend(&mut self, child: NodeId) {
        trace!(node = child.index(), "descend into subcommand");
        self.state.node = child;
        self.state.used.clear();
        self.state.pending_values = 0;
        self.state.pending_option = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{CommandBuilder, GrammarBuilder, OptionBuilder};
    use crate::repl::completion::provider::StaticGrammarProvider;
    use std::sync::Arc;

    fn provider() -> StaticGrammarProvider {
        let grammar = GrammarBuilder::new(
            CommandBuilder::group("app")
                .option(OptionBuilder::count(["--verbose", "-v"]))
                .option(OptionBuilder::flag(["--force", "-f"]))
                .option(OptionBuilder::value(["--output", "-o"]))
                .option(OptionBuilder::value(["--point", "-P"]).nargs(2))
                .subcommand(CommandBuilder::leaf("run")),
        )
        .build()
        .unwrap();
        StaticGrammarProvider::new(Arc::new(grammar), true)
    }

    fn walk<'p>(
        provider: &'p StaticGrammarProvider,
        line: &[&str],
        live: bool,
        mode: WalkMode,
    ) -> Result<WalkState<'p>, WalkAbort> {
        let tokens: Vec<String> = line.iter().map(|t| t.to_string()).collect();
        Walker::new(provider, mode).walk(&tokens, live)
    }

    #[test]
    fn test_long_option_with_embedded_value() {
        let provider = provider();
        let state = walk(&provider, &["--output=x"], false, WalkMode::Complete).unwrap();
        assert_eq!(state.pending_values, 0);
        assert_eq!(state.used.len(), 1);

        let state = walk(&provider, &["--point=1"], false, WalkMode::Complete).unwrap();
        assert_eq!(state.pending_values, 1);
        assert_eq!(state.pending_option, Some("--point"));
    }

    #[test]
    fn test_embedded_value_on_flag_is_unknown() {
        let provider = provider();
        let err = walk(&provider, &["--force=yes", "run"], false, WalkMode::Complete).unwrap_err();
        assert_eq!(
            err,
            WalkAbort::UnknownOption {
                token: "--force=yes".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_live_long_option_is_tolerated() {
        let provider = provider();
        assert!(walk(&provider, &["--outp"], true, WalkMode::Complete).is_ok());
        assert!(walk(&provider, &["--outp"], false, WalkMode::Complete).is_err());
    }

    #[test]
    fn test_short_cluster_flags_continue() {
        let provider = provider();
        let state = walk(&provider, &["-vfv"], true, WalkMode::Complete).unwrap();
        assert!(state.short_continuable);
        // only the flag is used up; the counter never is
        assert_eq!(state.used.len(), 1);
    }

    #[test]
    fn test_short_cluster_value_stops_scan() {
        let provider = provider();
        let state = walk(&provider, &["-vo"], true, WalkMode::Complete).unwrap();
        assert!(!state.short_continuable);
        assert_eq!(state.pending_values, 1);

        // rest of the token is the attached value, even if it spells flags
        let state = walk(&provider, &["-ofv"], false, WalkMode::Complete).unwrap();
        assert_eq!(state.pending_values, 0);
        assert_eq!(state.options_seen, vec!["--output"]);
    }

    #[test]
    fn test_unknown_short_flag_aborts_even_when_live() {
        let provider = provider();
        let err = walk(&provider, &["-vx"], true, WalkMode::Complete).unwrap_err();
        assert_eq!(
            err,
            WalkAbort::UnknownShortFlag {
                token: "-vx".to_string(),
                flag: 'x'
            }
        );
    }

    #[test]
    fn test_values_are_skipped() {
        let provider = provider();
        let state = walk(&provider, &["-P", "run", "-x", "run"], false, WalkMode::Complete).unwrap();
        let run = provider.resolve_subcommand(provider.root(), "run").unwrap();
        assert_eq!(state.node, run);
    }

    #[test]
    fn test_value_token_resets_short_continuation() {
        let provider = provider();
        let state = walk(&provider, &["-o", "-v"], true, WalkMode::Complete).unwrap();
        assert!(!state.short_continuable);
    }

    #[test]
    fn test_descend_resets_used() {
        let provider = provider();
        let state = walk(&provider, &["-f", "run"], false, WalkMode::Complete).unwrap();
        assert!(state.used.is_empty());
    }

    #[test]
    fn test_positional_aborts_in_complete_mode() {
        let provider = provider();
        let err = walk(&provider, &["file.txt", "run"], false, WalkMode::Complete).unwrap_err();
        assert!(matches!(err, WalkAbort::UnexpectedArgument { .. }));
    }

    #[test]
    fn test_positional_collected_in_resolve_mode() {
        let provider = provider();
        let state = walk(&provider, &["run", "a", "b"], false, WalkMode::Resolve).unwrap();
        assert_eq!(state.arguments, vec!["a", "b"]);

        let err = walk(&provider, &["a", "run"], false, WalkMode::Resolve).unwrap_err();
        assert!(matches!(err, WalkAbort::UnexpectedArgument { .. }));
    }

    #[test]
    fn test_finish_reports_missing_values() {
        let provider = provider();
        let state = walk(&provider, &["--point", "1"], false, WalkMode::Complete).unwrap();
        assert_eq!(
            state.finish().unwrap_err(),
            WalkAbort::MissingValues {
                option: "--point".to_string(),
                remaining: 1
            }
        );
    }

    #[test]
    fn test_abort_display() {
        let abort = WalkAbort::UnknownShortFlag {
            token: "-vx".to_string(),
            flag: 'x',
        };
        assert_eq!(abort.to_string(), "no such option: -x (in '-vx')");
    }
}
