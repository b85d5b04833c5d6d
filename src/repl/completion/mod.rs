//! Completion system for command grammars
//!
//! Given a partially typed command line and the cursor state, the engine
//! returns the option names, subcommands and short-flag continuations that
//! may come next. Each candidate carries the suffix to insert after the
//! text already typed.
//!
//! # Architecture
//!
//! - **Tokenizer**: POSIX shell-style splitting plus live-token detection
//! - **Provider**: grammar queries (options, subcommands, resolution)
//! - **State**: the token walk, ending on a command node or a [`WalkAbort`]
//! - **Candidate**: prefix filtering and suffix formatting
//! - **Engine**: ties the steps together; any abort yields no candidates
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use cmdtree::grammar::{CommandBuilder, GrammarBuilder, OptionBuilder};
//! use cmdtree::repl::completion::CompletionEngine;
//!
//! let grammar = GrammarBuilder::new(
//!     CommandBuilder::group("myapp").subcommand_with_aliases(
//!         CommandBuilder::leaf("serve").option(OptionBuilder::value(["--port", "-p"])),
//!         ["s"],
//!     ),
//! )
//! .build()
//! .unwrap();
//!
//! let engine = CompletionEngine::from_grammar(Arc::new(grammar), true).with_program_name("myapp");
//!
//! let candidates = engine.complete("myapp serve --po", true);
//! assert_eq!(candidates[0].suffix, "rt");
//! ```

mod candidate;
mod engine;
mod provider;
mod state;
mod tokenizer;

#[cfg(test)]
mod tests;

pub use candidate::{CandidateKind, CompletionCandidate};
pub use engine::{CompletionEngine, Resolution};
pub use provider::{GrammarProvider, StaticGrammarProvider};
pub use state::WalkAbort;
pub use tokenizer::{TokenizedLine, tokenize};
