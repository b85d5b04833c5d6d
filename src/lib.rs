//! cmdtree library
//!
//! Keystroke-level autocompletion for hierarchical command grammars. Given a
//! grammar and a partially typed line, the engine returns the text that could
//! be appended at the cursor to finish the word being typed.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `grammar`: Command grammar model, builder and TOML loader
//! - `repl`: Interactive shell and the completion engine
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cmdtree::grammar::{CommandBuilder, GrammarBuilder, OptionBuilder};
//! use cmdtree::CompletionEngine;
//!
//! let grammar = GrammarBuilder::new(
//!     CommandBuilder::group("myapp")
//!         .subcommand(CommandBuilder::leaf("serve").option(OptionBuilder::value(["--port"]))),
//! )
//! .build()
//! .unwrap();
//!
//! let engine = CompletionEngine::from_grammar(Arc::new(grammar), true);
//! let suffixes: Vec<String> = engine
//!     .complete("se", true)
//!     .into_iter()
//!     .map(|candidate| candidate.suffix)
//!     .collect();
//! assert_eq!(suffixes, vec!["rve"]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod grammar;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use error::{CmdtreeError, Result};
pub use grammar::{Grammar, GrammarBuilder};
pub use repl::ReplEngine;
pub use repl::completion::{CompletionCandidate, CompletionEngine, Resolution};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
