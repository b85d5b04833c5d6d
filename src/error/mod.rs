//! Error handling module for cmdtree.
//!
//! Completion requests never return errors: every failure while walking a
//! line degrades to "no candidates". The types here cover the places that
//! can legitimately fail:
//! - Grammar construction and grammar-file loading (fail fast)
//! - Configuration loading
//! - The interactive shell and its line editor
//!
//! # Example
//!
//! ```rust
//! use cmdtree::error::{CmdtreeError, GrammarError, Result};
//!
//! fn check(name: &str) -> Result<()> {
//!     if name.starts_with('-') {
//!         return Err(GrammarError::InvalidCommandName { name: name.into() }.into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(check("-x"), Err(CmdtreeError::Grammar(_))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CmdtreeError, ConfigError, GrammarError, Result, TokenizeError};
