//! Validator for reedline - keeps the editor open while a quote is unterminated

use reedline::{ValidationResult, Validator};

use super::completion::tokenize;

/// Accepts a line once it splits cleanly into shell words
#[derive(Debug, Default, Clone, Copy)]
pub struct CmdtreeValidator;

impl CmdtreeValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for CmdtreeValidator {
    /// An unterminated quote or trailing backslash continues on the next line
    fn validate(&self, line: &str) -> ValidationResult {
        if line.trim().is_empty() {
            return ValidationResult::Complete;
        }

        match tokenize(line, false) {
            Ok(_) => ValidationResult::Complete,
            Err(_) => ValidationResult::Incomplete,
        }
    }
}
