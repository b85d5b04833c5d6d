//! Shell-style splitting with live-token detection
//!
//! The line is split with POSIX quoting rules. The *live* token is the one
//! still being typed: the last token, provided the cursor sits at the end
//! of the text and nothing (not even whitespace) follows it.
//!
//! `#` has no special meaning: a word starting with it is an ordinary word,
//! not the start of a comment.

use std::borrow::Cow;

use crate::error::TokenizeError;

/// Result of splitting one command line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenizedLine {
    tokens: Vec<String>,
    /// Whether the last token is being typed
    live: bool,
}

impl TokenizedLine {
    /// All tokens in order, the live one included
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether the last token is live
    pub fn has_live_token(&self) -> bool {
        self.live
    }

    /// Text being completed; empty when no real token is live
    pub fn live_token(&self) -> &str {
        match self.tokens.last() {
            Some(token) if self.live => token,
            _ => "",
        }
    }

    /// Whether the token at `index` is the live one
    pub fn is_live(&self, index: usize) -> bool {
        self.live && index + 1 == self.tokens.len()
    }
}

/// Split `text` into tokens and decide which one is live
///
/// # Arguments
/// * `text` - Raw command line
/// * `cursor_at_end` - Whether the cursor is at the end of `text`
///
/// # Returns
/// * `Result<TokenizedLine, TokenizeError>` - Tokens, or an error for an unterminated quote or escape
pub fn tokenize(text: &str, cursor_at_end: bool) -> Result<TokenizedLine, TokenizeError> {
    let escaped = escape_comment_starts(text);
    let tokens =
        shlex::split(&escaped).ok_or_else(|| TokenizeError::Unbalanced(text.to_string()))?;
    let live = cursor_at_end && !tokens.is_empty() && text.trim_end() == text;
    Ok(TokenizedLine { tokens, live })
}

/// Backslash-escape every unquoted `#` that starts a word, so `shlex` keeps
/// it as a literal character instead of dropping the rest of the line
fn escape_comment_starts(text: &str) -> Cow<'_, str> {
    if !text.contains('#') {
        return Cow::Borrowed(text);
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut out = String::with_capacity(text.len() + 4);
    let mut quote = Quote::None;
    let mut word_start = true;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
            (Quote::Double, '\\') | (Quote::None, '\\') => {
                out.push(ch);
                word_start = false;
                match chars.next() {
                    Some(next) => out.push(next),
                    // Dangling escape, left for shlex to reject
                    None => break,
                }
                continue;
            }
            (Quote::None, '\'') => quote = Quote::Single,
            (Quote::None, '"') => quote = Quote::Double,
            (Quote::None, ' ' | '\t' | '\n') => {
                word_start = true;
                out.push(ch);
                continue;
            }
            (Quote::None, '#') if word_start => out.push('\\'),
            _ => {}
        }
        out.push(ch);
        word_start = false;
    }
    Cow::Owned(out)
}
