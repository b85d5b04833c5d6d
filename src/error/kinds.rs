use std::{fmt, io};

/// Crate-wide `Result` type using [`CmdtreeError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, CmdtreeError>;

/// Top-level error type for cmdtree operations.
///
/// Completion itself never fails outward; these errors surface from grammar
/// construction, configuration loading and the interactive shell.
#[derive(Debug)]
pub enum CmdtreeError {
    /// Grammar construction or loading errors.
    Grammar(GrammarError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Grammar construction errors.
///
/// These are configuration mistakes in whoever builds the grammar and are
/// raised at build time, never while completing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// Two options of one command accept the same name.
    DuplicateOption { command: String, name: String },

    /// Option name is neither `--long` nor `-c`.
    InvalidOptionName { command: String, name: String },

    /// Option declared without any accepted name.
    UnnamedOption { command: String },

    /// Value-taking option declared with zero arity.
    InvalidArity { command: String, option: String },

    /// Command or alias name is empty, contains whitespace or starts with `-`.
    InvalidCommandName { name: String },

    /// Two children of one group share a name.
    DuplicateCommand { parent: String, name: String },

    /// Alias collides with a child name or another alias of the same group.
    AliasCollision { parent: String, alias: String },

    /// Alias points at a command that is not a member of the group.
    UnknownAliasTarget {
        parent: String,
        alias: String,
        target: String,
    },

    /// Subcommands or aliases attached to a leaf command.
    LeafWithSubcommands { command: String },

    /// Grammar file could not be read.
    FileNotFound(String),

    /// Grammar file is not valid TOML or does not match the schema.
    InvalidFormat(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Shell-style tokenization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// Unterminated quote or dangling escape.
    Unbalanced(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for CmdtreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmdtreeError::Grammar(e) => write!(f, "Grammar error: {e}"),
            CmdtreeError::Config(e) => write!(f, "Configuration error: {e}"),
            CmdtreeError::Io(e) => write!(f, "I/O error: {e}"),
            CmdtreeError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::DuplicateOption { command, name } => {
                write!(f, "option name '{name}' is declared twice on '{command}'")
            }
            GrammarError::InvalidOptionName { command, name } => write!(
                f,
                "invalid option name '{name}' on '{command}'; expected '--long' or '-c'"
            ),
            GrammarError::UnnamedOption { command } => {
                write!(f, "option without a name on '{command}'")
            }
            GrammarError::InvalidArity { command, option } => {
                write!(f, "value option '{option}' on '{command}' must take at least one value")
            }
            GrammarError::InvalidCommandName { name } => {
                write!(f, "invalid command name '{name}'")
            }
            GrammarError::DuplicateCommand { parent, name } => {
                write!(f, "command '{name}' is declared twice under '{parent}'")
            }
            GrammarError::AliasCollision { parent, alias } => {
                write!(f, "cannot add a non-distinct alias '{alias}' under '{parent}'")
            }
            GrammarError::UnknownAliasTarget {
                parent,
                alias,
                target,
            } => write!(
                f,
                "cannot add alias '{alias}'; command '{target}' is not a member of '{parent}'"
            ),
            GrammarError::LeafWithSubcommands { command } => {
                write!(f, "leaf command '{command}' cannot have subcommands")
            }
            GrammarError::FileNotFound(path) => write!(f, "Grammar file not found: {path}"),
            GrammarError::InvalidFormat(msg) => write!(f, "Invalid grammar format: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::Unbalanced(input) => {
                write!(f, "Unterminated quote or escape in: {input}")
            }
        }
    }
}

impl std::error::Error for CmdtreeError {}
impl std::error::Error for GrammarError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for TokenizeError {}

/* ========================= Conversions to CmdtreeError ========================= */

impl From<io::Error> for CmdtreeError {
    fn from(err: io::Error) -> Self {
        CmdtreeError::Io(err)
    }
}

impl From<GrammarError> for CmdtreeError {
    fn from(err: GrammarError) -> Self {
        CmdtreeError::Grammar(err)
    }
}

impl From<ConfigError> for CmdtreeError {
    fn from(err: ConfigError) -> Self {
        CmdtreeError::Config(err)
    }
}

impl From<String> for CmdtreeError {
    fn from(msg: String) -> Self {
        CmdtreeError::Generic(msg)
    }
}

impl From<&str> for CmdtreeError {
    fn from(msg: &str) -> Self {
        CmdtreeError::Generic(msg.to_owned())
    }
}

impl From<reedline::ReedlineError> for CmdtreeError {
    fn from(err: reedline::ReedlineError) -> Self {
        CmdtreeError::Generic(format!("Line editor error: {err}"))
    }
}
