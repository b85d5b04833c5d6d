//! Command-line interface for cmdtree
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and flag overrides
//! - Grammar loading
//! - One-shot subcommands (`complete`, `check`, `config`, ...)

pub mod completion;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{Config, LogLevel};
use crate::error::{CmdtreeError, GrammarError, Result};
use crate::grammar::{Grammar, load_grammar};
use crate::repl::completion::{CompletionCandidate, CompletionEngine, tokenize};

/// Keystroke-level completion for hierarchical command grammars
#[derive(Parser, Debug)]
#[command(
    name = "cmdtree",
    version,
    about = "Completion engine for hierarchical command grammars",
    long_about = "Loads a command grammar from a TOML file and completes partially typed
command lines against it, either in an interactive shell or one request at a time."
)]
pub struct CliArgs {
    /// Grammar file (TOML)
    #[arg(value_name = "GRAMMAR")]
    pub grammar: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Expect every completed line to start with this program name
    #[arg(long = "prog-name", value_name = "NAME")]
    pub prog_name: Option<String>,

    /// Do not offer or accept command aliases
    #[arg(long = "no-aliases")]
    pub no_aliases: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for cmdtree
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Complete one command line and print the candidates
    Complete {
        /// Command line to complete
        #[arg(value_name = "LINE", allow_hyphen_values = true)]
        line: String,

        /// Cursor position as a byte offset (defaults to the end of the line)
        #[arg(long, value_name = "POS")]
        cursor: Option<usize>,

        /// Print candidates as JSON
        #[arg(long, conflicts_with = "words")]
        json: bool,

        /// Print whole words instead of suffixes
        #[arg(long)]
        words: bool,
    },

    /// Validate the grammar and print its command tree
    Check,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,

        /// Also complete this program from the grammar via `cmdtree complete`
        #[arg(long, value_name = "PROGRAM")]
        bridge: Option<String>,
    },

    /// Show version information
    Version,

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {e}");
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Apply CLI arguments to configuration
    ///
    /// # Arguments
    /// * `config` - Configuration to modify
    /// * `args` - Parsed arguments
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if let Some(grammar) = &args.grammar {
            config.grammar.path = Some(grammar.clone());
        }

        if let Some(name) = &args.prog_name {
            config.completion.program_name = Some(name.clone());
        }

        if args.no_aliases {
            config.completion.use_aliases = false;
        }

        if args.no_color {
            config.display.color_output = false;
        }

        if args.very_verbose {
            config.logging.level = LogLevel::Trace;
        } else if args.verbose {
            config.logging.level = LogLevel::Debug;
        } else if args.quiet {
            config.logging.level = LogLevel::Error;
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Grammar file from the arguments or the configuration
    pub fn grammar_path(&self) -> Result<&PathBuf> {
        self.config.grammar.path.as_ref().ok_or_else(|| {
            GrammarError::FileNotFound(
                "no grammar file given; pass GRAMMAR or set grammar.path".to_string(),
            )
            .into()
        })
    }

    /// Load and validate the grammar
    pub fn load_grammar(&self) -> Result<Grammar> {
        let path = self.grammar_path()?;
        Ok(load_grammar(path)?)
    }

    /// Completion engine over `grammar` with the configured settings
    ///
    /// # Arguments
    /// * `grammar` - Loaded grammar
    /// * `with_program_name` - Apply `completion.program_name` (one-shot requests)
    pub fn engine(&self, grammar: Arc<Grammar>, with_program_name: bool) -> CompletionEngine {
        let engine = CompletionEngine::from_grammar(grammar, self.config.completion.use_aliases);
        match &self.config.completion.program_name {
            Some(name) if with_program_name => engine.with_program_name(name.clone()),
            _ => engine,
        }
    }

    /// Handle a subcommand if one was given
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand ran, false to start the shell
    pub fn handle_subcommand(&self) -> Result<bool> {
        let Some(command) = &self.args.command else {
            return Ok(false);
        };

        match command {
            Commands::Complete {
                line,
                cursor,
                json,
                words,
            } => {
                let grammar = Arc::new(self.load_grammar()?);
                let engine = self.engine(grammar, true);
                let pos = cursor.unwrap_or(line.len());
                let (_, candidates) = engine.complete_at(line, pos);
                debug!("{} candidate(s) for {:?}", candidates.len(), line);

                if *json {
                    let rendered = serde_json::to_string_pretty(&candidates)
                        .map_err(|e| CmdtreeError::Generic(format!("JSON encoding failed: {e}")))?;
                    println!("{rendered}");
                } else {
                    let live = live_token(line, pos);
                    for entry in render_candidates(&candidates, *words, &live) {
                        println!("{entry}");
                    }
                }
            }
            Commands::Check => {
                let grammar = self.load_grammar()?;
                print!("{grammar}");
                println!("OK: {} command(s)", grammar.len());
            }
            Commands::Completion { shell, bridge } => {
                let grammar = match bridge {
                    Some(_) => Some(self.grammar_path()?.clone()),
                    None => None,
                };
                completion::generate_completion(
                    shell,
                    bridge.as_deref().zip(grammar.as_deref()),
                )?;
            }
            Commands::Version => {
                println!("cmdtree {}", crate::VERSION);
            }
            Commands::Config { show, validate } => {
                if *validate {
                    let config = Config::load_from_file(self.args.config_file.as_deref())?;
                    match config.validate() {
                        Ok(()) => println!("Configuration is valid"),
                        Err(e) => {
                            warn!("Invalid configuration: {e}");
                            return Err(e);
                        }
                    }
                }
                if *show || !*validate {
                    print!("{}", self.config.to_toml()?);
                }
            }
        }

        Ok(true)
    }
}

/// Live token of `line` with the cursor at `pos`
fn live_token(line: &str, pos: usize) -> String {
    tokenize(line, pos >= line.len())
        .map(|tokenized| tokenized.live_token().to_string())
        .unwrap_or_default()
}

/// One output line per candidate: the suffix, or the whole word when `words`
fn render_candidates(candidates: &[CompletionCandidate], words: bool, live: &str) -> Vec<String> {
    candidates
        .iter()
        .map(|candidate| {
            if words {
                format!("{live}{}", candidate.suffix)
            } else {
                candidate.suffix.clone()
            }
        })
        .collect()
}
