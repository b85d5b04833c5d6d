//! cmdtree - grammar-driven command-line completion
//!
//! Loads a command grammar and either opens an interactive shell with
//! Tab completion or answers one completion request and exits.
//!
//! # Usage
//!
//! ```bash
//! # Interactive shell
//! cmdtree grammars/myapp.toml
//!
//! # One-shot completion
//! cmdtree --prog-name myapp grammars/myapp.toml complete "myapp serve --po"
//! ```

use std::sync::Arc;

use tracing::{Level, debug};

use cmdtree::cli::CliInterface;
use cmdtree::error::Result;
use cmdtree::repl::ReplEngine;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle a subcommand or start the interactive shell
///
/// # Returns
/// * `Result<()>` - Success or error
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    let logging = &cli.config().logging;
    initialize_logging(logging.level.to_tracing_level(), logging.timestamps);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    run_interactive_mode(&cli)
}

/// Run the interactive completion shell
fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let grammar = Arc::new(cli.load_grammar()?);
    debug!("Grammar loaded with {} command(s)", grammar.len());

    let config = cli.config();
    let prompt_name = config
        .completion
        .program_name
        .clone()
        .unwrap_or_else(|| grammar.root_node().name().to_string());

    // Lines typed in the shell start below the root, so no program name
    let engine = cli.engine(grammar, false);

    let mut repl = ReplEngine::new(
        engine,
        &prompt_name,
        &config.history,
        config.completion.show_descriptions,
        config.display.color_output,
    )?;
    repl.run()?;

    println!("Goodbye!");
    Ok(())
}

/// Initialize logging system
///
/// # Arguments
/// * `level` - Maximum level to emit
/// * `timestamps` - Prefix each record with a timestamp
fn initialize_logging(level: Level, timestamps: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
