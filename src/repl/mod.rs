//! Interactive completion shell
//!
//! A reedline editor wired to the completion engine:
//! - Tab opens a menu of grammar completions
//! - Inline hints from history, else from a single possible completion
//! - Lines with an open quote continue on the next line
//! - Accepted lines are resolved and echoed, never executed

pub mod completer;
pub mod completion;
pub mod hinter;
pub mod prompt;
pub mod validator;

use nu_ansi_term::Color;
use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, History, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, info};

use crate::config::HistoryConfig;
use crate::error::Result;

pub use completer::CmdtreeCompleter;
pub use completion::{CompletionEngine, Resolution, WalkAbort};
pub use hinter::CmdtreeHinter;
pub use prompt::CmdtreePrompt;
pub use validator::CmdtreeValidator;

const COMPLETION_MENU: &str = "completion_menu";

/// What the shell does with one accepted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    /// Leave the shell
    Exit,

    /// Nothing to do (blank line)
    Skip,

    /// The line resolved to a command
    Resolved(Resolution),

    /// The line does not match the grammar
    Rejected(WalkAbort),
}

/// Interpret one accepted line
pub fn evaluate_line(engine: &CompletionEngine, line: &str) -> ReplAction {
    match line.trim() {
        "" => ReplAction::Skip,
        "exit" | "quit" => ReplAction::Exit,
        _ => match engine.resolve(line) {
            Ok(resolution) => ReplAction::Resolved(resolution),
            Err(abort) => ReplAction::Rejected(abort),
        },
    }
}

/// One-line rendering of a resolved command
pub fn format_resolution(resolution: &Resolution, color: bool) -> String {
    let path = resolution.path.join(" ");
    let mut out = if color {
        Color::Green.bold().paint(path).to_string()
    } else {
        path
    };
    if !resolution.options.is_empty() {
        out.push_str(&format!("  options: {}", resolution.options.join(" ")));
    }
    if !resolution.arguments.is_empty() {
        out.push_str(&format!("  arguments: {}", resolution.arguments.join(" ")));
    }
    out
}

/// REPL engine for interactive completion
pub struct ReplEngine {
    editor: Reedline,
    prompt: CmdtreePrompt,
    engine: CompletionEngine,
    color_enabled: bool,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `engine` - Completion engine for the loaded grammar
    /// * `prompt_name` - Name shown in the prompt
    /// * `history_config` - History configuration
    /// * `show_descriptions` - Show help text in the completion menu
    /// * `color_enabled` - Enable colored output
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(
        engine: CompletionEngine,
        prompt_name: &str,
        history_config: &HistoryConfig,
        show_descriptions: bool,
        color_enabled: bool,
    ) -> Result<Self> {
        let history: Box<dyn History> = if history_config.persist {
            debug!("Using history file {}", history_config.file_path.display());
            Box::new(FileBackedHistory::with_file(
                history_config.max_size,
                history_config.file_path.clone(),
            )?)
        } else {
            Box::new(FileBackedHistory::new(history_config.max_size)?)
        };

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);

        let editor = Reedline::create()
            .with_history(history)
            .with_completer(Box::new(CmdtreeCompleter::new(
                engine.clone(),
                show_descriptions,
            )))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_hinter(Box::new(CmdtreeHinter::new(engine.clone())))
            .with_validator(Box::new(CmdtreeValidator::new()))
            .with_ansi_colors(color_enabled);

        Ok(Self {
            editor,
            prompt: CmdtreePrompt::new(prompt_name),
            engine,
            color_enabled,
        })
    }

    /// Start the REPL loop
    ///
    /// # Returns
    /// * `Result<()>` - Ok when the user leaves the shell
    pub fn run(&mut self) -> Result<()> {
        info!("Starting interactive shell");
        loop {
            match self.editor.read_line(&self.prompt)? {
                Signal::Success(line) => {
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Signal::CtrlC => continue,
                Signal::CtrlD => break,
                #[allow(unreachable_patterns)]
                _ => break,
            }
        }
        Ok(())
    }

    /// Handle one accepted line; false means exit
    fn handle_line(&self, line: &str) -> bool {
        match evaluate_line(&self.engine, line) {
            ReplAction::Exit => return false,
            ReplAction::Skip => {}
            ReplAction::Resolved(resolution) => {
                println!("{}", format_resolution(&resolution, self.color_enabled));
            }
            ReplAction::Rejected(abort) => {
                let message = format!("Error: {abort}");
                if self.color_enabled {
                    eprintln!("{}", Color::Red.paint(message));
                } else {
                    eprintln!("{message}");
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{ArgumentBuilder, CommandBuilder, GrammarBuilder, OptionBuilder};
    use std::sync::Arc;

    fn engine() -> CompletionEngine {
        let grammar = GrammarBuilder::new(
            CommandBuilder::group("myapp").subcommand_with_aliases(
                CommandBuilder::leaf("serve")
                    .option(OptionBuilder::value(["--port", "-p"]))
                    .argument(ArgumentBuilder::new("root")),
                ["s"],
            ),
        )
        .build()
        .unwrap();
        CompletionEngine::from_grammar(Arc::new(grammar), true)
    }

    #[test]
    fn test_exit_commands() {
        let engine = engine();
        assert_eq!(evaluate_line(&engine, "exit"), ReplAction::Exit);
        assert_eq!(evaluate_line(&engine, "  quit "), ReplAction::Exit);
        assert_eq!(evaluate_line(&engine, "   "), ReplAction::Skip);
    }

    #[test]
    fn test_resolved_line() {
        let engine = engine();
        let ReplAction::Resolved(resolution) = evaluate_line(&engine, "s -p 80 /srv") else {
            panic!("line should resolve");
        };
        assert_eq!(
            format_resolution(&resolution, false),
            "myapp serve  options: --port  arguments: /srv"
        );
    }

    #[test]
    fn test_rejected_line() {
        let engine = engine();
        assert!(matches!(
            evaluate_line(&engine, "serve --port"),
            ReplAction::Rejected(WalkAbort::MissingValues { .. })
        ));
        // groups take no positional words
        assert!(matches!(
            evaluate_line(&engine, "build"),
            ReplAction::Rejected(WalkAbort::UnexpectedArgument { .. })
        ));
        assert!(matches!(
            evaluate_line(&engine, "serve --bogus"),
            ReplAction::Rejected(WalkAbort::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_colored_resolution() {
        let resolution = Resolution {
            path: vec!["myapp".to_string()],
            options: Vec::new(),
            arguments: Vec::new(),
        };
        let rendered = format_resolution(&resolution, true);
        assert!(rendered.contains("myapp"));
        assert_ne!(rendered, "myapp");
    }
}
