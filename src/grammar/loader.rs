//! Declarative grammar files
//!
//! A grammar file is a TOML document describing the root command. Nested
//! commands live under `[[commands]]`; aliases are declared on the child and
//! registered in its parent.
//!
//! ```toml
//! name = "myapp"
//!
//! [[options]]
//! names = ["--verbose", "-v"]
//! kind = "flag"
//!
//! [[commands]]
//! name = "serve"
//! aliases = ["s"]
//!
//! [[commands.options]]
//! names = ["--port", "-p"]
//! ```
//!
//! Parsed documents go through [`GrammarBuilder`], so every construction
//! rule applies to files as well.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::builder::{ArgumentBuilder, CommandBuilder, GrammarBuilder, OptionBuilder};
use super::{Grammar, OptionKind};
use crate::error::GrammarError;

/// One command as written in a grammar file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    pub name: String,

    #[serde(default)]
    pub help: Option<String>,

    /// Force group kind even without subcommands
    #[serde(default)]
    pub group: bool,

    /// Alternate names registered in the parent group
    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub options: Vec<OptionSpec>,

    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,

    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

/// One option as written in a grammar file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OptionSpec {
    pub names: Vec<String>,

    #[serde(default)]
    pub secondary_names: Vec<String>,

    #[serde(default)]
    pub kind: OptionKind,

    #[serde(default = "default_nargs")]
    pub nargs: usize,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub help: Option<String>,
}

/// One positional argument as written in a grammar file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ArgumentSpec {
    pub name: String,

    #[serde(default = "default_nargs")]
    pub nargs: usize,

    #[serde(default)]
    pub help: Option<String>,
}

fn default_nargs() -> usize {
    1
}

impl OptionSpec {
    fn into_builder(self) -> OptionBuilder {
        let mut builder = match self.kind {
            OptionKind::Flag => OptionBuilder::flag(self.names),
            OptionKind::Count => OptionBuilder::count(self.names),
            OptionKind::Value => OptionBuilder::value(self.names).nargs(self.nargs),
        };
        for name in self.secondary_names {
            builder = builder.secondary(name);
        }
        if self.multiple {
            builder = builder.multiple();
        }
        if let Some(help) = self.help {
            builder = builder.help(help);
        }
        builder
    }
}

impl ArgumentSpec {
    fn into_builder(self) -> ArgumentBuilder {
        let builder = ArgumentBuilder::new(self.name).nargs(self.nargs);
        match self.help {
            Some(help) => builder.help(help),
            None => builder,
        }
    }
}

impl CommandSpec {
    /// Convert into a builder; `aliases` must be handled by the parent
    pub fn into_builder(self) -> CommandBuilder {
        let mut builder = if self.group || !self.commands.is_empty() {
            CommandBuilder::group(self.name)
        } else {
            CommandBuilder::leaf(self.name)
        };
        if let Some(help) = self.help {
            builder = builder.help(help);
        }
        for option in self.options {
            builder = builder.option(option.into_builder());
        }
        for argument in self.arguments {
            builder = builder.argument(argument.into_builder());
        }
        for mut child in self.commands {
            let aliases = std::mem::take(&mut child.aliases);
            builder = builder.subcommand_with_aliases(child.into_builder(), aliases);
        }
        builder
    }
}

/// Parse a grammar from TOML text
pub fn parse_grammar(content: &str) -> Result<Grammar, GrammarError> {
    let spec: CommandSpec =
        toml::from_str(content).map_err(|e| GrammarError::InvalidFormat(e.to_string()))?;

    if !spec.aliases.is_empty() {
        return Err(GrammarError::InvalidFormat(format!(
            "root command '{}' cannot declare aliases",
            spec.name
        )));
    }

    GrammarBuilder::new(spec.into_builder()).build()
}

/// Load a grammar from a TOML file
///
/// # Arguments
/// * `path` - Path to the grammar file
///
/// # Returns
/// * `Result<Grammar, GrammarError>` - Validated grammar or the first problem found
pub fn load_grammar<P: AsRef<Path>>(path: P) -> Result<Grammar, GrammarError> {
    let path = path.as_ref();
    debug!("Loading grammar from {}", path.display());

    let content = fs::read_to_string(path)
        .map_err(|e| GrammarError::FileNotFound(format!("{}: {e}", path.display())))?;
    let grammar = parse_grammar(&content)?;

    debug!(
        "Loaded grammar '{}' with {} commands",
        grammar.root_node().name(),
        grammar.len()
    );
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CommandKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
name = "myapp"
help = "Sample application"

[[options]]
names = ["--verbose", "-v"]
kind = "count"

[[commands]]
name = "serve"
aliases = ["s"]
help = "Run the server"

[[commands.options]]
names = ["--port", "-p"]

[[commands.options]]
names = ["--tag", "-t"]
multiple = true

[[commands.arguments]]
name = "root"

[[commands]]
name = "remote"
group = true
"#;

    #[test]
    fn test_parse_sample() {
        let grammar = parse_grammar(SAMPLE).unwrap();
        let root = grammar.root_node();

        assert_eq!(root.name(), "myapp");
        assert_eq!(root.help(), Some("Sample application"));
        assert!(root.is_group());
        assert!(grammar.options_of(grammar.root()).short('v').unwrap().is_counting());

        let serve = grammar.resolve_subcommand(grammar.root(), "s").unwrap();
        let node = grammar.node(serve);
        assert_eq!(node.name(), "serve");
        assert_eq!(node.kind(), CommandKind::Leaf);
        assert_eq!(node.arguments()[0].name(), "root");

        let options = grammar.options_of(serve);
        assert_eq!(options.get("--port").unwrap().arity(), 1);
        assert!(options.get("-t").unwrap().is_repeatable());
    }

    #[test]
    fn test_group_flag_forces_group() {
        let grammar = parse_grammar(SAMPLE).unwrap();
        let remote = grammar.resolve_subcommand(grammar.root(), "remote").unwrap();
        assert!(grammar.node(remote).is_group());
        assert!(grammar.subcommands_of(remote, true).is_empty());
    }

    #[test]
    fn test_value_option_with_nargs() {
        let grammar = parse_grammar(
            r#"
name = "app"

[[options]]
names = ["--point"]
nargs = 2
secondary_names = ["--no-point"]
"#,
        )
        .unwrap();
        let point = grammar.options_of(grammar.root()).get("--no-point").unwrap();
        assert_eq!(point.arity(), 2);
        assert!(point.takes_values());
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_grammar("name = ").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidFormat(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_grammar("name = \"app\"\nflavour = \"x\"\n").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidFormat(_)));
    }

    #[test]
    fn test_root_aliases_rejected() {
        let err = parse_grammar("name = \"app\"\naliases = [\"a\"]\n").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidFormat(_)));
    }

    #[test]
    fn test_construction_rules_apply_to_files() {
        let err = parse_grammar(
            r#"
name = "app"

[[commands]]
name = "run"
aliases = ["r"]

[[commands]]
name = "r"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::AliasCollision { .. }));
    }

    #[test]
    fn test_load_grammar_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let grammar = load_grammar(file.path()).unwrap();
        assert_eq!(grammar.len(), 3);
    }

    #[test]
    fn test_bundled_sample_grammar() {
        let grammar = parse_grammar(include_str!("../../grammars/myapp.toml")).unwrap();
        let remote = grammar.resolve_subcommand(grammar.root(), "remote").unwrap();
        assert_eq!(grammar.subcommands_of(remote, true), vec!["add", "remove", "rm"]);
        // myapp, serve, remote, add, remove
        assert_eq!(grammar.len(), 5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_grammar(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, GrammarError::FileNotFound(_)));
    }
}
