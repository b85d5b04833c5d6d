//! Grammar construction
//!
//! Builders describe commands top-down; [`GrammarBuilder::build`] flattens
//! them into the arena and enforces every construction rule, so a grammar
//! that builds is valid for the rest of its life.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use super::{
    ArgumentDescriptor, CommandKind, CommandNode, Grammar, NodeId, OptionDescriptor, OptionId,
    OptionKind,
};
use crate::error::GrammarError;

/// Declaration of one option
#[derive(Debug, Clone)]
pub struct OptionBuilder {
    names: Vec<String>,
    secondary_names: Vec<String>,
    kind: OptionKind,
    arity: usize,
    multiple: bool,
    help: Option<String>,
}

impl OptionBuilder {
    fn with_kind<I, S>(names: I, kind: OptionKind, arity: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            secondary_names: Vec::new(),
            kind,
            arity,
            multiple: false,
            help: None,
        }
    }

    /// Boolean switch such as `--verbose`/`-v`
    pub fn flag<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(names, OptionKind::Flag, 0)
    }

    /// Counting switch such as `-v` in `-vvv`
    pub fn count<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(names, OptionKind::Count, 0)
    }

    /// Option taking one value; see [`OptionBuilder::nargs`]
    pub fn value<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(names, OptionKind::Value, 1)
    }

    /// Secondary (negating) name, e.g. `--no-color`
    pub fn secondary(mut self, name: impl Into<String>) -> Self {
        self.secondary_names.push(name.into());
        self
    }

    /// Number of value tokens. Ignored for flags and counters.
    pub fn nargs(mut self, nargs: usize) -> Self {
        self.arity = nargs;
        self
    }

    /// Allow the option to be given more than once
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Declaration of one positional argument
#[derive(Debug, Clone)]
pub struct ArgumentBuilder {
    name: String,
    arity: usize,
    help: Option<String>,
}

impl ArgumentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: 1,
            help: None,
        }
    }

    pub fn nargs(mut self, nargs: usize) -> Self {
        self.arity = nargs;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Declaration of one command and, for groups, its subtree
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    kind: CommandKind,
    help: Option<String>,
    options: Vec<OptionBuilder>,
    arguments: Vec<ArgumentBuilder>,
    subcommands: Vec<CommandBuilder>,
    /// `(alias, target child name)` in registration order
    aliases: Vec<(String, String)>,
}

impl CommandBuilder {
    fn with_kind(name: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            name: name.into(),
            kind,
            help: None,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Terminal command
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::with_kind(name, CommandKind::Leaf)
    }

    /// Command group dispatching to subcommands
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, CommandKind::Group)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn option(mut self, option: OptionBuilder) -> Self {
        self.options.push(option);
        self
    }

    pub fn argument(mut self, argument: ArgumentBuilder) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn subcommand(mut self, command: CommandBuilder) -> Self {
        self.subcommands.push(command);
        self
    }

    /// Add a subcommand together with its aliases
    pub fn subcommand_with_aliases<I, S>(mut self, command: CommandBuilder, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = command.name.clone();
        self.aliases
            .extend(aliases.into_iter().map(|alias| (alias.into(), target.clone())));
        self.subcommands.push(command);
        self
    }

    /// Alias an existing member of this group by name
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }
}

/// Entry point for grammar construction
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    root: CommandBuilder,
}

impl GrammarBuilder {
    pub fn new(root: CommandBuilder) -> Self {
        Self { root }
    }

    /// Validate the declarations and freeze them into a [`Grammar`]
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut assembler = Assembler::default();
        let root = assembler.insert(self.root, None, "")?;
        trace!(
            "Built grammar with {} commands and {} options",
            assembler.nodes.len(),
            assembler.next_option
        );
        Ok(Grammar {
            nodes: assembler.nodes,
            root,
        })
    }
}

#[derive(Default)]
struct Assembler {
    nodes: Vec<CommandNode>,
    next_option: usize,
}

impl Assembler {
    fn insert(
        &mut self,
        command: CommandBuilder,
        parent: Option<NodeId>,
        parent_path: &str,
    ) -> Result<NodeId, GrammarError> {
        validate_command_name(&command.name)?;
        let path = if parent_path.is_empty() {
            command.name.clone()
        } else {
            format!("{parent_path} {}", command.name)
        };

        if command.kind == CommandKind::Leaf
            && (!command.subcommands.is_empty() || !command.aliases.is_empty())
        {
            return Err(GrammarError::LeafWithSubcommands { command: path });
        }

        let (options, option_index) = self.assemble_options(command.options, &path)?;
        let arguments = command
            .arguments
            .into_iter()
            .map(|argument| ArgumentDescriptor {
                name: argument.name,
                arity: argument.arity,
                help: argument.help,
            })
            .collect();

        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            id,
            parent,
            name: command.name,
            kind: command.kind,
            help: command.help,
            options,
            option_index,
            arguments,
            children: BTreeMap::new(),
            aliases: BTreeMap::new(),
        });

        let mut children = BTreeMap::new();
        for subcommand in command.subcommands {
            if children.contains_key(&subcommand.name) {
                return Err(GrammarError::DuplicateCommand {
                    parent: path,
                    name: subcommand.name,
                });
            }
            let name = subcommand.name.clone();
            let child = self.insert(subcommand, Some(id), &path)?;
            children.insert(name, child);
        }

        let mut aliases = BTreeMap::new();
        for (alias, target) in command.aliases {
            validate_command_name(&alias)?;
            if children.contains_key(&alias) || aliases.contains_key(&alias) {
                return Err(GrammarError::AliasCollision {
                    parent: path,
                    alias,
                });
            }
            let Some(&child) = children.get(&target) else {
                return Err(GrammarError::UnknownAliasTarget {
                    parent: path,
                    alias,
                    target,
                });
            };
            aliases.insert(alias, child);
        }

        let node = &mut self.nodes[id.0];
        node.children = children;
        node.aliases = aliases;
        Ok(id)
    }

    fn assemble_options(
        &mut self,
        declared: Vec<OptionBuilder>,
        path: &str,
    ) -> Result<(Vec<OptionDescriptor>, HashMap<String, usize>), GrammarError> {
        let mut options = Vec::with_capacity(declared.len());
        let mut index = HashMap::new();

        for option in declared {
            if option.names.is_empty() {
                return Err(GrammarError::UnnamedOption {
                    command: path.to_string(),
                });
            }

            let position = options.len();
            for name in option.names.iter().chain(option.secondary_names.iter()) {
                if !is_valid_option_name(name) {
                    return Err(GrammarError::InvalidOptionName {
                        command: path.to_string(),
                        name: name.clone(),
                    });
                }
                if index.insert(name.clone(), position).is_some() {
                    return Err(GrammarError::DuplicateOption {
                        command: path.to_string(),
                        name: name.clone(),
                    });
                }
            }

            let arity = match option.kind {
                OptionKind::Flag | OptionKind::Count => 0,
                OptionKind::Value if option.arity == 0 => {
                    return Err(GrammarError::InvalidArity {
                        command: path.to_string(),
                        option: option.names[0].clone(),
                    });
                }
                OptionKind::Value => option.arity,
            };

            options.push(OptionDescriptor {
                id: OptionId(self.next_option),
                names: option.names,
                secondary_names: option.secondary_names,
                kind: option.kind,
                arity,
                multiple: option.multiple,
                help: option.help,
            });
            self.next_option += 1;
        }

        Ok((options, index))
    }
}

fn validate_command_name(name: &str) -> Result<(), GrammarError> {
    if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
        return Err(GrammarError::InvalidCommandName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// `--long-name` or `-c`; no whitespace, no `=`
fn is_valid_option_name(name: &str) -> bool {
    if name.chars().any(|c| c.is_whitespace() || c == '=') {
        return false;
    }
    if let Some(long) = name.strip_prefix("--") {
        return !long.is_empty() && !long.starts_with('-');
    }
    match name.strip_prefix('-') {
        Some(short) => {
            let mut chars = short.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if c != '-')
        }
        None => false,
    }
}
