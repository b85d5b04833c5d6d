//! Command grammar model
//!
//! A [`Grammar`] is an immutable tree of [`CommandNode`]s stored in an arena
//! and addressed by [`NodeId`]. Every node exposes its own options (keyed by
//! every accepted name), its positional arguments, its children and the
//! aliases of those children.
//!
//! Grammars are assembled through [`GrammarBuilder`] (or loaded from a TOML
//! file through [`loader`]) and are read-only afterwards, so a single
//! `Arc<Grammar>` can serve any number of completion requests at once.
//!
//! # Example
//!
//! ```rust
//! use cmdtree::grammar::{CommandBuilder, GrammarBuilder, OptionBuilder};
//!
//! let grammar = GrammarBuilder::new(
//!     CommandBuilder::group("myapp")
//!         .option(OptionBuilder::flag(["--verbose", "-v"]))
//!         .subcommand_with_aliases(
//!             CommandBuilder::leaf("serve").option(OptionBuilder::value(["--port", "-p"])),
//!             ["s"],
//!         ),
//! )
//! .build()
//! .unwrap();
//!
//! let serve = grammar.resolve_subcommand(grammar.root(), "s").unwrap();
//! assert_eq!(grammar.node(serve).name(), "serve");
//! ```

pub mod builder;
pub mod loader;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::{ArgumentBuilder, CommandBuilder, GrammarBuilder, OptionBuilder};
pub use loader::{ArgumentSpec, CommandSpec, OptionSpec, load_grammar, parse_grammar};

/// Index of a command node inside its [`Grammar`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Grammar-wide identifier of an option descriptor.
///
/// All names of one option (short, long and secondary) share the same id,
/// which is what "already used" tracking keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl OptionId {
    /// Position of the option in declaration order across the grammar
    pub fn index(self) -> usize {
        self.0
    }
}

/// Role of an option
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Zero-arity boolean switch
    Flag,

    /// Zero-arity switch that increments a counter and may repeat freely
    Count,

    /// Option consuming `arity` value tokens
    #[default]
    Value,
}

/// Whether a command dispatches to subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Terminal command
    Leaf,

    /// Command group with children
    Group,
}

/// One declared option of a command node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub(crate) id: OptionId,
    pub(crate) names: Vec<String>,
    pub(crate) secondary_names: Vec<String>,
    pub(crate) kind: OptionKind,
    pub(crate) arity: usize,
    pub(crate) multiple: bool,
    pub(crate) help: Option<String>,
}

impl OptionDescriptor {
    pub fn id(&self) -> OptionId {
        self.id
    }

    /// Primary names, e.g. `--verbose` and `-v`
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Secondary (negating) names, e.g. `--no-verbose`
    pub fn secondary_names(&self) -> &[String] {
        &self.secondary_names
    }

    /// Primary names followed by secondary names
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .chain(self.secondary_names.iter())
            .map(String::as_str)
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Number of value tokens consumed; zero for flags and counters
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_flag(&self) -> bool {
        self.kind == OptionKind::Flag
    }

    pub fn is_counting(&self) -> bool {
        self.kind == OptionKind::Count
    }

    /// Declared as `multiple`
    pub fn is_repeatable(&self) -> bool {
        self.multiple
    }

    pub fn takes_values(&self) -> bool {
        self.kind == OptionKind::Value
    }

    /// Whether one occurrence removes the option from further completion
    pub fn is_single_use(&self) -> bool {
        !(self.multiple || self.is_counting())
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Name used when reporting the option: the first long name, else the first name
    pub fn canonical_name(&self) -> &str {
        self.names
            .iter()
            .find(|name| name.starts_with("--"))
            .or_else(|| self.names.first())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// A positional parameter. Never completed; kept for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub(crate) name: String,
    pub(crate) arity: usize,
    pub(crate) help: Option<String>,
}

impl ArgumentDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// One command or command group
#[derive(Debug, Clone)]
pub struct CommandNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: String,
    pub(crate) kind: CommandKind,
    pub(crate) help: Option<String>,
    pub(crate) options: Vec<OptionDescriptor>,
    /// Every accepted name -> position in `options`
    pub(crate) option_index: HashMap<String, usize>,
    pub(crate) arguments: Vec<ArgumentDescriptor>,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) aliases: BTreeMap<String, NodeId>,
}

impl CommandNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn is_group(&self) -> bool {
        self.kind == CommandKind::Group
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    pub fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.arguments
    }

    /// Look up an option by any of its accepted names
    pub fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.option_index.get(name).map(|&idx| &self.options[idx])
    }

    /// Child names in sorted order
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Alias names in sorted order
    pub fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// Aliases pointing at the given child
    pub fn aliases_of(&self, child: NodeId) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|(_, target)| **target == child)
            .map(|(alias, _)| alias.as_str())
            .collect()
    }

    /// Resolve a child by name first, then by alias
    pub fn resolve(&self, word: &str) -> Option<NodeId> {
        self.children
            .get(word)
            .or_else(|| self.aliases.get(word))
            .copied()
    }
}

/// Flattened view of one node's options, keyed by every accepted name
#[derive(Debug, Clone, Copy)]
pub struct OptionTable<'g> {
    node: &'g CommandNode,
}

impl<'g> OptionTable<'g> {
    /// Resolve an exact option name such as `--port` or `-p`
    pub fn get(&self, name: &str) -> Option<&'g OptionDescriptor> {
        self.node.option(name)
    }

    /// Resolve a single-character short option
    pub fn short(&self, ch: char) -> Option<&'g OptionDescriptor> {
        let mut name = String::with_capacity(1 + ch.len_utf8());
        name.push('-');
        name.push(ch);
        self.get(&name)
    }

    /// `(name, descriptor)` pairs in declaration order, primary names first
    pub fn entries(&self) -> impl Iterator<Item = (&'g str, &'g OptionDescriptor)> + use<'g> {
        let node = self.node;
        node.options
            .iter()
            .flat_map(|option| option.all_names().map(move |name| (name, option)))
    }

    pub fn len(&self) -> usize {
        self.node.option_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.option_index.is_empty()
    }
}

/// Immutable command tree
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) nodes: Vec<CommandNode>,
    pub(crate) root: NodeId,
}

impl Grammar {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &CommandNode {
        self.node(self.root)
    }

    /// Node lookup. Ids are only handed out by this grammar, so lookup is infallible.
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    /// Number of command nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandNode> {
        self.nodes.iter()
    }

    /// Names from the root down to `id`
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            path.push(node.name());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Every accepted option name of `id` (not inherited) mapped to its descriptor
    pub fn options_of(&self, id: NodeId) -> OptionTable<'_> {
        OptionTable {
            node: self.node(id),
        }
    }

    /// Child names of `id`, followed by the sorted aliases when requested
    pub fn subcommands_of(&self, id: NodeId, include_aliases: bool) -> Vec<&str> {
        let node = self.node(id);
        let mut names: Vec<&str> = node.child_names().collect();
        if include_aliases {
            names.extend(node.alias_names());
        }
        names
    }

    /// Resolve `word` as a child of `id`, by name first, then by alias
    pub fn resolve_subcommand(&self, id: NodeId, word: &str) -> Option<NodeId> {
        self.node(id).resolve(word)
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        let indent = "  ".repeat(depth);

        write!(f, "{indent}{}", node.name)?;
        if let Some(parent) = node.parent {
            let aliases = self.node(parent).aliases_of(id);
            if !aliases.is_empty() {
                write!(f, " ({})", aliases.join(", "))?;
            }
        }
        if let Some(help) = &node.help {
            write!(f, "  - {help}")?;
        }
        writeln!(f)?;

        for option in &node.options {
            let names: Vec<&str> = option.all_names().collect();
            write!(f, "{indent}  {}", names.join(", "))?;
            match option.kind {
                OptionKind::Flag => write!(f, " [flag]")?,
                OptionKind::Count => write!(f, " [count]")?,
                OptionKind::Value => write!(f, " <{}>", option.arity)?,
            }
            if option.multiple {
                write!(f, " [multiple]")?;
            }
            writeln!(f)?;
        }
        for argument in &node.arguments {
            writeln!(f, "{indent}  {} <{}>", argument.name.to_uppercase(), argument.arity)?;
        }
        for &child in node.children.values() {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}
