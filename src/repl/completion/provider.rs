//! Grammar access for the completion engine
//!
//! The engine only asks three questions of a grammar: which options a
//! command accepts, which subcommands it offers and which child a word
//! selects. [`GrammarProvider`] is that seam.

use std::sync::Arc;

use crate::grammar::{Grammar, NodeId, OptionDescriptor};

/// Read-only queries the completion walk needs
pub trait GrammarProvider: Send + Sync {
    /// Root command node
    fn root(&self) -> NodeId;

    /// Every accepted option name of `node` with its descriptor, in declaration order
    fn options_of(&self, node: NodeId) -> Vec<(&str, &OptionDescriptor)>;

    /// Look up one option of `node` by exact name
    fn option(&self, node: NodeId, name: &str) -> Option<&OptionDescriptor>;

    /// Look up the `-c` style option of `node` for one cluster character
    fn short_option(&self, node: NodeId, flag: char) -> Option<&OptionDescriptor>;

    /// Child names of `node` (sorted), followed by sorted aliases if enabled
    fn subcommands_of(&self, node: NodeId) -> Vec<&str>;

    /// Whether `node` dispatches to subcommands
    fn is_group(&self, node: NodeId) -> bool;

    /// Child of `node` selected by `word`, by name first, then by alias
    fn resolve_subcommand(&self, node: NodeId, word: &str) -> Option<NodeId>;

    /// Help text of the subcommand `word` selects, if any
    fn describe_subcommand(&self, node: NodeId, word: &str) -> Option<&str>;

    /// Full command path from the root to `node`
    fn path(&self, node: NodeId) -> Vec<&str>;
}

/// Provider over an in-memory [`Grammar`]
#[derive(Debug, Clone)]
pub struct StaticGrammarProvider {
    grammar: Arc<Grammar>,
    use_aliases: bool,
}

impl StaticGrammarProvider {
    /// Create a new provider
    ///
    /// # Arguments
    /// * `grammar` - Shared grammar
    /// * `use_aliases` - Whether aliases are offered and accepted as subcommands
    pub fn new(grammar: Arc<Grammar>, use_aliases: bool) -> Self {
        Self {
            grammar,
            use_aliases,
        }
    }
}

impl GrammarProvider for StaticGrammarProvider {
    fn root(&self) -> NodeId {
        self.grammar.root()
    }

    fn options_of(&self, node: NodeId) -> Vec<(&str, &OptionDescriptor)> {
        self.grammar.options_of(node).entries().collect()
    }

    fn option(&self, node: NodeId, name: &str) -> Option<&OptionDescriptor> {
        self.grammar.options_of(node).get(name)
    }

    fn short_option(&self, node: NodeId, flag: char) -> Option<&OptionDescriptor> {
        self.grammar.options_of(node).short(flag)
    }

    fn subcommands_of(&self, node: NodeId) -> Vec<&str> {
        self.grammar.subcommands_of(node, self.use_aliases)
    }

    fn is_group(&self, node: NodeId) -> bool {
        self.grammar.node(node).is_group()
    }

    fn resolve_subcommand(&self, node: NodeId, word: &str) -> Option<NodeId> {
        let parent = self.grammar.node(node);
        if self.use_aliases {
            parent.resolve(word)
        } else {
            parent.children.get(word).copied()
        }
    }

    fn describe_subcommand(&self, node: NodeId, word: &str) -> Option<&str> {
        self.resolve_subcommand(node, word)
            .and_then(|child| self.grammar.node(child).help())
    }

    fn path(&self, node: NodeId) -> Vec<&str> {
        self.grammar.path(node)
    }
}
