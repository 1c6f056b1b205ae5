//! Parser-agnostic command-tree model.
//!
//! The runner assembles this tree from its scaffolder catalogue; a parser
//! adapter (clap in the shipped adapters crate) renders it into a real
//! argument parser.  Keeping the model here means the core never links
//! against a parser library, mirroring how the rest of the crate exposes
//! ports instead of concrete infrastructure.

use crate::category::Category;
use crate::option::FlagSpec;

/// The whole command surface: one root, one branch per category, one leaf
/// per scaffolder.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTree {
    /// Root command name (the binary name).
    pub root: String,
    pub about: String,
    pub version: String,
    /// Flags attached at the root and inherited by every leaf.
    pub global_flags: Vec<FlagSpec>,
    pub branches: Vec<CategoryBranch>,
}

/// One category sub-command grouping related scaffolders.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBranch {
    pub category: Category,
    pub about: String,
    pub leaves: Vec<LeafCommand>,
}

/// One scaffolder rendered as a leaf command.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafCommand {
    /// Lower-cased scaffolder name.
    pub name: String,
    pub about: String,
    pub flags: Vec<FlagSpec>,
}

impl CommandTree {
    /// Find a leaf by category and lower-cased name.
    pub fn leaf(&self, category: Category, name: &str) -> Option<&LeafCommand> {
        self.branches
            .iter()
            .find(|b| b.category == category)
            .and_then(|b| b.leaves.iter().find(|l| l.name == name))
    }
}
