//! Scaffolder categories.
//!
//! A category is purely a grouping label: it decides which command-tree
//! branch a scaffolder hangs under and how related scaffolders are presented
//! together.  It plays no part in execution semantics.

use std::fmt;

/// Closed set of command-tree branches scaffolders are grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// API surfaces: controllers, minimal endpoints.
    Api,
    /// Server-rendered pages and views.
    Pages,
    /// Reusable UI components.
    Components,
    /// Data access: repositories, database wiring.
    Data,
    /// Authentication and identity wiring.
    Identity,
}

impl Category {
    /// Every category, in presentation order.
    pub const ALL: [Category; 5] = [
        Category::Api,
        Category::Pages,
        Category::Components,
        Category::Data,
        Category::Identity,
    ];

    /// The sub-command name this category renders as.
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Pages => "pages",
            Self::Components => "components",
            Self::Data => "data",
            Self::Identity => "identity",
        }
    }

    /// One-line help text for the category branch.
    pub const fn about(self) -> &'static str {
        match self {
            Self::Api => "Scaffold API controllers and endpoints",
            Self::Pages => "Scaffold server-rendered pages",
            Self::Components => "Scaffold UI components",
            Self::Data => "Scaffold data-access code",
            Self::Identity => "Scaffold identity and authentication wiring",
        }
    }

    /// Look a category up by its sub-command name.
    pub fn from_command_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.command_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())
    }
}
