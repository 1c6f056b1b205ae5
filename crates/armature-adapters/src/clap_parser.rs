//! Clap-backed implementation of the core's `CommandParser` port.
//!
//! The command surface is data (a [`CommandTree`] assembled by the runner),
//! so this adapter uses clap's builder API rather than the derive macros:
//! one root command, one sub-command per category, one leaf per scaffolder,
//! flags rendered from the core's [`FlagSpec`] projections.

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use tracing::debug;

use armature_core::prelude::*;

/// Parses process arguments against a rendered command tree.
pub struct ClapCommandParser;

impl ClapCommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Render the tree into a `clap::Command`.
    fn build_command(tree: &CommandTree) -> Command {
        let mut root = Command::new(tree.root.clone())
            .about(tree.about.clone())
            .subcommand_required(true)
            .arg_required_else_help(true);
        if !tree.version.is_empty() {
            root = root.version(tree.version.clone());
        }

        // Global flags live on the root and propagate to every leaf.  Clap
        // forbids required globals, so required-ness is dropped here; the
        // runner re-validates required options before any step runs.
        for flag in &tree.global_flags {
            root = root.arg(Self::render_flag(flag).required(false).global(true));
        }

        for branch in &tree.branches {
            let mut category_cmd = Command::new(branch.category.command_name())
                .about(branch.about.clone())
                .subcommand_required(true)
                .arg_required_else_help(true);

            for leaf in &branch.leaves {
                let mut leaf_cmd = Command::new(leaf.name.clone()).about(leaf.about.clone());
                for flag in Self::leaf_only_flags(tree, leaf) {
                    leaf_cmd = leaf_cmd.arg(Self::render_flag(flag).required(flag.required));
                }
                category_cmd = category_cmd.subcommand(leaf_cmd);
            }
            root = root.subcommand(category_cmd);
        }
        root
    }

    /// Leaf flags that do not collide with a global flag.  A collision is not
    /// an error: the root definition wins and both resolve to the same key.
    fn leaf_only_flags<'a>(tree: &'a CommandTree, leaf: &'a LeafCommand) -> Vec<&'a FlagSpec> {
        leaf.flags
            .iter()
            .filter(|flag| tree.global_flags.iter().all(|g| g.name != flag.name))
            .collect()
    }

    fn render_flag(flag: &FlagSpec) -> Arg {
        let mut arg = Arg::new(flag.name.clone()).long(flag.name.clone());
        if let Some(description) = &flag.description {
            arg = arg.help(description.clone());
        }
        match flag.value {
            ValueKind::Switch => arg.action(ArgAction::SetTrue),
            ValueKind::Text => arg
                .action(ArgAction::Set)
                .value_name(flag.name.to_uppercase().replace('-', "_")),
            ValueKind::Integer => arg
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(i64))
                .value_name("N"),
        }
    }

    /// Pull every effective flag's value out of the leaf matches (global
    /// flags propagate down, so one matches object sees them all).
    fn collect_values(
        tree: &CommandTree,
        leaf: &LeafCommand,
        matches: &ArgMatches,
    ) -> OptionValues {
        let mut values = OptionValues::new();
        let effective = tree
            .global_flags
            .iter()
            .chain(Self::leaf_only_flags(tree, leaf));
        for flag in effective {
            match flag.value {
                ValueKind::Switch => {
                    values.insert(flag.name.clone(), Value::Bool(matches.get_flag(&flag.name)));
                }
                ValueKind::Text => {
                    if let Some(text) = matches.get_one::<String>(&flag.name) {
                        values.insert(flag.name.clone(), Value::String(text.clone()));
                    }
                }
                ValueKind::Integer => {
                    if let Some(number) = matches.get_one::<i64>(&flag.name) {
                        values.insert(flag.name.clone(), Value::from(*number));
                    }
                }
            }
        }
        values
    }
}

impl Default for ClapCommandParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandParser for ClapCommandParser {
    fn parse(&self, tree: &CommandTree, args: &[String]) -> CoreResult<ParseOutcome> {
        let command = Self::build_command(tree);
        let argv = std::iter::once(tree.root.clone()).chain(args.iter().cloned());

        let matches = match command.try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        Ok(ParseOutcome::Rendered {
                            message: e.render().to_string(),
                            code: e.exit_code(),
                        })
                    }
                    _ => Err(CoreError::InvalidArguments {
                        message: e.render().to_string(),
                    }),
                };
            }
        };

        let (category_name, category_matches) =
            matches
                .subcommand()
                .ok_or_else(|| CoreError::InvalidArguments {
                    message: "no category given".into(),
                })?;
        let category =
            Category::from_command_name(category_name).ok_or_else(|| CoreError::Internal {
                message: format!("parsed unknown category '{category_name}'"),
            })?;

        let (leaf_name, leaf_matches) =
            category_matches
                .subcommand()
                .ok_or_else(|| CoreError::InvalidArguments {
                    message: format!("no scaffolder given under '{category_name}'"),
                })?;
        let leaf = tree
            .leaf(category, leaf_name)
            .ok_or_else(|| CoreError::Internal {
                message: format!("parsed unknown scaffolder '{leaf_name}'"),
            })?;

        let values = Self::collect_values(tree, leaf, leaf_matches);
        debug!(
            category = %category,
            scaffolder = leaf_name,
            values = values.len(),
            "Arguments parsed"
        );
        Ok(ParseOutcome::Invocation(Invocation {
            category,
            scaffolder: leaf_name.to_string(),
            values,
        }))
    }
}
