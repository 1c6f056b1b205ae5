//! Front-end adapters for the Armature scaffolder core.
//!
//! The core exposes two ports and stays library-agnostic; this crate plugs
//! real infrastructure into them:
//!
//! - [`ClapCommandParser`] renders the assembled command tree into a
//!   `clap::Command` and parses process arguments with it.
//! - [`DialoguerPrompter`] (behind the default-on `interactive` feature)
//!   renders parameters as terminal prompts.

pub mod clap_parser;

#[cfg(feature = "interactive")]
pub mod prompt;

pub use clap_parser::ClapCommandParser;

#[cfg(feature = "interactive")]
pub use prompt::DialoguerPrompter;
