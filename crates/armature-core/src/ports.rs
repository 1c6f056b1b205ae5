//! Front-end ports.
//!
//! The runner drives two front ends through these traits and never learns
//! which libraries sit behind them: a command parser renders and parses the
//! assembled [`CommandTree`], and a parameter prompter carries the
//! interactive flow.  Implementations live in the adapters crate.

use serde_json::Value;

use crate::category::Category;
use crate::command::CommandTree;
use crate::error::CoreResult;
use crate::option::{OptionValues, Parameter};

/// A fully parsed command line: which scaffolder to run, with which values.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub category: Category,
    pub scaffolder: String,
    /// Global and leaf values merged under normalized flag names.
    pub values: OptionValues,
}

/// What parsing produced: either a scaffolder to run, or output the parser
/// already rendered (help, version, usage errors with a preferred exit code).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Invocation(Invocation),
    Rendered { message: String, code: i32 },
}

/// Argument-parsing port.
///
/// `args` excludes the binary name.  Implementations report malformed input
/// through [`crate::error::CoreError::InvalidArguments`]; `--help` and
/// friends come back as [`ParseOutcome::Rendered`] rather than errors.
#[cfg_attr(test, mockall::automock)]
pub trait CommandParser: Send + Sync {
    fn parse(&self, tree: &CommandTree, args: &[String]) -> CoreResult<ParseOutcome>;
}

/// Interactive-flow port.
///
/// The runner owns the flow (pick category → pick scaffolder → one prompt
/// per parameter); the prompter only renders individual interactions.
pub trait ParameterPrompter: Send + Sync {
    /// Pick one item from a list; returns the index.
    fn select(&self, prompt: &str, items: &[String]) -> CoreResult<usize>;

    /// Prompt for one parameter according to its picker kind.
    ///
    /// Returns `Value::Null` when an optional parameter is left unanswered.
    fn choose(&self, parameter: &Parameter) -> CoreResult<Value>;
}
