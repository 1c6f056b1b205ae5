//! Unified error handling for the scaffolder core.
//!
//! Build-time wiring defects (unresolved steps, double builds, using the
//! runner before its command tree exists) are kept apart from user input
//! problems and from step failures: the former abort startup, the latter are
//! rendered with suggestions by the CLI layer.

use thiserror::Error;

use crate::category::Category;
use crate::step::StepFailure;

/// Root error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An option was declared without a display name.  The display name is
    /// mandatory: it is also the fallback source for the CLI flag name.
    #[error("option declared without a display name")]
    MissingDisplayName,

    /// A custom picker was declared with an empty value list.
    #[error("option '{option}' uses a custom picker but has no values to pick from")]
    EmptyCustomPicker { option: String },

    /// A scaffolder references a step type nobody registered.  There is no
    /// partial scaffolder; this aborts the build.
    #[error("scaffolder '{scaffolder}' uses step '{step}' which is not registered")]
    UnresolvedStep {
        step: &'static str,
        scaffolder: String,
    },

    /// `RunnerBuilder::build` was called a second time.
    #[error("the runner has already been built; build() is one-shot")]
    AlreadyBuilt,

    /// The runner was used before its command tree was assembled.
    #[error("runner used before its command tree was assembled")]
    NotAssembled,

    /// The CLI path was taken but no command parser was injected.
    #[error("no command parser configured")]
    ParserNotConfigured,

    /// The interactive path was taken but no prompter was injected.
    #[error("interactive mode is not available: no prompter configured")]
    PrompterNotConfigured,

    /// Argument parsing failed before any step ran.
    #[error("{message}")]
    InvalidArguments { message: String },

    /// No scaffolder matches the requested category + name pair.
    #[error("no scaffolder named '{name}' under category '{category}'")]
    UnknownScaffolder { category: Category, name: String },

    /// A required option has no resolved value for this invocation.
    #[error("missing required option '--{flag}'")]
    MissingRequiredOption { flag: String },

    /// A step reported failure; the pipeline halted there.
    #[error("step '{step}' failed after {completed} completed step(s)")]
    StepFailed {
        step: String,
        completed: usize,
        #[source]
        source: StepFailure,
    },

    /// The run was cancelled between steps.  Distinct from a step failure.
    #[error("operation cancelled")]
    Cancelled,

    /// Interactive prompting failed (terminal gone, I/O error).
    #[error("prompt failed: {message}")]
    Prompt { message: String },

    /// Unexpected internal errors (bugs).
    #[error("internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl CoreError {
    /// Get the error category for exit-code mapping and styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingDisplayName
            | Self::EmptyCustomPicker { .. }
            | Self::UnresolvedStep { .. }
            | Self::AlreadyBuilt
            | Self::NotAssembled
            | Self::ParserNotConfigured
            | Self::PrompterNotConfigured => ErrorCategory::Configuration,
            Self::InvalidArguments { .. } | Self::MissingRequiredOption { .. } => {
                ErrorCategory::UserInput
            }
            Self::UnknownScaffolder { .. } => ErrorCategory::NotFound,
            Self::StepFailed { .. } => ErrorCategory::Execution,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Prompt { .. } | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnresolvedStep { step, scaffolder } => vec![
                format!("Register '{step}' on the runner builder's services before declaring '{scaffolder}'"),
                "Every step type used by with_step must have a registered factory".into(),
            ],
            Self::AlreadyBuilt => vec![
                "build() may only be called once per process".into(),
                "Create a new RunnerBuilder if you need a second runner".into(),
            ],
            Self::InvalidArguments { .. } => {
                vec!["Use --help for usage information".into()]
            }
            Self::UnknownScaffolder { category, .. } => vec![
                format!("Run with '{category} --help' to list the scaffolders in this category"),
                "Run with --help to see all categories".into(),
            ],
            Self::MissingRequiredOption { flag } => vec![
                format!("Pass a value with --{flag} <VALUE>"),
                "Run the bare command for the interactive flow, which prompts for required values".into(),
            ],
            Self::StepFailed { .. } => vec![
                "Earlier steps are not rolled back; inspect the output directory before retrying".into(),
                "Re-run with --verbose for step-level diagnostics".into(),
            ],
            Self::Cancelled => vec!["No further steps were started".into()],
            Self::Internal { .. } => {
                vec!["This appears to be a bug in armature; please report it".into()]
            }
            _ => Vec::new(),
        }
    }
}

/// Error categories for exit codes and UI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    UserInput,
    NotFound,
    Execution,
    Cancelled,
    Internal,
}

/// Convenient result type alias.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_defects_are_configuration_errors() {
        assert_eq!(
            CoreError::AlreadyBuilt.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            CoreError::NotAssembled.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            CoreError::UnresolvedStep {
                step: "DemoStep",
                scaffolder: "demo".into()
            }
            .category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn cancelled_is_not_an_execution_failure() {
        assert_eq!(CoreError::Cancelled.category(), ErrorCategory::Cancelled);
    }

    #[test]
    fn missing_option_suggests_the_flag() {
        let err = CoreError::MissingRequiredOption {
            flag: "name".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--name")));
    }

    #[test]
    fn unresolved_step_names_both_sides() {
        let err = CoreError::UnresolvedStep {
            step: "EmitArtifactStep",
            scaffolder: "controller".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("EmitArtifactStep"));
        assert!(rendered.contains("controller"));
    }
}
