//! Dialoguer-backed implementation of the core's `ParameterPrompter` port.
//!
//! Each parameter's picker kind decides the prompt: yes/no confirmations,
//! enumerated selects, free input with required-ness validation, and a
//! project picker fed by manifest discovery on disk.

use std::path::{Path, PathBuf};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input, Select};
use serde_json::Value;
use tracing::debug;

use armature_core::prelude::*;

/// Project manifests the project picker looks for.
const MANIFEST_NAMES: [&str; 5] = [
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
    "composer.json",
];

/// Terminal prompter for the interactive flow.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
    project_root: PathBuf,
    search_depth: usize,
}

impl DialoguerPrompter {
    /// Prompter scanning `project_root` (to `search_depth` levels) when a
    /// parameter asks for a project picker.
    pub fn new(project_root: impl Into<PathBuf>, search_depth: usize) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            project_root: project_root.into(),
            search_depth,
        }
    }

    fn prompt_text(parameter: &Parameter) -> String {
        match &parameter.description {
            Some(description) => format!("{} ({description})", parameter.display_name),
            None => parameter.display_name.clone(),
        }
    }

    fn confirm(&self, prompt: &str) -> CoreResult<Value> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_error)?;
        Ok(Value::Bool(answer))
    }

    fn input(&self, parameter: &Parameter) -> CoreResult<Value> {
        let text: String = Input::with_theme(&self.theme)
            .with_prompt(Self::prompt_text(parameter))
            .allow_empty(!parameter.required)
            .interact_text()
            .map_err(prompt_error)?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        match parameter.value {
            ValueKind::Integer => {
                text.parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| CoreError::Prompt {
                        message: format!(
                            "'{text}' is not a valid integer for {}",
                            parameter.display_name
                        ),
                    })
            }
            _ => Ok(Value::String(text)),
        }
    }

    fn pick_from(&self, parameter: &Parameter, items: &[String]) -> CoreResult<Value> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(Self::prompt_text(parameter))
            .items(items)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(Value::String(items[index].clone()))
    }

    fn pick_project(&self, parameter: &Parameter) -> CoreResult<Value> {
        let manifests = discover_manifests(&self.project_root, self.search_depth);
        debug!(
            root = %self.project_root.display(),
            found = manifests.len(),
            "Project manifests discovered"
        );
        if manifests.is_empty() {
            // Nothing to pick from; fall back to free input.
            return self.input(parameter);
        }
        let index = FuzzySelect::with_theme(&self.theme)
            .with_prompt(Self::prompt_text(parameter))
            .items(&manifests)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(Value::String(manifests[index].clone()))
    }
}

impl ParameterPrompter for DialoguerPrompter {
    fn select(&self, prompt: &str, items: &[String]) -> CoreResult<usize> {
        FuzzySelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(prompt_error)
    }

    fn choose(&self, parameter: &Parameter) -> CoreResult<Value> {
        match parameter.picker {
            PickerKind::YesNo => self.confirm(&Self::prompt_text(parameter)),
            PickerKind::Custom => self.pick_from(parameter, &parameter.custom_values),
            PickerKind::Project => self.pick_project(parameter),
            PickerKind::Class | PickerKind::None => match parameter.value {
                ValueKind::Switch => self.confirm(&Self::prompt_text(parameter)),
                _ => self.input(parameter),
            },
        }
    }
}

fn prompt_error(err: dialoguer::Error) -> CoreError {
    CoreError::Prompt {
        message: err.to_string(),
    }
}

/// Walk `root` looking for known project manifests, returned as displayable
/// paths in discovery order.
pub fn discover_manifests(root: &Path, max_depth: usize) -> Vec<String> {
    walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| MANIFEST_NAMES.contains(&name))
        })
        .map(|entry| entry.path().display().to_string())
        .collect()
}
