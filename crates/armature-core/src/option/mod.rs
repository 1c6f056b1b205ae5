//! Typed scaffolder options with two read projections.
//!
//! A [`ScaffoldOption`] is a single value object declared once per logical
//! setting.  It is never consumed directly; instead it projects into
//!
//! - a [`FlagSpec`] the command parser adapter renders as a CLI flag, and
//! - a [`Parameter`] the interactive flow renders as a prompt.
//!
//! Both projections derive from the same fields, so a given invocation
//! resolves to the same value whichever front end produced it.  Keeping one
//! value object with two read paths (rather than two authored lists) is what
//! makes the dual front end cheap.

use std::marker::PhantomData;
use std::sync::OnceLock;

use crate::error::{CoreError, CoreResult};

pub mod values;
pub use values::{OptionValueKind, OptionValues};

// ── Projections ───────────────────────────────────────────────────────────────

/// How a flag or parameter carries its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Boolean switch; present/absent on the CLI, yes/no interactively.
    Switch,
    /// Free-form text.
    Text,
    /// Signed integer.
    Integer,
}

/// Which interactive prompt an option renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    /// Plain input matching the value kind.
    None,
    /// Yes/no confirmation.
    YesNo,
    /// Pick a type from the target project.
    Class,
    /// Pick a project manifest discovered on disk.
    Project,
    /// Pick from an enumerated value list supplied at declaration time.
    Custom,
}

/// Parser-library-agnostic flag definition.
///
/// `name` is the normalized long-flag name, without leading dashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub required: bool,
    pub description: Option<String>,
    pub value: ValueKind,
}

/// Interactive-picker descriptor derived from the same option fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Same normalized name as the CLI flag — the context key.
    pub name: String,
    pub display_name: String,
    pub required: bool,
    pub description: Option<String>,
    pub value: ValueKind,
    pub picker: PickerKind,
    pub custom_values: Vec<String>,
}

// ── The option value object ───────────────────────────────────────────────────

/// A typed, named configuration value exposed identically as a CLI flag and
/// an interactive parameter.  Immutable once built.
#[derive(Debug)]
pub struct ScaffoldOption<T: OptionValueKind> {
    display_name: String,
    cli_flag: Option<String>,
    required: bool,
    description: Option<String>,
    picker: PickerKind,
    custom_values: Vec<String>,
    flag: OnceLock<FlagSpec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: OptionValueKind> ScaffoldOption<T> {
    /// Start declaring an option.  The display name is mandatory; it doubles
    /// as the fallback source for the flag name.
    pub fn builder(display_name: impl Into<String>) -> OptionBuilder<T> {
        OptionBuilder {
            display_name: display_name.into(),
            cli_flag: None,
            required: false,
            description: None,
            picker: PickerKind::None,
            custom_values: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// The CLI flag definition, memoized: repeated calls return the same
    /// instance for the lifetime of the option.
    pub fn flag(&self) -> &FlagSpec {
        self.flag.get_or_init(|| FlagSpec {
            name: self.normalized_name(),
            required: self.required,
            description: self.description.clone(),
            value: T::KIND,
        })
    }

    /// The interactive-parameter descriptor, derived from the same fields as
    /// [`Self::flag`].
    pub fn parameter(&self) -> Parameter {
        Parameter {
            name: self.normalized_name(),
            display_name: self.display_name.clone(),
            required: self.required,
            description: self.description.clone(),
            value: T::KIND,
            picker: self.picker,
            custom_values: self.custom_values.clone(),
        }
    }

    /// Extract this option's typed value from a resolved value bag.
    ///
    /// Returns `None` when absent (legal for non-required options) or when
    /// the stored value has an incompatible shape.
    pub fn value_in(&self, values: &OptionValues) -> Option<T> {
        values
            .get(&self.normalized_name())
            .and_then(T::from_value)
    }

    fn normalized_name(&self) -> String {
        normalize_flag_name(self.cli_flag.as_deref().unwrap_or(&self.display_name))
    }
}

/// Erased view of an option, held by builders and the runner.
///
/// Typed reads go through the concrete [`ScaffoldOption`] handle the host
/// keeps; the erased form only serves flag/parameter projection.
pub trait OptionSpec: Send + Sync {
    fn display_name(&self) -> &str;
    fn required(&self) -> bool;
    fn flag(&self) -> &FlagSpec;
    fn parameter(&self) -> Parameter;
}

impl<T: OptionValueKind> OptionSpec for ScaffoldOption<T> {
    fn display_name(&self) -> &str {
        self.display_name()
    }

    fn required(&self) -> bool {
        self.required
    }

    fn flag(&self) -> &FlagSpec {
        self.flag()
    }

    fn parameter(&self) -> Parameter {
        self.parameter()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Builder for [`ScaffoldOption`].
pub struct OptionBuilder<T: OptionValueKind> {
    display_name: String,
    cli_flag: Option<String>,
    required: bool,
    description: Option<String>,
    picker: PickerKind,
    custom_values: Vec<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: OptionValueKind> OptionBuilder<T> {
    /// Override the flag name.  Leading dashes are tolerated and stripped.
    pub fn cli_flag(mut self, flag: impl Into<String>) -> Self {
        self.cli_flag = Some(flag.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn picker(mut self, picker: PickerKind) -> Self {
        self.picker = picker;
        self
    }

    /// Enumerate pickable values; implies [`PickerKind::Custom`].
    pub fn choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_values = values.into_iter().map(Into::into).collect();
        self.picker = PickerKind::Custom;
        self
    }

    pub fn build(self) -> CoreResult<ScaffoldOption<T>> {
        if self.display_name.trim().is_empty() {
            return Err(CoreError::MissingDisplayName);
        }
        if self.picker == PickerKind::Custom && self.custom_values.is_empty() {
            return Err(CoreError::EmptyCustomPicker {
                option: self.display_name,
            });
        }
        Ok(ScaffoldOption {
            display_name: self.display_name,
            cli_flag: self.cli_flag,
            required: self.required,
            description: self.description,
            picker: self.picker,
            custom_values: self.custom_values,
            flag: OnceLock::new(),
            _marker: PhantomData,
        })
    }
}

// ── Flag-name normalization ───────────────────────────────────────────────────

/// Derive a normalized long-flag name: lowercase, word breaks become single
/// dashes, anything else non-alphanumeric is dropped.
pub(crate) fn normalize_flag_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.trim().trim_start_matches('-').chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !name.is_empty() {
                name.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                name.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn text_option() -> ScaffoldOption<String> {
        ScaffoldOption::<String>::builder("Model Class")
            .description("Fully qualified model type")
            .required(true)
            .build()
            .expect("valid option")
    }

    #[test]
    fn flag_name_derived_from_display_name() {
        assert_eq!(text_option().flag().name, "model-class");
    }

    #[test]
    fn explicit_cli_flag_wins_over_display_name() {
        let opt = ScaffoldOption::<String>::builder("Model Class")
            .cli_flag("--model")
            .build()
            .expect("valid option");
        assert_eq!(opt.flag().name, "model");
    }

    #[test]
    fn normalization_collapses_separators() {
        assert_eq!(normalize_flag_name("Open  API support"), "open-api-support");
        assert_eq!(normalize_flag_name("--no-color"), "no-color");
        assert_eq!(normalize_flag_name("snake_case_name"), "snake-case-name");
    }

    #[test]
    fn flag_is_memoized() {
        let opt = text_option();
        let first = opt.flag() as *const FlagSpec;
        let second = opt.flag() as *const FlagSpec;
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn flag_and_parameter_stay_consistent() {
        let opt = text_option();
        let flag = opt.flag();
        let parameter = opt.parameter();
        assert_eq!(flag.name, parameter.name);
        assert_eq!(flag.required, parameter.required);
        assert_eq!(flag.value, parameter.value);
        assert_eq!(flag.description, parameter.description);
    }

    #[test]
    fn empty_display_name_is_a_build_error() {
        let result = ScaffoldOption::<String>::builder("   ").build();
        assert!(matches!(result, Err(CoreError::MissingDisplayName)));
    }

    #[test]
    fn custom_picker_requires_values() {
        let result = ScaffoldOption::<String>::builder("Provider")
            .picker(PickerKind::Custom)
            .build();
        assert!(matches!(result, Err(CoreError::EmptyCustomPicker { .. })));
    }

    #[test]
    fn choices_imply_custom_picker() {
        let opt = ScaffoldOption::<String>::builder("Provider")
            .choices(["postgres", "sqlite"])
            .build()
            .expect("valid option");
        let parameter = opt.parameter();
        assert_eq!(parameter.picker, PickerKind::Custom);
        assert_eq!(parameter.custom_values, vec!["postgres", "sqlite"]);
    }

    #[test]
    fn value_extraction_uses_normalized_name() {
        let opt = text_option();
        let mut values = OptionValues::new();
        values.insert("model-class", Value::String("Invoice".into()));
        assert_eq!(opt.value_in(&values), Some("Invoice".to_string()));
    }

    #[test]
    fn absent_value_reads_as_none() {
        let opt = text_option();
        assert_eq!(opt.value_in(&OptionValues::new()), None);
    }

    #[test]
    fn switch_options_project_switch_kind() {
        let opt = ScaffoldOption::<bool>::builder("Verbose")
            .build()
            .expect("valid option");
        assert_eq!(opt.flag().value, ValueKind::Switch);
    }
}
