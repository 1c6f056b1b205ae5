//! Resolved option values for one invocation.
//!
//! Values travel as [`serde_json::Value`] keyed by normalized flag name, no
//! matter which front end produced them: the CLI parser adapter and the
//! interactive prompter both feed the same bag, which is why a scaffolder
//! run cannot tell the two apart.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

use super::ValueKind;

/// Marker + conversion trait for the value types an option may carry.
pub trait OptionValueKind: Sized + Send + Sync + 'static {
    /// How a flag/parameter for this type is rendered and parsed.
    const KIND: ValueKind;

    /// Extract a typed value from its wire form, if compatible.
    fn from_value(value: &Value) -> Option<Self>;

    /// Convert a typed value into its wire form.
    fn into_value(self) -> Value;
}

impl OptionValueKind for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl OptionValueKind for bool {
    const KIND: ValueKind = ValueKind::Switch;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl OptionValueKind for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl OptionValueKind for PathBuf {
    const KIND: ValueKind = ValueKind::Text;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(PathBuf::from)
    }

    fn into_value(self) -> Value {
        Value::String(self.display().to_string())
    }
}

/// The resolved values of one invocation, keyed by normalized flag name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionValues(HashMap<String, Value>);

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resolved value under its normalized flag name.
    pub fn insert(&mut self, flag: impl Into<String>, value: Value) {
        self.0.insert(flag.into(), value);
    }

    pub fn get(&self, flag: &str) -> Option<&Value> {
        self.0.get(flag)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.contains_key(flag)
    }

    /// Overlay these values on top of `base`.
    ///
    /// Keys present on both sides resolve to `self`'s value: scaffolder-local
    /// options shadow global options with the same normalized name.
    pub fn merged_over(self, base: OptionValues) -> OptionValues {
        let mut merged = base.0;
        merged.extend(self.0);
        OptionValues(merged)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for OptionValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
