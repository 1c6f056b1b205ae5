//! The shared per-run property bag.
//!
//! One context exists per scaffolder execution.  It carries the resolved
//! option values for the invocation plus a string-keyed bag steps use to pass
//! data downstream.  The key namespace is an informal contract between step
//! authors; the core enforces nothing about it.
//!
//! Contexts are never reused: a new run gets a new context (and a new run
//! id), and the bag is dropped with the run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::option::{OptionValueKind, OptionValues, ScaffoldOption};

/// Mutable state shared by all steps of one scaffolder run.
#[derive(Debug)]
pub struct ScaffoldContext {
    run_id: Uuid,
    scaffolder: String,
    started_at: DateTime<Utc>,
    properties: HashMap<String, Value>,
    values: OptionValues,
}

impl ScaffoldContext {
    /// Create the context for one run, seeded with the invocation's resolved
    /// option values (CLI-parsed or interactively picked — the context does
    /// not know which).
    pub fn new(scaffolder: impl Into<String>, values: OptionValues) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            scaffolder: scaffolder.into(),
            started_at: Utc::now(),
            properties: HashMap::new(),
            values,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn scaffolder(&self) -> &str {
        &self.scaffolder
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // ── Property bag ──────────────────────────────────────────────────────

    /// Write a property for downstream steps.  Overwrites silently.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Deserialize a property into a concrete type.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.properties
            .get(key)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    // ── Option results ────────────────────────────────────────────────────

    /// Resolve a previously-declared option to its value for this invocation.
    ///
    /// This is the single accessor both front ends feed: a value parsed from
    /// `--flag` and the same value picked interactively land under the same
    /// key and read back identically.
    pub fn option<T: OptionValueKind>(&self, option: &ScaffoldOption<T>) -> Option<T> {
        option.value_in(&self.values)
    }

    /// The raw resolved values for this invocation.
    pub fn option_values(&self) -> &OptionValues {
        &self.values
    }
}
