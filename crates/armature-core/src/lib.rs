//! Armature Core - Scaffolder Pipeline Framework
//!
//! This crate provides the pipeline/builder framework for the Armature
//! scaffolding tool: a host declares named scaffolders composed of ordered
//! steps, and gets a CLI command tree and an interactive flow assembled from
//! the same declarations.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          armature-cli (host)            │
//! │   (wires steps, options, scaffolders)   │
//! └──────────────────┬──────────────────────┘
//!                    │ composes via
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │             RunnerBuilder               │
//! │  registry + scaffolder catalogue +      │
//! │  global options  →  one-shot build()    │
//! └──────────────────┬──────────────────────┘
//!                    │ produces
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │                Runner                   │
//! │  command tree · CLI + interactive       │
//! │  front ends · one execute loop          │
//! └──────────────────┬──────────────────────┘
//!                    │ drives
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   Scaffolder: pre → execute → post      │
//! │   per step, in declaration order,       │
//! │   over one shared ScaffoldContext       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Parsing and prompting are ports ([`ports::CommandParser`],
//! [`ports::ParameterPrompter`]) implemented by `armature-adapters`; steps
//! are opaque units supplied by the host and resolved through the
//! [`registry::ServiceRegistry`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use armature_core::prelude::*;
//!
//! # use async_trait::async_trait;
//! # use std::any::Any;
//! # #[derive(Default)]
//! # struct EmitStep { pub name: String, pub skip: bool }
//! # #[async_trait]
//! # impl ScaffoldStep for EmitStep {
//! #     fn should_skip(&self) -> bool { self.skip }
//! #     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! #     async fn execute(&mut self, _: &mut ScaffoldContext, _: &CancelSignal) -> StepResult { Ok(()) }
//! # }
//! # fn main() -> CoreResult<()> {
//! let name = std::sync::Arc::new(
//!     ScaffoldOption::<String>::builder("Name").required(true).build()?,
//! );
//!
//! let mut rb = RunnerBuilder::new("armature");
//! rb.services_mut().register_step::<EmitStep, _>(EmitStep::default);
//! rb.add_scaffolder(Category::Api, "controller")
//!     .with_option(name.clone())
//!     .with_prepared_step(StepPreparer::<EmitStep>::new().pre({
//!         let name = name.clone();
//!         move |step, ctx| {
//!             if let Some(value) = ctx.option(&name) {
//!                 step.name = value;
//!             }
//!         }
//!     }));
//!
//! let runner = rb.build()?;
//! # let _ = runner;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod category;
pub mod command;
pub mod context;
pub mod error;
pub mod option;
pub mod ports;
pub mod preparer;
pub mod registry;
pub mod runner;
pub mod runner_builder;
pub mod scaffolder;
pub mod step;

// Public API - what host crates should use
pub mod prelude {
    pub use crate::builder::ScaffolderBuilder;
    pub use crate::category::Category;
    pub use crate::command::{CategoryBranch, CommandTree, LeafCommand};
    pub use crate::context::ScaffoldContext;
    pub use crate::error::{CoreError, CoreResult, ErrorCategory};
    pub use crate::option::{
        FlagSpec, OptionSpec, OptionValueKind, OptionValues, Parameter, PickerKind, ScaffoldOption,
        ValueKind,
    };
    pub use crate::ports::{CommandParser, Invocation, ParameterPrompter, ParseOutcome};
    pub use crate::preparer::StepPreparer;
    pub use crate::registry::ServiceRegistry;
    pub use crate::runner::{RunOutcome, Runner};
    pub use crate::runner_builder::RunnerBuilder;
    pub use crate::scaffolder::{RunReport, Scaffolder, StepReport, StepStatus};
    pub use crate::step::{CancelSignal, ScaffoldStep, StepFailure, StepResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
