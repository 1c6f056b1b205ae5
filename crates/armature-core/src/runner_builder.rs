//! The composition root.
//!
//! A host wires everything here: step factories on the registry, scaffolder
//! declarations, global options, the parser/prompter adapters, and the
//! logging hook.  `build()` is one-shot — it freezes the registry, builds
//! every declared scaffolder (failing fatally on the first unresolved step),
//! groups them by category, and hands the lot to a fresh [`Runner`] with its
//! command tree assembled.

use std::collections::BTreeMap;

use std::sync::Arc;

use tracing::debug;

use crate::builder::ScaffolderBuilder;
use crate::category::Category;
use crate::error::{CoreError, CoreResult};
use crate::option::{OptionSpec, OptionValues};
use crate::ports::{CommandParser, ParameterPrompter};
use crate::registry::ServiceRegistry;
use crate::runner::{LoggingHook, Runner};
use crate::scaffolder::Scaffolder;

/// Declares scaffolders and global wiring, then builds the [`Runner`].
pub struct RunnerBuilder {
    root_name: String,
    about: String,
    version: String,
    services: ServiceRegistry,
    builders: Vec<ScaffolderBuilder>,
    global_options: Vec<Arc<dyn OptionSpec>>,
    parser: Option<Box<dyn CommandParser>>,
    prompter: Option<Box<dyn ParameterPrompter>>,
    logging: Option<LoggingHook>,
    built: bool,
}

impl RunnerBuilder {
    /// Start composing a tool whose root command is `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            about: String::new(),
            version: String::new(),
            services: ServiceRegistry::new(),
            builders: Vec::new(),
            global_options: Vec::new(),
            parser: None,
            prompter: None,
            logging: None,
            built: false,
        }
    }

    pub fn with_about(&mut self, about: impl Into<String>) -> &mut Self {
        self.about = about.into();
        self
    }

    pub fn with_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = version.into();
        self
    }

    /// The dependency-registration surface: step factories live here.
    pub fn services_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.services
    }

    /// Register a global option, attached at the root command and available
    /// to every scaffolder (e.g. a verbosity flag).
    pub fn add_option(&mut self, option: Arc<dyn OptionSpec>) -> &mut Self {
        self.global_options.push(option);
        self
    }

    /// Declare a new scaffolder under `category` and return its builder for
    /// fluent configuration.
    pub fn add_scaffolder(
        &mut self,
        category: Category,
        name: impl Into<String>,
    ) -> &mut ScaffolderBuilder {
        self.builders.push(ScaffolderBuilder::new(category, name));
        self.builders
            .last_mut()
            .expect("builder list cannot be empty after push")
    }

    /// Inject the argument-parsing adapter for the CLI front end.
    pub fn with_parser(&mut self, parser: Box<dyn CommandParser>) -> &mut Self {
        self.parser = Some(parser);
        self
    }

    /// Inject the interactive-prompting adapter.  Without one, running with
    /// no arguments is an error instead of an interactive session.
    pub fn with_prompter(&mut self, prompter: Box<dyn ParameterPrompter>) -> &mut Self {
        self.prompter = Some(prompter);
        self
    }

    /// The logging-registration surface: the hook receives the resolved
    /// option values after parsing, before the first step.  Subscriber
    /// construction stays host-side; the core only emits events.
    pub fn with_logging(
        &mut self,
        hook: impl Fn(&OptionValues) + Send + Sync + 'static,
    ) -> &mut Self {
        self.logging = Some(Box::new(hook));
        self
    }

    /// Number of declared (not yet built) scaffolders.
    pub fn scaffolder_count(&self) -> usize {
        self.builders.len()
    }

    /// Build every declared scaffolder and assemble the runner.
    ///
    /// One-shot: a second call fails with [`CoreError::AlreadyBuilt`] without
    /// touching any state.  An unresolved step type fails the whole build —
    /// that is a wiring defect to fix, not a condition to recover from.
    pub fn build(&mut self) -> CoreResult<Runner> {
        if self.built {
            return Err(CoreError::AlreadyBuilt);
        }
        self.built = true;

        let registry = std::mem::take(&mut self.services);
        let mut grouped: BTreeMap<Category, Vec<Scaffolder>> = BTreeMap::new();
        for mut builder in std::mem::take(&mut self.builders) {
            let scaffolder = builder.build(&registry)?;
            grouped
                .entry(scaffolder.category())
                .or_default()
                .push(scaffolder);
        }

        debug!(
            categories = grouped.len(),
            global_options = self.global_options.len(),
            "Runner built"
        );

        let mut runner = Runner::new(
            std::mem::take(&mut self.root_name),
            std::mem::take(&mut self.about),
            std::mem::take(&mut self.version),
            grouped,
            std::mem::take(&mut self.global_options),
            self.parser.take(),
            self.prompter.take(),
            self.logging.take(),
        );
        runner.assemble();
        Ok(runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScaffoldContext;
    use crate::step::{CancelSignal, ScaffoldStep, StepResult};
    use async_trait::async_trait;
    use std::any::Any;

    #[derive(Default)]
    struct NoopStep;

    #[async_trait]
    impl ScaffoldStep for NoopStep {
        fn should_skip(&self) -> bool {
            false
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        async fn execute(&mut self, _: &mut ScaffoldContext, _: &CancelSignal) -> StepResult {
            Ok(())
        }
    }

    #[test]
    fn build_is_one_shot() {
        let mut rb = RunnerBuilder::new("armature");
        rb.services_mut().register_step::<NoopStep, _>(NoopStep::default);
        rb.add_scaffolder(Category::Api, "demo").with_step::<NoopStep>();

        assert!(rb.build().is_ok());
        assert!(matches!(rb.build(), Err(CoreError::AlreadyBuilt)));
    }

    #[test]
    fn failed_build_cannot_be_retried() {
        let mut rb = RunnerBuilder::new("armature");
        // NoopStep never registered: first build fails on resolution.
        rb.add_scaffolder(Category::Api, "demo").with_step::<NoopStep>();

        assert!(matches!(rb.build(), Err(CoreError::UnresolvedStep { .. })));
        assert!(matches!(rb.build(), Err(CoreError::AlreadyBuilt)));
    }

    #[test]
    fn build_groups_scaffolders_by_category() {
        let mut rb = RunnerBuilder::new("armature");
        rb.services_mut().register_step::<NoopStep, _>(NoopStep::default);
        rb.add_scaffolder(Category::Api, "controller")
            .with_step::<NoopStep>();
        rb.add_scaffolder(Category::Api, "endpoints")
            .with_step::<NoopStep>();
        rb.add_scaffolder(Category::Identity, "setup")
            .with_step::<NoopStep>();

        let runner = rb.build().expect("build should succeed");
        assert_eq!(runner.scaffolder_count(), 3);
        assert!(runner.scaffolder(Category::Api, "controller").is_some());
        assert!(runner.scaffolder(Category::Api, "endpoints").is_some());
        assert!(runner.scaffolder(Category::Identity, "setup").is_some());
    }

    #[test]
    fn tree_is_assembled_during_build() {
        let mut rb = RunnerBuilder::new("armature");
        rb.services_mut().register_step::<NoopStep, _>(NoopStep::default);
        rb.add_scaffolder(Category::Pages, "page").with_step::<NoopStep>();

        let runner = rb.build().expect("build should succeed");
        assert!(runner.command_tree().is_some());
    }
}
