//! Fluent declaration of a single scaffolder.
//!
//! A `ScaffolderBuilder` accumulates display metadata, options, and an
//! ordered list of step preparers, then produces an immutable [`Scaffolder`]
//! once every step type resolves from the registry.  Builders are created by
//! [`crate::runner_builder::RunnerBuilder::add_scaffolder`], which fixes the
//! category and name up front.

use std::sync::Arc;

use tracing::debug;

use crate::category::Category;
use crate::error::{CoreError, CoreResult};
use crate::option::OptionSpec;
use crate::preparer::{Preparer, StepPreparer};
use crate::registry::ServiceRegistry;
use crate::scaffolder::Scaffolder;
use crate::step::ScaffoldStep;

/// Accumulates one scaffolder's declaration.
pub struct ScaffolderBuilder {
    name: String,
    category: Category,
    display_name: String,
    description: String,
    options: Vec<Arc<dyn OptionSpec>>,
    preparers: Vec<Box<dyn Preparer>>,
}

impl ScaffolderBuilder {
    pub(crate) fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category,
            display_name: String::new(),
            description: String::new(),
            options: Vec::new(),
            preparers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Human-facing name shown in the interactive flow.  Defaults to the
    /// command name when never set.
    pub fn with_display_name(&mut self, display_name: impl Into<String>) -> &mut Self {
        self.display_name = display_name.into();
        self
    }

    /// Re-home the scaffolder under a different category branch.
    pub fn with_category(&mut self, category: Category) -> &mut Self {
        self.category = category;
        self
    }

    pub fn with_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Append an option.  Order is preserved into help text and prompts.
    ///
    /// Flag-name collisions between options (or with global options) are not
    /// policed here; at resolution time a scaffolder-local value shadows a
    /// global one under the same normalized name.
    pub fn with_option(&mut self, option: Arc<dyn OptionSpec>) -> &mut Self {
        self.options.push(option);
        self
    }

    /// Append a pipeline stage for step type `S` with no hooks.
    pub fn with_step<S: ScaffoldStep + 'static>(&mut self) -> &mut Self {
        self.with_prepared_step(StepPreparer::<S>::new())
    }

    /// Append a pipeline stage for `S` with its pre/post hooks.
    ///
    /// The same step type may appear in several stages; each stage gets its
    /// own registry-resolved instance.
    pub fn with_prepared_step<S: ScaffoldStep + 'static>(
        &mut self,
        preparer: StepPreparer<S>,
    ) -> &mut Self {
        self.preparers.push(Box::new(preparer));
        self
    }

    /// Number of declared pipeline stages.
    pub fn step_count(&self) -> usize {
        self.preparers.len()
    }

    /// Resolve every declared step from the registry and freeze the
    /// scaffolder.  A missing registration is a configuration defect and
    /// fails the whole build — there is no partial scaffolder.
    pub(crate) fn build(&mut self, registry: &ServiceRegistry) -> CoreResult<Scaffolder> {
        let preparers = std::mem::take(&mut self.preparers);
        let options = std::mem::take(&mut self.options);

        let mut steps = Vec::with_capacity(preparers.len());
        for preparer in &preparers {
            let step =
                preparer
                    .resolve(registry)
                    .ok_or_else(|| CoreError::UnresolvedStep {
                        step: preparer.step_name(),
                        scaffolder: self.name.clone(),
                    })?;
            steps.push(step);
        }

        let display_name = if self.display_name.is_empty() {
            self.name.clone()
        } else {
            self.display_name.clone()
        };

        debug!(
            scaffolder = %self.name,
            category = %self.category,
            steps = steps.len(),
            options = options.len(),
            "Scaffolder built"
        );

        Ok(Scaffolder::new(
            self.name.clone(),
            display_name,
            self.description.clone(),
            self.category,
            options,
            steps,
            preparers,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScaffoldContext;
    use crate::option::ScaffoldOption;
    use crate::step::{CancelSignal, StepResult};
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

    #[derive(Default)]
    struct UnregisteredStep;

    #[async_trait]
    impl ScaffoldStep for UnregisteredStep {
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

    fn registry_with_noop() -> ServiceRegistry {
        let mut registry = ServiceRegistry::new();
        registry.register_step::<NoopStep, _>(NoopStep::default);
        registry
    }

    #[test]
    fn build_preserves_declaration_order_and_pairing() {
        let registry = registry_with_noop();
        let mut builder = ScaffolderBuilder::new(Category::Api, "demo");
        builder
            .with_step::<NoopStep>()
            .with_step::<NoopStep>()
            .with_step::<NoopStep>();

        let scaffolder = builder.build(&registry).expect("build should succeed");
        assert_eq!(scaffolder.step_count(), 3);
        assert_eq!(
            scaffolder.step_names(),
            vec!["NoopStep", "NoopStep", "NoopStep"]
        );
    }

    #[test]
    fn unresolved_step_fails_the_build() {
        let registry = registry_with_noop();
        let mut builder = ScaffolderBuilder::new(Category::Api, "demo");
        builder.with_step::<NoopStep>().with_step::<UnregisteredStep>();

        let err = builder.build(&registry).err().expect("build must fail");
        match err {
            CoreError::UnresolvedStep { step, scaffolder } => {
                assert_eq!(step, "UnregisteredStep");
                assert_eq!(scaffolder, "demo");
            }
            other => panic!("expected UnresolvedStep, got {other:?}"),
        }
    }

    #[test]
    fn display_name_falls_back_to_command_name() {
        let registry = registry_with_noop();
        let mut builder = ScaffolderBuilder::new(Category::Pages, "page");
        let scaffolder = builder.build(&registry).expect("build should succeed");
        assert_eq!(scaffolder.display_name(), "page");
    }

    #[test]
    fn metadata_setters_are_fluent() {
        let registry = registry_with_noop();
        let option = Arc::new(
            ScaffoldOption::<String>::builder("Name")
                .build()
                .expect("valid option"),
        );

        let mut builder = ScaffolderBuilder::new(Category::Data, "repository");
        builder
            .with_display_name("Repository")
            .with_description("Generate a repository")
            .with_category(Category::Identity)
            .with_option(option);

        let scaffolder = builder.build(&registry).expect("build should succeed");
        assert_eq!(scaffolder.display_name(), "Repository");
        assert_eq!(scaffolder.description(), "Generate a repository");
        assert_eq!(scaffolder.category(), Category::Identity);
        assert_eq!(scaffolder.options().len(), 1);
    }
}
