//! Step preparers: the binding between a step type and its pre/post hooks.
//!
//! A [`StepPreparer`] is created at declaration time, before any step
//! instance exists.  At run time the registry produces the instance and the
//! driver calls the hooks around it.  Because one pipeline mixes preparers
//! for different step types, builders hold them behind the non-generic
//! [`Preparer`] trait; the generic side recovers its concrete step type by
//! downcasting through the step's `as_any_mut` seam.

use std::any::TypeId;
use std::marker::PhantomData;

use crate::context::ScaffoldContext;
use crate::error::{CoreError, CoreResult};
use crate::registry::ServiceRegistry;
use crate::step::ScaffoldStep;

type Hook<S> = Box<dyn Fn(&mut S, &mut ScaffoldContext) + Send + Sync>;

/// Pre/post execution hooks for one pipeline stage of step type `S`.
///
/// Both hooks are optional.  The pre-hook typically copies option values and
/// upstream context keys into the step's fields (and may request a skip); the
/// post-hook observes results and may publish context keys downstream.
pub struct StepPreparer<S: ScaffoldStep + 'static> {
    pre: Option<Hook<S>>,
    post: Option<Hook<S>>,
    _marker: PhantomData<fn(S)>,
}

impl<S: ScaffoldStep + 'static> StepPreparer<S> {
    pub fn new() -> Self {
        Self {
            pre: None,
            post: None,
            _marker: PhantomData,
        }
    }

    /// Configure the step before execution, from context and option values.
    pub fn pre(mut self, hook: impl Fn(&mut S, &mut ScaffoldContext) + Send + Sync + 'static) -> Self {
        self.pre = Some(Box::new(hook));
        self
    }

    /// Observe the step after execution (runs even when the step skipped).
    pub fn post(
        mut self,
        hook: impl Fn(&mut S, &mut ScaffoldContext) + Send + Sync + 'static,
    ) -> Self {
        self.post = Some(Box::new(hook));
        self
    }
}

impl<S: ScaffoldStep + 'static> Default for StepPreparer<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased preparer held by builders and scaffolders.
pub(crate) trait Preparer: Send + Sync {
    /// Short step type name, for diagnostics and reports.
    fn step_name(&self) -> &'static str;

    /// Resolve a fresh instance of the bound step type from the registry.
    fn resolve(&self, registry: &ServiceRegistry) -> Option<Box<dyn ScaffoldStep>>;

    fn pre_execute(
        &self,
        step: &mut dyn ScaffoldStep,
        ctx: &mut ScaffoldContext,
    ) -> CoreResult<()>;

    fn post_execute(
        &self,
        step: &mut dyn ScaffoldStep,
        ctx: &mut ScaffoldContext,
    ) -> CoreResult<()>;
}

impl<S: ScaffoldStep + 'static> Preparer for StepPreparer<S> {
    fn step_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<S>())
    }

    fn resolve(&self, registry: &ServiceRegistry) -> Option<Box<dyn ScaffoldStep>> {
        registry.resolve_type(TypeId::of::<S>())
    }

    fn pre_execute(
        &self,
        step: &mut dyn ScaffoldStep,
        ctx: &mut ScaffoldContext,
    ) -> CoreResult<()> {
        let Some(hook) = &self.pre else {
            return Ok(());
        };
        hook(self.downcast(step)?, ctx);
        Ok(())
    }

    fn post_execute(
        &self,
        step: &mut dyn ScaffoldStep,
        ctx: &mut ScaffoldContext,
    ) -> CoreResult<()> {
        let Some(hook) = &self.post else {
            return Ok(());
        };
        hook(self.downcast(step)?, ctx);
        Ok(())
    }
}

impl<S: ScaffoldStep + 'static> StepPreparer<S> {
    /// Steps and preparers are paired positionally at build time, so a
    /// downcast mismatch here is a driver bug, not a user error.
    fn downcast<'a>(&self, step: &'a mut dyn ScaffoldStep) -> CoreResult<&'a mut S> {
        step.as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(|| CoreError::Internal {
                message: format!("step/preparer pairing mismatch for {}", self.step_name()),
            })
    }
}

/// Last path segment of a fully qualified type name.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionValues;
    use crate::step::{CancelSignal, StepResult};
    use async_trait::async_trait;
    use std::any::Any;

    #[derive(Default)]
    struct GreetStep {
        greeting: String,
        skip: bool,
    }

    #[async_trait]
    impl ScaffoldStep for GreetStep {
        fn should_skip(&self) -> bool {
            self.skip
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        async fn execute(&mut self, _: &mut ScaffoldContext, _: &CancelSignal) -> StepResult {
            Ok(())
        }
    }

    #[derive(Default)]
    struct OtherStep;

    #[async_trait]
    impl ScaffoldStep for OtherStep {
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
    fn pre_hook_mutates_the_typed_step() {
        let preparer =
            StepPreparer::<GreetStep>::new().pre(|step, _ctx| step.greeting = "hello".into());
        let mut step = GreetStep::default();
        let mut ctx = ScaffoldContext::new("demo", OptionValues::new());

        preparer
            .pre_execute(&mut step, &mut ctx)
            .expect("hook should run");
        assert_eq!(step.greeting, "hello");
    }

    #[test]
    fn hooks_are_optional() {
        let preparer = StepPreparer::<GreetStep>::new();
        let mut step = GreetStep::default();
        let mut ctx = ScaffoldContext::new("demo", OptionValues::new());

        assert!(preparer.pre_execute(&mut step, &mut ctx).is_ok());
        assert!(preparer.post_execute(&mut step, &mut ctx).is_ok());
    }

    #[test]
    fn mismatched_step_type_is_an_internal_error() {
        let preparer = StepPreparer::<GreetStep>::new().pre(|_, _| {});
        let mut wrong = OtherStep;
        let mut ctx = ScaffoldContext::new("demo", OptionValues::new());

        let result = preparer.pre_execute(&mut wrong, &mut ctx);
        assert!(matches!(result, Err(CoreError::Internal { .. })));
    }

    #[test]
    fn step_name_is_the_short_type_name() {
        let preparer = StepPreparer::<GreetStep>::new();
        assert_eq!(preparer.step_name(), "GreetStep");
    }
}
