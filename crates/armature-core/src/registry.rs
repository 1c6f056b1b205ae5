//! Step factory registry.
//!
//! Stands in for a dependency-injection container: the host registers one
//! factory per step type; builders resolve a fresh boxed instance per
//! pipeline stage.  Resolution of an unregistered type is a loud build-time
//! failure, never a runtime fallback.
//!
//! Factories close over whatever collaborators their step needs (paths,
//! stores, clients); the registry itself only knows type identities.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use crate::step::ScaffoldStep;

struct StepFactory {
    type_name: &'static str,
    make: Box<dyn Fn() -> Box<dyn ScaffoldStep> + Send + Sync>,
}

/// Registry of step factories keyed by step type.
///
/// Built once per process while wiring the runner, read-only afterwards.
#[derive(Default)]
pub struct ServiceRegistry {
    steps: HashMap<TypeId, StepFactory>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for step type `S`.
    ///
    /// Registering the same type again replaces the earlier factory (last
    /// registration wins).
    pub fn register_step<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ScaffoldStep + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<S>();
        debug!(step = type_name, "Registering step factory");
        self.steps.insert(
            TypeId::of::<S>(),
            StepFactory {
                type_name,
                make: Box::new(move || Box::new(factory())),
            },
        );
        self
    }

    /// Whether a factory exists for step type `S`.
    pub fn contains<S: 'static>(&self) -> bool {
        self.steps.contains_key(&TypeId::of::<S>())
    }

    /// Resolve a fresh instance for the given type id, if registered.
    pub(crate) fn resolve_type(&self, id: TypeId) -> Option<Box<dyn ScaffoldStep>> {
        self.steps.get(&id).map(|factory| {
            debug!(step = factory.type_name, "Resolving step instance");
            (factory.make)()
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
