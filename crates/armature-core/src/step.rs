//! The step contract and its supporting types.
//!
//! Steps are supplied by the host; the core treats them as opaque units of
//! work.  All the core needs is a type identity for registry resolution, a
//! skip flag it can read, a downcast seam for the preparer hooks, and an
//! asynchronous execute operation.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::context::ScaffoldContext;

/// Failure reported by a step's execute operation.
///
/// Carries a message plus an optional underlying error.  The driver never
/// interprets it beyond "halt the pipeline here".
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StepFailure {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl StepFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for StepFailure {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(err.to_string(), err)
    }
}

/// Result of a step's execute operation.
pub type StepResult = Result<(), StepFailure>;

/// Cooperative cancellation flag, raised by the host (e.g. a SIGINT handler)
/// and observed by the driver between steps and by steps mid-execution.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.  Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One unit of work within a scaffolder pipeline.
///
/// Implementations are stateful per invocation: the registry produces a fresh
/// instance for each pipeline run and instances are never reused.  Fields are
/// typically populated by the step's preparer hooks before execution.
#[async_trait]
pub trait ScaffoldStep: Send {
    /// Voluntary short-circuit.  Read by the driver after the pre-hook ran;
    /// a `true` here skips execute (not an error) and the pipeline moves on.
    fn should_skip(&self) -> bool;

    /// Downcast seam used by the type-erased preparer to hand typed hooks a
    /// concrete `&mut Self`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Perform the work.  A failure halts the pipeline; completed steps are
    /// not rolled back.  Long-running implementations should poll `cancel`.
    async fn execute(&mut self, ctx: &mut ScaffoldContext, cancel: &CancelSignal) -> StepResult;
}
