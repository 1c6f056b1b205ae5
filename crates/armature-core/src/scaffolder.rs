//! A built scaffolder and its sequential driver loop.
//!
//! A `Scaffolder` is immutable once built: metadata, options, resolved step
//! instances, and the parallel preparer list all come from the builder in
//! declaration order.  That order is the execution order; nothing here ever
//! re-sorts it.
//!
//! The driver is deliberately single-lane: one step at a time, pre-hook →
//! execute (unless skipped) → post-hook, halting on the first failure.  Steps
//! mutate a shared unsynchronized context, so interleaving two steps would
//! push a locking discipline onto step authors the core cannot verify.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use std::sync::Arc;

use crate::category::Category;
use crate::context::ScaffoldContext;
use crate::error::{CoreError, CoreResult};
use crate::option::OptionSpec;
use crate::preparer::Preparer;
use crate::step::{CancelSignal, ScaffoldStep};

/// Terminal state of one pipeline stage within a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    /// The step executed and reported success.
    Completed,
    /// The step asked to be skipped; not an error.
    Skipped,
}

/// Per-step record of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub status: StepStatus,
    pub duration_ms: i64,
}

/// Summary of one scaffolder run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub scaffolder: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count()
    }
}

/// One named, runnable code-generation workflow.
pub struct Scaffolder {
    name: String,
    display_name: String,
    description: String,
    category: Category,
    options: Vec<Arc<dyn OptionSpec>>,
    steps: Vec<Box<dyn ScaffoldStep>>,
    preparers: Vec<Box<dyn Preparer>>,
}

impl Scaffolder {
    pub(crate) fn new(
        name: String,
        display_name: String,
        description: String,
        category: Category,
        options: Vec<Arc<dyn OptionSpec>>,
        steps: Vec<Box<dyn ScaffoldStep>>,
        preparers: Vec<Box<dyn Preparer>>,
    ) -> Self {
        // Built positionally by the builder; a mismatch cannot survive build.
        debug_assert_eq!(steps.len(), preparers.len());
        Self {
            name,
            display_name,
            description,
            category,
            options,
            steps,
            preparers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn options(&self) -> &[Arc<dyn OptionSpec>] {
        &self.options
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Names of the pipeline stages, in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.preparers.iter().map(|p| p.step_name()).collect()
    }

    /// Drive the pipeline against a fresh context.
    ///
    /// Steps run strictly in declaration order.  For each stage: cancellation
    /// check, pre-hook, skip check, execute, post-hook.  The post-hook runs
    /// even for skipped and failed stages; a failure halts the pipeline
    /// before the next stage's pre-hook.
    #[instrument(skip_all, fields(scaffolder = %self.name, run_id = %ctx.run_id()))]
    pub async fn execute(
        &mut self,
        ctx: &mut ScaffoldContext,
        cancel: &CancelSignal,
    ) -> CoreResult<RunReport> {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(self.steps.len());

        for (index, (step, preparer)) in self
            .steps
            .iter_mut()
            .zip(self.preparers.iter())
            .enumerate()
        {
            if cancel.is_cancelled() {
                info!(completed = index, "Cancellation observed; stopping pipeline");
                return Err(CoreError::Cancelled);
            }

            let step_name = preparer.step_name();
            let step_started = Utc::now();
            debug!(step = step_name, index, "Preparing step");
            preparer.pre_execute(step.as_mut(), ctx)?;

            let status = if step.should_skip() {
                info!(step = step_name, "Step skipped");
                StepStatus::Skipped
            } else {
                match step.execute(ctx, cancel).await {
                    Ok(()) => {
                        debug!(step = step_name, "Step completed");
                        StepStatus::Completed
                    }
                    Err(failure) => {
                        // The failing step's post-hook still observes; later
                        // steps never start.
                        preparer.post_execute(step.as_mut(), ctx)?;
                        error!(step = step_name, error = %failure, "Step failed; halting pipeline");
                        return Err(CoreError::StepFailed {
                            step: step_name.to_string(),
                            completed: index,
                            source: failure,
                        });
                    }
                }
            };

            preparer.post_execute(step.as_mut(), ctx)?;
            reports.push(StepReport {
                step: step_name.to_string(),
                status,
                duration_ms: (Utc::now() - step_started).num_milliseconds(),
            });
        }

        let report = RunReport {
            run_id: ctx.run_id(),
            scaffolder: self.name.clone(),
            started_at,
            finished_at: Utc::now(),
            steps: reports,
        };
        info!(
            completed = report.completed_count(),
            skipped = report.skipped_count(),
            "Pipeline finished"
        );
        Ok(report)
    }
}
