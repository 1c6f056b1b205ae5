//! Run summary.

use std::any::Any;

use async_trait::async_trait;

use armature_core::prelude::*;

use crate::output::OutputManager;

/// Prints what the run produced.
///
/// The pre-hook skips this step entirely under `--quiet` — a voluntary skip,
/// not an error — and threads the colour setting through.
#[derive(Default)]
pub struct SummaryStep {
    pub skip: bool,
    pub no_color: bool,
}

#[async_trait]
impl ScaffoldStep for SummaryStep {
    fn should_skip(&self) -> bool {
        self.skip
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn execute(&mut self, ctx: &mut ScaffoldContext, _cancel: &CancelSignal) -> StepResult {
        let out = OutputManager::new(false, self.no_color);

        match ctx.get_str("artifact.path") {
            Some(path) => out.success(&format!("Generated {path}"))?,
            None => out.success("Done")?,
        }
        if let Some(detail) = ctx.get_str("summary.detail") {
            out.print(&format!("  {detail}"))?;
        }
        if let Some(manifest) = ctx.get_str("project.manifest") {
            out.info(&format!("Project manifest: {manifest}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn summarises_whatever_the_context_carries() {
        let mut ctx = ScaffoldContext::new("demo", OptionValues::new());
        ctx.set("artifact.path", "controllers/invoice.rs");
        ctx.set("project.manifest", "Cargo.toml");

        let mut step = SummaryStep {
            skip: false,
            no_color: true,
        };
        assert!(step.execute(&mut ctx, &CancelSignal::new()).await.is_ok());
    }

    #[tokio::test]
    async fn empty_context_still_summarises() {
        let mut ctx = ScaffoldContext::new("demo", OptionValues::new());
        let mut step = SummaryStep::default();
        assert!(step.execute(&mut ctx, &CancelSignal::new()).await.is_ok());
    }
}
