//! Integration tests for the scaffolder pipeline: declaration order, skip
//! semantics, fail-fast halting, front-end equivalence, and build-time
//! failure modes.

use std::any::Any;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use armature_core::prelude::*;

type EventLog = Arc<Mutex<Vec<String>>>;

fn record(log: &EventLog, event: impl Into<String>) {
    log.lock().unwrap().push(event.into());
}

fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// One reusable pipeline stage.  Hooks label it and flip its behavior, which
/// also exercises "same step type, several stages, one instance each".
struct StageStep {
    label: String,
    skip: bool,
    fail: bool,
    raise_cancel: bool,
    log: EventLog,
}

impl StageStep {
    fn with_log(log: EventLog) -> Self {
        Self {
            label: String::new(),
            skip: false,
            fail: false,
            raise_cancel: false,
            log,
        }
    }
}

#[async_trait]
impl ScaffoldStep for StageStep {
    fn should_skip(&self) -> bool {
        self.skip
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn execute(&mut self, _ctx: &mut ScaffoldContext, cancel: &CancelSignal) -> StepResult {
        record(&self.log, format!("exec:{}", self.label));
        if self.raise_cancel {
            cancel.cancel();
        }
        if self.fail {
            return Err(StepFailure::new("stage reported failure"));
        }
        Ok(())
    }
}

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

/// A labelled stage: pre-hook names the step and applies `setup`, both hooks
/// record their invocation.
fn stage(
    log: &EventLog,
    label: &'static str,
    setup: impl Fn(&mut StageStep) + Send + Sync + 'static,
) -> StepPreparer<StageStep> {
    let pre_log = log.clone();
    let post_log = log.clone();
    StepPreparer::<StageStep>::new()
        .pre(move |step, _ctx| {
            step.label = label.to_string();
            setup(step);
            record(&pre_log, format!("pre:{label}"));
        })
        .post(move |_step, _ctx| {
            record(&post_log, format!("post:{label}"));
        })
}

fn runner_builder_with_stage_step(log: &EventLog) -> RunnerBuilder {
    let mut rb = RunnerBuilder::new("armature");
    let log = log.clone();
    rb.services_mut()
        .register_step::<StageStep, _>(move || StageStep::with_log(log.clone()));
    rb
}

// ── Order and lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn steps_run_fully_in_declaration_order() {
    let log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&log);
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "A", |_| {}))
        .with_prepared_step(stage(&log, "B", |_| {}))
        .with_prepared_step(stage(&log, "C", |_| {}));

    let mut runner = rb.build().expect("build should succeed");
    let report = runner
        .execute(
            Category::Api,
            "demo",
            OptionValues::new(),
            &CancelSignal::new(),
        )
        .await
        .expect("run should succeed");

    assert_eq!(
        events(&log),
        vec![
            "pre:A", "exec:A", "post:A", //
            "pre:B", "exec:B", "post:B", //
            "pre:C", "exec:C", "post:C",
        ]
    );
    assert_eq!(report.completed_count(), 3);
    assert_eq!(report.skipped_count(), 0);
}

#[tokio::test]
async fn each_stage_of_a_repeated_type_gets_its_own_instance() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let log: EventLog = EventLog::default();
    let created = Arc::new(AtomicUsize::new(0));

    let mut rb = RunnerBuilder::new("armature");
    {
        let log = log.clone();
        let created = created.clone();
        rb.services_mut().register_step::<StageStep, _>(move || {
            created.fetch_add(1, Ordering::SeqCst);
            StageStep::with_log(log.clone())
        });
    }
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "first", |_| {}))
        .with_prepared_step(stage(&log, "second", |_| {}));

    let mut runner = rb.build().expect("build should succeed");
    runner
        .execute(
            Category::Api,
            "demo",
            OptionValues::new(),
            &CancelSignal::new(),
        )
        .await
        .expect("run should succeed");

    // Two stages of one type: two factory calls, two independent instances.
    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_eq!(events(&log).len(), 6);
}

// ── Skip semantics ────────────────────────────────────────────────────────────

#[tokio::test]
async fn skipped_step_runs_hooks_but_not_execute_and_pipeline_continues() {
    let log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&log);
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "A", |step| step.skip = true))
        .with_prepared_step(stage(&log, "B", |_| {}));

    let mut runner = rb.build().expect("build should succeed");
    let report = runner
        .execute(
            Category::Api,
            "demo",
            OptionValues::new(),
            &CancelSignal::new(),
        )
        .await
        .expect("a voluntary skip is not an error");

    assert_eq!(
        events(&log),
        vec!["pre:A", "post:A", "pre:B", "exec:B", "post:B"]
    );
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.completed_count(), 1);
}

// ── Fail-fast halt ────────────────────────────────────────────────────────────

#[tokio::test]
async fn step_failure_halts_the_pipeline_before_the_next_stage() {
    let log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&log);
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "A", |_| {}))
        .with_prepared_step(stage(&log, "B", |step| step.fail = true))
        .with_prepared_step(stage(&log, "C", |_| {}));

    let mut runner = rb.build().expect("build should succeed");
    let err = runner
        .execute(
            Category::Api,
            "demo",
            OptionValues::new(),
            &CancelSignal::new(),
        )
        .await
        .err()
        .expect("run must fail");

    match err {
        CoreError::StepFailed {
            step, completed, ..
        } => {
            assert_eq!(step, "StageStep");
            assert_eq!(completed, 1);
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
    // The failing stage's post-hook observed; C never started.
    assert_eq!(
        events(&log),
        vec!["pre:A", "exec:A", "post:A", "pre:B", "exec:B", "post:B"]
    );
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancellation_between_steps_stops_scheduling() {
    let log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&log);
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "A", |step| step.raise_cancel = true))
        .with_prepared_step(stage(&log, "B", |_| {}));

    let mut runner = rb.build().expect("build should succeed");
    let err = runner
        .execute(
            Category::Api,
            "demo",
            OptionValues::new(),
            &CancelSignal::new(),
        )
        .await
        .err()
        .expect("run must report cancellation");

    assert!(matches!(err, CoreError::Cancelled));
    assert_eq!(events(&log), vec!["pre:A", "exec:A", "post:A"]);
}

#[tokio::test]
async fn pre_cancelled_run_starts_no_step() {
    let log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&log);
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "A", |_| {}));

    let cancel = CancelSignal::new();
    cancel.cancel();

    let mut runner = rb.build().expect("build should succeed");
    let err = runner
        .execute(Category::Api, "demo", OptionValues::new(), &cancel)
        .await
        .err()
        .expect("run must report cancellation");
    assert!(matches!(err, CoreError::Cancelled));
    assert!(events(&log).is_empty());
}

// ── Option resolution ─────────────────────────────────────────────────────────

/// Parser double: recognises `<category> <name> --name <value>` well enough
/// to feed the runner the same shape the clap adapter would.
struct FakeParser;

impl CommandParser for FakeParser {
    fn parse(&self, _tree: &CommandTree, args: &[String]) -> CoreResult<ParseOutcome> {
        let category = Category::from_command_name(&args[0]).ok_or_else(|| {
            CoreError::InvalidArguments {
                message: format!("unknown category '{}'", args[0]),
            }
        })?;
        let mut values = OptionValues::new();
        if let Some(at) = args.iter().position(|a| a == "--name") {
            if let Some(value) = args.get(at + 1) {
                values.insert("name", Value::String(value.clone()));
            }
        }
        Ok(ParseOutcome::Invocation(Invocation {
            category,
            scaffolder: args[1].clone(),
            values,
        }))
    }
}

fn greeting_scaffolder(rb: &mut RunnerBuilder, log: &EventLog, name: &Arc<ScaffoldOption<String>>) {
    let read_log = log.clone();
    let assert_log = log.clone();
    let name_opt = name.clone();
    rb.add_scaffolder(Category::Api, "demo")
        .with_option(name.clone())
        .with_prepared_step(StepPreparer::<StageStep>::new().pre(move |step, ctx| {
            step.label = "greet".into();
            let value = ctx.option(&name_opt).unwrap_or_default();
            record(&read_log, format!("name:{value}"));
            ctx.set("greeting", format!("Hello {value}"));
        }))
        .with_prepared_step(StepPreparer::<StageStep>::new().pre(move |step, ctx| {
            step.label = "check".into();
            let greeting = ctx.get_str("greeting").unwrap_or("").to_string();
            record(&assert_log, format!("greeting:{greeting}"));
        }));
}

#[tokio::test]
async fn option_values_flow_between_steps_through_the_context() {
    let log: EventLog = EventLog::default();
    let name = Arc::new(
        ScaffoldOption::<String>::builder("Name")
            .required(true)
            .build()
            .expect("valid option"),
    );

    let mut rb = runner_builder_with_stage_step(&log);
    rb.with_parser(Box::new(FakeParser));
    greeting_scaffolder(&mut rb, &log, &name);

    let runner = rb.build().expect("build should succeed");
    let args = ["api", "demo", "--name", "X"]
        .into_iter()
        .map(String::from)
        .collect();
    runner
        .run(args, CancelSignal::new())
        .await
        .expect("run should succeed");

    let recorded = events(&log);
    assert!(recorded.contains(&"name:X".to_string()));
    assert!(recorded.contains(&"greeting:Hello X".to_string()));
}

#[tokio::test]
async fn cli_and_interactive_paths_resolve_identical_values() {
    let name = Arc::new(
        ScaffoldOption::<String>::builder("Name")
            .required(true)
            .build()
            .expect("valid option"),
    );

    // CLI path: values arrive through the parser.
    let cli_log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&cli_log);
    rb.with_parser(Box::new(FakeParser));
    greeting_scaffolder(&mut rb, &cli_log, &name);
    let runner = rb.build().expect("build should succeed");
    let args = ["api", "demo", "--name", "Foo"]
        .into_iter()
        .map(String::from)
        .collect();
    runner
        .run(args, CancelSignal::new())
        .await
        .expect("run should succeed");

    // Interactive-style path: the caller supplies already-resolved values.
    let direct_log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&direct_log);
    greeting_scaffolder(&mut rb, &direct_log, &name);
    let mut runner = rb.build().expect("build should succeed");
    let mut values = OptionValues::new();
    values.insert("name", Value::String("Foo".into()));
    runner
        .execute(Category::Api, "demo", values, &CancelSignal::new())
        .await
        .expect("run should succeed");

    assert_eq!(events(&cli_log), events(&direct_log));
}

#[tokio::test]
async fn missing_required_option_fails_before_any_step() {
    let log: EventLog = EventLog::default();
    let name = Arc::new(
        ScaffoldOption::<String>::builder("Name")
            .required(true)
            .build()
            .expect("valid option"),
    );

    let mut rb = runner_builder_with_stage_step(&log);
    greeting_scaffolder(&mut rb, &log, &name);
    let mut runner = rb.build().expect("build should succeed");

    let err = runner
        .execute(
            Category::Api,
            "demo",
            OptionValues::new(),
            &CancelSignal::new(),
        )
        .await
        .err()
        .expect("run must fail");
    match err {
        CoreError::MissingRequiredOption { flag } => assert_eq!(flag, "name"),
        other => panic!("expected MissingRequiredOption, got {other:?}"),
    }
    assert!(events(&log).is_empty());
}

// ── Build-time failure modes ──────────────────────────────────────────────────

#[test]
fn unregistered_step_fails_the_build_before_anything_runs() {
    let log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&log);
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "A", |_| {}))
        .with_step::<UnregisteredStep>();

    let err = rb.build().err().expect("build must fail");
    assert!(matches!(
        err,
        CoreError::UnresolvedStep {
            step: "UnregisteredStep",
            ..
        }
    ));
    assert!(events(&log).is_empty());
}

#[test]
fn build_twice_fails_deterministically() {
    let log: EventLog = EventLog::default();
    let mut rb = runner_builder_with_stage_step(&log);
    rb.add_scaffolder(Category::Api, "demo")
        .with_prepared_step(stage(&log, "A", |_| {}));

    let first = rb.build();
    assert!(first.is_ok());
    assert!(matches!(rb.build(), Err(CoreError::AlreadyBuilt)));
    assert!(matches!(rb.build(), Err(CoreError::AlreadyBuilt)));
}
