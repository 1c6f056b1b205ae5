//! The runner: parsed arguments or interactive picks in, one scaffolder
//! execution out.
//!
//! Both front ends converge on [`Runner::execute`]: the CLI path parses
//! through the injected [`CommandParser`], the interactive path collects the
//! same values through the injected [`ParameterPrompter`], and from there the
//! pipeline cannot tell them apart.  This is what keeps the dual front end
//! from duplicating any pipeline logic.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::category::Category;
use crate::command::{CategoryBranch, CommandTree, LeafCommand};
use crate::context::ScaffoldContext;
use crate::error::{CoreError, CoreResult};
use crate::option::{OptionSpec, OptionValues, ValueKind};
use crate::ports::{CommandParser, ParameterPrompter, ParseOutcome};
use crate::scaffolder::{RunReport, Scaffolder};
use crate::step::CancelSignal;

/// Hook invoked with the resolved option values after parsing and before the
/// first step, so the host can initialise logging from `--verbose`-style
/// globals without the core touching subscribers.
pub type LoggingHook = Box<dyn Fn(&OptionValues) + Send + Sync>;

/// What a run produced.
pub enum RunOutcome {
    /// A scaffolder executed to completion.
    Executed(RunReport),
    /// The parser already rendered output (help, version, usage error);
    /// nothing executed.  `code` is the preferred process exit code.
    Rendered { message: String, code: i32 },
}

/// Holds the built scaffolders and the assembled command tree, and drives
/// one scaffolder run per process.
pub struct Runner {
    root_name: String,
    about: String,
    version: String,
    scaffolders: BTreeMap<Category, Vec<Scaffolder>>,
    global_options: Vec<Arc<dyn OptionSpec>>,
    tree: Option<CommandTree>,
    parser: Option<Box<dyn CommandParser>>,
    prompter: Option<Box<dyn ParameterPrompter>>,
    logging: Option<LoggingHook>,
}

impl Runner {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        root_name: String,
        about: String,
        version: String,
        scaffolders: BTreeMap<Category, Vec<Scaffolder>>,
        global_options: Vec<Arc<dyn OptionSpec>>,
        parser: Option<Box<dyn CommandParser>>,
        prompter: Option<Box<dyn ParameterPrompter>>,
        logging: Option<LoggingHook>,
    ) -> Self {
        Self {
            root_name,
            about,
            version,
            scaffolders,
            global_options,
            tree: None,
            parser,
            prompter,
            logging,
        }
    }

    /// Assemble the command tree from the scaffolder catalogue: one branch
    /// per category present, one leaf per scaffolder with its declared
    /// options as flags, global options at the root.
    pub(crate) fn assemble(&mut self) {
        let branches = self
            .scaffolders
            .iter()
            .map(|(category, list)| CategoryBranch {
                category: *category,
                about: category.about().to_string(),
                leaves: list
                    .iter()
                    .map(|scaffolder| LeafCommand {
                        name: scaffolder.name().to_lowercase(),
                        about: if scaffolder.description().is_empty() {
                            scaffolder.display_name().to_string()
                        } else {
                            scaffolder.description().to_string()
                        },
                        flags: scaffolder
                            .options()
                            .iter()
                            .map(|option| option.flag().clone())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        self.tree = Some(CommandTree {
            root: self.root_name.clone(),
            about: self.about.clone(),
            version: self.version.clone(),
            global_flags: self
                .global_options
                .iter()
                .map(|option| option.flag().clone())
                .collect(),
            branches,
        });
        debug!(
            categories = self.scaffolders.len(),
            scaffolders = self.scaffolder_count(),
            "Command tree assembled"
        );
    }

    /// The assembled command tree, if any.
    pub fn command_tree(&self) -> Option<&CommandTree> {
        self.tree.as_ref()
    }

    pub fn scaffolder_count(&self) -> usize {
        self.scaffolders.values().map(Vec::len).sum()
    }

    /// Look a scaffolder up by category and (case-insensitive) name.
    pub fn scaffolder(&self, category: Category, name: &str) -> Option<&Scaffolder> {
        self.scaffolders
            .get(&category)
            .and_then(|list| list.iter().find(|s| s.name().eq_ignore_ascii_case(name)))
    }

    /// Run once: parse `args` (or enter the interactive flow when `args` is
    /// empty and a prompter is wired) and execute the matched scaffolder.
    ///
    /// Consumes the runner — step instances are per-run state, so a second
    /// run would need a second build.
    pub async fn run(mut self, args: Vec<String>, cancel: CancelSignal) -> CoreResult<RunOutcome> {
        if self.tree.is_none() {
            return Err(CoreError::NotAssembled);
        }

        if args.is_empty() && self.prompter.is_some() {
            return self.run_interactive(&cancel).await;
        }

        let outcome = {
            let tree = match &self.tree {
                Some(tree) => tree,
                None => return Err(CoreError::NotAssembled),
            };
            let parser = self
                .parser
                .as_deref()
                .ok_or(CoreError::ParserNotConfigured)?;
            parser.parse(tree, &args)?
        };

        match outcome {
            ParseOutcome::Rendered { message, code } => Ok(RunOutcome::Rendered { message, code }),
            ParseOutcome::Invocation(invocation) => {
                if let Some(hook) = &self.logging {
                    hook(&invocation.values);
                }
                let report = self
                    .execute(
                        invocation.category,
                        &invocation.scaffolder,
                        invocation.values,
                        &cancel,
                    )
                    .await?;
                Ok(RunOutcome::Executed(report))
            }
        }
    }

    /// The interactive flow: pick a category, pick a scaffolder, prompt for
    /// every parameter, then run the same execute path the CLI uses.
    async fn run_interactive(&mut self, cancel: &CancelSignal) -> CoreResult<RunOutcome> {
        if let Some(hook) = &self.logging {
            hook(&OptionValues::new());
        }

        let (category, name, values) = {
            let prompter = self
                .prompter
                .as_deref()
                .ok_or(CoreError::PrompterNotConfigured)?;

            let categories: Vec<Category> = self.scaffolders.keys().copied().collect();
            if categories.is_empty() {
                return Err(CoreError::Internal {
                    message: "no scaffolders registered".into(),
                });
            }
            let labels: Vec<String> = categories.iter().map(ToString::to_string).collect();
            let picked = prompter.select("Category", &labels)?;
            let category = *categories.get(picked).ok_or_else(|| CoreError::Internal {
                message: "category selection out of range".into(),
            })?;

            let list = self
                .scaffolders
                .get(&category)
                .ok_or_else(|| CoreError::Internal {
                    message: "picked category vanished".into(),
                })?;
            let display: Vec<String> = list
                .iter()
                .map(|s| s.display_name().to_string())
                .collect();
            let picked = prompter.select("Scaffolder", &display)?;
            let chosen = list.get(picked).ok_or_else(|| CoreError::Internal {
                message: "scaffolder selection out of range".into(),
            })?;

            let mut values = OptionValues::new();
            for option in self.global_options.iter().chain(chosen.options().iter()) {
                let parameter = option.parameter();
                let value = prompter.choose(&parameter)?;
                if !value.is_null() {
                    values.insert(parameter.name, value);
                }
            }
            (category, chosen.name().to_string(), values)
        };

        let report = self.execute(category, &name, values, cancel).await?;
        Ok(RunOutcome::Executed(report))
    }

    /// Execute one scaffolder with already-resolved option values.
    ///
    /// This is the convergence point of both front ends, and the entry point
    /// for hosts that resolve values themselves.  Required options are
    /// validated here, before any step runs.
    #[instrument(skip_all, fields(category = %category, scaffolder = %name))]
    pub async fn execute(
        &mut self,
        category: Category,
        name: &str,
        values: OptionValues,
        cancel: &CancelSignal,
    ) -> CoreResult<RunReport> {
        let scaffolder = self
            .scaffolders
            .get_mut(&category)
            .and_then(|list| {
                list.iter_mut()
                    .find(|s| s.name().eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| CoreError::UnknownScaffolder {
                category,
                name: name.to_string(),
            })?;

        for option in self.global_options.iter().chain(scaffolder.options().iter()) {
            let flag = option.flag();
            if flag.required && flag.value != ValueKind::Switch {
                let missing = values
                    .get(&flag.name)
                    .is_none_or(|value| matches!(value, Value::Null));
                if missing {
                    return Err(CoreError::MissingRequiredOption {
                        flag: flag.name.clone(),
                    });
                }
            }
        }

        let mut ctx = ScaffoldContext::new(scaffolder.name(), values);
        info!(run_id = %ctx.run_id(), "Scaffolder run starting");
        scaffolder.execute(&mut ctx, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Invocation, MockCommandParser};
    use crate::runner_builder::RunnerBuilder;
    use crate::step::{ScaffoldStep, StepResult};
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

    fn runner_with_one_scaffolder(parser: Option<Box<dyn CommandParser>>) -> Runner {
        let mut rb = RunnerBuilder::new("armature");
        rb.services_mut().register_step::<NoopStep, _>(NoopStep::default);
        rb.add_scaffolder(Category::Api, "demo").with_step::<NoopStep>();
        if let Some(parser) = parser {
            rb.with_parser(parser);
        }
        rb.build().expect("build should succeed")
    }

    #[test]
    fn assemble_groups_by_category_and_lowercases_names() {
        let mut rb = RunnerBuilder::new("armature");
        rb.services_mut().register_step::<NoopStep, _>(NoopStep::default);
        rb.add_scaffolder(Category::Api, "Demo").with_step::<NoopStep>();
        rb.add_scaffolder(Category::Data, "repository")
            .with_step::<NoopStep>();

        let runner = rb.build().expect("build should succeed");
        let tree = runner.command_tree().expect("tree must be assembled");
        assert_eq!(tree.branches.len(), 2);
        assert!(tree.leaf(Category::Api, "demo").is_some());
        assert!(tree.leaf(Category::Data, "repository").is_some());
    }

    #[tokio::test]
    async fn parser_driven_run_executes_the_invocation() {
        let mut parser = MockCommandParser::new();
        parser.expect_parse().returning(|_, _| {
            Ok(ParseOutcome::Invocation(Invocation {
                category: Category::Api,
                scaffolder: "demo".into(),
                values: OptionValues::new(),
            }))
        });

        let runner = runner_with_one_scaffolder(Some(Box::new(parser)));
        let outcome = runner
            .run(vec!["api".into(), "demo".into()], CancelSignal::new())
            .await
            .expect("run should succeed");
        match outcome {
            RunOutcome::Executed(report) => assert_eq!(report.completed_count(), 1),
            RunOutcome::Rendered { .. } => panic!("expected an executed run"),
        }
    }

    #[tokio::test]
    async fn rendered_parser_output_short_circuits_execution(){
        let mut parser = MockCommandParser::new();
        parser.expect_parse().returning(|_, _| {
            Ok(ParseOutcome::Rendered {
                message: "usage".into(),
                code: 0,
            })
        });

        let runner = runner_with_one_scaffolder(Some(Box::new(parser)));
        let outcome = runner
            .run(vec!["--help".into()], CancelSignal::new())
            .await
            .expect("run should succeed");
        assert!(matches!(outcome, RunOutcome::Rendered { code: 0, .. }));
    }

    #[tokio::test]
    async fn missing_parser_is_a_configuration_error() {
        let runner = runner_with_one_scaffolder(None);
        let err = runner
            .run(vec!["api".into()], CancelSignal::new())
            .await
            .err()
            .expect("run must fail");
        assert!(matches!(err, CoreError::ParserNotConfigured));
    }

    #[tokio::test]
    async fn unknown_scaffolder_is_reported() {
        let mut runner = runner_with_one_scaffolder(None);
        let err = runner
            .execute(
                Category::Api,
                "missing",
                OptionValues::new(),
                &CancelSignal::new(),
            )
            .await
            .err()
            .expect("execute must fail");
        assert!(matches!(err, CoreError::UnknownScaffolder { .. }));
    }
}
