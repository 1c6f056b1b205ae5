//! Runner composition.
//!
//! Everything the tool offers is declared here: step factories on the
//! registry, the scaffolder catalogue with its options and hooks, global
//! options, the front-end adapters, and the logging hook.  No business logic
//! lives in this module — hooks only move values between options, context,
//! and step fields.

use std::path::PathBuf;
use std::sync::Arc;

use armature_adapters::ClapCommandParser;
#[cfg(feature = "interactive")]
use armature_adapters::DialoguerPrompter;
use armature_core::prelude::*;

use crate::config::AppConfig;
use crate::logging;
use crate::steps::{ArtifactKind, EmitArtifactStep, ProbeProjectStep, SummaryStep};

/// Build the fully wired runner.
pub fn build_runner(config: &AppConfig) -> CoreResult<Runner> {
    let out_dir = config
        .scaffold
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let search_depth = config.scaffold.search_depth;
    let config_no_color = config.output.no_color;

    let mut rb = RunnerBuilder::new("armature");
    rb.with_about("Scaffold controllers, pages, components, and data access for your web project")
        .with_version(env!("CARGO_PKG_VERSION"));

    // ── Global options ────────────────────────────────────────────────────
    let verbose = Arc::new(
        ScaffoldOption::<bool>::builder("Verbose")
            .description("Enable debug logging")
            .build()?,
    );
    let quiet = Arc::new(
        ScaffoldOption::<bool>::builder("Quiet")
            .description("Suppress non-error output")
            .build()?,
    );
    let no_color = Arc::new(
        ScaffoldOption::<bool>::builder("No Color")
            .cli_flag("no-color")
            .description("Disable colored output")
            .build()?,
    );
    rb.add_option(verbose.clone());
    rb.add_option(quiet.clone());
    rb.add_option(no_color.clone());

    {
        let verbose = verbose.clone();
        let quiet = quiet.clone();
        let no_color = no_color.clone();
        rb.with_logging(move |values| {
            let verbose = verbose.value_in(values).unwrap_or(false);
            let quiet = quiet.value_in(values).unwrap_or(false);
            let no_color = config_no_color || no_color.value_in(values).unwrap_or(false);
            if let Err(e) = logging::init_logging(verbose, quiet, no_color) {
                eprintln!("Failed to initialise logging: {e}");
            }
        });
    }

    // ── Step factories ────────────────────────────────────────────────────
    {
        let root = out_dir.clone();
        rb.services_mut()
            .register_step::<ProbeProjectStep, _>(move || {
                ProbeProjectStep::new(root.clone(), search_depth)
            });
    }
    {
        let dir = out_dir.clone();
        rb.services_mut()
            .register_step::<EmitArtifactStep, _>(move || EmitArtifactStep::new(dir.clone()));
    }
    rb.services_mut()
        .register_step::<SummaryStep, _>(SummaryStep::default);

    // ── api/controller ────────────────────────────────────────────────────
    let name = Arc::new(
        ScaffoldOption::<String>::builder("Name")
            .required(true)
            .description("Name of the controller")
            .build()?,
    );
    let actions = Arc::new(
        ScaffoldOption::<bool>::builder("Actions")
            .description("Generate CRUD action handlers")
            .picker(PickerKind::YesNo)
            .build()?,
    );
    rb.add_scaffolder(Category::Api, "controller")
        .with_display_name("API controller")
        .with_description("Generate an API controller with optional CRUD actions")
        .with_option(name.clone())
        .with_option(actions.clone())
        .with_step::<ProbeProjectStep>()
        .with_prepared_step({
            let name = name.clone();
            let actions = actions.clone();
            StepPreparer::new()
                .pre(move |step: &mut EmitArtifactStep, ctx| {
                    step.kind = ArtifactKind::Controller;
                    if let Some(value) = ctx.option(&name) {
                        step.name = value;
                    }
                    step.with_actions = ctx.option(&actions).unwrap_or(false);
                })
                .post(|step: &mut EmitArtifactStep, ctx| {
                    if let Some(path) = &step.written {
                        ctx.set("summary.detail", format!("controller at {}", path.display()));
                    }
                })
        })
        .with_prepared_step(summary_stage(&quiet, &no_color, config_no_color));

    // ── api/endpoints ─────────────────────────────────────────────────────
    let model = Arc::new(
        ScaffoldOption::<String>::builder("Model")
            .required(true)
            .description("Model type the endpoints operate on")
            .picker(PickerKind::Class)
            .build()?,
    );
    let open_api = Arc::new(
        ScaffoldOption::<bool>::builder("Open API")
            .description("Register the endpoints with the OpenAPI document")
            .picker(PickerKind::YesNo)
            .build()?,
    );
    rb.add_scaffolder(Category::Api, "endpoints")
        .with_display_name("Minimal API endpoints")
        .with_description("Generate minimal API endpoints for a model")
        .with_option(model.clone())
        .with_option(open_api.clone())
        .with_step::<ProbeProjectStep>()
        .with_prepared_step({
            let model = model.clone();
            let open_api = open_api.clone();
            StepPreparer::new().pre(move |step: &mut EmitArtifactStep, ctx| {
                step.kind = ArtifactKind::Endpoints;
                if let Some(value) = ctx.option(&model) {
                    step.name = value;
                }
                step.open_api = ctx.option(&open_api).unwrap_or(false);
            })
        })
        .with_prepared_step(summary_stage(&quiet, &no_color, config_no_color));

    // ── pages/page ────────────────────────────────────────────────────────
    let page_name = Arc::new(
        ScaffoldOption::<String>::builder("Name")
            .required(true)
            .description("Name of the page")
            .build()?,
    );
    let route = Arc::new(
        ScaffoldOption::<String>::builder("Route")
            .description("Route path (defaults to /<name>)")
            .build()?,
    );
    rb.add_scaffolder(Category::Pages, "page")
        .with_display_name("Page")
        .with_description("Generate a server-rendered page")
        .with_option(page_name.clone())
        .with_option(route.clone())
        .with_step::<ProbeProjectStep>()
        .with_prepared_step({
            let page_name = page_name.clone();
            let route = route.clone();
            StepPreparer::new().pre(move |step: &mut EmitArtifactStep, ctx| {
                step.kind = ArtifactKind::Page;
                if let Some(value) = ctx.option(&page_name) {
                    step.name = value;
                }
                step.route = ctx.option(&route);
            })
        })
        .with_prepared_step(summary_stage(&quiet, &no_color, config_no_color));

    // ── data/repository ───────────────────────────────────────────────────
    let repo_model = Arc::new(
        ScaffoldOption::<String>::builder("Model")
            .required(true)
            .description("Model type the repository serves")
            .picker(PickerKind::Class)
            .build()?,
    );
    let provider = Arc::new(
        ScaffoldOption::<String>::builder("Provider")
            .description("Database provider")
            .choices(["postgres", "sqlite", "mysql"])
            .build()?,
    );
    rb.add_scaffolder(Category::Data, "repository")
        .with_display_name("Repository")
        .with_description("Generate a data-access repository for a model")
        .with_option(repo_model.clone())
        .with_option(provider.clone())
        .with_step::<ProbeProjectStep>()
        .with_prepared_step({
            let repo_model = repo_model.clone();
            let provider = provider.clone();
            StepPreparer::new().pre(move |step: &mut EmitArtifactStep, ctx| {
                step.kind = ArtifactKind::Repository;
                if let Some(value) = ctx.option(&repo_model) {
                    step.name = value;
                }
                step.provider = ctx.option(&provider);
            })
        })
        .with_prepared_step(summary_stage(&quiet, &no_color, config_no_color));

    // ── identity/setup ────────────────────────────────────────────────────
    let auth_provider = Arc::new(
        ScaffoldOption::<String>::builder("Provider")
            .required(true)
            .description("Authentication mechanism")
            .choices(["cookie", "openid-connect", "oauth"])
            .build()?,
    );
    let project = Arc::new(
        ScaffoldOption::<PathBuf>::builder("Project")
            .description("Target project manifest")
            .picker(PickerKind::Project)
            .build()?,
    );
    rb.add_scaffolder(Category::Identity, "setup")
        .with_display_name("Identity setup")
        .with_description("Wire authentication into the project")
        .with_option(auth_provider.clone())
        .with_option(project.clone())
        .with_prepared_step({
            let project = project.clone();
            StepPreparer::new().pre(move |step: &mut ProbeProjectStep, ctx| {
                // A picked manifest retargets probing at its directory.
                if let Some(manifest) = ctx.option(&project) {
                    if let Some(parent) = manifest.parent() {
                        step.root = parent.to_path_buf();
                    }
                }
            })
        })
        .with_prepared_step({
            let auth_provider = auth_provider.clone();
            StepPreparer::new().pre(move |step: &mut EmitArtifactStep, ctx| {
                step.kind = ArtifactKind::Identity;
                step.name = "Auth".into();
                step.provider = ctx.option(&auth_provider);
            })
        })
        .with_prepared_step(summary_stage(&quiet, &no_color, config_no_color));

    // ── Front ends ────────────────────────────────────────────────────────
    rb.with_parser(Box::new(ClapCommandParser::new()));
    #[cfg(feature = "interactive")]
    {
        rb.with_prompter(Box::new(DialoguerPrompter::new(
            out_dir.clone(),
            search_depth,
        )));
    }

    rb.build()
}

/// Summary stage shared by every scaffolder: `--quiet` skips it outright,
/// colour settings thread through.
fn summary_stage(
    quiet: &Arc<ScaffoldOption<bool>>,
    no_color: &Arc<ScaffoldOption<bool>>,
    config_no_color: bool,
) -> StepPreparer<SummaryStep> {
    let quiet = quiet.clone();
    let no_color = no_color.clone();
    StepPreparer::new().pre(move |step: &mut SummaryStep, ctx| {
        step.skip = ctx.option(&quiet).unwrap_or(false);
        step.no_color = config_no_color || ctx.option(&no_color).unwrap_or(false);
    })
}
