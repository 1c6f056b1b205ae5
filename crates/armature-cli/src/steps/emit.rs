//! Artifact emission.

use std::any::Any;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use armature_core::prelude::*;

/// What the step emits.  Decides the target directory and the stub shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactKind {
    #[default]
    Controller,
    Endpoints,
    Page,
    Repository,
    Identity,
}

impl ArtifactKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Controller => "controllers",
            Self::Endpoints => "endpoints",
            Self::Page => "pages",
            Self::Repository => "repositories",
            Self::Identity => "identity",
        }
    }
}

/// Writes one source stub into the output directory.
///
/// All fields are configured by preparer hooks from option values; the step
/// itself only knows how to render and write.  Refuses to overwrite an
/// existing file — partial side effects from earlier steps are left in place
/// for the user to inspect.
pub struct EmitArtifactStep {
    pub kind: ArtifactKind,
    /// Artifact name as given by the user (e.g. `Invoice`).
    pub name: String,
    pub route: Option<String>,
    pub provider: Option<String>,
    pub with_actions: bool,
    pub open_api: bool,
    pub out_dir: PathBuf,
    /// Path of the emitted file, populated on success for post-hooks.
    pub written: Option<PathBuf>,
    pub skip: bool,
}

impl EmitArtifactStep {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            kind: ArtifactKind::default(),
            name: String::new(),
            route: None,
            provider: None,
            with_actions: false,
            open_api: false,
            out_dir,
            written: None,
            skip: false,
        }
    }

    fn render(&self) -> String {
        let name = &self.name;
        match self.kind {
            ArtifactKind::Controller => {
                let mut src = format!(
                    "//! `{name}` API controller.\n\n\
                     pub struct {name}Controller;\n\n\
                     impl {name}Controller {{\n"
                );
                if self.with_actions {
                    for action in ["list", "get", "create", "update", "delete"] {
                        src.push_str(&format!(
                            "    pub async fn {action}(&self) -> Response {{\n        todo!(\"{action} {name}\")\n    }}\n\n"
                        ));
                    }
                } else {
                    src.push_str("    pub async fn index(&self) -> Response {\n        todo!()\n    }\n\n");
                }
                src.push_str("}\n");
                src
            }
            ArtifactKind::Endpoints => format!(
                "//! Minimal API endpoints for `{name}`.\n\n\
                 pub fn map_{snake}_endpoints(router: Router) -> Router {{\n\
                 \x20   router.route(\"/{snake}\", get(list_{snake}))\n\
                 }}\n\n\
                 async fn list_{snake}() -> Response {{\n    todo!()\n}}\n{openapi}",
                snake = snake_case(name),
                openapi = if self.open_api {
                    "\n// OpenAPI description registered with the document builder.\n"
                } else {
                    ""
                },
            ),
            ArtifactKind::Page => format!(
                "//! `{name}` page.\n\n\
                 pub struct {name}Page;\n\n\
                 impl {name}Page {{\n\
                 \x20   pub const ROUTE: &str = \"{route}\";\n\n\
                 \x20   pub async fn render(&self) -> Markup {{\n        todo!()\n    }}\n\
                 }}\n",
                route = self
                    .route
                    .clone()
                    .unwrap_or_else(|| format!("/{}", snake_case(name))),
            ),
            ArtifactKind::Repository => format!(
                "//! `{name}` repository.\n\n\
                 pub struct {name}Repository {{\n    pool: {provider}Pool,\n}}\n\n\
                 impl {name}Repository {{\n\
                 \x20   pub async fn find(&self, id: i64) -> Option<{name}> {{\n        todo!()\n    }}\n\
                 }}\n",
                provider = self
                    .provider
                    .as_deref()
                    .map(capitalize)
                    .unwrap_or_else(|| "Db".into()),
            ),
            ArtifactKind::Identity => format!(
                "//! Identity wiring ({provider}).\n\n\
                 pub fn configure_identity(app: AppBuilder) -> AppBuilder {{\n\
                 \x20   app.with_auth(\"{provider}\")\n\
                 }}\n",
                provider = self.provider.as_deref().unwrap_or("cookie"),
            ),
        }
    }
}

#[async_trait]
impl ScaffoldStep for EmitArtifactStep {
    fn should_skip(&self) -> bool {
        self.skip
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn execute(&mut self, ctx: &mut ScaffoldContext, _cancel: &CancelSignal) -> StepResult {
        if self.name.is_empty() {
            return Err(StepFailure::new("no artifact name configured"));
        }

        let dir = self.out_dir.join(self.kind.dir_name());
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.rs", snake_case(&self.name)));
        if path.exists() {
            return Err(StepFailure::new(format!(
                "{} already exists",
                path.display()
            )));
        }

        std::fs::write(&path, self.render())?;
        info!(artifact = %path.display(), "Artifact written");

        ctx.set("artifact.path", path.display().to_string());
        self.written = Some(path);
        Ok(())
    }
}

/// `InvoiceItem` → `invoice_item`.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else if ch == '-' || ch == ' ' {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out
}

/// `postgres` → `Postgres`.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
