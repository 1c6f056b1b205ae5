//! Project probing.

use std::any::Any;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use armature_core::prelude::*;

/// Manifest names that mark a project root.
const MANIFEST_NAMES: [&str; 5] = [
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
    "composer.json",
];

/// Looks for a project manifest under the target directory and publishes it
/// for downstream steps under `project.manifest`.
///
/// Not finding one is not an error — generation still works in an empty
/// directory; downstream steps just get no project context.
pub struct ProbeProjectStep {
    /// Directory to probe.  Hooks may retarget this (e.g. from a project
    /// picker option).
    pub root: PathBuf,
    pub search_depth: usize,
    pub skip: bool,
}

impl ProbeProjectStep {
    pub fn new(root: PathBuf, search_depth: usize) -> Self {
        Self {
            root,
            search_depth,
            skip: false,
        }
    }

    fn find_manifest(&self) -> Option<PathBuf> {
        walkdir::WalkDir::new(&self.root)
            .max_depth(self.search_depth)
            .into_iter()
            .filter_map(Result::ok)
            .find(|entry| {
                entry.file_type().is_file()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| MANIFEST_NAMES.contains(&name))
            })
            .map(|entry| entry.into_path())
    }
}

#[async_trait]
impl ScaffoldStep for ProbeProjectStep {
    fn should_skip(&self) -> bool {
        self.skip
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn execute(&mut self, ctx: &mut ScaffoldContext, _cancel: &CancelSignal) -> StepResult {
        match self.find_manifest() {
            Some(manifest) => {
                debug!(manifest = %manifest.display(), "Project manifest found");
                ctx.set("project.manifest", manifest.display().to_string());
            }
            None => {
                warn!(
                    root = %self.root.display(),
                    "No project manifest found; generating without project context"
                );
            }
        }
        Ok(())
    }
}
