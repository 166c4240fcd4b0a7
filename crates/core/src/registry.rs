//! File to run bookkeeping
//!
//! Every file that is executing has exactly one run. An entry is created
//! when the runner starts the file and removed only when the file's results
//! are finalized.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::host::{TestHost, TestRun};
use crate::selection::SelectionRequest;
use crate::tree::TestTree;
use crate::types::RunTarget;

#[derive(Default)]
pub struct RunRegistry {
    runs: HashMap<PathBuf, Arc<dyn TestRun>>,
}

impl fmt::Debug for RunRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.runs.iter().map(|(file, run)| (file, run.name())))
            .finish()
    }
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runs for `targets` under `request`, returning the files that
    /// got a new run.
    ///
    /// Folders expand to their member files. Files that already have a run,
    /// or that the request does not include, are skipped.
    pub fn start_run(
        &mut self,
        targets: &[RunTarget],
        request: &Arc<SelectionRequest>,
        tree: &dyn TestTree,
        host: &dyn TestHost,
    ) -> Vec<PathBuf> {
        let mut started = Vec::new();
        for target in targets {
            match target {
                RunTarget::Folder(folder) => {
                    let members: Vec<RunTarget> = tree
                        .files_in_folder(folder)
                        .into_iter()
                        .map(RunTarget::File)
                        .collect();
                    debug!("Expanding folder {} into {} files", folder.display(), members.len());
                    started.extend(self.start_run(&members, request, tree, host));
                }
                RunTarget::File(file) => {
                    if self.start_file(file, request, tree, host) {
                        started.push(file.clone());
                    }
                }
            }
        }
        started
    }

    fn start_file(
        &mut self,
        file: &Path,
        request: &Arc<SelectionRequest>,
        tree: &dyn TestTree,
        host: &dyn TestHost,
    ) -> bool {
        if self.runs.contains_key(file) {
            debug!("Run already active for {}", file.display());
            return false;
        }
        if !request.includes_file(file) {
            debug!("{} is not included in the request, skipping", file.display());
            return false;
        }

        let run = host.create_run(request, Some(run_name(file)));
        for item in tree.file_items(file) {
            run.enqueued(&item);
            for child in tree.descendants(&item.id) {
                run.enqueued(&child);
            }
        }

        debug!("Started run for {}", file.display());
        self.runs.insert(file.to_path_buf(), run);
        true
    }

    pub fn run_for(&self, file: &Path) -> Option<Arc<dyn TestRun>> {
        self.runs.get(file).map(Arc::clone)
    }

    /// Remove the run for `file` and finalize it. Returns whether one existed.
    pub fn end_run(&mut self, file: &Path) -> bool {
        match self.runs.remove(file) {
            Some(run) => {
                run.end();
                debug!("Ended run for {}", file.display());
                true
            }
            None => false,
        }
    }

    /// End and drop every run.
    pub fn clear(&mut self) {
        for (_, run) in self.runs.drain() {
            run.end();
        }
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Display name for a file's run: `<parent dir>/<file name>`.
pub fn run_name(file: &Path) -> String {
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string_lossy().into_owned());

    match file.parent().and_then(Path::file_name) {
        Some(parent) => format!("{}/{}", parent.to_string_lossy(), name),
        None => name,
    }
}
