//! Explorer tree contract plus an in-memory implementation
//!
//! The real editor owns its item tree; the orchestrator only needs lookups
//! by task id and by file. `MemoryTree` implements the same contract from
//! collected file tasks, which is enough to replay recorded sessions.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::types::{CaseKind, FileTask, Task, TaskId, TaskKind, TestItem, TestItemId};

pub trait TestTree: Send + Sync {
    /// Merge a freshly collected file into the tree.
    fn collect_file(&self, file: &FileTask);

    fn item_for_task(&self, id: &TaskId) -> Option<TestItem>;

    /// Items that stand for `file` itself.
    fn file_items(&self, file: &Path) -> Vec<TestItem>;

    /// Every item below `item`, at any depth.
    fn descendants(&self, item: &TestItemId) -> Vec<TestItem>;

    /// Test files known under `folder`, recursively.
    fn files_in_folder(&self, folder: &Path) -> Vec<PathBuf>;

    /// Attach (or clear) descriptive error text on an item.
    fn set_error(&self, item: &TestItemId, error: Option<String>);
}

#[derive(Debug, Clone)]
struct Node {
    item: TestItem,
    children: Vec<TestItemId>,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct TreeState {
    nodes: HashMap<TestItemId, Node>,
    by_task: HashMap<TaskId, TestItemId>,
    task_of: HashMap<TestItemId, TaskId>,
    files: BTreeMap<PathBuf, TestItemId>,
}

impl TreeState {
    fn remove_subtree(&mut self, id: &TestItemId) {
        if let Some(node) = self.nodes.remove(id) {
            if let Some(task) = self.task_of.remove(id) {
                self.by_task.remove(&task);
            }
            for child in node.children {
                self.remove_subtree(&child);
            }
        }
    }

    fn add_child(&mut self, parent: &TestItemId, child: TestItemId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }
}

/// In-memory [`TestTree`] rooted at a workspace folder
#[derive(Debug)]
pub struct MemoryTree {
    root: PathBuf,
    state: RwLock<TreeState>,
}

impl MemoryTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: RwLock::new(TreeState::default()),
        }
    }

    /// Error text currently attached to an item.
    pub fn error_of(&self, item: &TestItemId) -> Option<String> {
        self.state.read().nodes.get(item).and_then(|node| node.error.clone())
    }

    /// Find a case by its path of labels below a file, e.g. `["math", "adds"]`.
    pub fn find_case(&self, file: &Path, labels: &[&str]) -> Option<TestItem> {
        let state = self.state.read();
        let mut current = state.files.get(file)?;
        for label in labels {
            let node = state.nodes.get(current)?;
            current = node
                .children
                .iter()
                .find(|child| state.nodes.get(*child).is_some_and(|n| n.item.label == *label))?;
        }
        state.nodes.get(current).map(|node| node.item.clone())
    }

    /// Get or create the folder item for `folder` and every ancestor up to
    /// the tree root.
    pub fn folder_item(&self, folder: &Path) -> TestItem {
        let mut state = self.state.write();
        self.ensure_folder(&mut state, folder)
    }

    fn ensure_folder(&self, state: &mut TreeState, folder: &Path) -> TestItem {
        let item = TestItem::folder(folder);
        if !state.nodes.contains_key(&item.id) {
            state.nodes.insert(
                item.id.clone(),
                Node {
                    item: item.clone(),
                    children: Vec::new(),
                    error: None,
                },
            );
            if folder != self.root {
                if let Some(parent) = folder.parent().filter(|p| p.starts_with(&self.root)) {
                    let parent_item = self.ensure_folder(state, parent);
                    state.add_child(&parent_item.id, item.id.clone());
                }
            }
        }
        item
    }

    fn insert_tasks<'a>(
        state: &mut TreeState,
        file: &Path,
        parent: &TestItemId,
        ancestors: &[&'a str],
        tasks: &'a [Task],
    ) {
        for task in tasks {
            let mut names = ancestors.to_vec();
            names.push(task.name.as_str());

            let kind = match task.kind {
                TaskKind::Suite => CaseKind::Suite,
                TaskKind::Test | TaskKind::Custom => CaseKind::Test,
            };
            let item = TestItem::case(
                format!("{}#{}", file.display(), task.id),
                task.name.clone(),
                file,
                kind,
                name_pattern(&names, kind),
            );
            let id = item.id.clone();

            state.nodes.insert(
                id.clone(),
                Node {
                    item,
                    children: Vec::new(),
                    error: None,
                },
            );
            state.by_task.insert(task.id.clone(), id.clone());
            state.task_of.insert(id.clone(), task.id.clone());
            state.add_child(parent, id.clone());

            Self::insert_tasks(state, file, &id, &names, &task.tasks);
        }
    }
}

/// Anchored pattern over a case's full name (ancestor names joined by
/// spaces), with regex metacharacters escaped.
///
/// Tests match their full name exactly. Suites match their own name and
/// every full name below it, since the runner filters on test names.
pub fn name_pattern(names: &[&str], kind: CaseKind) -> String {
    let escaped: Vec<String> = names.iter().map(|name| regex::escape(name)).collect();
    match kind {
        CaseKind::Test => format!("^{}$", escaped.join(" ")),
        CaseKind::Suite => format!("^{}( |$)", escaped.join(" ")),
    }
}

impl TestTree for MemoryTree {
    fn collect_file(&self, file: &FileTask) {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let item = TestItem::file(&file.filepath);

        if let Some(node) = state.nodes.get_mut(&item.id) {
            let children = std::mem::take(&mut node.children);
            for child in children {
                state.remove_subtree(&child);
            }
        } else {
            state.nodes.insert(
                item.id.clone(),
                Node {
                    item: item.clone(),
                    children: Vec::new(),
                    error: None,
                },
            );
            if let Some(parent) = file.filepath.parent().filter(|p| p.starts_with(&self.root)) {
                let folder = self.ensure_folder(state, parent);
                state.add_child(&folder.id, item.id.clone());
            }
        }

        if let Some(previous) = state.task_of.insert(item.id.clone(), file.id.clone()) {
            if previous != file.id {
                state.by_task.remove(&previous);
            }
        }
        state.by_task.insert(file.id.clone(), item.id.clone());
        state.files.insert(file.filepath.clone(), item.id.clone());

        Self::insert_tasks(state, &file.filepath, &item.id, &[], &file.tasks);
    }

    fn item_for_task(&self, id: &TaskId) -> Option<TestItem> {
        let state = self.state.read();
        let item_id = state.by_task.get(id)?;
        state.nodes.get(item_id).map(|node| node.item.clone())
    }

    fn file_items(&self, file: &Path) -> Vec<TestItem> {
        let state = self.state.read();
        state
            .files
            .get(file)
            .and_then(|id| state.nodes.get(id))
            .map(|node| vec![node.item.clone()])
            .unwrap_or_default()
    }

    fn descendants(&self, item: &TestItemId) -> Vec<TestItem> {
        let state = self.state.read();
        let mut out = Vec::new();
        let mut stack: Vec<&TestItemId> = state
            .nodes
            .get(item)
            .map(|node| node.children.iter().rev().collect())
            .unwrap_or_default();

        while let Some(id) = stack.pop() {
            if let Some(node) = state.nodes.get(id) {
                out.push(node.item.clone());
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    fn files_in_folder(&self, folder: &Path) -> Vec<PathBuf> {
        self.state
            .read()
            .files
            .keys()
            .filter(|file| file.starts_with(folder))
            .cloned()
            .collect()
    }

    fn set_error(&self, item: &TestItemId, error: Option<String>) {
        if let Some(node) = self.state.write().nodes.get_mut(item) {
            node.error = error;
        }
    }
}
