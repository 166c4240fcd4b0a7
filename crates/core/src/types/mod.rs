pub mod item;
pub mod location;
pub mod target;
pub mod task;

pub use item::{CaseKind, TestData, TestItem, TestItemId};
pub use location::{normalize_separators, same_file, ErrorLocation};
pub use target::{to_wire, RunTarget};
pub use task::{
    FileTask, StackFrame, Task, TaskId, TaskKind, TaskMode, TaskResult, TaskState, TestError,
};
