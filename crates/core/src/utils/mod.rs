//! Small shared helpers

pub mod serde_helpers;
pub mod text;

pub use text::{normalize_line_endings, strip_ansi};
