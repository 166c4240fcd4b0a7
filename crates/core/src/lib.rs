//! vitest-explorer - Run orchestration between an editor test explorer and Vitest
//!
//! This crate provides functionality to:
//! - Translate explorer selections into runner file lists and name patterns
//! - Track one editor run per executing file
//! - Map task results, errors and console output back onto explorer items
//! - Coordinate coverage collection, watch mode, cancellation and debugging
pub mod api;
pub mod config;
pub mod coverage;
pub mod debug;
pub mod error;
pub mod host;
pub mod mapper;
pub mod registry;
pub mod runner;
pub mod selection;
pub mod tree;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

pub use api::{event_channel, EventReceiver, EventSender, RunnerEvent, VitestFolderApi};
pub use config::Config;
pub use coverage::{CoverageConfig, CoverageReport};
pub use debug::{DebugLauncher, DebugSession};
pub use host::{TestHost, TestMessage, TestRun};
pub use runner::TestRunner;
pub use selection::{ProfileKind, ResolvedSelection, SelectionRequest};
pub use tree::{MemoryTree, TestTree};
