//! Configuration management for vitest-explorer

mod settings;

pub use settings::{Config, CoverageSettings, CONFIG_FILE_NAMES};
