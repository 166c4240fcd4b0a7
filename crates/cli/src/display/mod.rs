pub mod formatter;

pub use formatter::{format_duration, format_location, format_message, format_output, format_summary};
