pub mod file;

pub use file::{read_json, read_transcript};
