use anyhow::Result;
use std::path::Path;
use tracing::debug;
use vitest_explorer_core::{to_wire, ResolvedSelection, SelectionRequest};

use crate::utils::read_json;

pub fn resolve_command(selection: &Path, json: bool) -> Result<()> {
    let request: SelectionRequest = read_json(selection)?;
    debug!("Resolving {:?}", request);

    let resolved = request.resolve();
    if json {
        let value = match &resolved {
            Some(resolved) => serde_json::to_value(resolved)?,
            None => serde_json::json!({ "files": null }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match resolved {
        None => println!("🎯 All test files, no name pattern"),
        Some(ResolvedSelection { files, pattern }) => {
            println!("🎯 {} target(s):", files.len());
            for file in to_wire(&files) {
                println!("   • {file}");
            }
            match pattern {
                Some(pattern) => println!("🔍 Pattern: {pattern}"),
                None => println!("🔍 No name pattern"),
            }
        }
    }
    Ok(())
}
