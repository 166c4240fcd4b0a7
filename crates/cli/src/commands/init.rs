use anyhow::{Context, Result};
use std::{env, path::PathBuf};
use tracing::info;
use vitest_explorer_core::config::{Config, CONFIG_FILE_NAMES};

pub fn init_command(cwd: Option<&str>, force: bool) -> Result<()> {
    // Determine the project root
    let project_root = if let Some(cwd) = cwd {
        PathBuf::from(cwd)
    } else {
        env::current_dir().context("Failed to get current directory")?
    };

    let project_root = project_root
        .canonicalize()
        .context("Failed to canonicalize project root")?;

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Wrote default config");

    println!("✅ Created config: {}", config_path.display());
    println!("\n📌 Adjust 'coverage.timeout_ms' if coverage reports are slow to appear");
    Ok(())
}
