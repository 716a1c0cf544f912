//! `dropzone config` handlers.

use anyhow::{Context, Result};
use dropzone_core::config::{self, Config};

pub fn path() {
    let path = config::paths::config_path();
    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} (not created yet)", path.display());
    }
}

pub fn init() -> Result<()> {
    let path = config::paths::config_path();
    Config::init(&path).with_context(|| format!("init config at {}", path.display()))?;
    println!("Created config at {}", path.display());
    Ok(())
}

/// Prints the effective configuration (file values over defaults).
pub fn show(config: &Config) -> Result<()> {
    let rendered = toml::to_string(config).context("serialize config")?;
    print!("{rendered}");
    Ok(())
}

pub fn generate() -> Result<()> {
    print!("{}", Config::generate()?);
    Ok(())
}
