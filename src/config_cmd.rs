use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use texthive::EngineConfig;

pub fn show(path: &Path, config: &EngineConfig) -> Result<()> {
    println!("Config: {}", path.display());
    println!();
    if !path.exists() {
        println!("(default config, file not created)");
        println!();
    }
    println!("{}", serde_json::to_string_pretty(&config.document())?);
    Ok(())
}

fn persist(path: &Path, config: &EngineConfig) -> Result<()> {
    config
        .save(path)
        .with_context(|| format!("Error saving configuration to {}", path.display()))
}

pub fn add_folder(path: &Path, mut config: EngineConfig, folder: PathBuf) -> Result<()> {
    let shown = folder.display().to_string();
    if config.add_folder(folder) {
        persist(path, &config)?;
        println!("Added folder {}", shown);
    } else {
        println!("Folder {} already configured", shown);
    }
    Ok(())
}

pub fn remove_folder(path: &Path, mut config: EngineConfig, folder: &Path) -> Result<()> {
    if config.remove_folder(folder) {
        persist(path, &config)?;
        println!("Removed folder {}", folder.display());
    } else {
        println!("Folder {} was not configured", folder.display());
    }
    Ok(())
}

pub fn add_ext(path: &Path, mut config: EngineConfig, ext: &str) -> Result<()> {
    if config.add_extension(ext)? {
        persist(path, &config)?;
        println!("Added extension {}", ext);
    } else {
        println!("Extension {} already configured", ext);
    }
    Ok(())
}

pub fn remove_ext(path: &Path, mut config: EngineConfig, ext: &str) -> Result<()> {
    if config.remove_extension(ext) {
        persist(path, &config)?;
        println!("Removed extension {}", ext);
    } else {
        println!("Extension {} was not configured", ext);
    }
    Ok(())
}
