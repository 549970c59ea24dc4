use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Read;
use std::path::Path;
use texthive::{Engine, SortKey};

pub fn list(engine: &Engine, sort: SortKey, desc: bool) -> Result<()> {
    let items = engine.snapshot().list(sort, desc);
    for item in &items {
        println!("{:<40} {:>10}  {}", item.file_name, item.size, item.modified);
    }
    println!();
    println!("{}", format!("Loaded {} files", items.len()).dimmed());
    Ok(())
}

pub fn show(engine: &Engine, file: &str) -> Result<()> {
    let snapshot = engine.snapshot();
    let record = snapshot.content(file)?;
    eprintln!("{}", record.path.display().to_string().dimmed());
    print!("{}", record.content);
    Ok(())
}

pub fn save(engine: &Engine, file: &str, from: Option<&Path>) -> Result<()> {
    let content = match from {
        Some(src) => std::fs::read_to_string(src)
            .with_context(|| format!("Failed to read {}", src.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read new content from stdin")?;
            buf
        }
    };

    let item = engine
        .save(file, &content)
        .with_context(|| format!("Error saving file: {}", file))?;
    println!("Saved changes to {}", item.file_name);
    Ok(())
}

pub fn create(engine: &Engine, name: &str) -> Result<()> {
    match engine.create_file(name)? {
        Some(item) => println!("Created {}", item.full_path),
        None => println!("{} already exists", name),
    }
    Ok(())
}

pub fn today(engine: &Engine) -> Result<()> {
    let note = engine.create_todays_note()?;
    let verb = if note.created { "Created" } else { "Opened" };
    eprintln!("{}", format!("{} {}", verb, note.item.full_path).dimmed());
    print!("{}", note.content);
    Ok(())
}
