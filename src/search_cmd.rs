use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use texthive::{Engine, FileItem, RelatedFile, SearchStats};

#[derive(Serialize)]
struct SearchReport<'a> {
    term: &'a str,
    stats: SearchStats,
    files: Vec<FileItem>,
    related: Vec<RelatedFile>,
}

pub fn run(engine: &Engine, term: &str, json: bool, verbose: u8) -> Result<()> {
    let snapshot = engine.snapshot();
    let outcome = snapshot.search(term);
    let related = snapshot.related_files(term);

    if verbose > 0 {
        eprintln!("search: '{}' over {} files", term, snapshot.corpus().len());
    }

    if json {
        let report = SearchReport {
            term,
            stats: outcome.stats.clone(),
            files: outcome.files.iter().map(|r| FileItem::from(*r)).collect(),
            related,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for record in &outcome.files {
        let item = FileItem::from(*record);
        println!("{:<40} {:>10}  {}", item.file_name, item.size, item.modified);
    }
    println!();
    println!("{}", outcome.stats.status_line(term).dimmed());

    if !related.is_empty() {
        println!();
        print_related(&related);
    }
    Ok(())
}

pub fn related(engine: &Engine, term: &str, json: bool) -> Result<()> {
    let rows = engine.snapshot().related_files(term);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No related files for '{}'", term);
        return Ok(());
    }
    print_related(&rows);
    Ok(())
}

fn print_related(rows: &[RelatedFile]) {
    println!("{:<40} {}", "File".bold(), "Related Words".bold());
    for row in rows {
        println!("{:<40} {}", row.file_name, row.related_words);
    }
}
