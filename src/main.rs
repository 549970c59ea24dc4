mod ask_cmd;
mod config_cmd;
mod files_cmd;
mod search_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use texthive::config::default_config_path;
use texthive::{Engine, EngineConfig, SortKey};

#[derive(Parser)]
#[command(
    name = "texthive",
    version,
    about = "TextHive - browse, search and cluster your plain-text notes",
    long_about = "Loads every file with a configured extension from the configured folders, then searches them, shows related files for a term and answers simple questions from their contents."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration document (default: <config dir>/texthive/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List every loaded file with size and modification time
    List {
        /// Column to sort by
        #[arg(short, long, default_value = "path")]
        sort: SortKey,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Search file contents and names, then show related files
    Search {
        /// Search term (empty lists everything)
        #[arg(default_value = "")]
        term: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show files related to a term through shared rare words
    Related {
        term: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Ask a question answered from your files
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print a loaded file (full path or file name)
    Show { file: String },

    /// Overwrite a loaded file with new content
    Save {
        /// Loaded file (full path or file name)
        file: String,

        /// Read the new content from this file instead of stdin
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Create an empty file in the first configured folder
    New { name: String },

    /// Open today's MM-dd-yyNotes.txt in the first folder, creating it if missing
    Today,

    /// Show or edit folders and extensions
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the configuration document
    Show,
    /// Add a folder to scan
    AddFolder { folder: PathBuf },
    /// Stop scanning a folder
    RemoveFolder { folder: PathBuf },
    /// Add a file extension, including the dot (e.g. .md)
    AddExt { ext: String },
    /// Remove a file extension
    RemoveExt { ext: String },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Rebuild the corpus from the configured folders, reporting per-file failures.
fn load_engine(config: EngineConfig, verbose: u8) -> Result<Engine> {
    let engine = Engine::new();
    let summary = engine.reload(config)?;
    for failure in &summary.failures {
        eprintln!("Error reading {}: {}", failure.path.display(), failure.message);
    }
    if verbose > 0 {
        eprintln!(
            "Loaded {} files in {}ms",
            summary.files_loaded,
            summary.elapsed.as_millis()
        );
    }
    Ok(engine)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = EngineConfig::load(&config_path);

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::show(&config_path, &config)?,
            ConfigCommands::AddFolder { folder } => {
                config_cmd::add_folder(&config_path, config, folder)?
            }
            ConfigCommands::RemoveFolder { folder } => {
                config_cmd::remove_folder(&config_path, config, &folder)?
            }
            ConfigCommands::AddExt { ext } => config_cmd::add_ext(&config_path, config, &ext)?,
            ConfigCommands::RemoveExt { ext } => {
                config_cmd::remove_ext(&config_path, config, &ext)?
            }
        },

        Commands::List { sort, desc } => {
            let engine = load_engine(config, cli.verbose)?;
            files_cmd::list(&engine, sort, desc)?;
        }

        Commands::Search { term, json } => {
            let engine = load_engine(config, cli.verbose)?;
            search_cmd::run(&engine, &term, json, cli.verbose)?;
        }

        Commands::Related { term, json } => {
            let engine = load_engine(config, cli.verbose)?;
            search_cmd::related(&engine, &term, json)?;
        }

        Commands::Ask { question, json } => {
            let engine = load_engine(config, cli.verbose)?;
            ask_cmd::run(&engine, &question.join(" "), json, cli.verbose)?;
        }

        Commands::Show { file } => {
            let engine = load_engine(config, cli.verbose)?;
            files_cmd::show(&engine, &file)?;
        }

        Commands::Save { file, from } => {
            let engine = load_engine(config, cli.verbose)?;
            files_cmd::save(&engine, &file, from.as_deref())?;
        }

        Commands::New { name } => {
            let engine = load_engine(config, cli.verbose)?;
            files_cmd::create(&engine, &name)?;
        }

        Commands::Today => {
            let engine = load_engine(config, cli.verbose)?;
            files_cmd::today(&engine)?;
        }
    }

    Ok(())
}
