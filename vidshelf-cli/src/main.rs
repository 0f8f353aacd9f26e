//! vidshelf CLI
//!
//! Command-line interface for cataloging a personal video collection.

mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use vidshelf_lib::Settings;

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "vidshelf")]
#[command(about = "Catalog video files, tags and the people in them", long_about = None)]
struct Cli {
    /// Catalog database (defaults to the settings file, then the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories and add new video files
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Number of worker threads (overrides settings)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Minimum file size in bytes (overrides settings)
        #[arg(long)]
        min_size: Option<u64>,
    },

    /// List scanned folders
    Folders,

    /// List files
    Files {
        /// Include hidden files
        #[arg(short, long)]
        all: bool,

        /// Only files below this folder id
        #[arg(long)]
        folder: Option<i64>,
    },

    /// Edit or inspect a single file
    File {
        #[command(subcommand)]
        action: FileAction,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage people
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },

    /// Credit people on files
    Cast {
        #[command(subcommand)]
        action: CastAction,
    },

    /// Checkpoint, compact and re-analyze the database
    Maintain,

    /// Show database details
    Info,

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum FileAction {
    /// Set the display title (omit to clear)
    Title { id: i64, title: Option<String> },

    /// Set the release year (omit to clear)
    Year { id: i64, year: Option<i64> },

    /// Hide a file from listings
    Hide { id: i64 },

    /// Show a hidden file again
    Show { id: i64 },

    /// Print tags and credits of a file
    Info { id: i64 },
}

#[derive(Subcommand)]
enum TagAction {
    /// Create a tag
    Add { name: String },

    /// Tag a file, creating the tag if needed
    Link { file_id: i64, tag: String },

    /// Remove a tag from a file
    Unlink { file_id: i64, tag: String },

    /// Delete an unused tag
    Delete { name: String },

    /// List tags, or the files carrying one tag
    List { name: Option<String> },
}

#[derive(Subcommand)]
enum PersonAction {
    /// Add a person
    Add {
        name: String,

        /// Birthday as YYYY-MM-DD
        #[arg(long)]
        born: Option<String>,
    },

    /// List people
    List,

    /// Show links and credits of a person
    Show { id: i64 },

    /// Attach a URL to a person
    Link {
        person_id: i64,
        url: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum CastAction {
    /// Credit a person on a file
    Add {
        file_id: i64,
        person_id: i64,

        /// Credit as director instead of actor
        #[arg(long)]
        director: bool,
    },

    /// Remove a credit
    Remove {
        file_id: i64,
        person_id: i64,

        #[arg(long)]
        director: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the settings file path
    Path,

    /// Print the effective settings
    Show,
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .target(env_logger::Target::Stdout)
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            log::Level::Warn => writeln!(
                buf,
                "{} {}",
                "warning:".if_supports_color(Stdout, |t| t.yellow()),
                record.args()
            ),
            log::Level::Error => writeln!(
                buf,
                "{} {}",
                "error:".if_supports_color(Stdout, |t| t.red()),
                record.args()
            ),
            level => writeln!(buf, "[{} {}] {}", level, record.target(), record.args()),
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load()?;
    let db = settings.database_path(cli.db);

    match cli.command {
        Commands::Scan {
            roots,
            workers,
            min_size,
        } => commands::scan::run_scan(&settings, &db, roots, workers, min_size),
        Commands::Folders => commands::files::run_folders(&settings, &db),
        Commands::Files { all, folder } => commands::files::run_files(&settings, &db, all, folder),
        Commands::File { action } => match action {
            FileAction::Title { id, title } => {
                commands::files::run_set_title(&settings, &db, id, title)
            }
            FileAction::Year { id, year } => commands::files::run_set_year(&settings, &db, id, year),
            FileAction::Hide { id } => commands::files::run_set_hidden(&settings, &db, id, true),
            FileAction::Show { id } => commands::files::run_set_hidden(&settings, &db, id, false),
            FileAction::Info { id } => commands::files::run_file_info(&settings, &db, id),
        },
        Commands::Tag { action } => match action {
            TagAction::Add { name } => commands::tags::run_tag_add(&settings, &db, &name),
            TagAction::Link { file_id, tag } => {
                commands::tags::run_tag_link(&settings, &db, file_id, &tag)
            }
            TagAction::Unlink { file_id, tag } => {
                commands::tags::run_tag_unlink(&settings, &db, file_id, &tag)
            }
            TagAction::Delete { name } => commands::tags::run_tag_delete(&settings, &db, &name),
            TagAction::List { name } => commands::tags::run_tag_list(&settings, &db, name),
        },
        Commands::Person { action } => match action {
            PersonAction::Add { name, born } => {
                commands::people::run_person_add(&settings, &db, &name, born)
            }
            PersonAction::List => commands::people::run_person_list(&settings, &db),
            PersonAction::Show { id } => commands::people::run_person_show(&settings, &db, id),
            PersonAction::Link {
                person_id,
                url,
                title,
                description,
            } => commands::people::run_person_link(&settings, &db, person_id, &url, title, description),
        },
        Commands::Cast { action } => match action {
            CastAction::Add {
                file_id,
                person_id,
                director,
            } => commands::people::run_cast(&settings, &db, file_id, person_id, director, true),
            CastAction::Remove {
                file_id,
                person_id,
                director,
            } => commands::people::run_cast(&settings, &db, file_id, person_id, director, false),
        },
        Commands::Maintain => commands::store::run_maintain(&settings, &db),
        Commands::Info => commands::store::run_info(&settings, &db),
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::Show => commands::config::run_config_show(&settings, &db),
        },
    }
}
