use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use vidshelf_lib::Settings;
use vidshelf_lib::util::format_bytes;

use crate::CliError;

use super::open_session;

/// Checkpoint, vacuum, reindex and analyze the catalog.
pub(crate) fn run_maintain(settings: &Settings, db_path: &Path) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let before = session.info()?;
    session.perform_maintenance()?;
    let after = session.info()?;

    log::info!(
        "{} {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        "Maintenance complete".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Size: {} -> {}",
        format_bytes(page_bytes(before.page_size, before.page_count)),
        format_bytes(page_bytes(after.page_size, after.page_count)),
    );
    session.close()?;
    Ok(())
}

/// Print engine-level facts and row counts for the catalog.
pub(crate) fn run_info(settings: &Settings, db_path: &Path) -> Result<(), CliError> {
    if !db_path.exists() {
        log::warn!("No catalog database found at {}", db_path.display());
        log::info!("Run 'vidshelf scan <dir>' to create one.");
        return Ok(());
    }

    let mut session = open_session(db_path, settings)?;
    let info = session.info()?;
    let prepared = session.prepare_all()?;

    log::info!("{}", "Catalog Database".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Database:   {}", db_path.display());
    log::info!(
        "  Size:       {}",
        format_bytes(page_bytes(info.page_size, info.page_count))
    );
    log::info!("  Schema:     v{}", info.schema_version);
    log::info!("  Journal:    {}", info.journal_mode);
    log::info!(
        "  Foreign keys: {}",
        if info.foreign_keys { "on" } else { "off" }
    );
    log::info!("  Statements: {}", prepared);
    log::debug!("  Tables:     {}", info.tables.join(", "));
    crate::log_blank();
    log::info!("  Folders: {:>8}", session.folder_get_all()?.len());
    log::info!("  Files:   {:>8}", session.file_get_all()?.len());
    log::info!("  People:  {:>8}", session.person_get_all()?.len());
    log::info!("  Tags:    {:>8}", session.tag_get_all()?.len());
    session.close()?;
    Ok(())
}

fn page_bytes(page_size: i64, page_count: i64) -> u64 {
    u64::try_from(page_size.saturating_mul(page_count)).unwrap_or(0)
}
