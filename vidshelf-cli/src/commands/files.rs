use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use vidshelf_catalog::File;
use vidshelf_lib::Settings;

use crate::CliError;

use super::{open_session, require_file};

/// List every scanned folder with its file count and last scan time.
pub(crate) fn run_folders(settings: &Settings, db_path: &Path) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let folders = session.folder_get_all()?;

    if folders.is_empty() {
        log::info!("No folders yet. Run 'vidshelf scan <dir>' to add one.");
        return session.close().map_err(Into::into);
    }

    log::info!("{}", "Folders".if_supports_color(Stdout, |t| t.bold()));
    for folder in &folders {
        let count = session.file_get_by_folder(folder)?.len();
        let scanned = if folder.never_scanned() {
            "never scanned".to_string()
        } else {
            folder.last_scan.format("%Y-%m-%d %H:%M").to_string()
        };
        log::info!(
            "  {:>4}  {}  {} file(s), {}",
            folder.id,
            folder.path.display().if_supports_color(Stdout, |t| t.cyan()),
            count,
            scanned.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    session.close()?;
    Ok(())
}

fn log_file_line(file: &File) {
    let year = file.year.map(|y| format!(" ({})", y)).unwrap_or_default();
    let hidden = if file.hidden { " [hidden]" } else { "" };
    log::info!(
        "  {:>5}  {}{}{}",
        file.id,
        file.display_title().if_supports_color(Stdout, |t| t.bold()),
        year,
        hidden.if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::debug!("         {}", file.path.display());
}

/// List files, optionally restricted to one folder.
pub(crate) fn run_files(
    settings: &Settings,
    db_path: &Path,
    all: bool,
    folder_id: Option<i64>,
) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let files = match folder_id {
        Some(id) => {
            let folder = session
                .folder_get_by_id(id)?
                .ok_or_else(|| CliError::not_found(format!("folder #{}", id)))?;
            session.file_get_by_folder(&folder)?
        }
        None => session.file_get_all()?,
    };

    let mut hidden = 0;
    for file in &files {
        if file.hidden && !all {
            hidden += 1;
            continue;
        }
        log_file_line(file);
    }
    if hidden > 0 {
        log::info!(
            "{}",
            format!("{} hidden file(s) not shown, use --all", hidden)
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    session.close()?;
    Ok(())
}

pub(crate) fn run_set_title(
    settings: &Settings,
    db_path: &Path,
    id: i64,
    title: Option<String>,
) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let mut file = require_file(&mut session, id)?;
    session.file_set_title(&mut file, title.as_deref())?;
    log::info!("#{} is now '{}'", file.id, file.display_title());
    session.close()?;
    Ok(())
}

pub(crate) fn run_set_year(
    settings: &Settings,
    db_path: &Path,
    id: i64,
    year: Option<i64>,
) -> Result<(), CliError> {
    if let Some(y) = year
        && y <= 1900
    {
        return Err(CliError::invalid(format!("year {} must be after 1900", y)));
    }
    let mut session = open_session(db_path, settings)?;
    let mut file = require_file(&mut session, id)?;
    session.file_set_year(&mut file, year)?;
    match file.year {
        Some(y) => log::info!("#{} year set to {}", file.id, y),
        None => log::info!("#{} year cleared", file.id),
    }
    session.close()?;
    Ok(())
}

pub(crate) fn run_set_hidden(
    settings: &Settings,
    db_path: &Path,
    id: i64,
    hidden: bool,
) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let mut file = require_file(&mut session, id)?;
    session.file_set_hidden(&mut file, hidden)?;
    log::info!(
        "#{} {}",
        file.id,
        if hidden { "hidden" } else { "visible" }
    );
    session.close()?;
    Ok(())
}

/// Print one file with its tags and credits.
pub(crate) fn run_file_info(settings: &Settings, db_path: &Path, id: i64) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let file = require_file(&mut session, id)?;
    let tags = session.tag_link_get_by_file(&file)?;
    let actors = session.actor_get_by_file(&file)?;
    let directors = session.director_get_by_file(&file)?;

    log::info!(
        "{}",
        file.display_title().if_supports_color(Stdout, |t| t.bold())
    );
    log::info!("  Path:      {}", file.path.display());
    if let Some(year) = file.year {
        log::info!("  Year:      {}", year);
    }
    if file.hidden {
        log::info!("  Hidden:    yes");
    }
    let join = |names: Vec<String>| {
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    };
    log::info!(
        "  Tags:      {}",
        join(tags.into_iter().map(|t| t.name).collect())
    );
    log::info!(
        "  Directors: {}",
        join(directors.into_iter().map(|p| p.name).collect())
    );
    log::info!(
        "  Actors:    {}",
        join(actors.into_iter().map(|p| p.name).collect())
    );
    session.close()?;
    Ok(())
}
