pub(crate) mod config;
pub(crate) mod files;
pub(crate) mod people;
pub(crate) mod scan;
pub(crate) mod store;
pub(crate) mod tags;

use std::path::Path;

use vidshelf_catalog::{File, Person, Tag};
use vidshelf_db::Session;
use vidshelf_lib::Settings;

use crate::CliError;

/// Create the directory that will hold the catalog database.
pub(crate) fn ensure_parent_dir(db_path: &Path) -> Result<(), CliError> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Open a Session on `db_path`, creating its parent directory if needed.
pub(crate) fn open_session(db_path: &Path, settings: &Settings) -> Result<Session, CliError> {
    ensure_parent_dir(db_path)?;
    log::debug!("Opening catalog at {}", db_path.display());
    Ok(Session::open_with(db_path, &settings.store_config())?)
}

pub(crate) fn require_file(session: &mut Session, id: i64) -> Result<File, CliError> {
    session
        .file_get_by_id(id)?
        .ok_or_else(|| CliError::not_found(format!("file #{}", id)))
}

pub(crate) fn require_person(session: &mut Session, id: i64) -> Result<Person, CliError> {
    session
        .person_get_by_id(id)?
        .ok_or_else(|| CliError::not_found(format!("person #{}", id)))
}

pub(crate) fn require_tag(session: &mut Session, name: &str) -> Result<Tag, CliError> {
    session
        .tag_get_by_name(name)?
        .ok_or_else(|| CliError::not_found(format!("tag '{}'", name)))
}
