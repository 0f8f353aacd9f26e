use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use vidshelf_lib::Settings;

use crate::CliError;

use super::{open_session, require_file, require_tag};

pub(crate) fn run_tag_add(settings: &Settings, db_path: &Path, name: &str) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    if session.tag_get_by_name(name)?.is_some() {
        return Err(CliError::invalid(format!("tag '{}' already exists", name)));
    }
    let tag = session.tag_add(name)?;
    log::info!("Created tag '{}' (#{})", tag.name, tag.id);
    session.close()?;
    Ok(())
}

/// Attach `tag` to a file, creating the tag first if it does not exist.
pub(crate) fn run_tag_link(
    settings: &Settings,
    db_path: &Path,
    file_id: i64,
    tag: &str,
) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let file = require_file(&mut session, file_id)?;

    let created = session.transaction(|s| {
        let (tag, created) = match s.tag_get_by_name(tag)? {
            Some(existing) => (existing, false),
            None => (s.tag_add(tag)?, true),
        };
        if !s.tag_link_get_by_file(&file)?.contains(&tag) {
            s.tag_link_add(&file, &tag)?;
        }
        Ok(created)
    })?;

    if created {
        log::info!("Created tag '{}'", tag);
    }
    log::info!("Tagged '{}' with '{}'", file.display_title(), tag);
    session.close()?;
    Ok(())
}

pub(crate) fn run_tag_unlink(
    settings: &Settings,
    db_path: &Path,
    file_id: i64,
    tag: &str,
) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let file = require_file(&mut session, file_id)?;
    let tag = require_tag(&mut session, tag)?;
    session.tag_link_delete(&file, &tag)?;
    log::info!("Removed '{}' from '{}'", tag.name, file.display_title());
    session.close()?;
    Ok(())
}

/// Delete a tag. Tags still attached to files are refused.
pub(crate) fn run_tag_delete(
    settings: &Settings,
    db_path: &Path,
    name: &str,
) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let tag = require_tag(&mut session, name)?;
    let in_use = session.tag_link_get_by_tag(&tag)?.len();
    if in_use > 0 {
        return Err(CliError::invalid(format!(
            "tag '{}' is still on {} file(s)",
            tag.name, in_use
        )));
    }
    session.tag_delete(&tag)?;
    log::info!("Deleted tag '{}'", tag.name);
    session.close()?;
    Ok(())
}

/// List all tags with usage counts, or the files carrying `name`.
pub(crate) fn run_tag_list(
    settings: &Settings,
    db_path: &Path,
    name: Option<String>,
) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;

    match name {
        Some(name) => {
            let tag = require_tag(&mut session, &name)?;
            let files = session.tag_link_get_by_tag(&tag)?;
            log::info!(
                "{}",
                format!("Files tagged '{}'", tag.name).if_supports_color(Stdout, |t| t.bold())
            );
            for file in &files {
                log::info!("  {:>5}  {}", file.id, file.display_title());
            }
        }
        None => {
            let tags = session.tag_get_all()?;
            if tags.is_empty() {
                log::info!("No tags yet.");
            }
            for tag in &tags {
                let count = session.tag_link_get_by_tag(tag)?.len();
                log::info!(
                    "  {:<24} {:>5}",
                    tag.name.if_supports_color(Stdout, |t| t.cyan()),
                    count
                );
            }
        }
    }
    session.close()?;
    Ok(())
}
