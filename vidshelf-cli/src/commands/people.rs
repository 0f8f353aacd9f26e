use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use url::Url;

use vidshelf_catalog::{Link, Role};
use vidshelf_lib::Settings;

use crate::CliError;

use super::{open_session, require_file, require_person};

/// Parse a `YYYY-MM-DD` birthday as midnight UTC.
fn parse_birthday(text: &str) -> Result<DateTime<Utc>, CliError> {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| CliError::invalid(format!("birthday '{}': {}", text, e)))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CliError::invalid(format!("birthday '{}'", text)))
}

pub(crate) fn run_person_add(
    settings: &Settings,
    db_path: &Path,
    name: &str,
    born: Option<String>,
) -> Result<(), CliError> {
    let birthday = born.as_deref().map(parse_birthday).transpose()?;
    let mut session = open_session(db_path, settings)?;
    if session.person_get_by_name(name)?.is_some() {
        return Err(CliError::invalid(format!("'{}' already exists", name)));
    }
    let person = session.person_add(name, birthday)?;
    log::info!("Added {} (#{})", person.name, person.id);
    session.close()?;
    Ok(())
}

pub(crate) fn run_person_list(settings: &Settings, db_path: &Path) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let today = Utc::now().date_naive();
    for person in session.person_get_all()? {
        let age = person
            .age_on(today)
            .map(|a| format!(" ({})", a))
            .unwrap_or_default();
        log::info!(
            "  {:>4}  {}{}",
            person.id,
            person.name.if_supports_color(Stdout, |t| t.bold()),
            age.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    session.close()?;
    Ok(())
}

/// Print a person's links and the files they are credited on.
pub(crate) fn run_person_show(settings: &Settings, db_path: &Path, id: i64) -> Result<(), CliError> {
    let mut session = open_session(db_path, settings)?;
    let person = require_person(&mut session, id)?;

    log::info!("{}", person.name.if_supports_color(Stdout, |t| t.bold()));
    if let Some(born) = person.birthday {
        log::info!("  Born: {}", born.format("%Y-%m-%d"));
    }

    let links = session.person_url_get_by_person(&person)?;
    if !links.is_empty() {
        crate::log_blank();
        log::info!("  Links:");
        for link in &links {
            log::info!(
                "    {} {}",
                link.display_title(),
                link.url.as_str().if_supports_color(Stdout, |t| t.cyan()),
            );
            if let Some(description) = link.description.as_deref() {
                log::info!("      {}", description.if_supports_color(Stdout, |t| t.dimmed()));
            }
        }
    }

    for role in [Role::Director, Role::Actor] {
        let files = session.credit_get_by_person(role, &person)?;
        if files.is_empty() {
            continue;
        }
        crate::log_blank();
        log::info!("  As {}:", role.as_str());
        for file in &files {
            log::info!("    {:>5}  {}", file.id, file.display_title());
        }
    }
    session.close()?;
    Ok(())
}

pub(crate) fn run_person_link(
    settings: &Settings,
    db_path: &Path,
    person_id: i64,
    url: &str,
    title: Option<String>,
    description: Option<String>,
) -> Result<(), CliError> {
    let url = Url::parse(url).map_err(|e| CliError::invalid(format!("url '{}': {}", url, e)))?;
    let mut session = open_session(db_path, settings)?;
    let person = require_person(&mut session, person_id)?;

    let mut link = Link::new(url);
    if let Some(title) = title {
        link = link.with_title(title);
    }
    if let Some(description) = description {
        link = link.with_description(description);
    }
    session.person_url_add(&person, &mut link)?;
    log::info!("Linked {} to {}", person.name, link.url);
    session.close()?;
    Ok(())
}

/// Add (`add == true`) or remove a credit.
pub(crate) fn run_cast(
    settings: &Settings,
    db_path: &Path,
    file_id: i64,
    person_id: i64,
    director: bool,
    add: bool,
) -> Result<(), CliError> {
    let role = if director { Role::Director } else { Role::Actor };
    let mut session = open_session(db_path, settings)?;
    let file = require_file(&mut session, file_id)?;
    let person = require_person(&mut session, person_id)?;

    if add {
        session.credit_add(role, &file, &person).map_err(|e| {
            if e.is_constraint() {
                CliError::invalid(format!(
                    "{} is already credited as {} on '{}'",
                    person.name,
                    role.as_str(),
                    file.display_title()
                ))
            } else {
                e.into()
            }
        })?;
        log::info!(
            "{} credited as {} on '{}'",
            person.name,
            role.as_str(),
            file.display_title()
        );
    } else {
        session.credit_delete(role, &file, &person)?;
        log::info!(
            "Removed {} credit for {} on '{}'",
            role.as_str(),
            person.name,
            file.display_title()
        );
    }
    session.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn birthday_parses_to_midnight_utc() {
        let born = parse_birthday("1962-07-03").unwrap();
        assert_eq!(born.year(), 1962);
        assert_eq!(born.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn bad_birthday_is_invalid_argument() {
        assert!(matches!(
            parse_birthday("03/07/1962"),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
