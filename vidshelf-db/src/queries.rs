//! Read accessors for all catalog entity types.
//!
//! A lookup that matches nothing returns `Ok(None)` or an empty `Vec`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Row, params};
use url::Url;
use vidshelf_catalog::{File, Folder, Link, Person, Role, Tag};

use crate::error::DbError;
use crate::operations::path_text;
use crate::query::QueryId;
use crate::session::Session;

impl Session {
    // ── Folder ──────────────────────────────────────────────────────────

    /// All folders, ordered by path.
    pub fn folder_get_all(&mut self) -> Result<Vec<Folder>, DbError> {
        self.query_all(QueryId::FolderGetAll, "folders", params![], row_to_folder)
    }

    pub fn folder_get_by_path(&mut self, path: &Path) -> Result<Option<Folder>, DbError> {
        let text = path_text(path)?;
        self.query_optional(QueryId::FolderGetByPath, text, params![text], row_to_folder)
    }

    pub fn folder_get_by_id(&mut self, id: i64) -> Result<Option<Folder>, DbError> {
        self.query_optional(
            QueryId::FolderGetByID,
            &format!("folder {id}"),
            params![id],
            row_to_folder,
        )
    }

    // ── File ────────────────────────────────────────────────────────────

    /// All files, ordered by path.
    pub fn file_get_all(&mut self) -> Result<Vec<File>, DbError> {
        self.query_all(QueryId::FileGetAll, "files", params![], row_to_file)
    }

    pub fn file_get_by_path(&mut self, path: &Path) -> Result<Option<File>, DbError> {
        let text = path_text(path)?;
        self.query_optional(QueryId::FileGetByPath, text, params![text], row_to_file)
    }

    pub fn file_get_by_id(&mut self, id: i64) -> Result<Option<File>, DbError> {
        self.query_optional(
            QueryId::FileGetByID,
            &format!("file {id}"),
            params![id],
            row_to_file,
        )
    }

    pub fn file_get_by_folder(&mut self, folder: &Folder) -> Result<Vec<File>, DbError> {
        self.query_all(
            QueryId::FileGetByFolder,
            &format!("folder {}", folder.id),
            params![folder.id],
            row_to_file,
        )
    }

    // ── Tag ─────────────────────────────────────────────────────────────

    /// All tags, ordered by name.
    pub fn tag_get_all(&mut self) -> Result<Vec<Tag>, DbError> {
        self.query_all(QueryId::TagGetAll, "tags", params![], row_to_tag)
    }

    pub fn tag_get_by_id(&mut self, id: i64) -> Result<Option<Tag>, DbError> {
        self.query_optional(
            QueryId::TagGetByID,
            &format!("tag {id}"),
            params![id],
            row_to_tag,
        )
    }

    pub fn tag_get_by_name(&mut self, name: &str) -> Result<Option<Tag>, DbError> {
        self.query_optional(QueryId::TagGetByName, name, params![name], row_to_tag)
    }

    /// Files carrying `tag`, ordered by path.
    pub fn tag_link_get_by_tag(&mut self, tag: &Tag) -> Result<Vec<File>, DbError> {
        self.query_all(
            QueryId::TagLinkGetByTag,
            &tag.name,
            params![tag.id],
            row_to_file,
        )
    }

    /// Tags on `file`, ordered by name.
    pub fn tag_link_get_by_file(&mut self, file: &File) -> Result<Vec<Tag>, DbError> {
        self.query_all(
            QueryId::TagLinkGetByFile,
            &format!("file {}", file.id),
            params![file.id],
            row_to_tag,
        )
    }

    // ── Person ──────────────────────────────────────────────────────────

    /// All people, ordered by name.
    pub fn person_get_all(&mut self) -> Result<Vec<Person>, DbError> {
        self.query_all(QueryId::PersonGetAll, "people", params![], row_to_person)
    }

    pub fn person_get_by_id(&mut self, id: i64) -> Result<Option<Person>, DbError> {
        self.query_optional(
            QueryId::PersonGetByID,
            &format!("person {id}"),
            params![id],
            row_to_person,
        )
    }

    pub fn person_get_by_name(&mut self, name: &str) -> Result<Option<Person>, DbError> {
        self.query_optional(QueryId::PersonGetByName, name, params![name], row_to_person)
    }

    /// Links owned by `person`, in insertion order.
    pub fn person_url_get_by_person(&mut self, person: &Person) -> Result<Vec<Link>, DbError> {
        self.query_all(
            QueryId::PersonURLGetByPerson,
            &person.name,
            params![person.id],
            row_to_link,
        )
    }

    // ── Credits ─────────────────────────────────────────────────────────

    /// Files on which `person` is credited in `role`, ordered by path.
    pub fn credit_get_by_person(
        &mut self,
        role: Role,
        person: &Person,
    ) -> Result<Vec<File>, DbError> {
        let query = match role {
            Role::Actor => QueryId::ActorGetByPerson,
            Role::Director => QueryId::DirectorGetByPerson,
        };
        self.query_all(query, &person.name, params![person.id], row_to_file)
    }

    /// People credited on `file` in `role`, ordered by name.
    pub fn credit_get_by_file(&mut self, role: Role, file: &File) -> Result<Vec<Person>, DbError> {
        let query = match role {
            Role::Actor => QueryId::ActorGetByFile,
            Role::Director => QueryId::DirectorGetByFile,
        };
        self.query_all(
            query,
            &format!("file {}", file.id),
            params![file.id],
            row_to_person,
        )
    }

    pub fn actor_get_by_person(&mut self, person: &Person) -> Result<Vec<File>, DbError> {
        self.credit_get_by_person(Role::Actor, person)
    }

    pub fn actor_get_by_file(&mut self, file: &File) -> Result<Vec<Person>, DbError> {
        self.credit_get_by_file(Role::Actor, file)
    }

    pub fn director_get_by_person(&mut self, person: &Person) -> Result<Vec<File>, DbError> {
        self.credit_get_by_person(Role::Director, person)
    }

    pub fn director_get_by_file(&mut self, file: &File) -> Result<Vec<Person>, DbError> {
        self.credit_get_by_file(Role::Director, file)
    }
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

fn row_to_folder(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get(0)?,
        path: PathBuf::from(row.get::<_, String>(1)?),
        last_scan: timestamp(row, 2)?,
    })
}

fn row_to_file(row: &Row<'_>) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        folder_id: row.get(1)?,
        path: PathBuf::from(row.get::<_, String>(2)?),
        title: row.get(3)?,
        year: row.get(4)?,
        hidden: row.get(5)?,
    })
}

fn row_to_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    let secs: i64 = row.get(2)?;
    let birthday = if secs == 0 {
        None
    } else {
        Some(timestamp(row, 2)?)
    };
    Ok(Person {
        id: row.get(0)?,
        name: row.get(1)?,
        birthday,
    })
}

fn row_to_link(row: &Row<'_>) -> rusqlite::Result<Link> {
    let text: String = row.get(2)?;
    let url = Url::parse(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Link {
        id: row.get(0)?,
        person_id: row.get(1)?,
        url,
        title: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Epoch seconds to a UTC timestamp.
fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {secs} out of range").into(),
        )
    })
}
