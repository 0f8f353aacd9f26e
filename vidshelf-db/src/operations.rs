//! Mutations for all catalog entity types.
//!
//! Each method is atomic on its own. Inside an explicit transaction it
//! becomes part of that transaction instead.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::params;
use vidshelf_catalog::{File, Folder, Link, Person, Role, Tag};

use crate::error::DbError;
use crate::query::QueryId;
use crate::session::Session;

/// Paths are stored as text.
pub(crate) fn path_text(path: &Path) -> Result<&str, DbError> {
    path.to_str()
        .ok_or_else(|| DbError::NonUtf8Path(path.to_path_buf()))
}

/// Truncate to the second precision the store keeps.
pub(crate) fn whole_seconds(stamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(stamp.timestamp(), 0).unwrap_or(stamp)
}

/// Person birthdays use epoch zero for "unknown".
fn birthday_secs(birthday: Option<DateTime<Utc>>) -> i64 {
    birthday.map_or(0, |b| b.timestamp())
}

impl Session {
    // ── Folder ──────────────────────────────────────────────────────────

    /// Register a scan root. It starts out as never scanned.
    pub fn folder_add(&mut self, path: &Path) -> Result<Folder, DbError> {
        let text = path_text(path)?;
        let id = self.insert(QueryId::FolderAdd, text, params![text])?;
        Ok(Folder {
            id,
            path: path.to_path_buf(),
            last_scan: DateTime::UNIX_EPOCH,
        })
    }

    /// Fails with a constraint error while files still belong to the folder.
    pub fn folder_remove(&mut self, folder: &Folder) -> Result<(), DbError> {
        let target = folder_target(folder);
        self.execute(QueryId::FolderRemove, &target, params![folder.id])?;
        Ok(())
    }

    /// Record a completed scan pass at `stamp` (kept with second precision).
    pub fn folder_update_scan(
        &mut self,
        folder: &mut Folder,
        stamp: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let target = folder_target(folder);
        self.execute(
            QueryId::FolderUpdateScan,
            &target,
            params![folder.id, stamp.timestamp()],
        )?;
        folder.last_scan = whole_seconds(stamp);
        Ok(())
    }

    // ── File ────────────────────────────────────────────────────────────

    pub fn file_add(&mut self, path: &Path, folder: &Folder) -> Result<File, DbError> {
        let text = path_text(path)?;
        let id = self.insert(QueryId::FileAdd, text, params![folder.id, text])?;
        Ok(File {
            id,
            folder_id: folder.id,
            path: path.to_path_buf(),
            title: None,
            year: None,
            hidden: false,
        })
    }

    /// Fails with a constraint error while tags or credits reference the file.
    pub fn file_remove(&mut self, file: &File) -> Result<(), DbError> {
        let target = file_target(file);
        self.execute(QueryId::FileRemove, &target, params![file.id])?;
        Ok(())
    }

    /// Set or clear the display title.
    pub fn file_set_title(&mut self, file: &mut File, title: Option<&str>) -> Result<(), DbError> {
        let target = file_target(file);
        self.execute(QueryId::FileSetTitle, &target, params![file.id, title])?;
        file.title = title.map(str::to_string);
        Ok(())
    }

    /// Set or clear the release year. Years up to 1900 are rejected by the
    /// schema.
    pub fn file_set_year(&mut self, file: &mut File, year: Option<i64>) -> Result<(), DbError> {
        let target = file_target(file);
        self.execute(QueryId::FileSetYear, &target, params![file.id, year])?;
        file.year = year;
        Ok(())
    }

    pub fn file_set_hidden(&mut self, file: &mut File, hidden: bool) -> Result<(), DbError> {
        let target = file_target(file);
        self.execute(QueryId::FileSetHidden, &target, params![file.id, hidden])?;
        file.hidden = hidden;
        Ok(())
    }

    // ── Tag ─────────────────────────────────────────────────────────────

    pub fn tag_add(&mut self, name: &str) -> Result<Tag, DbError> {
        let id = self.insert(QueryId::TagAdd, name, params![name])?;
        Ok(Tag {
            id,
            name: name.to_string(),
        })
    }

    /// Fails with a constraint error while the tag is linked to files.
    pub fn tag_delete(&mut self, tag: &Tag) -> Result<(), DbError> {
        self.execute(QueryId::TagDelete, &tag.name, params![tag.id])?;
        Ok(())
    }

    /// Tagging the same file twice is a constraint error.
    pub fn tag_link_add(&mut self, file: &File, tag: &Tag) -> Result<(), DbError> {
        let target = pair_target(file, &tag.name);
        self.insert(QueryId::TagLinkAdd, &target, params![file.id, tag.id])?;
        Ok(())
    }

    pub fn tag_link_delete(&mut self, file: &File, tag: &Tag) -> Result<(), DbError> {
        let target = pair_target(file, &tag.name);
        self.execute(QueryId::TagLinkDelete, &target, params![file.id, tag.id])?;
        Ok(())
    }

    // ── Person ──────────────────────────────────────────────────────────

    /// Add a person. The birthday is kept with second precision.
    pub fn person_add(
        &mut self,
        name: &str,
        birthday: Option<DateTime<Utc>>,
    ) -> Result<Person, DbError> {
        let id = self.insert(
            QueryId::PersonAdd,
            name,
            params![name, birthday_secs(birthday)],
        )?;
        Ok(Person {
            id,
            name: name.to_string(),
            birthday: birthday.map(whole_seconds),
        })
    }

    /// Fails with a constraint error while links or credits reference the
    /// person.
    pub fn person_remove(&mut self, person: &Person) -> Result<(), DbError> {
        self.execute(QueryId::PersonRemove, &person.name, params![person.id])?;
        Ok(())
    }

    /// Attach `link` to `person`, filling in its id and owner.
    pub fn person_url_add(&mut self, person: &Person, link: &mut Link) -> Result<(), DbError> {
        let id = self.insert(
            QueryId::PersonURLAdd,
            link.url.as_str(),
            params![
                person.id,
                link.url.as_str(),
                link.title.as_deref(),
                link.description.as_deref(),
            ],
        )?;
        link.id = id;
        link.person_id = person.id;
        Ok(())
    }

    pub fn person_url_delete(&mut self, link: &Link) -> Result<(), DbError> {
        self.execute(QueryId::PersonURLDelete, link.url.as_str(), params![link.id])?;
        Ok(())
    }

    // ── Credits ─────────────────────────────────────────────────────────

    /// Credit `person` on `file` in `role`. Crediting the same pair twice in
    /// one role is a constraint error.
    pub fn credit_add(&mut self, role: Role, file: &File, person: &Person) -> Result<(), DbError> {
        let query = match role {
            Role::Actor => QueryId::ActorAdd,
            Role::Director => QueryId::DirectorAdd,
        };
        let target = pair_target(file, &person.name);
        self.insert(query, &target, params![file.id, person.id])?;
        Ok(())
    }

    pub fn credit_delete(
        &mut self,
        role: Role,
        file: &File,
        person: &Person,
    ) -> Result<(), DbError> {
        let query = match role {
            Role::Actor => QueryId::ActorDelete,
            Role::Director => QueryId::DirectorDelete,
        };
        let target = pair_target(file, &person.name);
        self.execute(query, &target, params![file.id, person.id])?;
        Ok(())
    }

    pub fn actor_add(&mut self, file: &File, person: &Person) -> Result<(), DbError> {
        self.credit_add(Role::Actor, file, person)
    }

    pub fn actor_delete(&mut self, file: &File, person: &Person) -> Result<(), DbError> {
        self.credit_delete(Role::Actor, file, person)
    }

    pub fn director_add(&mut self, file: &File, person: &Person) -> Result<(), DbError> {
        self.credit_add(Role::Director, file, person)
    }

    pub fn director_delete(&mut self, file: &File, person: &Person) -> Result<(), DbError> {
        self.credit_delete(Role::Director, file, person)
    }
}

fn folder_target(folder: &Folder) -> String {
    format!("folder {} ({})", folder.id, folder.path.display())
}

fn file_target(file: &File) -> String {
    format!("file {} ({})", file.id, file.path.display())
}

fn pair_target(file: &File, other: &str) -> String {
    format!("file {} / {}", file.id, other)
}
