//! Symbolic identifiers for every statement the session runs, and the SQL
//! behind each of them.

use std::fmt;

/// A specific database query.
///
/// The enumeration is closed: each identifier maps to exactly one SQL
/// template through [`QueryId::sql`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryId {
    FolderAdd,
    FolderRemove,
    FolderUpdateScan,
    FolderGetAll,
    FolderGetByPath,
    FolderGetByID,
    FileAdd,
    FileRemove,
    FileGetAll,
    FileGetByPath,
    FileGetByID,
    FileGetByFolder,
    FileSetTitle,
    FileSetYear,
    FileSetHidden,
    TagAdd,
    TagDelete,
    TagGetAll,
    TagGetByID,
    TagGetByName,
    TagLinkAdd,
    TagLinkDelete,
    TagLinkGetByTag,
    TagLinkGetByFile,
    PersonAdd,
    PersonRemove,
    PersonGetAll,
    PersonGetByID,
    PersonGetByName,
    PersonURLAdd,
    PersonURLDelete,
    PersonURLGetByPerson,
    ActorAdd,
    ActorDelete,
    ActorGetByPerson,
    ActorGetByFile,
    DirectorAdd,
    DirectorDelete,
    DirectorGetByPerson,
    DirectorGetByFile,
}

impl QueryId {
    /// Every query identifier, in declaration order.
    pub const ALL: [QueryId; 40] = [
        QueryId::FolderAdd,
        QueryId::FolderRemove,
        QueryId::FolderUpdateScan,
        QueryId::FolderGetAll,
        QueryId::FolderGetByPath,
        QueryId::FolderGetByID,
        QueryId::FileAdd,
        QueryId::FileRemove,
        QueryId::FileGetAll,
        QueryId::FileGetByPath,
        QueryId::FileGetByID,
        QueryId::FileGetByFolder,
        QueryId::FileSetTitle,
        QueryId::FileSetYear,
        QueryId::FileSetHidden,
        QueryId::TagAdd,
        QueryId::TagDelete,
        QueryId::TagGetAll,
        QueryId::TagGetByID,
        QueryId::TagGetByName,
        QueryId::TagLinkAdd,
        QueryId::TagLinkDelete,
        QueryId::TagLinkGetByTag,
        QueryId::TagLinkGetByFile,
        QueryId::PersonAdd,
        QueryId::PersonRemove,
        QueryId::PersonGetAll,
        QueryId::PersonGetByID,
        QueryId::PersonGetByName,
        QueryId::PersonURLAdd,
        QueryId::PersonURLDelete,
        QueryId::PersonURLGetByPerson,
        QueryId::ActorAdd,
        QueryId::ActorDelete,
        QueryId::ActorGetByPerson,
        QueryId::ActorGetByFile,
        QueryId::DirectorAdd,
        QueryId::DirectorDelete,
        QueryId::DirectorGetByPerson,
        QueryId::DirectorGetByFile,
    ];

    /// The identifier as it appears in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            QueryId::FolderAdd => "FolderAdd",
            QueryId::FolderRemove => "FolderRemove",
            QueryId::FolderUpdateScan => "FolderUpdateScan",
            QueryId::FolderGetAll => "FolderGetAll",
            QueryId::FolderGetByPath => "FolderGetByPath",
            QueryId::FolderGetByID => "FolderGetByID",
            QueryId::FileAdd => "FileAdd",
            QueryId::FileRemove => "FileRemove",
            QueryId::FileGetAll => "FileGetAll",
            QueryId::FileGetByPath => "FileGetByPath",
            QueryId::FileGetByID => "FileGetByID",
            QueryId::FileGetByFolder => "FileGetByFolder",
            QueryId::FileSetTitle => "FileSetTitle",
            QueryId::FileSetYear => "FileSetYear",
            QueryId::FileSetHidden => "FileSetHidden",
            QueryId::TagAdd => "TagAdd",
            QueryId::TagDelete => "TagDelete",
            QueryId::TagGetAll => "TagGetAll",
            QueryId::TagGetByID => "TagGetByID",
            QueryId::TagGetByName => "TagGetByName",
            QueryId::TagLinkAdd => "TagLinkAdd",
            QueryId::TagLinkDelete => "TagLinkDelete",
            QueryId::TagLinkGetByTag => "TagLinkGetByTag",
            QueryId::TagLinkGetByFile => "TagLinkGetByFile",
            QueryId::PersonAdd => "PersonAdd",
            QueryId::PersonRemove => "PersonRemove",
            QueryId::PersonGetAll => "PersonGetAll",
            QueryId::PersonGetByID => "PersonGetByID",
            QueryId::PersonGetByName => "PersonGetByName",
            QueryId::PersonURLAdd => "PersonURLAdd",
            QueryId::PersonURLDelete => "PersonURLDelete",
            QueryId::PersonURLGetByPerson => "PersonURLGetByPerson",
            QueryId::ActorAdd => "ActorAdd",
            QueryId::ActorDelete => "ActorDelete",
            QueryId::ActorGetByPerson => "ActorGetByPerson",
            QueryId::ActorGetByFile => "ActorGetByFile",
            QueryId::DirectorAdd => "DirectorAdd",
            QueryId::DirectorDelete => "DirectorDelete",
            QueryId::DirectorGetByPerson => "DirectorGetByPerson",
            QueryId::DirectorGetByFile => "DirectorGetByFile",
        }
    }

    /// The SQL template for this query. Placeholders are positional.
    pub fn sql(self) -> &'static str {
        match self {
            // ── Folder ──────────────────────────────────────────────────────
            QueryId::FolderAdd => "INSERT INTO folder (path, last_scan) VALUES (?1, 0)",
            QueryId::FolderRemove => "DELETE FROM folder WHERE id = ?1",
            QueryId::FolderUpdateScan => "UPDATE folder SET last_scan = ?2 WHERE id = ?1",
            QueryId::FolderGetAll => "SELECT id, path, last_scan FROM folder ORDER BY path",
            QueryId::FolderGetByPath => "SELECT id, path, last_scan FROM folder WHERE path = ?1",
            QueryId::FolderGetByID => "SELECT id, path, last_scan FROM folder WHERE id = ?1",

            // ── File ────────────────────────────────────────────────────────
            QueryId::FileAdd => "INSERT INTO file (folder_id, path) VALUES (?1, ?2)",
            QueryId::FileRemove => "DELETE FROM file WHERE id = ?1",
            QueryId::FileGetAll => {
                "SELECT id, folder_id, path, title, year, hidden FROM file ORDER BY path"
            }
            QueryId::FileGetByPath => {
                "SELECT id, folder_id, path, title, year, hidden FROM file WHERE path = ?1"
            }
            QueryId::FileGetByID => {
                "SELECT id, folder_id, path, title, year, hidden FROM file WHERE id = ?1"
            }
            QueryId::FileGetByFolder => {
                "SELECT id, folder_id, path, title, year, hidden FROM file
                 WHERE folder_id = ?1 ORDER BY path"
            }
            QueryId::FileSetTitle => "UPDATE file SET title = ?2 WHERE id = ?1",
            QueryId::FileSetYear => "UPDATE file SET year = ?2 WHERE id = ?1",
            QueryId::FileSetHidden => "UPDATE file SET hidden = ?2 WHERE id = ?1",

            // ── Tag ─────────────────────────────────────────────────────────
            QueryId::TagAdd => "INSERT INTO tag (name) VALUES (?1)",
            QueryId::TagDelete => "DELETE FROM tag WHERE id = ?1",
            QueryId::TagGetAll => "SELECT id, name FROM tag ORDER BY name",
            QueryId::TagGetByID => "SELECT id, name FROM tag WHERE id = ?1",
            QueryId::TagGetByName => "SELECT id, name FROM tag WHERE name = ?1",
            QueryId::TagLinkAdd => "INSERT INTO tag_link (file_id, tag_id) VALUES (?1, ?2)",
            QueryId::TagLinkDelete => "DELETE FROM tag_link WHERE file_id = ?1 AND tag_id = ?2",
            QueryId::TagLinkGetByTag => {
                "SELECT f.id, f.folder_id, f.path, f.title, f.year, f.hidden
                 FROM tag_link l
                 INNER JOIN file f ON l.file_id = f.id
                 WHERE l.tag_id = ?1
                 ORDER BY f.path"
            }
            QueryId::TagLinkGetByFile => {
                "SELECT t.id, t.name
                 FROM tag_link l
                 INNER JOIN tag t ON l.tag_id = t.id
                 WHERE l.file_id = ?1
                 ORDER BY t.name"
            }

            // ── Person ──────────────────────────────────────────────────────
            QueryId::PersonAdd => "INSERT INTO person (name, birthday) VALUES (?1, ?2)",
            QueryId::PersonRemove => "DELETE FROM person WHERE id = ?1",
            QueryId::PersonGetAll => "SELECT id, name, birthday FROM person ORDER BY name",
            QueryId::PersonGetByID => "SELECT id, name, birthday FROM person WHERE id = ?1",
            QueryId::PersonGetByName => "SELECT id, name, birthday FROM person WHERE name = ?1",
            QueryId::PersonURLAdd => {
                "INSERT INTO person_url (person_id, url, title, description)
                 VALUES (?1, ?2, ?3, ?4)"
            }
            QueryId::PersonURLDelete => "DELETE FROM person_url WHERE id = ?1",
            QueryId::PersonURLGetByPerson => {
                "SELECT id, person_id, url, title, description
                 FROM person_url WHERE person_id = ?1 ORDER BY id"
            }

            // ── Credits ─────────────────────────────────────────────────────
            QueryId::ActorAdd => "INSERT INTO actor (file_id, person_id) VALUES (?1, ?2)",
            QueryId::ActorDelete => "DELETE FROM actor WHERE file_id = ?1 AND person_id = ?2",
            QueryId::ActorGetByPerson => {
                "SELECT f.id, f.folder_id, f.path, f.title, f.year, f.hidden
                 FROM actor a
                 INNER JOIN file f ON a.file_id = f.id
                 WHERE a.person_id = ?1
                 ORDER BY f.path"
            }
            QueryId::ActorGetByFile => {
                "SELECT p.id, p.name, p.birthday
                 FROM actor a
                 INNER JOIN person p ON a.person_id = p.id
                 WHERE a.file_id = ?1
                 ORDER BY p.name"
            }
            QueryId::DirectorAdd => "INSERT INTO director (file_id, person_id) VALUES (?1, ?2)",
            QueryId::DirectorDelete => {
                "DELETE FROM director WHERE file_id = ?1 AND person_id = ?2"
            }
            QueryId::DirectorGetByPerson => {
                "SELECT f.id, f.folder_id, f.path, f.title, f.year, f.hidden
                 FROM director d
                 INNER JOIN file f ON d.file_id = f.id
                 WHERE d.person_id = ?1
                 ORDER BY f.path"
            }
            QueryId::DirectorGetByFile => {
                "SELECT p.id, p.name, p.birthday
                 FROM director d
                 INNER JOIN person p ON d.person_id = p.id
                 WHERE d.file_id = ?1
                 ORDER BY p.name"
            }
        }
    }

    /// True for statements that modify the database.
    pub fn is_mutation(self) -> bool {
        let sql = self.sql().trim_start();
        !sql.starts_with("SELECT")
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
