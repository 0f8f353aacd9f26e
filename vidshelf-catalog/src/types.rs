//! Data model types for the video catalog.
//!
//! These types represent the persistent catalog schema: scanned folders,
//! video files, people credited on them, tags, and external links.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

// ── Folder ──────────────────────────────────────────────────────────────────

/// The root of a directory tree that is scanned for video files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub path: PathBuf,
    /// Time of the last completed scan. `UNIX_EPOCH` means "never scanned".
    pub last_scan: DateTime<Utc>,
}

impl Folder {
    /// True if no scan pass over this folder has completed yet.
    pub fn never_scanned(&self) -> bool {
        self.last_scan == DateTime::UNIX_EPOCH
    }
}

// ── File ────────────────────────────────────────────────────────────────────

/// A single video file discovered below a [`Folder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    pub folder_id: i64,
    pub path: PathBuf,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub hidden: bool,
}

impl File {
    /// The title to show for this file: the explicit title if set, otherwise
    /// the file name of its path.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => base_name(&self.path),
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

// ── Person ──────────────────────────────────────────────────────────────────

/// A person that can be credited on a [`File`] as actor or director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    /// Birthday with second precision; `None` if unknown.
    #[serde(default)]
    pub birthday: Option<DateTime<Utc>>,
}

impl Person {
    /// Age in whole years on the given date, if the birthday is known.
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let born = self.birthday?.date_naive();
        date.years_since(born)
    }

    /// Birth year, if the birthday is known.
    pub fn birth_year(&self) -> Option<i32> {
        self.birthday.map(|b| b.year())
    }
}

// ── Tag ─────────────────────────────────────────────────────────────────────

/// A free-form label attached to files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

// ── Link ────────────────────────────────────────────────────────────────────

/// An external URL attached to a [`Person`], with an optional title and
/// description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub person_id: i64,
    pub url: Url,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Link {
    /// Build a link that has not been persisted yet.
    pub fn new(url: Url) -> Self {
        Self {
            id: 0,
            person_id: 0,
            url,
            title: None,
            description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The link's title if non-empty, otherwise the URL itself.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => self.url.to_string(),
        }
    }
}

// ── Credits ─────────────────────────────────────────────────────────────────

/// The role a [`Person`] is credited with on a [`File`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Actor,
    Director,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Actor => "actor",
            Role::Director => "director",
        }
    }
}
