//! Directory scanner that registers video files in the catalog.
//!
//! Each root is walked by a worker holding its own pooled Session. All
//! files found below one root are added inside a single transaction, so a
//! root either lands completely or not at all.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use chrono::Utc;
use vidshelf_catalog::{File, Folder};
use vidshelf_db::{DbError, Session, SessionPool};
use walkdir::WalkDir;

use crate::error::ScanError;

/// Files smaller than this are not considered videos.
pub const DEFAULT_MIN_SIZE: u64 = 32 * 1024 * 1024;

/// File suffixes picked up by default (compared case-insensitively).
pub const DEFAULT_SUFFIXES: &[&str] = &[
    "avi", "mp4", "mpg", "asf", "flv", "m4v", "mkv", "mov", "ogm", "ogv", "sfv", "webm", "wmv",
];

/// Filters and parallelism for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub min_size: u64,
    /// Lowercase suffixes without the leading dot.
    pub suffixes: HashSet<String>,
    pub workers: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SIZE, DEFAULT_SUFFIXES, 1)
    }
}

impl ScanOptions {
    pub fn new<S: AsRef<str>>(min_size: u64, suffixes: &[S], workers: usize) -> Self {
        Self {
            min_size,
            suffixes: suffixes
                .iter()
                .map(|s| s.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            workers: workers.max(1),
        }
    }

    /// True if `path` ends in one of the configured suffixes.
    pub fn matches_suffix(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.suffixes.contains(&e.to_lowercase()))
    }
}

/// Why a candidate file was not added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Smaller than [`ScanOptions::min_size`].
    TooSmall,
    /// Already in the catalog.
    Known,
    /// The path is not valid UTF-8 and cannot be stored.
    UnsupportedPath,
}

/// Progress callbacks for a scan. Called from worker threads.
pub trait ScanProgress: Sync {
    fn on_root_start(&self, _root: &Path) {}
    /// Called once the transaction holding `file` has committed.
    fn on_file_added(&self, _file: &File) {}
    fn on_skipped(&self, _path: &Path, _reason: SkipReason) {}
    fn on_error(&self, _path: &Path, _message: &str) {}
    fn on_root_complete(&self, _folder: &Folder, _stats: &ScanStats) {}
}

/// A [`ScanProgress`] that ignores every event.
pub struct NoProgress;

impl ScanProgress for NoProgress {}

/// Counters for one root or a whole scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub roots: usize,
    pub added: usize,
    pub known: usize,
    pub too_small: usize,
    /// Regular files without a video suffix.
    pub ignored: usize,
    pub errors: usize,
}

impl ScanStats {
    pub fn merge(&mut self, other: &ScanStats) {
        self.roots += other.roots;
        self.added += other.added;
        self.known += other.known;
        self.too_small += other.too_small;
        self.ignored += other.ignored;
        self.errors += other.errors;
    }
}

/// Scan every root in `roots` using up to `options.workers` threads.
///
/// A failing root stops the worker that scanned it; other workers finish
/// their roots. The first error is returned once all workers are done.
pub fn scan_roots(
    pool: &SessionPool,
    roots: &[PathBuf],
    options: &ScanOptions,
    progress: &dyn ScanProgress,
) -> Result<ScanStats, ScanError> {
    let next = AtomicUsize::new(0);
    let workers = options.workers.clamp(1, roots.len().max(1));
    log::debug!("Scanning {} root(s) with {} worker(s)", roots.len(), workers);

    let results: Vec<Result<ScanStats, ScanError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| -> Result<ScanStats, ScanError> {
                    let mut session = pool.acquire()?;
                    let mut stats = ScanStats::default();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(root) = roots.get(index) else {
                            break;
                        };
                        let root_stats = scan_root(&mut session, root, options, progress)?;
                        stats.merge(&root_stats);
                    }
                    Ok(stats)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(Err(ScanError::WorkerPanicked)))
            .collect()
    });

    let mut total = ScanStats::default();
    let mut first_error = None;
    for result in results {
        match result {
            Ok(stats) => total.merge(&stats),
            Err(e) => {
                log::error!("Scan failed: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    first_error.map_or(Ok(total), Err)
}

/// Scan one root with an existing session.
pub fn scan_root(
    session: &mut Session,
    root: &Path,
    options: &ScanOptions,
    progress: &dyn ScanProgress,
) -> Result<ScanStats, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    progress.on_root_start(root);

    let mut folder = match session.folder_get_by_path(root)? {
        Some(folder) => folder,
        None => session.folder_add(root)?,
    };

    let (mut stats, added) = session.transaction(|s| add_new_files(s, &folder, options, progress))?;
    stats.roots = 1;

    for file in &added {
        progress.on_file_added(file);
    }
    session.folder_update_scan(&mut folder, Utc::now())?;
    log::info!(
        "Scanned {}: {} added, {} known",
        root.display(),
        stats.added,
        stats.known
    );
    progress.on_root_complete(&folder, &stats);
    Ok(stats)
}

fn add_new_files(
    session: &mut Session,
    folder: &Folder,
    options: &ScanOptions,
    progress: &dyn ScanProgress,
) -> Result<(ScanStats, Vec<File>), DbError> {
    let mut stats = ScanStats::default();
    let mut added = Vec::new();

    for entry in WalkDir::new(&folder.path).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().unwrap_or(&folder.path).to_path_buf();
                log::warn!("Skipping {}: {}", path.display(), e);
                progress.on_error(&path, &e.to_string());
                stats.errors += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !options.matches_suffix(path) {
            stats.ignored += 1;
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                progress.on_error(path, &e.to_string());
                stats.errors += 1;
                continue;
            }
        };
        if size < options.min_size {
            stats.too_small += 1;
            progress.on_skipped(path, SkipReason::TooSmall);
            continue;
        }
        if path.to_str().is_none() {
            log::warn!("Skipping non-UTF-8 path {}", path.display());
            progress.on_skipped(path, SkipReason::UnsupportedPath);
            stats.errors += 1;
            continue;
        }

        if session.file_get_by_path(path)?.is_some() {
            stats.known += 1;
            progress.on_skipped(path, SkipReason::Known);
            continue;
        }
        added.push(session.file_add(path, folder)?);
        stats.added += 1;
    }

    Ok((stats, added))
}
