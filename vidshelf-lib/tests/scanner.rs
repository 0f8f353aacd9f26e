use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;
use vidshelf_catalog::{File, Folder};
use vidshelf_db::{SessionPool, StoreConfig};
use vidshelf_lib::*;

const MIN: u64 = 4096;

fn options(workers: usize) -> ScanOptions {
    ScanOptions::new(MIN, &["mkv", "mp4"], workers)
}

fn make_file(path: &Path, size: u64) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::File::create(path).unwrap().set_len(size).unwrap();
}

/// A media root with two videos, one too small, one foreign file and a
/// nested video.
fn media_root(base: &Path, name: &str) -> PathBuf {
    let root = base.join(name);
    make_file(&root.join("a.mkv"), MIN);
    make_file(&root.join("B.MP4"), MIN * 2);
    make_file(&root.join("tiny.mkv"), 10);
    make_file(&root.join("notes.txt"), MIN);
    make_file(&root.join("season 1").join("e01.mkv"), MIN);
    root
}

fn temp_pool() -> (TempDir, SessionPool) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        retry_delay_ms: 2,
        ..StoreConfig::default()
    };
    let pool = SessionPool::new(dir.path().join("catalog.db"), config, 4).unwrap();
    (dir, pool)
}

#[derive(Default)]
struct Recorder {
    added: Mutex<Vec<PathBuf>>,
    skipped: Mutex<Vec<(PathBuf, SkipReason)>>,
    completed: Mutex<Vec<Folder>>,
}

impl ScanProgress for Recorder {
    fn on_file_added(&self, file: &File) {
        self.added.lock().unwrap().push(file.path.clone());
    }

    fn on_skipped(&self, path: &Path, reason: SkipReason) {
        self.skipped.lock().unwrap().push((path.to_path_buf(), reason));
    }

    fn on_root_complete(&self, folder: &Folder, _stats: &ScanStats) {
        self.completed.lock().unwrap().push(folder.clone());
    }
}

#[test]
fn suffix_matching_is_case_insensitive() {
    let opts = ScanOptions::new(0, &[".MKV", "mp4"], 1);
    assert!(opts.matches_suffix(Path::new("/v/a.mkv")));
    assert!(opts.matches_suffix(Path::new("/v/a.Mp4")));
    assert!(!opts.matches_suffix(Path::new("/v/a.txt")));
    assert!(!opts.matches_suffix(Path::new("/v/mkv")));
}

#[test]
fn default_options() {
    let opts = ScanOptions::default();
    assert_eq!(opts.min_size, 32 * 1024 * 1024);
    assert!(opts.matches_suffix(Path::new("movie.webm")));
    assert!(opts.matches_suffix(Path::new("movie.OGM")));
}

#[test]
fn scan_adds_matching_files() {
    let (dir, pool) = temp_pool();
    let root = media_root(dir.path(), "videos");
    let recorder = Recorder::default();

    let stats = scan_roots(&pool, &[root.clone()], &options(1), &recorder).unwrap();
    assert_eq!(stats.roots, 1);
    assert_eq!(stats.added, 3);
    assert_eq!(stats.too_small, 1);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.known, 0);

    let mut session = pool.acquire().unwrap();
    let folder = session.folder_get_by_path(&root).unwrap().unwrap();
    assert!(!folder.never_scanned());
    let files = session.file_get_by_folder(&folder).unwrap();
    assert_eq!(files.len(), 3);
    assert!(files.iter().any(|f| f.path == root.join("season 1").join("e01.mkv")));

    assert_eq!(recorder.added.lock().unwrap().len(), 3);
    assert_eq!(recorder.completed.lock().unwrap().len(), 1);
    assert!(
        recorder
            .skipped
            .lock()
            .unwrap()
            .contains(&(root.join("tiny.mkv"), SkipReason::TooSmall))
    );
}

#[test]
fn rescan_only_adds_new_files() {
    let (dir, pool) = temp_pool();
    let root = media_root(dir.path(), "videos");
    scan_roots(&pool, &[root.clone()], &options(1), &NoProgress).unwrap();

    make_file(&root.join("c.mkv"), MIN);
    let stats = scan_roots(&pool, &[root.clone()], &options(1), &NoProgress).unwrap();
    assert_eq!(stats.added, 1);
    assert_eq!(stats.known, 3);

    let mut session = pool.acquire().unwrap();
    assert_eq!(session.folder_get_all().unwrap().len(), 1);
    assert_eq!(session.file_get_all().unwrap().len(), 4);
}

#[test]
fn parallel_roots() {
    let (dir, pool) = temp_pool();
    let roots: Vec<PathBuf> = ["movies", "shows", "clips", "docs"]
        .iter()
        .map(|name| media_root(dir.path(), name))
        .collect();

    let stats = scan_roots(&pool, &roots, &options(3), &NoProgress).unwrap();
    assert_eq!(stats.roots, 4);
    assert_eq!(stats.added, 12);

    let mut session = pool.acquire().unwrap();
    assert_eq!(session.folder_get_all().unwrap().len(), 4);
    assert_eq!(session.file_get_all().unwrap().len(), 12);
}

#[test]
fn missing_root_is_an_error() {
    let (dir, pool) = temp_pool();
    let good = media_root(dir.path(), "videos");
    let missing = dir.path().join("missing");

    let err = scan_roots(&pool, &[good, missing.clone()], &options(1), &NoProgress).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory(p) if p == missing));

    // The root scanned before the failure is kept.
    let mut session = pool.acquire().unwrap();
    assert_eq!(session.file_get_all().unwrap().len(), 3);
}

#[test]
fn no_roots_is_empty_scan() {
    let (_dir, pool) = temp_pool();
    let stats = scan_roots(&pool, &[], &options(4), &NoProgress).unwrap();
    assert_eq!(stats, ScanStats::default());
}

#[test]
fn failing_root_adds_nothing() {
    let (dir, pool) = temp_pool();
    let root = media_root(dir.path(), "videos");

    // Reject the nested file, which is walked after two files were added.
    let conn = rusqlite::Connection::open(pool.path()).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER refuse_episode BEFORE INSERT ON file
         WHEN NEW.path LIKE '%e01.mkv'
         BEGIN SELECT RAISE(ABORT, 'refused'); END;",
    )
    .unwrap();
    drop(conn);

    let recorder = Recorder::default();
    let err = scan_roots(&pool, &[root.clone()], &options(1), &recorder).unwrap_err();
    assert!(matches!(err, ScanError::Db(ref e) if e.is_constraint()));

    let mut session = pool.acquire().unwrap();
    let folder = session.folder_get_by_path(&root).unwrap().unwrap();
    assert!(session.file_get_by_folder(&folder).unwrap().is_empty());
    assert!(folder.never_scanned());
    assert!(recorder.added.lock().unwrap().is_empty());
    assert!(recorder.completed.lock().unwrap().is_empty());
}
