use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use vidshelf_catalog::{File, Folder};
use vidshelf_db::SessionPool;
use vidshelf_lib::util::format_bytes;
use vidshelf_lib::{ScanProgress, ScanStats, Settings, SkipReason, scan_roots};

use crate::CliError;

struct CliScanProgress {
    pb: ProgressBar,
}

impl ScanProgress for CliScanProgress {
    fn on_root_start(&self, root: &Path) {
        self.pb.set_message(format!("Scanning {}", root.display()));
    }

    fn on_file_added(&self, file: &File) {
        self.pb.suspend(|| {
            log::info!(
                "  {} {}",
                "+".if_supports_color(Stdout, |t| t.green()),
                file.path.display(),
            );
        });
    }

    fn on_skipped(&self, path: &Path, reason: SkipReason) {
        if reason == SkipReason::UnsupportedPath {
            self.pb.suspend(|| {
                log::warn!("  Not a UTF-8 path: {}", path.display());
            });
        } else {
            log::debug!("  Skipped {} ({:?})", path.display(), reason);
        }
    }

    fn on_error(&self, path: &Path, message: &str) {
        self.pb.suspend(|| {
            log::warn!(
                "  {} {}: {}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                path.display(),
                message,
            );
        });
    }

    fn on_root_complete(&self, folder: &Folder, stats: &ScanStats) {
        log::debug!(
            "Folder #{} done: {} added, {} known",
            folder.id,
            stats.added,
            stats.known
        );
    }
}

/// Scan the given directories and register new video files.
pub(crate) fn run_scan(
    settings: &Settings,
    db_path: &Path,
    roots: Vec<PathBuf>,
    workers: Option<usize>,
    min_size: Option<u64>,
) -> Result<(), CliError> {
    let mut options = settings.scan_options();
    if let Some(n) = workers {
        options.workers = n.max(1);
    }
    if let Some(size) = min_size {
        options.min_size = size;
    }

    let mut canonical = Vec::with_capacity(roots.len());
    for root in &roots {
        let path = root
            .canonicalize()
            .map_err(|e| CliError::invalid(format!("{}: {}", root.display(), e)))?;
        if !path.is_dir() {
            return Err(CliError::invalid(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        canonical.push(path);
    }

    super::ensure_parent_dir(db_path)?;
    let pool = SessionPool::new(db_path, settings.store_config(), options.workers)?;

    log::info!(
        "{}",
        format!(
            "Scanning {} folder(s) for videos of at least {}",
            canonical.len(),
            format_bytes(options.min_size)
        )
        .if_supports_color(Stdout, |t| t.bold()),
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let progress = CliScanProgress { pb };
    let result = scan_roots(&pool, &canonical, &options, &progress);
    progress.pb.finish_and_clear();
    pool.close()?;
    let stats = result?;

    crate::log_blank();
    log::info!("{}", "Scan complete".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Folders:     {:>6}", stats.roots);
    log::info!("  Added:       {:>6}", stats.added);
    log::info!("  Known:       {:>6}", stats.known);
    log::info!("  Too small:   {:>6}", stats.too_small);
    log::info!("  Other files: {:>6}", stats.ignored);
    if stats.errors > 0 {
        log::info!(
            "  Errors:      {:>6}",
            stats.errors.if_supports_color(Stdout, |t| t.red())
        );
    }
    Ok(())
}
