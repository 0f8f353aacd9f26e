//! Collaborators around the catalog store: settings, the directory scanner
//! and shared display helpers.

pub mod error;
pub mod scanner;
pub mod settings;
pub mod util;

pub use error::{ScanError, SettingsError};
pub use scanner::{NoProgress, ScanOptions, ScanProgress, ScanStats, SkipReason, scan_roots};
pub use settings::Settings;
