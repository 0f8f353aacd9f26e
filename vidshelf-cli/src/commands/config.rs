use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use vidshelf_lib::Settings;
use vidshelf_lib::settings::settings_path;

use crate::CliError;

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings_path().display());
    Ok(())
}

/// Show the effective settings as TOML, with the resolved database path.
pub(crate) fn run_config_show(settings: &Settings, db_path: &Path) -> Result<(), CliError> {
    let path = settings_path();
    let status = if path.exists() {
        "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "(not found, using defaults)"
            .if_supports_color(Stdout, |t| t.dimmed())
            .to_string()
    };
    log::info!(
        "  Settings file: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        status
    );
    log::info!(
        "  Database:      {}",
        db_path.display().if_supports_color(Stdout, |t| t.cyan())
    );
    crate::log_blank();
    for line in settings.to_toml()?.lines() {
        log::info!("{}", line);
    }
    Ok(())
}
