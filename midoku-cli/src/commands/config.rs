use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::error::CliError;
use crate::settings::{self, Settings};

/// Show the settings file and the database it resolves to.
pub(crate) fn run_config_show(cli_database: Option<PathBuf>) -> Result<(), CliError> {
    let path = settings::settings_path();
    let settings = Settings::load().map_err(|e| CliError::config(e.to_string()))?;

    println!(
        "{}",
        "Midoku Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();
    println!(
        "  Settings file: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        if path.exists() {
            "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
        } else {
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()).to_string()
        },
    );

    let saved = match &settings.library.database {
        Some(p) => p.display().to_string(),
        None => "(not set)".to_string(),
    };
    println!("  library.database: {saved}");
    println!(
        "  Using database: {}",
        settings
            .resolve_database(cli_database)
            .display()
            .if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

/// Save the library database path.
pub(crate) fn run_config_set_database(path: PathBuf) -> Result<(), CliError> {
    let mut settings = Settings::load().map_err(|e| CliError::config(e.to_string()))?;
    let path = if path.is_relative() {
        std::env::current_dir()?.join(path)
    } else {
        path
    };
    settings.library.database = Some(path.clone());
    settings.save()?;
    log::debug!("Saved settings to {}", settings::settings_path().display());

    println!(
        "{} library database set to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
