// SPDX-License-Identifier: MIT OR Apache-2.0
//! jsonport command line front end.
//!
//! Imports one JSON export file, or every `*.json` file under a directory,
//! into an in-memory host and prints the batch report of each file.
//!
//! ```text
//! jsonport exports/ --select Skeleton=/Game/SK_Hero.SK_Hero --dump out/
//! ```

mod error;
mod inputs;
mod report;

use clap::Parser;
use error::{CliError, CliResult};
use inputs::{collect_inputs, parse_selection, Selection};
use jsonport_import::{ImportSession, ImportSettings, InMemoryHost};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "jsonport", version)]
#[command(about = "Rebuild engine assets from JSON export batches")]
struct Args {
    /// JSON export file, or a directory searched for `*.json` files
    path: PathBuf,

    /// Settings file (defaults to `jsonport.ron` next to PATH)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Override the host engine major version
    #[arg(long)]
    engine_major: Option<u32>,

    /// Pre-select an asset in the host, as `<Class>=<Path>`
    #[arg(long, value_parser = parse_selection)]
    select: Vec<Selection>,

    /// Write RON dumps of imported assets and graphs to this directory
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::debug!("Starting jsonport v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "jsonport_import=debug,jsonport_cli=debug"
    } else {
        "jsonport_import=info,jsonport_cli=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Import every input. Returns whether every export imported cleanly.
fn run(args: &Args) -> CliResult<bool> {
    let settings = load_settings(args)?;
    tracing::debug!("Host engine {}", settings.engine);

    let mut host = InMemoryHost::new(&settings);
    for selection in &args.select {
        if !host.select_new(&selection.class, &selection.path) {
            return Err(CliError::Selection {
                class: selection.class.clone(),
                path: selection.path.clone(),
            });
        }
    }

    let files = collect_inputs(&args.path)?;
    if files.is_empty() {
        tracing::warn!("No JSON exports under {}", args.path.display());
        return Ok(true);
    }

    let mut clean = true;
    let mut session = ImportSession::new(&mut host, &settings);
    for file in &files {
        let report = match session.import_file(file) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("{}: {e}", file.display());
                clean = false;
                continue;
            }
        };

        print!("{}", report::format_report(file, &report));
        clean &= report.failure_count() == 0;

        if let Some(dir) = &args.dump {
            report::dump_assets(dir, &report.assets)?;
        }
    }

    Ok(clean)
}

fn load_settings(args: &Args) -> CliResult<ImportSettings> {
    let mut settings = match &args.settings {
        Some(path) => ImportSettings::load(path)?,
        None => ImportSettings::load_or_default(&ImportSettings::settings_file_path(settings_dir(&args.path)))?,
    };
    if let Some(major) = args.engine_major {
        settings.engine.major = major;
    }
    Ok(settings)
}

/// Directory searched for the default settings file
fn settings_dir(path: &Path) -> &Path {
    if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "jsonport",
            "exports",
            "--engine-major",
            "4",
            "--select",
            "AnimBlueprint=/Game/ABP_Hero.ABP_Hero",
            "--select",
            "Skeleton=/Game/SK_Hero.SK_Hero",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.path, PathBuf::from("exports"));
        assert_eq!(args.engine_major, Some(4));
        assert_eq!(args.select.len(), 2);
        assert_eq!(args.select[1].class, "Skeleton");
        assert!(args.verbose);
        assert!(args.dump.is_none());
    }

    #[test]
    fn test_bad_selection_is_rejected() {
        assert!(Args::try_parse_from(["jsonport", "x.json", "--select", "Skeleton"]).is_err());
    }

    #[test]
    fn test_engine_override() {
        let dir = std::env::temp_dir().join(format!("jsonport_cli_settings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        ImportSettings::for_engine(5, 1)
            .save(&ImportSettings::settings_file_path(&dir))
            .unwrap();

        let args = Args::try_parse_from(["jsonport", dir.to_str().unwrap(), "--engine-major", "4"]).unwrap();
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.engine.major, 4);
        assert_eq!(settings.engine.minor, 1);
        assert!(!settings.capabilities().subgraphs);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
