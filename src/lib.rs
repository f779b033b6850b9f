//! treedupe - duplicate file and directory finder.
//!
//! Every regular file below a root is fingerprinted with BLAKE3 and files
//! sharing a fingerprint are reported as duplicates. Optionally each
//! directory also receives a fingerprint derived from the ordered
//! fingerprints of the files beneath it, so identical subtrees are found
//! regardless of their names.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonReport, TextReport};
use crate::progress::Progress;
use crate::scanner::ReadErrorPolicy;
use crate::signal::ShutdownHandler;

/// Run one scan as described by the parsed command line.
///
/// The report goes to stdout, diagnostics to stderr.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined, the
/// hashing pool cannot be built, the scan is interrupted, or the report
/// cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref());
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let root = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("cannot determine the working directory")?,
    };
    let root = std::path::absolute(&root).unwrap_or(root);

    let shutdown = signal::install_handler().unwrap_or_else(|e| {
        log::warn!("{}; Ctrl+C will terminate immediately", e);
        ShutdownHandler::new()
    });

    let mut finder_config = FinderConfig::default()
        .with_compare_dirs(config.dir_comparison)
        .with_io_threads(config.io_threads)
        .with_read_error_policy(ReadErrorPolicy::from(config.on_read_error))
        .with_shutdown_flag(shutdown.flag());

    let text_output = cli.output == OutputFormat::Text;
    if config.progress && text_output && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if text_output {
        writeln!(out, "Starting scan on: {}", root.display())?;
        out.flush()?;
    }

    let (groups, summary) = DuplicateFinder::new(finder_config).find_duplicates(&root)?;
    let exit_code = ExitCode::from_summary(&summary);

    match cli.output {
        OutputFormat::Text => {
            let color = !cli.no_color && std::io::stdout().is_terminal();
            TextReport::new(&groups, &summary)
                .with_full_fingerprints(config.full_fingerprints)
                .with_color(color)
                .write_to(&mut out)
                .context("failed to write report")?;
        }
        OutputFormat::Json => {
            JsonReport::new(&groups, &summary, exit_code)
                .write_to(&mut out)
                .context("failed to write JSON report")?;
        }
    }
    out.flush()?;

    Ok(exit_code)
}
