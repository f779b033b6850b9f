//! Diagnostic logging on stderr.
//!
//! Built on the `log` facade with an `env_logger` backend. The active
//! filter comes from, in order:
//!
//! 1. `RUST_LOG`, when set
//! 2. `--quiet` (errors only) or `-v`/`-vv` (debug/trace)
//! 3. info
//!
//! Diagnostics never go to stdout, which carries only the report. Debug
//! builds prefix each line with a timestamp and the module path.

use std::env;
use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Install the global logger.
///
/// Returns `false` when a logger is already installed (for instance when
/// the library is driven from tests); the existing logger is kept.
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let from_env = env::var_os("RUST_LOG").is_some();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }

    let with_module = verbose > 0 || cfg!(debug_assertions);
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        #[cfg(debug_assertions)]
        {
            let timestamp = buf.timestamp_seconds();
            write!(buf, "{timestamp} ")?;
        }
        if with_module {
            writeln!(
                buf,
                "{style}{:<5}{style:#} [{}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
        }
    });

    let installed = builder.try_init().is_ok();
    if installed && !from_env {
        log::debug!("Log level set to {}", level);
    }
    installed
}

/// Map CLI verbosity flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}
