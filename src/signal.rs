//! Ctrl+C handling.
//!
//! A process-wide [`ShutdownHandler`] owns an `AtomicBool` that the signal
//! hook sets. The flag is handed to the [`DuplicateFinder`](crate::duplicates::DuplicateFinder),
//! which polls it between entries and returns
//! [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted)
//! once it is raised. The binary then exits with [`EXIT_CODE_INTERRUPTED`].

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code after SIGINT (128 + 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with the flag cleared. No signal hook is attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag by hand.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to pass to [`FinderConfig::with_shutdown_flag`](crate::duplicates::FinderConfig::with_shutdown_flag).
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag so the handler can serve another scan.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Failure to attach the Ctrl+C hook.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// The hook could not be installed.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Attach the Ctrl+C hook, or reuse the one attached earlier in this process.
///
/// Calling this more than once (as the integration tests do through
/// [`run_app`](crate::run_app)) returns the same handler with its flag
/// cleared.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if some other code already owns
/// the process signal hook.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let mut install_error = None;
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        let flag = handler.flag();
        if let Err(e) = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\nInterrupted. Finishing up...");
            let _ = stderr.flush();
        }) {
            install_error = Some(e);
        }
        handler
    });

    if let Some(e) = install_error {
        return Err(e.into());
    }

    handler.reset();
    Ok(handler.clone())
}
