//! # Armature CLI
//!
//! Scaffolder pipelines for web projects.
//!
//! ## Startup sequence
//!
//! 1. Load `.env` (silently skipped when absent).
//! 2. Install the SIGINT handler feeding the [`CancelSignal`].
//! 3. Load configuration (files + env + defaults).
//! 4. Build the runner ([`app::build_runner`]) — step factories, scaffolder
//!    catalogue, global options, front-end adapters.
//! 5. Run: with arguments the clap adapter parses them; with none the
//!    interactive flow takes over.  Logging initialises inside the run, once
//!    the global options are resolved.
//! 6. Translate any error into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                    |
//! |------|----------------------------|
//! |  0   | Success                    |
//! |  1   | Internal / step failure    |
//! |  2   | User / input error         |
//! |  3   | Scaffolder not found       |
//! |  4   | Configuration error        |
//! | 130  | Cancelled (SIGINT)         |

use std::io::IsTerminal;
use std::process::ExitCode;

use tracing::info;

use armature_core::prelude::{CancelSignal, RunOutcome};

use crate::error::CliError;

mod app;
mod config;
mod error;
mod logging;
mod output;
mod steps;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything else.  Silently ignored if absent
    // (production setups use real environment variables).
    let _ = dotenvy::dotenv();

    // ── 2. Cancellation ───────────────────────────────────────────────────
    let cancel = CancelSignal::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel()).ok();
    }

    // ── 3. Configuration ──────────────────────────────────────────────────
    let config = match config::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            return handle_error(&CliError::Config {
                message: format!("{e:#}"),
            });
        }
    };

    // ── 4. Build the runner ───────────────────────────────────────────────
    let runner = match app::build_runner(&config) {
        Ok(runner) => runner,
        Err(e) => return handle_error(&CliError::from(e)),
    };

    // ── 5. Run + 6. Error handling ────────────────────────────────────────
    let args: Vec<String> = std::env::args().skip(1).collect();
    match runner.run(args, cancel).await {
        Ok(RunOutcome::Executed(report)) => {
            info!(
                scaffolder = %report.scaffolder,
                completed = report.completed_count(),
                skipped = report.skipped_count(),
                "Scaffold completed successfully"
            );
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Rendered { message, code }) => {
            // Help/version/usage output the parser already rendered.
            if code == 0 {
                print!("{message}");
            } else {
                eprint!("{message}");
            }
            ExitCode::from(code.clamp(0, 255) as u8)
        }
        Err(e) => handle_error(&CliError::from(e)),
    }
}

/// Translate a `CliError` into a user message and an appropriate exit code.
///
/// This is the single place where structured errors become human-readable
/// output and OS exit codes.
fn handle_error(err: &CliError) -> ExitCode {
    // Structured log event first (no-op if the subscriber never came up).
    err.log();

    // Colour is disabled when stderr is not a TTY.
    let msg = if std::io::stderr().is_terminal() {
        err.format_colored(false)
    } else {
        err.format_plain(false)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}
