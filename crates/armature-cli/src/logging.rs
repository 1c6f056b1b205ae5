//! Tracing subscriber initialisation.
//!
//! Only this crate constructs subscribers; `armature-core` and the adapters
//! only *emit* spans and events.  The runner invokes [`init_logging`] through
//! the logging hook registered in `app.rs`, after the global options have
//! been resolved and before the first step runs.
//!
//! # Verbosity mapping
//!
//! | Flags      | Filter level |
//! |------------|--------------|
//! | (none)     | WARN         |
//! | `--verbose`| DEBUG        |
//! | `--quiet`  | ERROR        |
//!
//! `RUST_LOG` overrides all of the above if set.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros fire.
pub fn init_logging(verbose: bool, quiet: bool, no_color: bool) -> anyhow::Result<()> {
    let level = derive_level(verbose, quiet);

    // RUST_LOG wins; otherwise build our own filter string so each crate
    // gets the same level as the top-level filter.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "armature_cli={level},armature_core={level},armature_adapters={level}",
        ))
    });

    let use_ansi = !no_color && std::io::stderr().is_terminal();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

/// Translate the verbosity flags to a filter level string.
fn derive_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    if verbose { "debug" } else { "warn" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_default() {
        assert_eq!(derive_level(false, false), "warn");
    }

    #[test]
    fn level_verbose() {
        assert_eq!(derive_level(true, false), "debug");
    }

    #[test]
    fn level_quiet() {
        assert_eq!(derive_level(false, true), "error");
    }

    // quiet takes precedence over verbose
    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(derive_level(true, true), "error");
    }
}
