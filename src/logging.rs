//! Tracing subscriber setup for the `okr-board` binary.
//!
//! Console output goes to stderr so rendered boards on stdout stay clean.
//! When a log directory is given, a second non-ANSI layer writes a daily
//! rolling file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "OKR_BOARD_LOG";

const LOG_FILE_PREFIX: &str = "okr-board.log";

#[derive(Debug, Clone, Default)]
pub struct LogOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub log_dir: Option<&'a Path>,
}

/// Build the filter: `OKR_BOARD_LOG` wins, else `debug` with `--verbose`,
/// else `warn` so the board output is not interleaved with info lines.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("okr_board=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Install the global subscriber. The returned guard flushes the file
/// writer on drop and must be held for the life of the process.
pub fn init(options: LogOptions<'_>) -> Option<WorkerGuard> {
    let console = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(env_filter(options.verbose))
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter(options.verbose))
            .boxed()
    };
    let registry = tracing_subscriber::registry().with(console);

    let Some(dir) = options.log_dir else {
        let _ = registry.try_init();
        return None;
    };

    if let Err(err) = std::fs::create_dir_all(dir) {
        let _ = registry.try_init();
        tracing::warn!(directory = %dir.display(), %err, "failed to create log directory");
        return None;
    }

    let writer = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (nb, guard) = tracing_appender::non_blocking(writer);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(nb)
        .with_filter(EnvFilter::new("okr_board=info"));
    let _ = registry.with(file_layer).try_init();
    Some(guard)
}
