//! Logging setup for the watch loop.
//!
//! Compact timestamped output via `tracing`. The CLI's `-v`/`--vv` flags
//! map onto two levels of filtering: `-v` raises this crate's level to
//! trace, `--vv` raises everything (including notify and other host
//! crates).
//!
//! The `RUST_LOG` environment variable takes precedence over the flags:
//! ```bash
//! RUST_LOG=sasswatch=trace sasswatch watch .
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Normal operation: info for this crate, warnings from everything else.
    #[default]
    Normal,
    /// `-v`: trace for this crate.
    Verbose,
    /// `--vv`: trace for everything, host crates included.
    VerboseAll,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, verbose_all: bool) -> Self {
        if verbose_all {
            Self::VerboseAll
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    fn filter(self) -> &'static str {
        match self {
            Self::Normal => "warn,sasswatch=info",
            Self::Verbose => "warn,sasswatch=trace",
            Self::VerboseAll => "trace",
        }
    }
}

/// Initialize logging.
///
/// Call once at startup. Safe to call multiple times (only the first call
/// takes effect).
pub fn init(verbosity: Verbosity) {
    INIT.call_once(|| {
        // RUST_LOG env var takes precedence over the CLI flags
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(verbosity.filter())
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}
