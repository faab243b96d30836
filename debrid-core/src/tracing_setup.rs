//! Log output for the debrid tools
//!
//! The console shows what the operator asked for. Every run also leaves a
//! trace-level file behind, so provider and tracker list failures can be
//! read back after the command has exited.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Directory used when no logs directory is given.
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// File name written inside the logs directory, overwritten on every run.
pub const LAST_RUN_LOG_FILE: &str = "debrid-last-run.log";

/// Installs the global subscriber and returns the path of the run's trace file.
///
/// The console layer writes to stderr at `console_level` unless `RUST_LOG`
/// is set. The file layer records everything down to `TRACE` in
/// [`LAST_RUN_LOG_FILE`] under `logs_dir` (default [`DEFAULT_LOGS_DIR`]).
///
/// # Errors
///
/// - `std::io::Error` - Logs directory or trace file could not be created
/// - `tracing_subscriber::util::TryInitError` - A global subscriber is already installed
pub fn init_tracing(
    console_level: Level,
    logs_dir: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
    let logs_dir = logs_dir.unwrap_or_else(|| Path::new(DEFAULT_LOGS_DIR));
    create_dir_all(logs_dir)?;

    let trace_path = logs_dir.join(LAST_RUN_LOG_FILE);
    let trace_file = File::create(&trace_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.as_str()));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    let trace = fmt::layer()
        .with_writer(trace_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(LevelFilter::TRACE);

    tracing_subscriber::registry()
        .with(console)
        .with(trace)
        .try_init()?;

    tracing::debug!(
        "Console logging at {}, full trace in {}",
        console_level,
        trace_path.display()
    );

    Ok(trace_path)
}

/// Console verbosity accepted by `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    /// Every level, quietest first.
    pub const ALL: [CliLogLevel; 5] = [
        CliLogLevel::Error,
        CliLogLevel::Warn,
        CliLogLevel::Info,
        CliLogLevel::Debug,
        CliLogLevel::Trace,
    ];

    /// Lowercase name, as typed on the command line.
    pub fn name(self) -> &'static str {
        match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        }
    }

    /// ```
    /// use debrid_core::tracing_setup::CliLogLevel;
    ///
    /// assert_eq!(CliLogLevel::Info.as_tracing_level(), tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for CliLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown log level '{s}'"))
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_names_parse_back() {
        for level in CliLogLevel::ALL {
            assert_eq!(level.to_string().parse::<CliLogLevel>(), Ok(level));
        }
        assert_eq!("WARN".parse::<CliLogLevel>(), Ok(CliLogLevel::Warn));
        assert_eq!(" debug ".parse::<CliLogLevel>(), Ok(CliLogLevel::Debug));
        assert!("verbose".parse::<CliLogLevel>().is_err());
    }

    #[test]
    fn test_levels_are_ordered_quietest_first() {
        let levels: Vec<Level> = CliLogLevel::ALL
            .into_iter()
            .map(CliLogLevel::as_tracing_level)
            .collect();

        // tracing orders more verbose levels as greater
        assert!(levels.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_init_tracing_writes_last_run_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        let path = init_tracing(Level::WARN, Some(temp_dir.path())).unwrap();

        assert_eq!(path, temp_dir.path().join(LAST_RUN_LOG_FILE));
        assert!(path.exists());

        // A second global subscriber is refused instead of panicking.
        assert!(init_tracing(Level::WARN, Some(temp_dir.path())).is_err());
    }
}
