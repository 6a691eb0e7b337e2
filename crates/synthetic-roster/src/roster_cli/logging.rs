//! Log destinations for the roster binary.
//!
//! Events always go to stderr as JSON, filtered by `RUST_LOG`. The binary
//! also appends to two plain-text files per hour under `LOG_DIR` (default
//! `log`):
//!
//! - `DEBUG_roster_<YYYYmmdd_HH>.log` receives every event up to
//!   `LOG_LEVEL` (default `DEBUG`) with its target and source location.
//! - `INFO_roster_<YYYYmmdd_HH>.log` receives `INFO` and above, still capped
//!   by `LOG_LEVEL`.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use chrono::{Local, NaiveDateTime};
use tracing::{Subscriber, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Environment variable naming the log file directory.
pub const LOG_DIR_ENV: &str = "LOG_DIR";
/// Environment variable holding the file log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

const DEFAULT_LOG_DIR: &str = "log";
const DEFAULT_STDERR_FILTER: &str = "info";
const LOG_TOPIC: &str = "roster";
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H";
const LINE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Location and level of the per-level log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFiles {
    dir: PathBuf,
    level: LevelFilter,
}

impl LogFiles {
    /// Log files under `dir`, capped at `level`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, level: LevelFilter) -> Self {
        Self {
            dir: dir.into(),
            level,
        }
    }

    /// Reads `LOG_DIR` and `LOG_LEVEL`; an unrecognized level means `DEBUG`.
    #[must_use]
    pub fn from_env() -> Self {
        let dir = std::env::var_os(LOG_DIR_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from);
        let level =
            std::env::var(LOG_LEVEL_ENV).map_or(LevelFilter::DEBUG, |raw| parse_level(&raw));
        Self::new(dir, level)
    }

    /// Directory holding the log files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Most verbose level written to the debug file.
    #[must_use]
    pub const fn level(&self) -> LevelFilter {
        self.level
    }

    /// Most verbose level written to the info file.
    #[must_use]
    pub fn info_level(&self) -> LevelFilter {
        self.level.min(LevelFilter::INFO)
    }

    /// Debug file for the hour containing `at`.
    #[must_use]
    pub fn debug_path(&self, at: &NaiveDateTime) -> PathBuf {
        self.dir.join(file_name("DEBUG", at))
    }

    /// Info file for the hour containing `at`.
    #[must_use]
    pub fn info_path(&self, at: &NaiveDateTime) -> PathBuf {
        self.dir.join(file_name("INFO", at))
    }

    fn open(&self, at: &NaiveDateTime) -> io::Result<(File, File)> {
        Dir::create_ambient_dir_all(&self.dir, ambient_authority())?;
        let dir = Dir::open_ambient_dir(&self.dir, ambient_authority())?;
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        let debug = dir.open_with(file_name("DEBUG", at), &options)?;
        let info = dir.open_with(file_name("INFO", at), &options)?;
        Ok((debug.into_std(), info.into_std()))
    }
}

fn file_name(level: &str, at: &NaiveDateTime) -> String {
    format!("{level}_{LOG_TOPIC}_{}.log", at.format(FILE_STAMP_FORMAT))
}

fn parse_level(raw: &str) -> LevelFilter {
    raw.trim().parse().unwrap_or(LevelFilter::DEBUG)
}

fn file_layer<S>(file: File, level: LevelFilter, caller: bool) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_ansi(false)
        .with_timer(ChronoLocal::new(LINE_TIME_FORMAT.to_owned()))
        .with_target(caller)
        .with_file(caller)
        .with_line_number(caller)
        .with_writer(Arc::new(file))
        .with_filter(level)
}

/// Installs the global subscriber: JSON on stderr plus the two log files.
///
/// When the log files cannot be opened the run continues with stderr only
/// and a warning names the directory.
pub fn init_tracing(files: &LogFiles) {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDERR_FILTER));
    let stderr_layer = fmt::layer()
        .json()
        .with_writer(io::stderr)
        .with_filter(stderr_filter);

    let opened = files.open(&Local::now().naive_local());
    let open_error = opened.as_ref().err().map(ToString::to_string);
    let (debug_layer, info_layer) = opened
        .ok()
        .map(|(debug, info)| {
            (
                file_layer(debug, files.level(), true),
                file_layer(info, files.info_level(), false),
            )
        })
        .unzip();

    if tracing_subscriber::registry()
        .with(stderr_layer)
        .with(debug_layer)
        .with(info_layer)
        .try_init()
        .is_err()
    {
        return;
    }
    if let Some(error) = open_error {
        warn!(dir = %files.dir().display(), %error, "log files unavailable; logging to stderr only");
    }
}
