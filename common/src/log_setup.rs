//! Process-wide logger setup for binaries.
//!
//! Library code only emits records through the `log` macros. The binary builds a
//! [`LogConfig`], calls [`setup_logging`] once and keeps the returned handle alive
//! until exit; dropping the handle flushes the file sink.

use std::io::Write;
use std::path::PathBuf;

use flexi_logger::{
    DeferredNow, Duplicate, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
};
use log::{LevelFilter, Record};

/// Threshold of the optional log file.
pub const FILE_LEVEL: LevelFilter = LevelFilter::Info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Records below this level are not printed to the console.
    pub console_level: LevelFilter,
    /// Optional log file, appended to, receiving everything from [`FILE_LEVEL`] up.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file: None,
        }
    }
}

impl LogConfig {
    /// Console threshold after `quiet` reductions: info, then warn, then error.
    pub fn level_for_quiet(quiet: u8) -> LevelFilter {
        match quiet {
            0 => LevelFilter::Info,
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    }
}

pub fn setup_logging(config: &LogConfig) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = match &config.file {
        Some(path) => {
            let level = config.console_level.max(FILE_LEVEL);
            Logger::with(LogSpecification::builder().default(level).build())
                .log_to_file(FileSpec::try_from(path.clone())?.suppress_timestamp())
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .duplicate_to_stderr(duplicate_for(config.console_level))
                .format_for_stderr(console_format)
        }
        None => Logger::with(
            LogSpecification::builder()
                .default(config.console_level)
                .build(),
        )
        .log_to_stderr()
        .format_for_stderr(console_format),
    };

    logger.start()
}

/// `LEVEL    message`, the level padded to eight columns.
pub fn console_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(w, "{:<8} {}", record.level(), record.args())
}

fn duplicate_for(level: LevelFilter) -> Duplicate {
    match level {
        LevelFilter::Off => Duplicate::None,
        LevelFilter::Error => Duplicate::Error,
        LevelFilter::Warn => Duplicate::Warn,
        LevelFilter::Info => Duplicate::Info,
        LevelFilter::Debug => Duplicate::Debug,
        LevelFilter::Trace => Duplicate::Trace,
    }
}
