//! Logging setup for executables
//!
//! Every record goes to stdout and to the session log file. A single base
//! level applies to all targets, and individual targets (for instance
//! `traj_lib::path_generator`) can be made more or less verbose on their own,
//! so that detailed trace output from one module does not drown the rest.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info, Level};
use colored::{ColoredString, Colorize};
use std::str::FromStr;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Log level override for a single target, written `target=level` on the
/// command line.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetLevel {
    /// Module path prefix the override applies to.
    pub target: String,

    pub level: LevelFilter,
}

/// How the logger should filter records.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// Level applied to every target without an override, must be at least
    /// as verbose as `Info`.
    pub base_level: LevelFilter,

    pub overrides: Vec<TargetLevel>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The base log level must include info messages, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Expected a target override as `target=level`, found \"{0}\"")]
    InvalidTargetLevel(String),

    #[error("Could not open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set for this process: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LogSettings {
    pub fn new(base_level: LevelFilter) -> Self {
        Self {
            base_level,
            overrides: Vec::new()
        }
    }

    /// Add an override for the given target.
    pub fn with_target(mut self, target: &str, level: LevelFilter) -> Self {
        self.overrides.push(TargetLevel {
            target: target.to_string(),
            level
        });
        self
    }

    /// Check the settings can be used to build a logger.
    pub fn validate(&self) -> Result<(), LoggerInitError> {
        if self.base_level < Level::Info {
            return Err(LoggerInitError::InvalidMinLogLevel(self.base_level))
        }

        Ok(())
    }

    /// The most verbose level any record can pass with.
    pub fn max_level(&self) -> LevelFilter {
        self.overrides
            .iter()
            .map(|o| o.level)
            .fold(self.base_level, |a, b| a.max(b))
    }
}

impl FromStr for TargetLevel {
    type Err = LoggerInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LoggerInitError::InvalidTargetLevel(s.to_string());

        let mut parts = s.splitn(2, '=');
        let target = parts.next().map(str::trim).filter(|t| !t.is_empty());
        let level = parts.next().map(str::trim);

        match (target, level) {
            (Some(target), Some(level)) => Ok(Self {
                target: target.to_string(),
                level: level.parse().map_err(|_| invalid())?
            }),
            _ => Err(invalid())
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Notes
///
/// - This function must only be called once per process, a second call fails
///   with `FernInitError`.
pub fn logger_init(
    settings: &LogSettings,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    settings.validate()?;

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // Only show where a record came from when it's a detail message
            if record.level() > Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            }
            else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(settings.base_level);

    for o in settings.overrides.iter() {
        dispatch = dispatch.level_for(o.target.clone(), o.level);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Base log level: {:?}", settings.base_level);
    for o in settings.overrides.iter() {
        info!("    {} log level: {:?}", o.target, o.level);
    }
    info!("    Most verbose level: {:?}", settings.max_level());
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Three letter tag shown for each level.
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    }
}

/// Coloured tag for a level, the more severe the more visible.
fn level_to_str(level: Level) -> ColoredString {
    let tag = level_tag(level);

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info  => tag.normal(),
        Level::Warn  => tag.yellow(),
        Level::Error => tag.red().bold()
    }
}
