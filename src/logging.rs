use std::fmt;
use std::fs::File;
use std::path::PathBuf;

use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger};

/// Things worth telling a human about. The tree logs these instead of printing them.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Scratch space for a traversal couldn't be allocated.
    AllocationFailed,
    /// The sentinel couldn't be allocated, so there is no tree.
    TreeCreationFailed,
    NodeCreationFailed,
    /// A left rotation was asked for on a node without a right child.
    LeftRotateSkipped,
    /// A right rotation was asked for on a node without a left child.
    RightRotateSkipped,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Diagnostic::AllocationFailed => "memory allocation failed",
            Diagnostic::TreeCreationFailed => "failed to create the tree",
            Diagnostic::NodeCreationFailed => "failed to create a node",
            Diagnostic::LeftRotateSkipped => "left rotation skipped: node has no right child",
            Diagnostic::RightRotateSkipped => "right rotation skipped: node has no left child",
        };
        f.write_str(message)
    }
}

/// Where log output goes.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub term_level: LevelFilter,
    pub file: Option<LogFile>,
}

#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { term_level: LevelFilter::Warn, file: None }
    }
}

#[derive(Debug)]
pub enum LoggingError {
    /// The log file couldn't be created.
    Io(std::io::Error),
    /// Some other logger was installed first.
    AlreadyInitialized(log::SetLoggerError),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(e) => write!(f, "could not open log file: {e}"),
            LoggingError::AlreadyInitialized(e) => write!(f, "could not install logger: {e}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::Io(e) => Some(e),
            LoggingError::AlreadyInitialized(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoggingError {
    fn from(value: std::io::Error) -> Self {
        LoggingError::Io(value)
    }
}

impl From<log::SetLoggerError> for LoggingError {
    fn from(value: log::SetLoggerError) -> Self {
        LoggingError::AlreadyInitialized(value)
    }
}

/// Installs a terminal logger, plus a file logger if `config` asks for one.
///
/// This sets the global logger, so it can only succeed once per process.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(config.term_level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
    ];
    if let Some(LogFile { path, level }) = &config.file {
        loggers.push(WriteLogger::new(*level, Config::default(), File::create(path)?));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

#[test]
fn diagnostics_are_readable() {
    assert_eq!(Diagnostic::LeftRotateSkipped.to_string(), "left rotation skipped: node has no right child");
    assert_eq!(Diagnostic::NodeCreationFailed.to_string(), "failed to create a node");
}

#[test]
fn default_config_only_logs_warnings_to_the_terminal() {
    let config = LoggingConfig::default();
    assert_eq!(config.term_level, LevelFilter::Warn);
    assert!(config.file.is_none());
}

#[test]
fn missing_log_directory_is_an_io_error() {
    let config = LoggingConfig {
        term_level: LevelFilter::Off,
        file: Some(LogFile {
            path: PathBuf::from("/this/directory/does/not/exist/rbtree.log"),
            level: LevelFilter::Debug,
        }),
    };
    assert!(matches!(init_logging(&config), Err(LoggingError::Io(_))));
}
