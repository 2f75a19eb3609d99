//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tilequilt::config::ConfigFileError;
use tilequilt::quilt::QuiltError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration file could not be loaded
    ConfigFile(ConfigFileError),
    /// Invalid command line value
    Config(String),
    /// Quilt run could not start
    Quilt(QuiltError),
    /// Every archive in the run failed
    AllArchivesFailed { count: usize },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::AllArchivesFailed { .. } = self {
            eprintln!();
            eprintln!("Check that --indir points at the directory holding the archives");
            eprintln!("and that the archive pattern matches their file names.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Quilt(e) => write!(f, "Quilt run failed: {}", e),
            CliError::AllArchivesFailed { count } => {
                write!(f, "All {} archive(s) failed", count)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::ConfigFile(e) => Some(e),
            CliError::Quilt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<QuiltError> for CliError {
    fn from(e: QuiltError) -> Self {
        CliError::Quilt(e)
    }
}
