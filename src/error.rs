//! Error types for the command line front-end.
//!
//! Pipeline failures arrive as [`crate::exporter::Error`]; everything the CLI
//! itself can get wrong (config, queue files, arguments) lives here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Top-level error of the `hise_exporter` binary
#[derive(Error, Debug)]
pub enum ExporterError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pipeline errors
    #[error("{0}")]
    Export(#[from] crate::exporter::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// No config file at the given or default location
    #[error("Config file not found: {}", path.display())]
    ConfigNotFound {
        /// Path that was tried
        path: PathBuf,
    },

    /// Queue file could not be read or parsed
    #[error("Invalid queue file {}: {reason}", path.display())]
    InvalidQueue {
        /// Queue file
        path: PathBuf,
        /// What was wrong
        reason: String,
    },
}

impl ExporterError {
    /// Hints printed below the error message
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ExporterError::Cli(CliError::ConfigNotFound { .. }) => vec![
                "Create a config.toml with at least hise_executable, hise_source and assets_dir"
                    .to_string(),
                "Or pass one explicitly with --config <PATH>".to_string(),
            ],
            ExporterError::Toml(_) | ExporterError::Cli(CliError::InvalidQueue { .. }) => {
                vec!["Each job is a [[job]] table; unknown keys are rejected".to_string()]
            }
            ExporterError::Export(crate::exporter::Error::MissingCredentials(_)) => vec![
                "Set apple_id and apple_team_id in the config".to_string(),
                format!(
                    "Provide the app-specific password in {}",
                    crate::exporter::sign::APP_PASSWORD_ENV
                ),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
