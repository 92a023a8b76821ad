//! Error types for the export pipeline.
//!
//! Every pipeline stage returns [`Result`]. External tool failures, filesystem
//! failures and validation failures are all distinct variants so the queue
//! engine and the CLI can report them precisely.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error as DeriveError;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the export pipeline.
#[derive(Debug, DeriveError)]
pub enum Error {
    /// Free-form failure with a message.
    #[error("{0}")]
    GenericError(String),

    /// A failure with added context.
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted.
        context: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The external program could not be spawned or awaited.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Program and arguments.
        command: String,
        /// Spawn or wait error.
        #[source]
        error: io::Error,
    },

    /// The external program exited with a nonzero code.
    #[error("`{command}` exited with code {code}{}", stderr_suffix(.stderr))]
    ToolFailed {
        /// Program and arguments.
        command: String,
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
        /// Captured stderr (may be empty).
        stderr: String,
    },

    /// Filesystem operation failed on a specific path.
    #[error("{context} ({}): {error}", .path.display())]
    Fs {
        /// Operation being performed.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        error: io::Error,
    },

    /// Raw io error without path context.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Malformed or unexpected XML.
    #[error("XML error in {}: {message}", .path.display())]
    Xml {
        /// File being read or written.
        path: PathBuf,
        /// Parser or writer message.
        message: String,
    },

    /// A template could not be registered or rendered.
    #[error("template error ({name}): {message}")]
    Template {
        /// Template name.
        name: &'static str,
        /// Renderer message.
        message: String,
    },

    /// A job failed validation and was not queued.
    #[error("invalid job: {0}")]
    Validation(String),

    /// A field-for-field identical job is already queued.
    #[error("same job is already in queue")]
    DuplicateJob,

    /// `run` was called with nothing to do.
    #[error("no jobs in queue")]
    EmptyQueue,

    /// The run was cancelled and the in-flight step was interrupted.
    #[error("cancelled")]
    Cancelled,

    /// Apple ID, team ID or app-specific password missing.
    #[error("{0}")]
    MissingCredentials(String),

    /// Notarization tool output did not contain the expected marker.
    #[error("problem with notarization: `{marker}` not found in tool output")]
    NotarizationMarkerNotFound {
        /// Marker that was searched for.
        marker: &'static str,
        /// Full tool output, kept for the log.
        output: String,
    },

    /// Remote notarization finished with status "invalid".
    #[error("notarization of {} was rejected (status: invalid)", .path.display())]
    NotarizationInvalid {
        /// Artifact that was submitted.
        path: PathBuf,
    },

    /// Path could not be expressed as UTF-8 where a tool needs text.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl Error {
    /// True when this error came from the cancellation path.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Context { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Attach context to optional values and results.
pub trait Context<T> {
    /// Wrap the failure with a fixed message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the failure with a lazily built message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context {
            context: context.to_string(),
            source: Box::new(e),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context {
            context: f().to_string(),
            source: Box::new(e),
        })
    }
}

/// Attach a path to io failures.
pub trait ErrorExt<T> {
    /// Convert an io error into [`Error::Fs`] for `path`.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Return early with [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::exporter::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::exporter::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
