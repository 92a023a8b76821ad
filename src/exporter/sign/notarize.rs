//! Parsers for notarization tool output.
//!
//! `altool` reports in free text. These functions are the only place that
//! knows its format.

use crate::exporter::error::{Error, Result};
use regex::Regex;
use std::{fmt, sync::LazyLock};

/// Marker preceding the request identifier in a submission reply.
pub const REQUEST_ID_MARKER: &str = "RequestUUID";

/// Marker preceding the status in a notarization-info reply.
pub const STATUS_MARKER: &str = "Status:";

static REQUEST_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"RequestUUID\s*=\s*([0-9A-Za-z-]+)").expect("constant regex pattern is valid")
});

static STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Status:\s*(.+?)\s*$").expect("constant regex pattern is valid")
});

/// Remote notarization state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NotarizationStatus {
    InProgress,
    Success,
    Invalid,
    /// Any other text, kept verbatim. Treated as not yet terminal.
    Other(String),
}

impl NotarizationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Invalid)
    }
}

impl From<&str> for NotarizationStatus {
    fn from(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "in progress" => Self::InProgress,
            "success" => Self::Success,
            "invalid" => Self::Invalid,
            _ => Self::Other(text.trim().to_string()),
        }
    }
}

impl fmt::Display for NotarizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => f.write_str("in progress"),
            Self::Success => f.write_str("success"),
            Self::Invalid => f.write_str("invalid"),
            Self::Other(text) => f.write_str(text),
        }
    }
}

/// Extract the request identifier from a submission reply.
pub fn parse_request_id(output: &str) -> Result<String> {
    REQUEST_ID
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::NotarizationMarkerNotFound {
            marker: REQUEST_ID_MARKER,
            output: output.to_string(),
        })
}

/// Extract the status line from a notarization-info reply.
pub fn parse_status(output: &str) -> Result<NotarizationStatus> {
    STATUS
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| NotarizationStatus::from(m.as_str()))
        .ok_or_else(|| Error::NotarizationMarkerNotFound {
            marker: STATUS_MARKER,
            output: output.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_found_among_other_lines() {
        let reply = "2024-01-01 12:00:00 altool[1:2] No errors uploading 'Synth.pkg'.\n\
                     RequestUUID = 2efe2717-52ef-43a5-96dc-0797e4ca1041\n";
        assert_eq!(
            parse_request_id(reply).unwrap(),
            "2efe2717-52ef-43a5-96dc-0797e4ca1041"
        );
    }

    #[test]
    fn missing_request_id_is_marker_error() {
        let err = parse_request_id("*** Error: Unable to upload your app").unwrap_err();
        assert!(matches!(
            err,
            Error::NotarizationMarkerNotFound {
                marker: REQUEST_ID_MARKER,
                ..
            }
        ));
    }

    #[test]
    fn status_line_is_parsed() {
        let reply = "No errors getting notarization info.\n\n\
                     Date: 2024-01-01 12:00:00 +0000\n\
                     Hash: 6b3b\n\
                     RequestUUID: 2efe2717\n\
                     Status: in progress\n";
        assert_eq!(parse_status(reply).unwrap(), NotarizationStatus::InProgress);
        assert_eq!(
            parse_status("   Status: success").unwrap(),
            NotarizationStatus::Success
        );
        assert_eq!(
            parse_status("Status: invalid\nStatus Code: 2").unwrap(),
            NotarizationStatus::Invalid
        );
    }

    #[test]
    fn status_message_is_not_the_status() {
        let status = parse_status("Status Message: Package Approved").unwrap_err();
        assert!(matches!(status, Error::NotarizationMarkerNotFound { .. }));
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = parse_status("Status: queued").unwrap();
        assert_eq!(status, NotarizationStatus::Other("queued".into()));
        assert!(!status.is_terminal());
    }
}
