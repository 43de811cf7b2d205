//! Error types for attachment flows.
//!
//! Text-layer outcomes (link not found, ambiguous candidates) are resolved
//! at the apply boundary and surfaced as notices; they reach this type only
//! when a flow has to abort. Collaborator failures arrive as
//! [`PlatformError`] and are wrapped here at the flow level.

use std::time::Duration;

/// Main error type for attachment operations.
#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// Target link text absent from the expected scan range.
    #[error("could not find the link for '{0}' in the surrounding text")]
    LinkNotFound(String),

    /// More than one equally-valid candidate span. Never auto-resolved.
    #[error("found {count} identical links for '{target}'")]
    AmbiguousLink { target: String, count: usize },

    /// No active compatible editor view at the moment of action.
    ///
    /// Not an error from the user's perspective; callers treat it as a
    /// silent no-op for the affected gesture step.
    #[error("no active editor view")]
    DetachedContext,

    /// An underlying trash/delete/clipboard call failed.
    #[error("file operation failed: {0}")]
    FileSystem(#[from] PlatformError),

    /// A blob fetch exceeded its deadline or retry budget.
    #[error("attachment data unavailable after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, FlowError>;

/// Error type for host collaborator operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FlowError::AmbiguousLink {
            target: "pic.png".to_string(),
            count: 2,
        };
        assert_eq!(err.to_string(), "found 2 identical links for 'pic.png'");

        let err = FlowError::FileSystem(PlatformError::from("trash unavailable"));
        assert_eq!(err.to_string(), "file operation failed: trash unavailable");
    }
}
