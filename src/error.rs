//! Error Types
//!
//! Every failure the core reports to its collaborator. None of them is
//! fatal: parse and lookup failures leave the tree untouched, viewport
//! failures send navigation down the degraded path.

use thiserror::Error;

use crate::workflow::NodeId;

#[derive(Error, Debug)]
pub enum WaymarkError {
    #[error("Failed to parse workflow document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No task contains step {step}")]
    LookupMiss { step: NodeId },

    #[error("{0}")]
    InvalidSelection(String),

    #[error("Viewport failed to initialize: {0}")]
    ViewportInit(String),

    #[error("Error loading URL {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WaymarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_from_serde() {
        let err: WaymarkError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(matches!(err, WaymarkError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse workflow document"));
    }

    #[test]
    fn test_navigation_error_message() {
        let err = WaymarkError::Navigation {
            url: "https://example.com".to_string(),
            reason: "engine crashed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error loading URL https://example.com: engine crashed"
        );
    }

    #[test]
    fn test_invalid_selection_is_verbatim() {
        let err = WaymarkError::InvalidSelection("Please select a step.".to_string());
        assert_eq!(err.to_string(), "Please select a step.");
    }
}
