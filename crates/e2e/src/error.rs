//! Error types for E2E and API testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Authentication failed with status {status}: {body}")]
    Authentication { status: u16, body: String },

    #[error("{resource} not found (status {status})")]
    NotFound { resource: String, status: u16 },

    #[error("{operation}: expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus {
        operation: String,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("Response decode error in {operation}: {reason}")]
    Decode { operation: String, reason: String },

    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Bridge protocol error: {0}")]
    Bridge(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Layout check failed on {device}: {reason}")]
    Layout { device: String, reason: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Domain error: {0}")]
    Domain(#[from] pumpmaster_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            E2eError::Authentication { status, .. } | E2eError::NotFound { status, .. } => {
                Some(*status)
            }
            E2eError::UnexpectedStatus { actual, .. } => Some(*actual),
            E2eError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_embed_status() {
        let auth = E2eError::Authentication {
            status: 401,
            body: "{}".to_string(),
        };
        assert!(auth.to_string().contains("401"));

        let missing = E2eError::NotFound {
            resource: "pump 7".to_string(),
            status: 404,
        };
        assert!(missing.to_string().contains("404"));
        assert!(missing.is_not_found());

        let unexpected = E2eError::UnexpectedStatus {
            operation: "create pump".to_string(),
            expected: 201,
            actual: 500,
            body: String::new(),
        };
        assert_eq!(unexpected.status(), Some(500));
        assert!(unexpected.to_string().starts_with("create pump"));
    }
}
