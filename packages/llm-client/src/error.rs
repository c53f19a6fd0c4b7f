//! Error types for the LLM client.

use thiserror::Error;

/// Result type for LLM client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration error (missing config list, invalid entry, no model left after filtering)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        retryable: bool,
    },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Every endpoint in the config list failed
    #[error("All {attempts} configured endpoints failed; last error: {last}")]
    Exhausted { attempts: usize, last: String },
}

impl LlmError {
    /// Whether the next endpoint in the config list should be tried.
    pub fn should_fail_over(&self) -> bool {
        match self {
            LlmError::Network(_) => true,
            LlmError::Api { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_and_retryable_api_errors_fail_over() {
        assert!(LlmError::Network("reset".into()).should_fail_over());
        assert!(LlmError::Api {
            status: 429,
            message: "slow down".into(),
            retryable: true
        }
        .should_fail_over());
    }

    #[test]
    fn client_errors_do_not_fail_over() {
        assert!(!LlmError::Api {
            status: 400,
            message: "bad request".into(),
            retryable: false
        }
        .should_fail_over());
        assert!(!LlmError::Parse("eof".into()).should_fail_over());
        assert!(!LlmError::Config("empty".into()).should_fail_over());
    }
}
