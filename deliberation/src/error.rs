//! Error taxonomy for the deliberation engine.

use thiserror::Error;

/// Errors from the model-capability boundary.
///
/// The engine never retries these. Retry and backoff policy belongs to the
/// transport or to the caller that wraps a deliberation run.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected completion shape.
    #[error("response parse error: {0}")]
    Parse(String),

    /// No API key was configured for the provider.
    #[error("API key not configured: {0}")]
    MissingApiKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        let err = ProviderError::Api {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));

        let err = ProviderError::MissingApiKey("OPENAI_API_KEY".to_string());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
