use thiserror::Error;

/// Failures talking to the listings API or preparing a request for it
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("listings API returned HTTP {0}")]
    Status(u16),

    #[error("could not decode listings API response: {0}")]
    Decode(String),

    /// Response parsed but `status` was not `success`; carries the API's own message
    #[error("{0}")]
    Remote(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn remote(message: Option<String>, fallback: &str) -> Self {
        ApiError::Remote(
            message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_prefers_api_message() {
        let err = ApiError::remote(Some("Invalid token".to_string()), "Failed to add listing");
        assert_eq!(err.to_string(), "Invalid token");

        let err = ApiError::remote(Some("  ".to_string()), "Failed to add listing");
        assert_eq!(err.to_string(), "Failed to add listing");
    }
}
