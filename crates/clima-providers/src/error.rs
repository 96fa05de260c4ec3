use thiserror::Error;

/// Upstream provider failures. Every variant means the corresponding
/// response section degrades to "unavailable"; the request itself still
/// succeeds.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Server error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// Classify reqwest failures into our taxonomy.
pub(crate) trait ReqwestErrorExt {
    fn into_provider_error(self) -> ProviderError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_provider_error(self) -> ProviderError {
        if self.is_timeout() {
            ProviderError::Timeout
        } else if self.is_decode() {
            ProviderError::Malformed(self.to_string())
        } else if let Some(status) = self.status() {
            ProviderError::Status {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            ProviderError::ConnectionFailed(self.to_string())
        }
    }
}
