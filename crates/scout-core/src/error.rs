use thiserror::Error;

/// Application-wide error types for Career Scout.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page or calling a backend).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Model backend returned a non-success response.
    #[error("LLM error (HTTP {status_code}): {message}")]
    LlmError { message: String, status_code: u16 },

    /// Model reply could not be interpreted against the extraction schema.
    #[error("Schema validation error: {0}")]
    SchemaValidationError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Missing credential, unsupported model, or invalid setting.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading or writing an export file failed.
    #[error("Export error: {0}")]
    ExportError(String),

    /// The search request itself is unusable (e.g. empty company name).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    /// Returns true for failures of the transport itself (timeout, DNS,
    /// refused connection). These are "no result" signals, not bugs.
    pub fn is_transport(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::ExportError(e.to_string())
    }
}
