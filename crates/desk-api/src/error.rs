use desk_core::DeskError;

/// Errors raised by the HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("{path} returned status {status}")]
    Status { status: u16, path: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("pincode directory API key is not configured")]
    MissingApiKey,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for DeskError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, path } => DeskError::RemoteStatus { status, path },
            ApiError::Decode(e) => DeskError::Decode(e),
            other => DeskError::Remote(other.to_string()),
        }
    }
}
