use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("policy API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("policy API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid policy API response: {message}")]
    Decode { message: String },

    #[error("policy API configuration error: {message}")]
    Config { message: String },
}

impl ApiError {
    /// HTTP status code when the backend answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
