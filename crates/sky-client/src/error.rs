use reqwest::StatusCode;
use sky_core::{ErrorCode, SkyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid backend url: {0}")]
    Url(String),
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} request failed with {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("{endpoint} returned an unreadable body: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned an empty result")]
    Empty { endpoint: &'static str },
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Url(_) => ErrorCode::InvalidInput,
            Self::Transport { .. } => ErrorCode::Unavailable,
            Self::Status { status, .. } if *status == StatusCode::NOT_FOUND => ErrorCode::NotFound,
            Self::Status { status, .. } if status.is_client_error() => ErrorCode::InvalidInput,
            Self::Status { .. } | Self::Empty { .. } => ErrorCode::Upstream,
            Self::Decode { .. } => ErrorCode::Decode,
        }
    }
}

impl From<ApiError> for SkyError {
    fn from(error: ApiError) -> Self {
        SkyError::new(error.code(), error.to_string())
    }
}
