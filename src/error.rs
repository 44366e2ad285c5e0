use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type PoetResult<T> = Result<T, PoetError>;

/// Everything that can go wrong between an upload and a finished artwork.
#[derive(Debug, thiserror::Error)]
pub enum PoetError {
    /// Unsupported image type or oversized file, caught before any service call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The image bytes could not be rasterized.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// The drawing surface could not be prepared or flattened.
    #[error("drawing surface unavailable: {0}")]
    Surface(String),

    /// The model service call failed or returned an unusable reply.
    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PoetError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Surface(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PoetError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "{self}");
        } else {
            tracing::warn!(%status, "{self}");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(PoetError::invalid_input("x")
            .to_string()
            .contains("invalid input:"));
        assert!(PoetError::decode("x")
            .to_string()
            .contains("image decode failed:"));
        assert!(PoetError::surface("x")
            .to_string()
            .contains("drawing surface unavailable:"));
        assert!(PoetError::upstream("x")
            .to_string()
            .contains("upstream service failed:"));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            PoetError::invalid_input("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PoetError::decode("x").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(PoetError::upstream("x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            PoetError::surface("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PoetError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
