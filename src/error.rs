use axum::http::StatusCode;
use thiserror::Error;

use crate::counters::CounterError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Counter store unavailable: {0}")]
    CounterStore(#[from] CounterError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::CounterStore(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client
    pub fn public_message(&self) -> String {
        match self {
            ServerError::ImageNotFound(_) => "Image not found".to_string(),
            ServerError::CounterStore(_) => "Statistics are temporarily unavailable".to_string(),
            ServerError::Database(_) => "Internal server error".to_string(),
            ServerError::InvalidRequest(_) => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServerError::ImageNotFound("3".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::CounterStore(CounterError::Backend("down".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ServerError::Database(sea_orm::DbErr::Custom("secret path /var/db".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }
}
