use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jpegfit_core::{CompressError, IntakeError};
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        let status = match err {
            IntakeError::Empty => StatusCode::BAD_REQUEST,
            IntakeError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IntakeError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        };
        Self::new(status, err.to_string())
    }
}

impl From<CompressError> for AppError {
    fn from(err: CompressError) -> Self {
        let status = match err {
            CompressError::Decode(_) => StatusCode::BAD_REQUEST,
            CompressError::BudgetUnreachable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CompressError::Encode(_) | CompressError::Config(_) | CompressError::Cancelled { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpegfit_core::DecodeError;

    #[test]
    fn test_intake_statuses() {
        assert_eq!(AppError::from(IntakeError::Empty).status, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(IntakeError::TooLarge { size: 2, limit: 1 }).status,
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::from(IntakeError::UnsupportedType("image/gif".into())).status,
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_compress_statuses() {
        assert_eq!(
            AppError::from(CompressError::Decode(DecodeError::InvalidFormat)).status,
            StatusCode::BAD_REQUEST
        );
        let unreachable = AppError::from(CompressError::BudgetUnreachable {
            attempts: 20,
            last_size: 10,
            limit: 1,
        });
        assert_eq!(unreachable.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(unreachable.message.starts_with("Image cannot be reduced enough"));
    }
}
