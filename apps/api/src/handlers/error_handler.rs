use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use application::auth::dtos::AuthErrorResponse;
use application::AppError;
use std::fmt;

/// Wrapper around AppError to implement ResponseError (defined in actix-web)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl fmt::Display for HttpAppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl ResponseError for HttpAppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_code = self.0.error_code();
        let error_message = self.0.to_string();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(
                error_code = error_code,
                error_message = %error_message,
                "Internal Server Error: {:?}",
                self.0
            );
        } else if status_code == StatusCode::UNAUTHORIZED || status_code == StatusCode::FORBIDDEN {
            tracing::warn!(
                error_code = error_code,
                error_message = %error_message,
                "Auth Error"
            );
        }

        HttpResponse::build(status_code).json(AuthErrorResponse {
            error: error_message,
            error_code: error_code.to_string(),
        })
    }
}
