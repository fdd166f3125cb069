use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cache::CacheError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),
    #[error("The backend did not answer in time")]
    GatewayTimeout,
    #[error("The backend is unreachable and nothing is cached")]
    BadGateway(#[source] CacheError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<CacheError> for AppError {
    fn from(error: CacheError) -> Self {
        tracing::error!("Request failed: {error}");
        if error.is_timeout() {
            AppError::GatewayTimeout
        } else {
            AppError::BadGateway(error)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
