use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{month}/{year} is not a valid period")]
    InvalidPeriod { month: i64, year: i32 },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("missing or invalid owner token")]
    Unauthorized,
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    title: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    detail: String,
}

impl AppError {
    fn title(&self) -> &'static str {
        match self {
            AppError::InvalidPeriod { .. } => "Invalid Period",
            AppError::NotFound(_) => "Not Found",
            AppError::Validation(_) => "Bad Request",
            AppError::Unauthorized => "Unauthorized",
            AppError::Config(_) | AppError::Database(_) => "Internal Server Error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidPeriod { .. } | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Config(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Storage failures are logged here and kept out of the response body.
        let detail = if status.is_server_error() {
            log::error!("request failed: {self}");
            String::new()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            title: self.title(),
            detail,
        };
        HttpResponse::build(status)
            .append_header((header::CONTENT_TYPE, "application/problem+json"))
            .body(serde_json::to_string(&body).unwrap_or_default())
    }
}
