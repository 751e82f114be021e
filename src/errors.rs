use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Унифицированная структура ответа об ошибке
#[derive(Serialize)]
pub struct ErrorResponse<'a> {
    pub code: &'a str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// Транспорт ответил не-2xx статусом
    #[error("Telegram API HTTP {status}: {body}")]
    TelegramHttp { status: u16, body: String },

    /// Удалённый API ответил `ok: false`
    #[error("Telegram API rejected message: {0}")]
    Rejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ReqwestError(_) | AppError::TelegramHttp { .. } | AppError::Rejected(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Детали внешнего API наружу не отдаём, только в лог
        let message = match self {
            AppError::ReqwestError(_) | AppError::TelegramHttp { .. } | AppError::Rejected(_) => {
                "Upstream messaging API failed".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorResponse { code: self.code(), message, details: None };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ReqwestError(_) => "HTTP_ERROR",
            AppError::TelegramHttp { .. } => "TELEGRAM_HTTP_ERROR",
            AppError::Rejected(_) => "TELEGRAM_REJECTED",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
