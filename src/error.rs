use std::{error::Error, fmt::Display};

use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AppError {
    /// Connection refused, DNS failure or timeout
    NetworkUnavailable(String),
    /// The server answered 404 or a lookup by code found nothing
    NotFound(String),
    /// Bad user input or a response body that does not match the schema
    ValidationFailed(String),
    /// Any other non-2xx answer
    ServerRejected { status: u16, message: String },
    Config(String),
}

pub type Result<T> = core::result::Result<T, AppError>;

impl AppError {
    /// Text shown in the result modal
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnavailable(_) => String::from("Erro de conexão com o servidor."),
            Self::NotFound(m) | Self::ValidationFailed(m) | Self::Config(m) => m.clone(),
            Self::ServerRejected { message, .. } => message.clone(),
        }
    }
    /// Maps a non-2xx answer and its already extracted message
    pub fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound(message)
        } else {
            Self::ServerRejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkUnavailable(e) => write!(f, "network unavailable: {e}"),
            Self::NotFound(e) => write!(f, "not found: {e}"),
            Self::ValidationFailed(e) => write!(f, "validation failed: {e}"),
            Self::ServerRejected { status, message } => {
                write!(f, "server rejected the request ({status}): {message}")
            }
            Self::Config(e) => write!(f, "configuration error: {e}"),
        }
    }
}
impl Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::ValidationFailed(value.to_string())
        } else if let Some(status) = value.status() {
            Self::from_status(status, value.to_string())
        } else {
            Self::NetworkUnavailable(value.to_string())
        }
    }
}
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::ValidationFailed(value.to_string())
    }
}
