use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use std::error::Error as StdError;

use crate::db::StoreError;

const FALLBACK_MESSAGE: &str = "Something went wrong";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid ID")]
    InvalidId,

    #[error("Not Found")]
    NotFound,

    /// A fault raised inside a handler's guarded section. Rendered as a JSON
    /// string carrying the fault message.
    #[error("{0}")]
    Internal(#[source] anyhow::Error),

    /// A fault that escaped the handler. Rendered by the process-wide error
    /// page as plain text.
    #[error("{0}")]
    Unhandled(#[source] anyhow::Error),
}

impl AppError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        AppError::Internal(err.into())
    }

    pub fn unhandled(err: impl Into<anyhow::Error>) -> Self {
        AppError::Unhandled(err.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidId => {
                tracing::warn!(error_type = %self, status_code = %StatusCode::BAD_REQUEST, "Request error");
                (StatusCode::BAD_REQUEST, Json("Invalid ID")).into_response()
            }
            AppError::NotFound => {
                tracing::warn!(error_type = %self, status_code = %StatusCode::NOT_FOUND, "Request error");
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            AppError::Internal(e) => {
                log_source_chain(e);
                let message = e.to_string();
                let message = if message.is_empty() {
                    FALLBACK_MESSAGE.to_string()
                } else {
                    message
                };
                tracing::error!(
                    error_message = %message,
                    status_code = %StatusCode::INTERNAL_SERVER_ERROR,
                    "Request error"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(message)).into_response()
            }
            AppError::Unhandled(e) => {
                log_source_chain(e);
                error_page(&e.to_string())
            }
        }
    }
}

/// Plain-text page for anything that escaped a handler. Answers with a
/// success status; only the body reports the fault.
pub fn error_page(message: &str) -> Response {
    tracing::error!(error_message = %message, "Unhandled error");

    (StatusCode::OK, format!("An error occured: {}", message)).into_response()
}

/// Turns a handler panic into the process-wide error page.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    error_page(&message)
}

fn log_source_chain(e: &anyhow::Error) {
    let mut source_chain = String::new();
    let mut current_err: Option<&(dyn StdError + 'static)> = e.source();
    while let Some(err) = current_err {
        source_chain.push_str(&format!("\n  Caused by: {}", err));
        current_err = err.source();
    }
    if !source_chain.is_empty() {
        tracing::error!("Error source chain:{}", source_chain);
    }
}
