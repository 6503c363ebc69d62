use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{html, Markup};

use crate::{names, services::attempt::AttemptError, views};

#[derive(Debug)]
pub enum AppError {
    Internal(&'static str),
    Input(&'static str),
    NotFound,
    Forbidden(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AppError::Internal(message) => {
                tracing::error!("internal error: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
            AppError::Input(message) => {
                tracing::debug!("input error: {message}");
                (StatusCode::BAD_REQUEST, "INPUT_ERROR")
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Forbidden(message) => {
                tracing::info!("forbidden: {message}");
                (StatusCode::FORBIDDEN, "FORBIDDEN")
            }
        };

        (code, error_page(message)).into_response()
    }
}

impl From<AttemptError> for AppError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::NotFound => AppError::NotFound,
            AttemptError::TooManyTries(_) => AppError::Forbidden("answer count exhausted"),
            AttemptError::Bank(e) => {
                tracing::warn!("{e}");
                AppError::Forbidden("item bank exhausted")
            }
            AttemptError::Irt(e) => {
                tracing::error!("estimation failed: {e}");
                AppError::Internal("could not estimate ability")
            }
            AttemptError::Db(e) => {
                tracing::error!("{e:?}");
                AppError::Internal("database error")
            }
        }
    }
}

/// Logs the underlying error and turns it into an internal error response.
pub trait ResultExt<T> {
    fn reject(self, message: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for Result<T, E> {
    fn reject(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e:?}");
            AppError::Internal(message)
        })
    }
}

fn error_page(message: &str) -> Markup {
    views::page(
        "Error",
        html! {
            h1 { (message) }
        },
        names::DEFAULT_LOCALE,
    )
}
