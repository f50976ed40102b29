use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::period::Period;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("payroll for {period} already generated")]
    AlreadyGenerated { period: Period },

    #[error("{0} not found")]
    NotFound(String),

    #[error("concurrent update conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("roster unavailable: {0}")]
    Roster(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // 23000: integrity constraint, 40001: serialization failure / deadlock
            match db_err.code().as_deref() {
                Some("23000") | Some("40001") => {
                    return CoreError::ConcurrencyConflict(db_err.message().to_string());
                }
                _ => {}
            }
        }
        CoreError::Storage(e.to_string())
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::AlreadyGenerated { .. } => StatusCode::CONFLICT,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            CoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CoreError::Roster(_) => StatusCode::BAD_GATEWAY,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            CoreError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            CoreError::Roster(e) | CoreError::Timeout(e) => {
                tracing::error!(error = %e, "Request failed");
                self.to_string()
            }
            other => {
                tracing::debug!(error = %other, "Request rejected");
                other.to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
