//! Error taxonomy shared by the stores, the payroll workflows and the HTTP layer.
//!
//! Every variant maps to one HTTP status through [`ResponseError`], so handlers
//! can return `Result<_, AppError>` and use `?` throughout.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::notify::DeliveryError;

/// MySQL reports unique key violations with SQLSTATE 23000.
const DUPLICATE_KEY_SQLSTATE: &str = "23000";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error(
        "Total deductions ({total_deductions:.2}) exceed gross salary ({gross_salary:.2}) for employee {employee_code}"
    )]
    ExcessiveDeductions {
        employee_code: String,
        total_deductions: Decimal,
        gross_salary: Decimal,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    AccessDenied(String),

    /// Mail transport failure. Approval records delivery problems per payslip
    /// instead of failing, so no workflow returns this today.
    #[error("notification delivery failed: {0}")]
    Delivery(DeliveryError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    /// Maps a unique key violation to `Conflict`, anything else to `Database`.
    pub fn from_write(err: sqlx::Error, conflict_message: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(DUPLICATE_KEY_SQLSTATE) {
                return AppError::Conflict(conflict_message.into());
            }
        }
        AppError::Database(err)
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ExcessiveDeductions { .. } => "EXCESSIVE_DEDUCTIONS",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::AccessDenied(_) => "ACCESS_DENIED",
            AppError::Delivery(_) => "DELIVERY_FAILED",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ExcessiveDeductions { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                json!({ "error": self.kind(), "message": "Internal Server Error" })
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                json!({ "error": self.kind(), "message": "Internal Server Error" })
            }
            AppError::ExcessiveDeductions {
                employee_code,
                total_deductions,
                gross_salary,
            } => json!({
                "error": self.kind(),
                "message": self.to_string(),
                "employee_code": employee_code,
                "total_deductions": total_deductions,
                "gross_salary": gross_salary,
            }),
            _ => json!({ "error": self.kind(), "message": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
