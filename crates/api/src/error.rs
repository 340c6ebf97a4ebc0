//! Error-to-HTTP mapping.
//!
//! Every repository error converts into an `ApiError` carrying the
//! status and SCREAMING_SNAKE code from the originating error enum;
//! the response body is always `{ "error": { "code", "message" } }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use tesoro_db::repositories::closeout::CloseoutRepoError;
use tesoro_shared::AppError;
use tesoro_db::repositories::credit::CreditRepoError;
use tesoro_db::repositories::delivery::DeliveryRepoError;
use tesoro_db::repositories::directory::DirectoryError;
use tesoro_db::repositories::expense::ExpenseError;
use tesoro_db::repositories::sale_order::SaleOrderError;
use tesoro_db::repositories::sales_return::SalesReturnError;

/// An error ready to be rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Builds an error from a status, code, and message.
    #[must_use]
    pub fn new(status: u16, code: &'static str, message: String) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message,
        }
    }

    /// A 404 with a `NOT_FOUND` code.
    #[must_use]
    pub fn not_found(message: String) -> Self {
        AppError::NotFound(message).into()
    }

    /// A 400 with a `VALIDATION_ERROR` code.
    #[must_use]
    pub fn validation(message: String) -> Self {
        AppError::Validation(message).into()
    }

    fn database(err: &DbErr) -> Self {
        error!(error = %err, "database error");
        AppError::Database("An internal database error occurred".to_string()).into()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = err.status_code();
        let code = err.error_code();
        let message = match err {
            AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::BusinessRule(m)
            | AppError::Conflict(m)
            | AppError::Database(m)
            | AppError::Internal(m) => m,
        };
        Self::new(status, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": {
                    "code": self.code,
                    "message": self.message,
                }
            })),
        )
            .into_response()
    }
}

impl From<CreditRepoError> for ApiError {
    fn from(err: CreditRepoError) -> Self {
        match err {
            CreditRepoError::NotFound(id) => Self::not_found(format!("Credit not found: {id}")),
            CreditRepoError::OrderNotFound(_) => Self::new(500, "DATA_INTEGRITY", err.to_string()),
            CreditRepoError::PaymentNotFound(id) => {
                Self::not_found(format!("Payment not found: {id}"))
            }
            CreditRepoError::Core(ref core) => {
                Self::new(core.http_status_code(), core.error_code(), err.to_string())
            }
            CreditRepoError::Payment(ref core) => {
                Self::new(core.http_status_code(), core.error_code(), err.to_string())
            }
            CreditRepoError::Database(ref db) => Self::database(db),
        }
    }
}

impl From<SaleOrderError> for ApiError {
    fn from(err: SaleOrderError) -> Self {
        match err {
            SaleOrderError::NotFound(id) => Self::not_found(format!("Sale order not found: {id}")),
            SaleOrderError::Validation(message) => Self::validation(message),
            SaleOrderError::Credit(ref core) => {
                Self::new(core.http_status_code(), core.error_code(), err.to_string())
            }
            SaleOrderError::Database(ref db) => Self::database(db),
        }
    }
}

impl From<DeliveryRepoError> for ApiError {
    fn from(err: DeliveryRepoError) -> Self {
        match err {
            DeliveryRepoError::BatchNotFound(_)
            | DeliveryRepoError::OrderNotFound(_)
            | DeliveryRepoError::PaymentNotFound(_)
            | DeliveryRepoError::ItemNotFound(_)
            | DeliveryRepoError::ExpenseNotFound(_) => Self::not_found(err.to_string()),
            DeliveryRepoError::Validation(message) => Self::validation(message),
            DeliveryRepoError::Core(ref core) => {
                Self::new(core.http_status_code(), core.error_code(), err.to_string())
            }
            DeliveryRepoError::Claim(ref core) => {
                Self::new(core.http_status_code(), core.error_code(), err.to_string())
            }
            DeliveryRepoError::Database(ref db) => Self::database(db),
        }
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::NotFound(_) => Self::not_found(err.to_string()),
            ExpenseError::Validation(message) => Self::validation(message),
            ExpenseError::Database(ref db) => Self::database(db),
        }
    }
}

impl From<SalesReturnError> for ApiError {
    fn from(err: SalesReturnError) -> Self {
        match err {
            SalesReturnError::OrderNotFound(_) => Self::not_found(err.to_string()),
            SalesReturnError::Validation(message) => Self::validation(message),
            SalesReturnError::InvalidOrderState(message) => {
                Self::new(422, "INVALID_ORDER_STATE", message)
            }
            SalesReturnError::Database(ref db) => Self::database(db),
        }
    }
}

impl From<CloseoutRepoError> for ApiError {
    fn from(err: CloseoutRepoError) -> Self {
        match err {
            CloseoutRepoError::NotFound(_) | CloseoutRepoError::ClientNotFound(_) => {
                Self::not_found(err.to_string())
            }
            CloseoutRepoError::Core(ref core) => {
                Self::new(core.http_status_code(), core.error_code(), err.to_string())
            }
            CloseoutRepoError::Database(ref db) => Self::database(db),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Database(ref db) => Self::database(db),
            _ => Self::not_found(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tesoro_core::delivery::DeliveryError;
    use tesoro_core::reconciliation::ReconciliationError;
    use uuid::Uuid;

    #[rstest]
    #[case(CreditRepoError::NotFound(Uuid::nil()).into(), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(
        SaleOrderError::Validation("bad input".to_string()).into(),
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR"
    )]
    #[case(
        DeliveryRepoError::Core(DeliveryError::AlreadyConfirmed).into(),
        StatusCode::CONFLICT,
        "ALREADY_CONFIRMED"
    )]
    #[case(
        DeliveryRepoError::Core(DeliveryError::EmptyBatch).into(),
        StatusCode::UNPROCESSABLE_ENTITY,
        "EMPTY_BATCH"
    )]
    #[case(
        DeliveryRepoError::Claim(ReconciliationError::AlreadyClaimed {
            target: tesoro_core::reconciliation::ClaimTarget::CashOrder(Uuid::nil()),
            batch_id: Uuid::nil(),
        }).into(),
        StatusCode::CONFLICT,
        "ALREADY_CLAIMED"
    )]
    fn test_error_mapping(
        #[case] err: ApiError,
        #[case] status: StatusCode,
        #[case] code: &'static str,
    ) {
        assert_eq!(err.status, status);
        assert_eq!(err.code, code);
    }

    #[test]
    fn test_app_error_message_not_rewrapped() {
        let err: ApiError = AppError::NotFound("Credit not found".to_string()).into();
        assert_eq!(err.message, "Credit not found");
    }
}
