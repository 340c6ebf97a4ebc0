//! Sales return routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tesoro_db::entities::sales_returns;
use tesoro_db::repositories::sales_return::SalesReturnRepository;

use crate::AppState;
use crate::error::ApiError;

/// Creates the sales return routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/returns", post(create_return))
}

/// Request body for recording a return.
#[derive(Debug, Deserialize)]
pub struct CreateReturnRequest {
    /// The order being partially or fully returned.
    pub sale_order_id: Uuid,
    /// Returned amount.
    pub amount: Decimal,
    /// Why the goods came back.
    pub reason: Option<String>,
    /// Date of the return (YYYY-MM-DD).
    pub returned_on: NaiveDate,
}

/// Response for a sales return.
#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    /// Return ID.
    pub id: Uuid,
    /// The returned order.
    pub sale_order_id: Uuid,
    /// Returned amount.
    pub amount: Decimal,
    /// Reason.
    pub reason: Option<String>,
    /// Date of the return.
    pub returned_on: NaiveDate,
}

impl From<sales_returns::Model> for ReturnResponse {
    fn from(ret: sales_returns::Model) -> Self {
        Self {
            id: ret.id,
            sale_order_id: ret.sale_order_id,
            amount: ret.amount,
            reason: ret.reason,
            returned_on: ret.returned_on,
        }
    }
}

/// POST `/returns` - Record a return against a sale order.
async fn create_return(
    State(state): State<AppState>,
    Json(request): Json<CreateReturnRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = SalesReturnRepository::new((*state.db).clone());
    let ret = repo
        .create(
            request.sale_order_id,
            request.amount,
            request.reason,
            request.returned_on,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ReturnResponse::from(ret))))
}
