//! Delivery batch routes.
//!
//! A draft batch is assembled claim by claim, then confirmed against the
//! cashier's declared amounts. The recorded variance is never corrected.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use tesoro_core::credit::types::PaymentMethod;
use tesoro_core::delivery::types::{DeclaredAmounts, DeliveryStatus};
use tesoro_db::entities::{delivery_batches, delivery_line_items};
use tesoro_db::repositories::delivery::{
    BatchDetails, CreateBatchInput, DeliveryRepository, EligibleOrder, EligiblePayment,
};
use tesoro_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::expenses::ExpenseResponse;
use crate::routes::orders::OrderResponse;

/// Creates the delivery batch routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deliveries", post(create_batch).get(list_batches))
        .route("/deliveries/eligible-orders", get(eligible_orders))
        .route("/deliveries/eligible-payments", get(eligible_payments))
        .route("/deliveries/{id}", get(get_batch).delete(delete_batch))
        .route("/deliveries/{id}/items", post(add_item))
        .route("/deliveries/{id}/items/{item_id}", delete(remove_item))
        .route(
            "/deliveries/{id}/expenses/{expense_id}",
            put(attach_expense).delete(detach_expense),
        )
        .route("/deliveries/{id}/confirm", post(confirm_batch))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a draft batch.
#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    /// The site settling its takings.
    pub site_id: Uuid,
    /// Responsible cashier.
    pub employee_id: Uuid,
    /// Hand-off date (YYYY-MM-DD).
    pub delivery_date: NaiveDate,
    /// Start of the settled period.
    pub period_start: NaiveDate,
    /// End of the settled period.
    pub period_end: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Request body for claiming an order or payment into a batch.
///
/// Exactly one of `order_id` and `payment_id` must be set.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// A cash sale order to claim.
    pub order_id: Option<Uuid>,
    /// An installment payment to claim.
    pub payment_id: Option<Uuid>,
}

/// Request body for confirming a batch.
#[derive(Debug, Deserialize)]
pub struct ConfirmBatchRequest {
    /// Declared cash amount.
    #[serde(default)]
    pub declared_cash: Decimal,
    /// Declared bank-transfer amount.
    #[serde(default)]
    pub declared_transfer: Decimal,
    /// Declared check amount.
    #[serde(default)]
    pub declared_check: Decimal,
    /// Declared direct-deposit amount.
    #[serde(default)]
    pub declared_deposit: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Query parameters for listing batches.
#[derive(Debug, Deserialize)]
pub struct ListBatchesQuery {
    /// Filter by site.
    pub site_id: Option<Uuid>,
    /// Filter by delivery date range start.
    pub from: Option<NaiveDate>,
    /// Filter by delivery date range end.
    pub to: Option<NaiveDate>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Query parameters for the eligibility listings.
#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    /// The site being settled.
    pub site_id: Uuid,
    /// Period start.
    pub from: NaiveDate,
    /// Period end.
    pub to: NaiveDate,
}

/// Response for a delivery batch.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// Batch ID.
    pub id: Uuid,
    /// The site settling its takings.
    pub site_id: Uuid,
    /// Responsible cashier.
    pub employee_id: Uuid,
    /// Hand-off date.
    pub delivery_date: NaiveDate,
    /// Start of the settled period.
    pub period_start: NaiveDate,
    /// End of the settled period.
    pub period_end: NaiveDate,
    /// Lifecycle state.
    pub status: String,
    /// Expected amount derived from claims and expenses.
    pub expected_amount: Decimal,
    /// Sum of attached expenses.
    pub expense_total: Decimal,
    /// Declared cash amount.
    pub declared_cash: Decimal,
    /// Declared transfer amount.
    pub declared_transfer: Decimal,
    /// Declared check amount.
    pub declared_check: Decimal,
    /// Declared deposit amount.
    pub declared_deposit: Decimal,
    /// Sum of the declared amounts.
    pub declared_total: Decimal,
    /// Declared total minus expected, set at confirmation.
    pub variance: Option<Decimal>,
    /// Voucher number assigned at confirmation.
    pub voucher_number: Option<i64>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl From<delivery_batches::Model> for BatchResponse {
    fn from(batch: delivery_batches::Model) -> Self {
        let status: DeliveryStatus = batch.status.into();
        Self {
            id: batch.id,
            site_id: batch.site_id,
            employee_id: batch.employee_id,
            delivery_date: batch.delivery_date,
            period_start: batch.period_start,
            period_end: batch.period_end,
            status: status.to_string(),
            expected_amount: batch.expected_amount,
            expense_total: batch.expense_total,
            declared_cash: batch.declared_cash,
            declared_transfer: batch.declared_transfer,
            declared_check: batch.declared_check,
            declared_deposit: batch.declared_deposit,
            declared_total: batch.declared_total,
            variance: batch.variance,
            voucher_number: batch.voucher_number,
            notes: batch.notes,
        }
    }
}

/// Response for a delivery line item.
#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    /// Line item ID.
    pub id: Uuid,
    /// Claimed cash order, if any.
    pub sale_order_id: Option<Uuid>,
    /// Claimed payment, if any.
    pub payment_id: Option<Uuid>,
    /// Claimed amount snapshot.
    pub amount: Decimal,
    /// Audit description.
    pub description: Option<String>,
}

impl From<delivery_line_items::Model> for LineItemResponse {
    fn from(item: delivery_line_items::Model) -> Self {
        Self {
            id: item.id,
            sale_order_id: item.sale_order_id,
            payment_id: item.payment_id,
            amount: item.amount,
            description: item.description,
        }
    }
}

/// Response for a batch with its line items and expenses.
#[derive(Debug, Serialize)]
pub struct BatchDetailsResponse {
    /// Batch header.
    pub batch: BatchResponse,
    /// Claimed orders and payments.
    pub line_items: Vec<LineItemResponse>,
    /// Attached site expenses.
    pub expenses: Vec<ExpenseResponse>,
}

impl From<BatchDetails> for BatchDetailsResponse {
    fn from(details: BatchDetails) -> Self {
        Self {
            batch: BatchResponse::from(details.batch),
            line_items: details
                .line_items
                .into_iter()
                .map(LineItemResponse::from)
                .collect(),
            expenses: details
                .expenses
                .into_iter()
                .map(ExpenseResponse::from)
                .collect(),
        }
    }
}

/// Response for an eligible cash order.
#[derive(Debug, Serialize)]
pub struct EligibleOrderResponse {
    /// The order.
    #[serde(flatten)]
    pub order: OrderResponse,
    /// Sum of returns recorded against the order.
    pub returns_total: Decimal,
    /// Amount the order would contribute to a batch.
    pub net_total: Decimal,
}

impl From<EligibleOrder> for EligibleOrderResponse {
    fn from(eligible: EligibleOrder) -> Self {
        Self {
            order: OrderResponse::from(eligible.order),
            returns_total: eligible.returns_total,
            net_total: eligible.net_total,
        }
    }
}

/// Response for an eligible installment payment.
#[derive(Debug, Serialize)]
pub struct EligiblePaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// The credit the payment belongs to.
    pub credit_id: Uuid,
    /// Payment amount.
    pub amount: Decimal,
    /// Date received.
    pub paid_on: NaiveDate,
    /// Payment method.
    pub method: String,
    /// Receipt reference.
    pub receipt_ref: Option<String>,
    /// Site of the parent order.
    pub site_id: Uuid,
    /// Number of the parent order.
    pub order_number: i64,
}

impl From<EligiblePayment> for EligiblePaymentResponse {
    fn from(eligible: EligiblePayment) -> Self {
        let method: PaymentMethod = eligible.method.into();
        Self {
            id: eligible.id,
            credit_id: eligible.credit_id,
            amount: eligible.amount,
            paid_on: eligible.paid_on,
            method: method.to_string(),
            receipt_ref: eligible.receipt_ref,
            site_id: eligible.site_id,
            order_number: eligible.order_number,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/deliveries` - Create a draft batch.
async fn create_batch(
    State(state): State<AppState>,
    Json(request): Json<CreateBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let batch = repo
        .create_draft(CreateBatchInput {
            site_id: request.site_id,
            employee_id: request.employee_id,
            delivery_date: request.delivery_date,
            period_start: request.period_start,
            period_end: request.period_end,
            notes: request.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(BatchResponse::from(batch))))
}

/// GET `/deliveries` - List batches with site/date filters.
async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<ListBatchesQuery>,
) -> Result<Json<PageResponse<BatchResponse>>, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let (items, total) = repo
        .list(
            query.site_id,
            query.from,
            query.to,
            query.page.offset(),
            query.page.limit(),
        )
        .await?;

    let data = items.into_iter().map(BatchResponse::from).collect();
    Ok(Json(PageResponse::new(
        data,
        query.page.page,
        query.page.per_page,
        total,
    )))
}

/// GET `/deliveries/{id}` - Fetch one batch with items and expenses.
async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchDetailsResponse>, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let details = repo.find_details(id).await?;
    Ok(Json(BatchDetailsResponse::from(details)))
}

/// DELETE `/deliveries/{id}` - Delete a draft batch.
async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    repo.delete_draft(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/deliveries/{id}/items` - Claim an order or payment.
async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let (item, batch) = match (request.order_id, request.payment_id) {
        (Some(order_id), None) => repo.add_order_item(id, order_id).await?,
        (None, Some(payment_id)) => repo.add_payment_item(id, payment_id).await?,
        _ => {
            return Err(ApiError::validation(
                "exactly one of order_id and payment_id must be set".to_string(),
            ));
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "item": LineItemResponse::from(item),
            "batch": BatchResponse::from(batch),
        })),
    ))
}

/// DELETE `/deliveries/{id}/items/{item_id}` - Release a claim.
async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BatchResponse>, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let batch = repo.remove_item(id, item_id).await?;
    Ok(Json(BatchResponse::from(batch)))
}

/// PUT `/deliveries/{id}/expenses/{expense_id}` - Attach an expense.
async fn attach_expense(
    State(state): State<AppState>,
    Path((id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BatchResponse>, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let batch = repo.attach_expense(id, expense_id).await?;
    Ok(Json(BatchResponse::from(batch)))
}

/// DELETE `/deliveries/{id}/expenses/{expense_id}` - Detach an expense.
async fn detach_expense(
    State(state): State<AppState>,
    Path((id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BatchResponse>, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let batch = repo.detach_expense(id, expense_id).await?;
    Ok(Json(BatchResponse::from(batch)))
}

/// POST `/deliveries/{id}/confirm` - Confirm against declared amounts.
async fn confirm_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let batch = repo
        .confirm(
            id,
            DeclaredAmounts {
                cash: request.declared_cash,
                transfer: request.declared_transfer,
                check: request.declared_check,
                deposit: request.declared_deposit,
            },
            request.notes,
        )
        .await?;
    Ok(Json(BatchResponse::from(batch)))
}

/// GET `/deliveries/eligible-orders` - Claimable cash orders.
async fn eligible_orders(
    State(state): State<AppState>,
    Query(query): Query<EligibilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let orders = repo
        .list_eligible_cash_orders(query.site_id, query.from, query.to)
        .await?;
    let data: Vec<EligibleOrderResponse> =
        orders.into_iter().map(EligibleOrderResponse::from).collect();
    Ok(Json(json!({ "orders": data })))
}

/// GET `/deliveries/eligible-payments` - Claimable installments.
async fn eligible_payments(
    State(state): State<AppState>,
    Query(query): Query<EligibilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DeliveryRepository::new((*state.db).clone());
    let payments = repo
        .list_eligible_payments(query.site_id, query.from, query.to)
        .await?;
    let data: Vec<EligiblePaymentResponse> = payments
        .into_iter()
        .map(EligiblePaymentResponse::from)
        .collect();
    Ok(Json(json!({ "payments": data })))
}
