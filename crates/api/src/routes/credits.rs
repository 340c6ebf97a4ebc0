//! Credit and installment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use tesoro_core::credit::OverduePolicy;
use tesoro_core::credit::types::{CreditStatus, PaymentMethod};
use tesoro_core::payment::PaymentInput;
use tesoro_db::entities::{credits, payments};
use tesoro_db::repositories::credit::{CreditRepository, UpdateWithholdingInput};
use tesoro_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;

/// Creates the credit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/credits", get(list_credits))
        .route("/credits/overdue-sweep", post(overdue_sweep))
        .route("/credits/{id}", get(get_credit))
        .route("/credits/{id}/payments", post(register_payment))
        .route("/credits/{id}/payments/{payment_id}", patch(amend_payment))
        .route("/credits/{id}/withholding", patch(update_withholding))
        .route("/credits/{id}/void", post(void_credit))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing credits.
#[derive(Debug, Deserialize)]
pub struct ListCreditsQuery {
    /// Filter by client.
    pub client_id: Option<Uuid>,
    /// Filter by site.
    pub site_id: Option<Uuid>,
    /// Filter by lifecycle state.
    pub status: Option<String>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Request body for registering an installment.
#[derive(Debug, Deserialize)]
pub struct RegisterPaymentRequest {
    /// Payment amount.
    pub amount: Decimal,
    /// Date the payment was received (YYYY-MM-DD).
    pub paid_on: NaiveDate,
    /// Payment method: cash, transfer, card, check, or other.
    pub method: String,
    /// Optional receipt or invoice reference.
    pub receipt_ref: Option<String>,
}

/// Request body for a corrective payment amendment.
#[derive(Debug, Deserialize)]
pub struct AmendPaymentRequest {
    /// The corrected amount.
    pub amount: Decimal,
}

/// Request body for a withholding update.
#[derive(Debug, Deserialize)]
pub struct UpdateWithholdingRequest {
    /// Whether source retention applies.
    pub source_enabled: bool,
    /// Source retention percentage.
    #[serde(default)]
    pub source_percent: Decimal,
    /// Source retention amount.
    #[serde(default)]
    pub source_amount: Decimal,
    /// Whether ICA retention applies.
    pub ica_enabled: bool,
    /// ICA retention percentage.
    #[serde(default)]
    pub ica_percent: Decimal,
    /// ICA retention amount.
    #[serde(default)]
    pub ica_amount: Decimal,
}

/// Request body for an overdue sweep.
#[derive(Debug, Deserialize)]
pub struct OverdueSweepRequest {
    /// Restrict the sweep to one site.
    pub site_id: Option<Uuid>,
    /// Reference date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

/// Response for a credit.
#[derive(Debug, Serialize)]
pub struct CreditResponse {
    /// Credit ID.
    pub id: Uuid,
    /// The originating sale order.
    pub sale_order_id: Uuid,
    /// The site of the originating order.
    pub site_id: Uuid,
    /// The client owing the balance.
    pub client_id: Option<Uuid>,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Authoritative sum of payments.
    pub paid_total: Decimal,
    /// Outstanding balance.
    pub pending_balance: Decimal,
    /// Lifecycle state.
    pub status: String,
    /// Opening date.
    pub opened_on: NaiveDate,
    /// Closing date, once settled.
    pub closed_on: Option<NaiveDate>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl From<credits::Model> for CreditResponse {
    fn from(credit: credits::Model) -> Self {
        let status: CreditStatus = credit.status.into();
        Self {
            id: credit.id,
            sale_order_id: credit.sale_order_id,
            site_id: credit.site_id,
            client_id: credit.client_id,
            credit_total: credit.credit_total,
            paid_total: credit.paid_total,
            pending_balance: credit.pending_balance,
            status: status.to_string(),
            opened_on: credit.opened_on,
            closed_on: credit.closed_on,
            notes: credit.notes,
        }
    }
}

/// Response for an installment payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
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
    /// Pending balance snapshot after this payment.
    pub balance_after: Decimal,
}

impl From<payments::Model> for PaymentResponse {
    fn from(payment: payments::Model) -> Self {
        let method: PaymentMethod = payment.method.into();
        Self {
            id: payment.id,
            credit_id: payment.credit_id,
            amount: payment.amount,
            paid_on: payment.paid_on,
            method: method.to_string(),
            receipt_ref: payment.receipt_ref,
            balance_after: payment.balance_after,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/credits` - List credits with client/site/status filters.
async fn list_credits(
    State(state): State<AppState>,
    Query(query): Query<ListCreditsQuery>,
) -> Result<Json<PageResponse<CreditResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            CreditStatus::parse(s)
                .ok_or_else(|| ApiError::validation(format!("unknown credit status: {s}")))
        })
        .transpose()?;

    let repo = CreditRepository::new((*state.db).clone());
    let (items, total) = repo
        .list(
            query.client_id,
            query.site_id,
            status,
            query.page.offset(),
            query.page.limit(),
        )
        .await?;

    let data = items.into_iter().map(CreditResponse::from).collect();
    Ok(Json(PageResponse::new(
        data,
        query.page.page,
        query.page.per_page,
        total,
    )))
}

/// GET `/credits/{id}` - Fetch one credit with its payment history.
async fn get_credit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditRepository::new((*state.db).clone());
    let found = repo.find_with_payments(id).await?;

    let payments: Vec<PaymentResponse> =
        found.payments.into_iter().map(PaymentResponse::from).collect();
    Ok(Json(json!({
        "credit": CreditResponse::from(found.credit),
        "payments": payments,
    })))
}

/// POST `/credits/{id}/payments` - Register an installment.
async fn register_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RegisterPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let method = PaymentMethod::parse(&request.method).ok_or_else(|| {
        ApiError::validation(format!("unknown payment method: {}", request.method))
    })?;

    let repo = CreditRepository::new((*state.db).clone());
    let (payment, credit) = repo
        .register_payment(
            id,
            PaymentInput {
                amount: request.amount,
                paid_on: request.paid_on,
                method,
                receipt_ref: request.receipt_ref,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "payment": PaymentResponse::from(payment),
            "credit": CreditResponse::from(credit),
        })),
    ))
}

/// PATCH `/credits/{id}/payments/{payment_id}` - Correct a payment amount.
async fn amend_payment(
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<AmendPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditRepository::new((*state.db).clone());
    let (payment, credit) = repo.amend_payment(id, payment_id, request.amount).await?;

    Ok(Json(json!({
        "payment": PaymentResponse::from(payment),
        "credit": CreditResponse::from(credit),
    })))
}

/// PATCH `/credits/{id}/withholding` - Update the order's withholding.
async fn update_withholding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWithholdingRequest>,
) -> Result<Json<CreditResponse>, ApiError> {
    let repo = CreditRepository::new((*state.db).clone());
    let credit = repo
        .update_withholding(
            id,
            UpdateWithholdingInput {
                source_enabled: request.source_enabled,
                source_percent: request.source_percent,
                source_amount: request.source_amount,
                ica_enabled: request.ica_enabled,
                ica_percent: request.ica_percent,
                ica_amount: request.ica_amount,
            },
        )
        .await?;
    Ok(Json(CreditResponse::from(credit)))
}

/// POST `/credits/{id}/void` - Void a credit, freezing its balance.
async fn void_credit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CreditResponse>, ApiError> {
    let repo = CreditRepository::new((*state.db).clone());
    let credit = repo.void(id).await?;
    Ok(Json(CreditResponse::from(credit)))
}

/// POST `/credits/overdue-sweep` - Apply the overdue policy.
async fn overdue_sweep(
    State(state): State<AppState>,
    Json(request): Json<OverdueSweepRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let as_of = request
        .as_of
        .unwrap_or_else(|| Utc::now().date_naive());
    let policy: OverduePolicy = state.overdue_policy;

    let repo = CreditRepository::new((*state.db).clone());
    let marked = repo.overdue_sweep(policy, as_of, request.site_id).await?;
    Ok(Json(json!({ "marked_overdue": marked })))
}
