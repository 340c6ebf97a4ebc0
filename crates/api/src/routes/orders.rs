//! Sale order routes.
//!
//! Orders enter the ledger finalized: creation assigns the site-scoped
//! order number and, for credit sales, opens the credit in the same
//! transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use tesoro_core::credit::types::OrderKind;
use tesoro_db::entities::sale_orders;
use tesoro_db::repositories::sale_order::{CreateSaleOrderInput, SaleOrderRepository};
use tesoro_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::credits::CreditResponse;

/// Creates the sale order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/{id}", get(get_order))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a finalized sale order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// The site the sale belongs to.
    pub site_id: Uuid,
    /// Optional salesperson.
    pub worker_id: Option<Uuid>,
    /// Optional client (required for credit sales).
    pub client_id: Option<Uuid>,
    /// "cash" or "credit".
    pub kind: String,
    /// Issue date (YYYY-MM-DD).
    pub issued_on: NaiveDate,
    /// Subtotal before tax and discounts.
    pub subtotal: Decimal,
    /// Discount total.
    #[serde(default)]
    pub discount_total: Decimal,
    /// Tax (IVA) total.
    #[serde(default)]
    pub tax_total: Decimal,
    /// Whether source retention applies.
    #[serde(default)]
    pub source_retention_enabled: bool,
    /// Source retention percentage.
    #[serde(default)]
    pub source_retention_percent: Decimal,
    /// Whether ICA retention applies.
    #[serde(default)]
    pub ica_retention_enabled: bool,
    /// ICA retention percentage.
    #[serde(default)]
    pub ica_retention_percent: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Query parameters for listing orders.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    /// Filter by site.
    pub site_id: Option<Uuid>,
    /// Filter by issue date range start.
    pub from: Option<NaiveDate>,
    /// Filter by issue date range end.
    pub to: Option<NaiveDate>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Response for a sale order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// The site the sale belongs to.
    pub site_id: Uuid,
    /// Salesperson, if any.
    pub worker_id: Option<Uuid>,
    /// Client, if any.
    pub client_id: Option<Uuid>,
    /// Human-facing sequential number.
    pub order_number: i64,
    /// "cash" or "credit".
    pub kind: String,
    /// Lifecycle state.
    pub status: String,
    /// Issue date.
    pub issued_on: NaiveDate,
    /// Subtotal before tax and discounts.
    pub subtotal: Decimal,
    /// Discount total.
    pub discount_total: Decimal,
    /// Tax total.
    pub tax_total: Decimal,
    /// Order total.
    pub total: Decimal,
    /// Whether source retention applies.
    pub source_retention_enabled: bool,
    /// Source retention amount.
    pub source_retention_amount: Decimal,
    /// Whether ICA retention applies.
    pub ica_retention_enabled: bool,
    /// ICA retention amount.
    pub ica_retention_amount: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl From<sale_orders::Model> for OrderResponse {
    fn from(order: sale_orders::Model) -> Self {
        let kind: OrderKind = order.kind.into();
        let status: tesoro_core::credit::types::OrderStatus = order.status.into();
        Self {
            id: order.id,
            site_id: order.site_id,
            worker_id: order.worker_id,
            client_id: order.client_id,
            order_number: order.order_number,
            kind: kind.to_string(),
            status: status.to_string(),
            issued_on: order.issued_on,
            subtotal: order.subtotal,
            discount_total: order.discount_total,
            tax_total: order.tax_total,
            total: order.total,
            source_retention_enabled: order.source_retention_enabled,
            source_retention_amount: order.source_retention_amount,
            ica_retention_enabled: order.ica_retention_enabled,
            ica_retention_amount: order.ica_retention_amount,
            notes: order.notes,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/orders` - Finalize a sale order.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = OrderKind::parse(&request.kind)
        .ok_or_else(|| ApiError::validation(format!("unknown order kind: {}", request.kind)))?;

    let repo = SaleOrderRepository::new((*state.db).clone());
    let (order, credit) = repo
        .create_finalized(CreateSaleOrderInput {
            site_id: request.site_id,
            worker_id: request.worker_id,
            client_id: request.client_id,
            kind,
            issued_on: request.issued_on,
            subtotal: request.subtotal,
            discount_total: request.discount_total,
            tax_total: request.tax_total,
            source_retention_enabled: request.source_retention_enabled,
            source_retention_percent: request.source_retention_percent,
            ica_retention_enabled: request.ica_retention_enabled,
            ica_retention_percent: request.ica_retention_percent,
            notes: request.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "order": OrderResponse::from(order),
            "credit": credit.map(CreditResponse::from),
        })),
    ))
}

/// GET `/orders/{id}` - Fetch one order.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let repo = SaleOrderRepository::new((*state.db).clone());
    let order = repo.find(id).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// GET `/orders` - List orders with site/date filters.
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError> {
    let repo = SaleOrderRepository::new((*state.db).clone());
    let (orders, total) = repo
        .list(
            query.site_id,
            query.from,
            query.to,
            query.page.offset(),
            query.page.limit(),
        )
        .await?;

    let data = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(PageResponse::new(
        data,
        query.page.page,
        query.page.per_page,
        total,
    )))
}
