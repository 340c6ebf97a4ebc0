//! Site expense routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tesoro_db::entities::site_expenses;
use tesoro_db::repositories::expense::ExpenseRepository;
use tesoro_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;

/// Creates the site expense routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/expenses", post(create_expense).get(list_expenses))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// The site the expense belongs to.
    pub site_id: Uuid,
    /// What the money was spent on.
    pub concept: String,
    /// Expense amount.
    pub amount: Decimal,
    /// Date incurred (YYYY-MM-DD).
    pub incurred_on: NaiveDate,
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Filter by site.
    pub site_id: Option<Uuid>,
    /// Only expenses not yet settled in a batch.
    #[serde(default)]
    pub unassigned: bool,
    /// Filter by incurred date range start.
    pub from: Option<NaiveDate>,
    /// Filter by incurred date range end.
    pub to: Option<NaiveDate>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Response for a site expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// The site the expense belongs to.
    pub site_id: Uuid,
    /// The batch that settled the expense, if any.
    pub batch_id: Option<Uuid>,
    /// What the money was spent on.
    pub concept: String,
    /// Expense amount.
    pub amount: Decimal,
    /// Date incurred.
    pub incurred_on: NaiveDate,
}

impl From<site_expenses::Model> for ExpenseResponse {
    fn from(expense: site_expenses::Model) -> Self {
        Self {
            id: expense.id,
            site_id: expense.site_id,
            batch_id: expense.batch_id,
            concept: expense.concept,
            amount: expense.amount,
            incurred_on: expense.incurred_on,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/expenses` - Record a site expense.
async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ExpenseRepository::new((*state.db).clone());
    let expense = repo
        .create(
            request.site_id,
            request.concept,
            request.amount,
            request.incurred_on,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(expense))))
}

/// GET `/expenses` - List expenses with site/unassigned filters.
async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListExpensesQuery>,
) -> Result<Json<PageResponse<ExpenseResponse>>, ApiError> {
    let repo = ExpenseRepository::new((*state.db).clone());
    let (items, total) = repo
        .list(
            query.site_id,
            query.unassigned,
            query.from,
            query.to,
            query.page.offset(),
            query.page.limit(),
        )
        .await?;

    let data = items.into_iter().map(ExpenseResponse::from).collect();
    Ok(Json(PageResponse::new(
        data,
        query.page.page,
        query.page.per_page,
        total,
    )))
}
