//! Special client closeout routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use tesoro_db::entities::{closeout_items, closeouts};
use tesoro_db::repositories::closeout::{CloseoutRepository, CloseoutWithItems};

use crate::AppState;
use crate::error::ApiError;

/// Creates the closeout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/closeouts", post(create_closeout))
        .route("/closeouts/{id}", get(get_closeout))
        .route("/clients/{client_id}/closeouts", get(list_client_closeouts))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording a closeout.
#[derive(Debug, Deserialize)]
pub struct CreateCloseoutRequest {
    /// The designated client.
    pub client_id: Uuid,
    /// The worker performing the closeout.
    pub performed_by: Uuid,
    /// The credits to include.
    pub credit_ids: Vec<Uuid>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Response for a closeout header.
#[derive(Debug, Serialize)]
pub struct CloseoutResponse {
    /// Closeout ID.
    pub id: Uuid,
    /// The designated client.
    pub client_id: Uuid,
    /// The worker who performed the closeout.
    pub performed_by: Uuid,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the closeout was recorded.
    pub created_at: DateTime<FixedOffset>,
}

impl From<closeouts::Model> for CloseoutResponse {
    fn from(closeout: closeouts::Model) -> Self {
        Self {
            id: closeout.id,
            client_id: closeout.client_id,
            performed_by: closeout.performed_by,
            notes: closeout.notes,
            created_at: closeout.created_at,
        }
    }
}

/// Response for one credit snapshot inside a closeout.
#[derive(Debug, Serialize)]
pub struct CloseoutItemResponse {
    /// The included credit.
    pub credit_id: Uuid,
    /// Order number at closeout time.
    pub order_number: i64,
    /// Credit total at closeout time.
    pub credit_total: Decimal,
    /// Pending balance before the closeout.
    pub prior_balance: Decimal,
}

impl From<closeout_items::Model> for CloseoutItemResponse {
    fn from(item: closeout_items::Model) -> Self {
        Self {
            credit_id: item.credit_id,
            order_number: item.order_number,
            credit_total: item.credit_total,
            prior_balance: item.prior_balance,
        }
    }
}

fn details_body(details: CloseoutWithItems) -> serde_json::Value {
    let items: Vec<CloseoutItemResponse> = details
        .items
        .into_iter()
        .map(CloseoutItemResponse::from)
        .collect();
    let total_prior_balance: Decimal = items.iter().map(|item| item.prior_balance).sum();
    json!({
        "closeout": CloseoutResponse::from(details.closeout),
        "items": items,
        "total_prior_balance": total_prior_balance,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/closeouts` - Record a bulk closeout for a designated client.
async fn create_closeout(
    State(state): State<AppState>,
    Json(request): Json<CreateCloseoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CloseoutRepository::new((*state.db).clone());
    let details = repo
        .create(
            request.client_id,
            request.performed_by,
            &request.credit_ids,
            request.notes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(details_body(details))))
}

/// GET `/closeouts/{id}` - Fetch one closeout with its snapshots.
async fn get_closeout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CloseoutRepository::new((*state.db).clone());
    let details = repo.find_with_items(id).await?;
    Ok(Json(details_body(details)))
}

/// GET `/clients/{client_id}/closeouts` - List a client's closeouts.
async fn list_client_closeouts(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CloseoutRepository::new((*state.db).clone());
    let closeouts: Vec<CloseoutResponse> = repo
        .list_for_client(client_id)
        .await?
        .into_iter()
        .map(CloseoutResponse::from)
        .collect();
    Ok(Json(json!({ "closeouts": closeouts })))
}
