//! Directory routes for sites, workers, and clients.
//!
//! Thin stores with no invariants of their own; the ledger only needs
//! them to exist before orders, batches, and closeouts can reference
//! them.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use tesoro_db::entities::{clients, sites, workers};
use tesoro_db::repositories::directory::DirectoryRepository;

use crate::AppState;
use crate::error::ApiError;

/// Creates the directory routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sites", post(create_site))
        .route("/sites/{id}", get(get_site))
        .route("/sites/{id}/workers", get(list_site_workers))
        .route("/workers", post(create_worker))
        .route("/clients", post(create_client))
        .route("/clients/{id}", get(get_client))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a site.
#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    /// Site name.
    pub name: String,
    /// City, if known.
    pub city: Option<String>,
}

/// Request body for creating a worker.
#[derive(Debug, Deserialize)]
pub struct CreateWorkerRequest {
    /// The site the worker belongs to.
    pub site_id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Role (cashier, salesperson, ...).
    pub role: Option<String>,
}

/// Request body for creating a client.
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    /// Client name.
    pub name: String,
    /// Tax identifier.
    pub tax_id: Option<String>,
    /// Designates the client for bulk credit closeout.
    #[serde(default)]
    pub is_special: bool,
}

/// Response for a site.
#[derive(Debug, Serialize)]
pub struct SiteResponse {
    /// Site ID.
    pub id: Uuid,
    /// Site name.
    pub name: String,
    /// City.
    pub city: Option<String>,
}

impl From<sites::Model> for SiteResponse {
    fn from(site: sites::Model) -> Self {
        Self {
            id: site.id,
            name: site.name,
            city: site.city,
        }
    }
}

/// Response for a worker.
#[derive(Debug, Serialize)]
pub struct WorkerResponse {
    /// Worker ID.
    pub id: Uuid,
    /// The site the worker belongs to.
    pub site_id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Role.
    pub role: Option<String>,
    /// Whether the worker is active.
    pub active: bool,
}

impl From<workers::Model> for WorkerResponse {
    fn from(worker: workers::Model) -> Self {
        Self {
            id: worker.id,
            site_id: worker.site_id,
            full_name: worker.full_name,
            role: worker.role,
            active: worker.active,
        }
    }
}

/// Response for a client.
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    /// Client ID.
    pub id: Uuid,
    /// Client name.
    pub name: String,
    /// Tax identifier.
    pub tax_id: Option<String>,
    /// Whether the client is designated for bulk closeout.
    pub is_special: bool,
}

impl From<clients::Model> for ClientResponse {
    fn from(client: clients::Model) -> Self {
        Self {
            id: client.id,
            name: client.name,
            tax_id: client.tax_id,
            is_special: client.is_special,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/sites` - Create a site.
async fn create_site(
    State(state): State<AppState>,
    Json(request): Json<CreateSiteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DirectoryRepository::new((*state.db).clone());
    let site = repo.create_site(request.name, request.city).await?;
    Ok((StatusCode::CREATED, Json(SiteResponse::from(site))))
}

/// GET `/sites/{id}` - Fetch one site.
async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SiteResponse>, ApiError> {
    let repo = DirectoryRepository::new((*state.db).clone());
    let site = repo.find_site(id).await?;
    Ok(Json(SiteResponse::from(site)))
}

/// GET `/sites/{id}/workers` - List a site's active workers.
async fn list_site_workers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DirectoryRepository::new((*state.db).clone());
    let workers: Vec<WorkerResponse> = repo
        .list_site_workers(id)
        .await?
        .into_iter()
        .map(WorkerResponse::from)
        .collect();
    Ok(Json(json!({ "workers": workers })))
}

/// POST `/workers` - Create a worker.
async fn create_worker(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DirectoryRepository::new((*state.db).clone());
    let worker = repo
        .create_worker(request.site_id, request.full_name, request.role)
        .await?;
    Ok((StatusCode::CREATED, Json(WorkerResponse::from(worker))))
}

/// POST `/clients` - Create a client.
async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DirectoryRepository::new((*state.db).clone());
    let client = repo
        .create_client(request.name, request.tax_id, request.is_special)
        .await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

/// GET `/clients/{id}` - Fetch one client.
async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, ApiError> {
    let repo = DirectoryRepository::new((*state.db).clone());
    let client = repo.find_client(id).await?;
    Ok(Json(ClientResponse::from(client)))
}
