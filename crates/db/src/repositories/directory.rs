//! Directory repository for sites, workers, and clients.
//!
//! These are simple data stores with no invariants of their own; the
//! reconciliation engine only reads them for names and the special-client
//! designation.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{clients, sites, workers};

/// Error types for directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Site not found.
    #[error("Site not found: {0}")]
    SiteNotFound(Uuid),

    /// Worker not found.
    #[error("Worker not found: {0}")]
    WorkerNotFound(Uuid),

    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for directory lookups and inserts.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    db: DatabaseConnection,
}

impl DirectoryRepository {
    /// Creates a new directory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a site.
    pub async fn create_site(
        &self,
        name: String,
        city: Option<String>,
    ) -> Result<sites::Model, DirectoryError> {
        let now = Utc::now().into();
        let site = sites::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            city: Set(city),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(site.insert(&self.db).await?)
    }

    /// Creates a worker attached to a site.
    pub async fn create_worker(
        &self,
        site_id: Uuid,
        full_name: String,
        role: Option<String>,
    ) -> Result<workers::Model, DirectoryError> {
        let now = Utc::now().into();
        let worker = workers::ActiveModel {
            id: Set(Uuid::new_v4()),
            site_id: Set(site_id),
            full_name: Set(full_name),
            role: Set(role),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(worker.insert(&self.db).await?)
    }

    /// Creates a client; `is_special` designates it for bulk closeout.
    pub async fn create_client(
        &self,
        name: String,
        tax_id: Option<String>,
        is_special: bool,
    ) -> Result<clients::Model, DirectoryError> {
        let now = Utc::now().into();
        let client = clients::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            tax_id: Set(tax_id),
            is_special: Set(is_special),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(client.insert(&self.db).await?)
    }

    /// Finds a site by id.
    pub async fn find_site(&self, id: Uuid) -> Result<sites::Model, DirectoryError> {
        sites::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::SiteNotFound(id))
    }

    /// Finds a worker by id.
    pub async fn find_worker(&self, id: Uuid) -> Result<workers::Model, DirectoryError> {
        workers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::WorkerNotFound(id))
    }

    /// Finds a client by id.
    pub async fn find_client(&self, id: Uuid) -> Result<clients::Model, DirectoryError> {
        clients::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::ClientNotFound(id))
    }

    /// Lists the active workers of a site.
    pub async fn list_site_workers(
        &self,
        site_id: Uuid,
    ) -> Result<Vec<workers::Model>, DirectoryError> {
        Ok(workers::Entity::find()
            .filter(workers::Column::SiteId.eq(site_id))
            .filter(workers::Column::Active.eq(true))
            .all(&self.db)
            .await?)
    }
}
