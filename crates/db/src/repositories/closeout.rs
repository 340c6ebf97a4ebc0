//! Closeout repository.
//!
//! A closeout is an audit record grouping a designated client's open
//! credits with a balance snapshot per credit. The credits themselves
//! are locked while the snapshots are taken but their state is never
//! altered - payment-driven closure stays the only road to CLOSED.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use tesoro_core::closeout::types::CloseoutCandidate;
use tesoro_core::closeout::{CloseoutError, CloseoutService};

use crate::entities::{clients, closeout_items, closeouts, credits, sale_orders};

/// Error types for closeout operations.
#[derive(Debug, thiserror::Error)]
pub enum CloseoutRepoError {
    /// Closeout not found.
    #[error("Closeout not found: {0}")]
    NotFound(Uuid),

    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// The closeout rules rejected the request.
    #[error(transparent)]
    Core(#[from] CloseoutError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A closeout with its per-credit snapshots.
#[derive(Debug, Clone)]
pub struct CloseoutWithItems {
    /// Closeout header.
    pub closeout: closeouts::Model,
    /// Snapshot rows, in request order.
    pub items: Vec<closeout_items::Model>,
}

/// Closeout repository.
#[derive(Debug, Clone)]
pub struct CloseoutRepository {
    db: DatabaseConnection,
}

impl CloseoutRepository {
    /// Creates a new closeout repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a closeout of the given credits for a designated client.
    ///
    /// Credits are locked while their balances are snapshotted so a
    /// racing payment cannot slip between the snapshot and the insert.
    pub async fn create(
        &self,
        client_id: Uuid,
        performed_by: Uuid,
        credit_ids: &[Uuid],
        notes: Option<String>,
    ) -> Result<CloseoutWithItems, CloseoutRepoError> {
        let txn = self.db.begin().await?;

        let client = clients::Entity::find_by_id(client_id)
            .one(&txn)
            .await?
            .ok_or(CloseoutRepoError::ClientNotFound(client_id))?;

        let rows = credits::Entity::find()
            .filter(credits::Column::Id.is_in(credit_ids.to_vec()))
            .lock_exclusive()
            .all(&txn)
            .await?;
        let mut candidates = Vec::with_capacity(rows.len());
        for credit in rows {
            let order = sale_orders::Entity::find_by_id(credit.sale_order_id)
                .one(&txn)
                .await?;
            candidates.push(CloseoutCandidate {
                credit_id: credit.id,
                client_id: credit.client_id.unwrap_or(Uuid::nil()),
                status: credit.status.into(),
                order_number: order.map_or(0, |o| o.order_number),
                credit_total: credit.credit_total,
                pending_balance: credit.pending_balance,
            });
        }

        let record = CloseoutService::build(
            client_id,
            client.is_special,
            performed_by,
            notes,
            credit_ids,
            &candidates,
        )?;

        let closeout = closeouts::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(record.client_id),
            performed_by: Set(record.performed_by),
            notes: Set(record.notes.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(record.items.len());
        for snapshot in &record.items {
            let item = closeout_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                closeout_id: Set(closeout.id),
                credit_id: Set(snapshot.credit_id),
                order_number: Set(snapshot.order_number),
                credit_total: Set(snapshot.credit_total),
                prior_balance: Set(snapshot.prior_balance),
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        txn.commit().await?;

        info!(
            closeout = %closeout.id,
            client = %client_id,
            credits = items.len(),
            "special client closeout recorded"
        );
        Ok(CloseoutWithItems { closeout, items })
    }

    /// Finds a closeout with its snapshots.
    pub async fn find_with_items(&self, id: Uuid) -> Result<CloseoutWithItems, CloseoutRepoError> {
        let closeout = closeouts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CloseoutRepoError::NotFound(id))?;
        let items = closeout_items::Entity::find()
            .filter(closeout_items::Column::CloseoutId.eq(id))
            .order_by_asc(closeout_items::Column::OrderNumber)
            .all(&self.db)
            .await?;
        Ok(CloseoutWithItems { closeout, items })
    }

    /// Lists a client's closeouts, newest first.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<closeouts::Model>, CloseoutRepoError> {
        Ok(closeouts::Entity::find()
            .filter(closeouts::Column::ClientId.eq(client_id))
            .order_by_desc(closeouts::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
