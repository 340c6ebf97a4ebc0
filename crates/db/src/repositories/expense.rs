//! Site expense repository.
//!
//! Expenses are recorded against a site and start out unassigned; a
//! draft delivery batch attaches them to net its expected amount. The
//! batch link lives on the expense row and is managed by the delivery
//! repository inside the batch transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::site_expenses;

/// Error types for site expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Site expense not found: {0}")]
    NotFound(Uuid),

    /// Invalid input rejected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for site expenses (gastos).
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an expense against a site, initially unassigned.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive amount or blank concept.
    pub async fn create(
        &self,
        site_id: Uuid,
        concept: String,
        amount: Decimal,
        incurred_on: NaiveDate,
    ) -> Result<site_expenses::Model, ExpenseError> {
        if amount <= Decimal::ZERO {
            return Err(ExpenseError::Validation(
                "expense amount must be positive".to_string(),
            ));
        }
        if concept.trim().is_empty() {
            return Err(ExpenseError::Validation(
                "expense concept cannot be blank".to_string(),
            ));
        }

        let now = Utc::now().into();
        let expense = site_expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            site_id: Set(site_id),
            batch_id: Set(None),
            concept: Set(concept),
            amount: Set(amount),
            incurred_on: Set(incurred_on),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(expense = %expense.id, site = %site_id, amount = %expense.amount, "expense recorded");
        Ok(expense)
    }

    /// Finds an expense by id.
    pub async fn find(&self, id: Uuid) -> Result<site_expenses::Model, ExpenseError> {
        site_expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(id))
    }

    /// Lists expenses for a site, optionally restricted to unassigned
    /// ones within a period (the candidates for a draft batch).
    pub async fn list(
        &self,
        site_id: Option<Uuid>,
        unassigned_only: bool,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<site_expenses::Model>, u64), ExpenseError> {
        let mut query = site_expenses::Entity::find();
        if let Some(site) = site_id {
            query = query.filter(site_expenses::Column::SiteId.eq(site));
        }
        if unassigned_only {
            query = query.filter(site_expenses::Column::BatchId.is_null());
        }
        if let Some(from) = from {
            query = query.filter(site_expenses::Column::IncurredOn.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(site_expenses::Column::IncurredOn.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(site_expenses::Column::IncurredOn)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((items, total))
    }
}
