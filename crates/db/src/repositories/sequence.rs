//! Sequence counter repository.
//!
//! Sequential human-facing numbers (order numbers, delivery voucher
//! numbers) come from a single authoritative counter row per (scope,
//! site), incremented inside the same transaction as the insert they
//! number. The upsert takes the row lock, so concurrent allocations
//! serialize and numbers never duplicate.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};
use uuid::Uuid;

/// Counter scope for sale order numbers.
pub const ORDER_NUMBER_SCOPE: &str = "order_number";

/// Counter scope for delivery voucher numbers.
pub const DELIVERY_VOUCHER_SCOPE: &str = "delivery_voucher";

/// Repository exposing the narrow next-value capability.
pub struct SequenceRepository;

impl SequenceRepository {
    /// Atomically increments and returns the counter for (scope, site).
    ///
    /// Must be called on the same connection/transaction as the insert
    /// being numbered.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn next_value<C: ConnectionTrait>(
        conn: &C,
        scope: &str,
        site_id: Uuid,
    ) -> Result<i64, DbErr> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO counters (scope, site_id, value) VALUES ($1, $2, 1) \
             ON CONFLICT (scope, site_id) DO UPDATE SET value = counters.value + 1 \
             RETURNING value",
            [scope.into(), site_id.into()],
        );

        let row = conn
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::Custom("counter upsert returned no row".to_string()))?;
        row.try_get("", "value")
    }
}
