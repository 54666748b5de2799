//! PostgreSQL implementation of FulfillmentBacklog.
//!
//! Entries for freshly paid orders are inserted by the order repository inside
//! its settlement transaction through [`enqueue`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp};
use crate::ports::{FulfillmentBacklog, PendingFulfillment};

pub struct PostgresFulfillmentBacklog {
    pool: PgPool,
}

impl PostgresFulfillmentBacklog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BacklogRow {
    order_id: Uuid,
    access_granted: bool,
    reason: String,
    attempts: i32,
    recorded_at: DateTime<Utc>,
    next_attempt_at: DateTime<Utc>,
    parked_at: Option<DateTime<Utc>>,
}

impl From<BacklogRow> for PendingFulfillment {
    fn from(row: BacklogRow) -> Self {
        PendingFulfillment {
            order_id: OrderId::from_uuid(row.order_id),
            access_granted: row.access_granted,
            reason: row.reason,
            attempts: u32::try_from(row.attempts).unwrap_or(0),
            recorded_at: Timestamp::from_datetime(row.recorded_at),
            next_attempt_at: Timestamp::from_datetime(row.next_attempt_at),
            parked_at: row.parked_at.map(Timestamp::from_datetime),
        }
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

/// Insert `entry` on `conn` unless the order already has one.
pub(super) async fn enqueue(
    conn: &mut PgConnection,
    entry: &PendingFulfillment,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO fulfillment_backlog
            (order_id, access_granted, reason, attempts, recorded_at, next_attempt_at)
        VALUES ($1, $2, $3, 0, $4, $5)
        ON CONFLICT (order_id) DO NOTHING
        "#,
    )
    .bind(entry.order_id.as_uuid())
    .bind(entry.access_granted)
    .bind(&entry.reason)
    .bind(entry.recorded_at.as_datetime())
    .bind(entry.next_attempt_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_error("Failed to enqueue fulfillment", e))?;

    Ok(())
}

#[async_trait]
impl FulfillmentBacklog for PostgresFulfillmentBacklog {
    async fn record(&self, entry: PendingFulfillment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO fulfillment_backlog
                (order_id, access_granted, reason, attempts, recorded_at, next_attempt_at, parked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO UPDATE SET
                access_granted = EXCLUDED.access_granted,
                reason = EXCLUDED.reason,
                attempts = EXCLUDED.attempts,
                recorded_at = EXCLUDED.recorded_at,
                next_attempt_at = EXCLUDED.next_attempt_at,
                parked_at = EXCLUDED.parked_at
            "#,
        )
        .bind(entry.order_id.as_uuid())
        .bind(entry.access_granted)
        .bind(&entry.reason)
        .bind(i32::try_from(entry.attempts).unwrap_or(i32::MAX))
        .bind(entry.recorded_at.as_datetime())
        .bind(entry.next_attempt_at.as_datetime())
        .bind(entry.parked_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record pending fulfillment", e))?;

        Ok(())
    }

    async fn pending(
        &self,
        limit: usize,
        due_by: Timestamp,
    ) -> Result<Vec<PendingFulfillment>, DomainError> {
        let rows: Vec<BacklogRow> = sqlx::query_as(
            r#"
            SELECT order_id, access_granted, reason, attempts, recorded_at,
                   next_attempt_at, parked_at
            FROM fulfillment_backlog
            WHERE parked_at IS NULL AND next_attempt_at <= $2
            ORDER BY next_attempt_at ASC, recorded_at ASC
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(due_by.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load fulfillment backlog", e))?;

        Ok(rows.into_iter().map(PendingFulfillment::from).collect())
    }

    async fn resolve(&self, order_id: &OrderId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM fulfillment_backlog WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to resolve pending fulfillment", e))?;

        Ok(())
    }

    async fn mark_attempt_failed(
        &self,
        order_id: &OrderId,
        access_granted: bool,
        reason: &str,
        retry_at: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE fulfillment_backlog
            SET attempts = attempts + 1,
                access_granted = $2,
                reason = $3,
                next_attempt_at = COALESCE($4::timestamptz, next_attempt_at),
                parked_at = CASE WHEN $4::timestamptz IS NULL THEN now() ELSE NULL END
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(access_granted)
        .bind(reason)
        .bind(retry_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update pending fulfillment", e))?;

        Ok(())
    }
}
