//! PostgreSQL implementation of OrderRepository.
//!
//! Settlement is a compare-and-swap on the status column: the first
//! `UPDATE ... WHERE status = 'created'` that matches wins, every other
//! delivery falls through to a plain append of its audit record. A winning
//! `paid` update inserts the backlog entry in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, OfferId, OrderId, PromoId, SchoolId, StudentId, Timestamp,
};
use crate::domain::order::{
    Currency, OfferSnapshot, Order, OrderStatus, PromoSnapshot, StudentSnapshot, Transaction,
};
use crate::ports::{OrderRepository, PendingFulfillment, TransitionResult};

use super::fulfillment_backlog::enqueue;

const ORDER_COLUMNS: &str = "id, school_id, student_id, student_name, student_email, \
     offer_id, offer_name, promo_id, promo_code, amount, currency, status, transactions, created_at";

/// PostgreSQL implementation of the OrderRepository port.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn append_returning(
        &self,
        id: &OrderId,
        transaction: &Transaction,
    ) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders
            SET transactions = transactions || jsonb_build_array($2::jsonb),
                updated_at = now()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(Json(transaction))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to append order transaction", e))?;

        row.map(Order::try_from).transpose()
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    school_id: Uuid,
    student_id: Uuid,
    student_name: String,
    student_email: String,
    offer_id: Uuid,
    offer_name: String,
    promo_id: Option<Uuid>,
    promo_code: Option<String>,
    amount: i64,
    currency: String,
    status: String,
    transactions: Json<Vec<Transaction>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let amount = u64::try_from(row.amount).map_err(|_| {
            DomainError::database(format!("Invalid amount for order {}: {}", row.id, row.amount))
        })?;
        let currency = Currency::new(row.currency.trim()).map_err(|e| {
            DomainError::database(format!("Invalid currency for order {}: {}", row.id, e))
        })?;
        let status: OrderStatus = row.status.parse().map_err(|e| {
            DomainError::database(format!("Invalid status for order {}: {}", row.id, e))
        })?;
        let promo = match (row.promo_id, row.promo_code) {
            (Some(id), Some(code)) => Some(PromoSnapshot {
                id: PromoId::from_uuid(id),
                code,
            }),
            _ => None,
        };

        Ok(Order {
            id: OrderId::from_uuid(row.id),
            school_id: SchoolId::from_uuid(row.school_id),
            student: StudentSnapshot {
                id: StudentId::from_uuid(row.student_id),
                name: row.student_name,
                email: row.student_email,
            },
            offer: OfferSnapshot {
                id: OfferId::from_uuid(row.offer_id),
                name: row.offer_name,
            },
            promo,
            amount,
            currency,
            status,
            transactions: row.transactions.0,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        let amount = i64::try_from(order.amount)
            .map_err(|_| DomainError::validation("amount", "Amount exceeds storage range"))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, school_id, student_id, student_name, student_email, offer_id, offer_name,
                promo_id, promo_code, amount, currency, status, transactions, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.school_id.as_uuid())
        .bind(order.student.id.as_uuid())
        .bind(&order.student.name)
        .bind(&order.student.email)
        .bind(order.offer.id.as_uuid())
        .bind(&order.offer.name)
        .bind(order.promo.as_ref().map(|p| *p.id.as_uuid()))
        .bind(order.promo.as_ref().map(|p| p.code.as_str()))
        .bind(amount)
        .bind(order.currency.as_str())
        .bind(order.status.as_str())
        .bind(Json(&order.transactions))
        .bind(order.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("orders_pkey") {
                    return DomainError::new(
                        ErrorCode::OrderExists,
                        format!("Order {} already exists", order.id),
                    );
                }
            }
            db_error("Failed to save order", e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find order", e))?;

        row.map(Order::try_from).transpose()
    }

    async fn transition_if_created(
        &self,
        id: &OrderId,
        target: OrderStatus,
        transaction: Transaction,
    ) -> Result<TransitionResult, DomainError> {
        if target == OrderStatus::Created {
            return Err(DomainError::validation(
                "status",
                "Cannot transition an order back to created",
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin settlement", e))?;

        let transitioned: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders
            SET status = $2,
                transactions = transactions || jsonb_build_array($3::jsonb),
                updated_at = now()
            WHERE id = $1 AND status = 'created'
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(target.as_str())
        .bind(Json(&transaction))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to transition order", e))?;

        if let Some(row) = transitioned {
            let order = Order::try_from(row)?;
            if order.status == OrderStatus::Paid {
                enqueue(&mut tx, &PendingFulfillment::awaiting_settlement(order.id)).await?;
            }
            tx.commit()
                .await
                .map_err(|e| db_error("Failed to commit settlement", e))?;
            return Ok(TransitionResult::Transitioned(order));
        }
        drop(tx);

        // Status is no longer `created` (or the order is unknown); a terminal
        // status never changes again, so appending separately is safe.
        match self.append_returning(id, &transaction).await? {
            Some(order) => Ok(TransitionResult::AlreadyTerminal(order)),
            None => Ok(TransitionResult::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> OrderRow {
        OrderRow {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            student_name: "Test Payment".to_string(),
            student_email: "payment@test.com".to_string(),
            offer_id: Uuid::new_v4(),
            offer_name: "Test Offer".to_string(),
            promo_id: None,
            promo_code: None,
            amount: 19_900,
            currency: "UAH".to_string(),
            status: "created".to_string(),
            transactions: Json(vec![]),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_order() {
        let row = row();
        let id = row.id;
        let order = Order::try_from(row).unwrap();

        assert_eq!(order.id, OrderId::from_uuid(id));
        assert_eq!(order.amount, 19_900);
        assert_eq!(order.currency.as_str(), "UAH");
        assert_eq!(order.status, OrderStatus::Created);
        assert!(order.promo.is_none());
    }

    #[test]
    fn row_with_promo_and_transactions() {
        let promo_id = Uuid::new_v4();
        let row = OrderRow {
            promo_id: Some(promo_id),
            promo_code: Some("SPRING".to_string()),
            status: "paid".to_string(),
            transactions: Json(vec![Transaction::new(OrderStatus::Paid, "{}")]),
            ..row()
        };
        let order = Order::try_from(row).unwrap();

        assert_eq!(order.promo.unwrap().id, PromoId::from_uuid(promo_id));
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.transactions.len(), 1);
    }

    #[test]
    fn negative_amount_is_database_error() {
        let row = OrderRow {
            amount: -1,
            ..row()
        };
        let err = Order::try_from(row).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn unknown_status_is_database_error() {
        let row = OrderRow {
            status: "refunded".to_string(),
            ..row()
        };
        assert!(Order::try_from(row).is_err());
    }

    #[test]
    fn padded_currency_is_trimmed() {
        let row = OrderRow {
            currency: "uah".to_string(),
            ..row()
        };
        assert_eq!(Order::try_from(row).unwrap().currency.as_str(), "UAH");
    }
}
