//! PostgreSQL implementation of OfferCatalog.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, ModuleId, OfferId, PromoId, SchoolId,
};
use crate::domain::order::Currency;
use crate::ports::{OfferCatalog, OfferEntitlements, PromoCode};

pub struct PostgresOfferCatalog {
    pool: PgPool,
}

impl PostgresOfferCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    school_id: Uuid,
    name: String,
    amount: i64,
    currency: String,
    course_ids: Vec<Uuid>,
    module_ids: Vec<Uuid>,
}

impl TryFrom<OfferRow> for OfferEntitlements {
    type Error = DomainError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let amount = u64::try_from(row.amount).map_err(|_| {
            DomainError::database(format!("Invalid amount for offer {}: {}", row.id, row.amount))
        })?;
        let currency = Currency::new(row.currency.trim()).map_err(|e| {
            DomainError::database(format!("Invalid currency for offer {}: {}", row.id, e))
        })?;

        Ok(OfferEntitlements {
            offer_id: OfferId::from_uuid(row.id),
            school_id: SchoolId::from_uuid(row.school_id),
            name: row.name,
            amount,
            currency,
            course_ids: row.course_ids.into_iter().map(CourseId::from_uuid).collect(),
            module_ids: row.module_ids.into_iter().map(ModuleId::from_uuid).collect(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PromoRow {
    id: Uuid,
    code: String,
    discount_percentage: i16,
    offer_ids: Vec<Uuid>,
}

impl TryFrom<PromoRow> for PromoCode {
    type Error = DomainError;

    fn try_from(row: PromoRow) -> Result<Self, Self::Error> {
        let discount_percentage = u8::try_from(row.discount_percentage)
            .ok()
            .filter(|pct| *pct <= 100)
            .ok_or_else(|| {
                DomainError::database(format!(
                    "Invalid discount for promo {}: {}",
                    row.id, row.discount_percentage
                ))
            })?;

        Ok(PromoCode {
            id: PromoId::from_uuid(row.id),
            code: row.code,
            discount_percentage,
            offer_ids: row.offer_ids.into_iter().map(OfferId::from_uuid).collect(),
        })
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

#[async_trait]
impl OfferCatalog for PostgresOfferCatalog {
    async fn find_entitlements(
        &self,
        offer_id: &OfferId,
    ) -> Result<Option<OfferEntitlements>, DomainError> {
        let row: Option<OfferRow> = sqlx::query_as(
            r#"
            SELECT id, school_id, name, amount, currency, course_ids, module_ids
            FROM offers
            WHERE id = $1
            "#,
        )
        .bind(offer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find offer", e))?;

        row.map(OfferEntitlements::try_from).transpose()
    }

    async fn find_promo(
        &self,
        school_id: &SchoolId,
        code: &str,
    ) -> Result<Option<PromoCode>, DomainError> {
        let row: Option<PromoRow> = sqlx::query_as(
            r#"
            SELECT id, code, discount_percentage, offer_ids
            FROM promo_codes
            WHERE school_id = $1
              AND code = $2
              AND (expires_at IS NULL OR expires_at > now())
            "#,
        )
        .bind(school_id.as_uuid())
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find promo code", e))?;

        row.map(PromoCode::try_from).transpose()
    }
}
