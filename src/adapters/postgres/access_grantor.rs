//! PostgreSQL implementation of AccessGrantor.
//!
//! Entitlements are rows keyed by `(student_id, course_id)` and
//! `(student_id, module_id)`; `ON CONFLICT DO NOTHING` makes a grant a set
//! union.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, ModuleId, StudentId};
use crate::ports::AccessGrantor;

pub struct PostgresAccessGrantor {
    pool: PgPool,
}

impl PostgresAccessGrantor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

#[async_trait]
impl AccessGrantor for PostgresAccessGrantor {
    async fn grant_access(
        &self,
        student_id: &StudentId,
        course_ids: &[CourseId],
        module_ids: &[ModuleId],
    ) -> Result<(), DomainError> {
        let courses: Vec<Uuid> = course_ids.iter().map(|id| *id.as_uuid()).collect();
        let modules: Vec<Uuid> = module_ids.iter().map(|id| *id.as_uuid()).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        if !courses.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO student_courses (student_id, course_id)
                SELECT $1, course_id FROM UNNEST($2::uuid[]) AS course_id
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(student_id.as_uuid())
            .bind(&courses)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to grant courses", e))?;
        }

        if !modules.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO student_modules (student_id, module_id)
                SELECT $1, module_id FROM UNNEST($2::uuid[]) AS module_id
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(student_id.as_uuid())
            .bind(&modules)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to grant modules", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit access grant", e))?;

        Ok(())
    }
}
