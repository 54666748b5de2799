//! Access grantor port.
//!
//! Adds courses and modules to a student's entitlement set.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, ModuleId, StudentId};

/// Port for granting purchased content.
///
/// Grants are a set union: granting something the student already has is
/// a no-op, not an error. Callers may therefore retry freely.
#[async_trait]
pub trait AccessGrantor: Send + Sync {
    async fn grant_access(
        &self,
        student_id: &StudentId,
        course_ids: &[CourseId],
        module_ids: &[ModuleId],
    ) -> Result<(), DomainError>;
}
