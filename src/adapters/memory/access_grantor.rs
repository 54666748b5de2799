//! In-memory access grantor.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{CourseId, DomainError, ModuleId, StudentId};
use crate::ports::AccessGrantor;

/// What a student may open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentAccess {
    pub courses: BTreeSet<CourseId>,
    pub modules: BTreeSet<ModuleId>,
}

#[derive(Default)]
pub struct InMemoryAccessGrantor {
    access: RwLock<HashMap<StudentId, StudentAccess>>,
}

impl InMemoryAccessGrantor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn access_of(&self, student_id: &StudentId) -> StudentAccess {
        self.access
            .read()
            .await
            .get(student_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn has_module(&self, student_id: &StudentId, module_id: &ModuleId) -> bool {
        self.access_of(student_id).await.modules.contains(module_id)
    }
}

#[async_trait]
impl AccessGrantor for InMemoryAccessGrantor {
    async fn grant_access(
        &self,
        student_id: &StudentId,
        course_ids: &[CourseId],
        module_ids: &[ModuleId],
    ) -> Result<(), DomainError> {
        let mut access = self.access.write().await;
        let entry = access.entry(*student_id).or_default();
        entry.courses.extend(course_ids.iter().copied());
        entry.modules.extend(module_ids.iter().copied());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grant_is_a_set_union() {
        let grantor = InMemoryAccessGrantor::new();
        let student = StudentId::new();
        let course = CourseId::new();
        let (m1, m2) = (ModuleId::new(), ModuleId::new());

        grantor.grant_access(&student, &[course], &[m1]).await.unwrap();
        grantor.grant_access(&student, &[course], &[m1, m2]).await.unwrap();

        let access = grantor.access_of(&student).await;
        assert_eq!(access.courses.len(), 1);
        assert_eq!(access.modules.len(), 2);
        assert!(grantor.has_module(&student, &m2).await);
    }

    #[tokio::test]
    async fn unknown_student_has_nothing() {
        let grantor = InMemoryAccessGrantor::new();
        assert_eq!(
            grantor.access_of(&StudentId::new()).await,
            StudentAccess::default()
        );
    }
}
