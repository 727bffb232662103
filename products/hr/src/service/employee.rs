use std::sync::Arc;

use tracing::{instrument, warn};

use super::{BatchOutcome, Records, checked};
use crate::{
    error::HrResult,
    model::{Employee, EmployeePatch, NewEmployee, RecordId, RecordKind},
    onboarding::{self, OnboardingStep},
    store::RecordStore,
};

#[derive(Clone)]
pub struct EmployeeService {
    records: Records<Employee>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn RecordStore<Employee>>) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    #[instrument(name = "hr.employees.get_all", skip_all)]
    pub async fn get_all(&self) -> HrResult<Vec<Employee>> {
        self.records.get_all().await
    }

    #[instrument(name = "hr.employees.get_by_id", skip(self))]
    pub async fn get_by_id(&self, id: RecordId) -> HrResult<Employee> {
        self.records.get_by_id(id).await
    }

    /// Creates an employee. A missing checklist becomes the blank template.
    #[instrument(name = "hr.employees.create", skip_all, fields(department = %draft.department))]
    pub async fn create(&self, draft: NewEmployee) -> HrResult<Employee> {
        checked(draft.validate(), RecordKind::Employee.as_str(), "create")?;
        self.records.create(draft).await
    }

    #[instrument(name = "hr.employees.update", skip(self, patch))]
    pub async fn update(&self, id: RecordId, patch: EmployeePatch) -> HrResult<Employee> {
        checked(patch.validate(), RecordKind::Employee.as_str(), "update")?;
        self.records.update(id, patch).await
    }

    /// Replaces the whole checklist. Step ids are expected to match the
    /// template but are not enforced here.
    #[instrument(name = "hr.employees.update_onboarding", skip(self, steps))]
    pub async fn update_onboarding_progress(
        &self,
        id: RecordId,
        steps: Vec<OnboardingStep>,
    ) -> HrResult<Employee> {
        if !onboarding::matches_template(&steps) {
            warn!(id, steps = steps.len(), "onboarding steps diverge from template");
        }
        let patch = EmployeePatch {
            onboarding_progress: Some(steps),
            ..EmployeePatch::default()
        };
        self.records.update(id, patch).await
    }

    #[instrument(name = "hr.employees.delete", skip(self))]
    pub async fn delete(&self, id: RecordId) -> HrResult<()> {
        self.records.delete(id).await
    }

    #[instrument(name = "hr.employees.delete_many", skip_all, fields(count = ids.len()))]
    pub async fn delete_many(&self, ids: &[RecordId]) -> BatchOutcome {
        self.records.delete_many(ids).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        error::HrError,
        model::EmployeeStatus,
        onboarding::template_steps,
        store::MemoryStore,
    };

    fn service() -> EmployeeService {
        EmployeeService::new(Arc::new(MemoryStore::new()))
    }

    fn draft(first: &str, last: &str) -> NewEmployee {
        NewEmployee {
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@example.test", first.to_lowercase()),
            phone: "555-0100".into(),
            photo_url: None,
            role: "Engineer".into(),
            department: "Eng".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: EmployeeStatus::Active,
            manager_id: None,
            onboarding_progress: None,
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let employee = service().create(draft("Ada", "Lovelace")).await.unwrap();
        assert_eq!(employee.id, 1);
        assert_eq!(employee.onboarding_progress, template_steps());
        assert_eq!(employee.manager_id, None);
        assert_eq!(employee.status, EmployeeStatus::Active);
    }

    #[tokio::test]
    async fn create_keeps_supplied_checklist() {
        let mut steps = template_steps();
        steps[0].completed = true;
        let mut new = draft("Ada", "Lovelace");
        new.onboarding_progress = Some(steps.clone());
        let employee = service().create(new).await.unwrap();
        assert_eq!(employee.onboarding_progress, steps);
    }

    #[tokio::test]
    async fn create_rejects_blank_required_fields() {
        let err = service().create(draft("", "B")).await.unwrap_err();
        let HrError::ValidationFailed(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.fields[0].field, "firstName");
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let service = service();
        let before = service.create(draft("A", "B")).await.unwrap();
        let patch = EmployeePatch {
            last_name: Some("C".into()),
            ..EmployeePatch::default()
        };
        let after = service.update(before.id, patch).await.unwrap();
        assert_eq!(after.first_name, "A");
        assert_eq!(after.last_name, "C");
        assert_eq!(
            Employee {
                last_name: "B".into(),
                ..after.clone()
            },
            before
        );
    }

    #[tokio::test]
    async fn update_rejects_blanking_a_required_field() {
        let service = service();
        let employee = service.create(draft("A", "B")).await.unwrap();
        let patch = EmployeePatch {
            email: Some("  ".into()),
            ..EmployeePatch::default()
        };
        assert!(matches!(
            service.update(employee.id, patch).await,
            Err(HrError::ValidationFailed(_))
        ));
        assert_eq!(service.get_by_id(employee.id).await.unwrap(), employee);
    }

    #[tokio::test]
    async fn onboarding_update_replaces_the_checklist() {
        let service = service();
        let employee = service.create(draft("A", "B")).await.unwrap();
        let mut steps = template_steps();
        steps[6].completed = true;
        let updated = service
            .update_onboarding_progress(employee.id, steps.clone())
            .await
            .unwrap();
        assert_eq!(updated.onboarding_progress, steps);
        assert_eq!(updated.first_name, "A");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found_for_every_operation() {
        let service = service();
        assert!(service.get_by_id(42).await.unwrap_err().is_not_found());
        assert!(
            service
                .update(42, EmployeePatch::default())
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(
            service
                .update_onboarding_progress(42, template_steps())
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(service.delete(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn batch_delete_reports_each_id() {
        let service = service();
        service.create(draft("A", "One")).await.unwrap();
        service.create(draft("B", "Two")).await.unwrap();
        let outcome = service.delete_many(&[1, 7, 2]).await;
        assert_eq!(outcome.succeeded, [1, 2]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id, 7);
        assert!(outcome.failed[0].error.is_not_found());
        assert!(!outcome.is_complete_success());
        assert!(service.get_all().await.unwrap().is_empty());
    }
}
