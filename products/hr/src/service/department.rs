use std::sync::Arc;

use tracing::instrument;

use super::{BatchOutcome, Records, checked};
use crate::{
    error::HrResult,
    filter,
    model::{Department, DepartmentPatch, Employee, NewDepartment, RecordId, RecordKind},
    store::RecordStore,
};

#[derive(Clone)]
pub struct DepartmentService {
    records: Records<Department>,
}

impl DepartmentService {
    pub fn new(store: Arc<dyn RecordStore<Department>>) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    #[instrument(name = "hr.departments.get_all", skip_all)]
    pub async fn get_all(&self) -> HrResult<Vec<Department>> {
        self.records.get_all().await
    }

    #[instrument(name = "hr.departments.get_by_id", skip(self))]
    pub async fn get_by_id(&self, id: RecordId) -> HrResult<Department> {
        self.records.get_by_id(id).await
    }

    /// New departments start with `employee_count` 0 and no parent.
    #[instrument(name = "hr.departments.create", skip_all, fields(name = %draft.name))]
    pub async fn create(&self, draft: NewDepartment) -> HrResult<Department> {
        checked(draft.validate(), RecordKind::Department.as_str(), "create")?;
        self.records.create(draft).await
    }

    #[instrument(name = "hr.departments.update", skip(self, patch))]
    pub async fn update(&self, id: RecordId, patch: DepartmentPatch) -> HrResult<Department> {
        checked(patch.validate(), RecordKind::Department.as_str(), "update")?;
        self.records.update(id, patch).await
    }

    #[instrument(name = "hr.departments.delete", skip(self))]
    pub async fn delete(&self, id: RecordId) -> HrResult<()> {
        self.records.delete(id).await
    }

    #[instrument(name = "hr.departments.delete_many", skip_all, fields(count = ids.len()))]
    pub async fn delete_many(&self, ids: &[RecordId]) -> BatchOutcome {
        self.records.delete_many(ids).await
    }

    /// Members of department `id`, matched by name against `employees`.
    #[instrument(name = "hr.departments.roster", skip(self, employees))]
    pub async fn roster(&self, id: RecordId, employees: &[Employee]) -> HrResult<Vec<Employee>> {
        let department = self.get_by_id(id).await?;
        Ok(filter::members_of(&department.name, employees)
            .into_iter()
            .cloned()
            .collect())
    }
}
