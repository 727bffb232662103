//! Persistence contract shared by every record type.
//!
//! Stores assign ids, apply creation defaults through [`Record`], and report
//! missing ids as [`HrError::NotFound`]. There is no isolation between
//! concurrent writers: two updates of one record race and the last one wins.
//!
//! [`HrError::NotFound`]: crate::HrError::NotFound

mod memory;

use async_trait::async_trait;

use crate::{
    error::HrResult,
    model::{
        Department, DepartmentPatch, Employee, EmployeePatch, NewDepartment, NewEmployee,
        RecordId, RecordKind,
    },
};

pub use memory::MemoryStore;

/// A record type a store can hold.
pub trait Record: Clone + Send + Sync + 'static {
    type Draft: Send + 'static;
    type Patch: Send + 'static;

    const KIND: RecordKind;

    fn id(&self) -> RecordId;

    /// Build the stored form of `draft` under `id`, applying defaults.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Shallow merge of `patch` over `self`.
    fn apply_patch(&mut self, patch: Self::Patch);
}

impl Record for Employee {
    type Draft = NewEmployee;
    type Patch = EmployeePatch;

    const KIND: RecordKind = RecordKind::Employee;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewEmployee) -> Self {
        Employee::from_draft(id, draft)
    }

    fn apply_patch(&mut self, patch: EmployeePatch) {
        self.apply(patch);
    }
}

impl Record for Department {
    type Draft = NewDepartment;
    type Patch = DepartmentPatch;

    const KIND: RecordKind = RecordKind::Department;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewDepartment) -> Self {
        Department::from_draft(id, draft)
    }

    fn apply_patch(&mut self, patch: DepartmentPatch) {
        self.apply(patch);
    }
}

#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Every record, in id order. Callers own the returned copies.
    async fn get_all(&self) -> HrResult<Vec<R>>;

    async fn get_by_id(&self, id: RecordId) -> HrResult<R>;

    async fn create(&self, draft: R::Draft) -> HrResult<R>;

    async fn update(&self, id: RecordId, patch: R::Patch) -> HrResult<R>;

    /// Hard delete.
    async fn delete(&self, id: RecordId) -> HrResult<()>;
}
