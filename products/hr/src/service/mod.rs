//! CRUD façades over the record stores.
//!
//! Services validate drafts and patches before they reach a store and log
//! every failure they hand back; nothing is retried.

mod department;
mod employee;

use std::sync::Arc;

use tracing::warn;

use crate::{
    error::{HrError, HrResult},
    model::RecordId,
    store::{Record, RecordStore},
};

pub use department::DepartmentService;
pub use employee::EmployeeService;

/// Per-item result of a batch operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutcome {
    pub succeeded: Vec<RecordId>,
    pub failed: Vec<BatchFailure>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchFailure {
    pub id: RecordId,
    pub error: HrError,
}

impl BatchOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Store handle shared by the typed services.
struct Records<R: Record> {
    store: Arc<dyn RecordStore<R>>,
}

impl<R: Record> Clone for Records<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Record> Records<R> {
    fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }

    async fn get_all(&self) -> HrResult<Vec<R>> {
        logged(self.store.get_all().await, R::KIND.as_str(), "get_all", None)
    }

    async fn get_by_id(&self, id: RecordId) -> HrResult<R> {
        logged(self.store.get_by_id(id).await, R::KIND.as_str(), "get_by_id", Some(id))
    }

    async fn create(&self, draft: R::Draft) -> HrResult<R> {
        logged(self.store.create(draft).await, R::KIND.as_str(), "create", None)
    }

    async fn update(&self, id: RecordId, patch: R::Patch) -> HrResult<R> {
        logged(self.store.update(id, patch).await, R::KIND.as_str(), "update", Some(id))
    }

    async fn delete(&self, id: RecordId) -> HrResult<()> {
        logged(self.store.delete(id).await, R::KIND.as_str(), "delete", Some(id))
    }

    async fn delete_many(&self, ids: &[RecordId]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for &id in ids {
            match self.delete(id).await {
                Ok(()) => outcome.succeeded.push(id),
                Err(error) => outcome.failed.push(BatchFailure { id, error }),
            }
        }
        outcome
    }
}

/// Validation gate for drafts and patches; rejections are logged like store failures.
fn checked(result: HrResult<()>, kind: &'static str, op: &'static str) -> HrResult<()> {
    if let Err(err) = &result {
        warn!(kind, op, error = %err, "rejected invalid input");
    }
    result
}

fn logged<T>(
    result: HrResult<T>,
    kind: &'static str,
    op: &'static str,
    id: Option<RecordId>,
) -> HrResult<T> {
    if let Err(err) = &result {
        warn!(kind, op, id, error = %err, "store operation failed");
    }
    result
}
