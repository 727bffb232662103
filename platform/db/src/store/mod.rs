//! sea-orm backed [`RecordStore`] implementations.
//!
//! [`RecordStore`]: products_hr::RecordStore

mod departments;
mod employees;

use products_hr::{HrError, RecordId, RecordKind, ValidationErrors};
use sea_orm::DbErr;

pub use departments::DbDepartmentStore;
pub use employees::DbEmployeeStore;

/// Constraint violations are rejected writes; everything else means the
/// database could not be reached or answered unexpectedly.
pub(crate) fn store_error(err: DbErr) -> HrError {
    match err.sql_err() {
        Some(violation) => {
            HrError::ValidationFailed(ValidationErrors::with_message(violation.to_string()))
        }
        None => HrError::transport(err.to_string()),
    }
}

/// Like [`store_error`], but a vanished row during `update` is `NotFound`.
pub(crate) fn write_error(kind: RecordKind, id: RecordId, err: DbErr) -> HrError {
    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => HrError::not_found(kind, id),
        other => store_error(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_map_to_not_found() {
        let err = write_error(RecordKind::Employee, 4, DbErr::RecordNotUpdated);
        assert_eq!(err, HrError::not_found(RecordKind::Employee, 4));
    }

    #[test]
    fn connection_failures_map_to_transport() {
        let err = store_error(DbErr::Custom("socket closed".into()));
        assert!(matches!(err, HrError::TransportFailure(message) if message.contains("socket closed")));
    }
}
