//! HR vertical slice: the employee directory core.
//!
//! Records live behind [`store::RecordStore`]; the services in [`service`]
//! add defaulting, validation and logging on top of whichever backend is
//! plugged in. Filtering, onboarding progress, statistics and CSV export are
//! pure functions over the records the services hand back.

pub mod error;
pub mod export;
pub mod filter;
pub mod model;
pub mod onboarding;
pub mod service;
pub mod stats;
pub mod store;

pub use error::{FieldError, HrError, HrResult, ValidationErrors};
pub use model::{
    Department, DepartmentPatch, Employee, EmployeePatch, EmployeeStatus, NewDepartment,
    NewEmployee, RecordId, RecordKind,
};
pub use onboarding::{ONBOARDING_TEMPLATE, OnboardingEditor, OnboardingProgress, OnboardingStep};
pub use service::{BatchFailure, BatchOutcome, DepartmentService, EmployeeService};
pub use store::{MemoryStore, Record, RecordStore};
