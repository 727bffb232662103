//! The record services shared by every surface.

use std::{sync::Arc, time::Duration};

use platform_db::{DbDepartmentStore, DbEmployeeStore, DbPool};
use products_hr::{
    Department, DepartmentService, Employee, EmployeeService, HrResult, MemoryStore, RecordStore,
    filter::EmployeeFilter,
};

#[derive(Clone)]
pub struct Directory {
    pub employees: EmployeeService,
    pub departments: DepartmentService,
}

impl Directory {
    pub fn new(
        employees: Arc<dyn RecordStore<Employee>>,
        departments: Arc<dyn RecordStore<Department>>,
    ) -> Self {
        Self {
            employees: EmployeeService::new(employees),
            departments: DepartmentService::new(departments),
        }
    }

    pub fn in_memory(latency: Duration) -> Self {
        Self::new(
            Arc::new(MemoryStore::new().with_latency(latency)),
            Arc::new(MemoryStore::new().with_latency(latency)),
        )
    }

    pub fn database(pool: DbPool) -> Self {
        Self::new(
            Arc::new(DbEmployeeStore::new(pool.clone())),
            Arc::new(DbDepartmentStore::new(pool)),
        )
    }

    pub async fn filtered_employees(&self, filter: &EmployeeFilter) -> HrResult<Vec<Employee>> {
        let employees = self.employees.get_all().await?;
        if filter.is_empty() {
            return Ok(employees);
        }
        Ok(employees.into_iter().filter(|e| filter.matches(e)).collect())
    }
}
