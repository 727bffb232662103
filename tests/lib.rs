//! Shared bootstrap for the cross-crate integration tests.

use std::sync::Arc;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbDepartmentStore, DbEmployeeStore, DbPool, connect};
use products_hr::{DepartmentService, EmployeeService};

pub struct TestDirectory {
    pub pool: DbPool,
    pub employees: EmployeeService,
    pub departments: DepartmentService,
}

/// A freshly migrated in-memory SQLite database behind both services.
pub async fn sqlite_directory() -> Result<TestDirectory> {
    let settings = DatabaseSettings::with_url("sqlite::memory:").max_connections(1);
    let pool = connect(&settings).await.context("connect sqlite")?;
    Migrator::up(&pool, None).await.context("run migrations")?;
    Ok(TestDirectory {
        employees: EmployeeService::new(Arc::new(DbEmployeeStore::new(pool.clone()))),
        departments: DepartmentService::new(Arc::new(DbDepartmentStore::new(pool.clone()))),
        pool,
    })
}
