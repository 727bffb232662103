use async_trait::async_trait;
use entity::departments;
use products_hr::{
    Department, DepartmentPatch, HrError, HrResult, NewDepartment, RecordId, RecordKind,
    RecordStore,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, QueryOrder, Set};
use tracing::instrument;

use super::{store_error, write_error};
use crate::DbPool;

/// Departments persisted in the `departments` table.
#[derive(Clone)]
pub struct DbDepartmentStore {
    pool: DbPool,
}

impl DbDepartmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find(&self, id: RecordId) -> HrResult<departments::Model> {
        departments::Entity::find_by_id(id)
            .one(&self.pool)
            .await
            .map_err(store_error)?
            .ok_or_else(|| HrError::not_found(RecordKind::Department, id))
    }
}

#[async_trait]
impl RecordStore<Department> for DbDepartmentStore {
    #[instrument(name = "db.departments.get_all", skip_all)]
    async fn get_all(&self) -> HrResult<Vec<Department>> {
        let rows = departments::Entity::find()
            .order_by_asc(departments::Column::Id)
            .all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(to_record).collect())
    }

    #[instrument(name = "db.departments.get_by_id", skip(self))]
    async fn get_by_id(&self, id: RecordId) -> HrResult<Department> {
        self.find(id).await.map(to_record)
    }

    #[instrument(name = "db.departments.create", skip_all)]
    async fn create(&self, draft: NewDepartment) -> HrResult<Department> {
        let mut active = to_active(&Department::from_draft(0, draft));
        active.id = NotSet;
        let model = active.insert(&self.pool).await.map_err(store_error)?;
        Ok(to_record(model))
    }

    #[instrument(name = "db.departments.update", skip(self, patch))]
    async fn update(&self, id: RecordId, patch: DepartmentPatch) -> HrResult<Department> {
        let mut record = to_record(self.find(id).await?);
        record.apply(patch);
        let model = to_active(&record)
            .update(&self.pool)
            .await
            .map_err(|err| write_error(RecordKind::Department, id, err))?;
        Ok(to_record(model))
    }

    #[instrument(name = "db.departments.delete", skip(self))]
    async fn delete(&self, id: RecordId) -> HrResult<()> {
        let result = departments::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Err(HrError::not_found(RecordKind::Department, id));
        }
        Ok(())
    }
}

fn to_record(model: departments::Model) -> Department {
    Department {
        id: model.id,
        name: model.name,
        description: model.description,
        head_id: model.head_id,
        parent_department_id: model.parent_department_id,
        employee_count: model.employee_count,
    }
}

fn to_active(record: &Department) -> departments::ActiveModel {
    departments::ActiveModel {
        id: Set(record.id),
        name: Set(record.name.clone()),
        description: Set(record.description.clone()),
        head_id: Set(record.head_id),
        parent_department_id: Set(record.parent_department_id),
        employee_count: Set(record.employee_count),
    }
}

#[cfg(test)]
mod tests {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use super::*;

    async fn store() -> DbDepartmentStore {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&pool, None).await.unwrap();
        DbDepartmentStore::new(pool)
    }

    #[tokio::test]
    async fn create_then_rename() {
        let store = store().await;
        let created = store
            .create(NewDepartment {
                description: Some(String::new()),
                ..NewDepartment::named("Engineering")
            })
            .await
            .unwrap();
        assert_eq!(created.employee_count, 0);
        assert_eq!(created.description, None);

        let renamed = store
            .update(
                created.id,
                DepartmentPatch {
                    name: Some("Platform".into()),
                    ..DepartmentPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Platform");
        assert_eq!(store.get_all().await.unwrap(), vec![renamed]);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let store = store().await;
        let created = store.create(NewDepartment::named("Sales")).await.unwrap();
        store.delete(created.id).await.unwrap();
        assert_eq!(
            store.delete(created.id).await.unwrap_err(),
            HrError::not_found(RecordKind::Department, created.id)
        );
    }
}
