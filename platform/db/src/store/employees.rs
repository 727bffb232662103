use async_trait::async_trait;
use entity::employees::{self, Status};
use products_hr::{
    Employee, EmployeePatch, EmployeeStatus, HrError, HrResult, NewEmployee, OnboardingStep,
    RecordId, RecordKind, RecordStore,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, QueryOrder, Set};
use tracing::instrument;

use super::{store_error, write_error};
use crate::DbPool;

/// Employees persisted in the `employees` table.
#[derive(Clone)]
pub struct DbEmployeeStore {
    pool: DbPool,
}

impl DbEmployeeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find(&self, id: RecordId) -> HrResult<employees::Model> {
        employees::Entity::find_by_id(id)
            .one(&self.pool)
            .await
            .map_err(store_error)?
            .ok_or_else(|| HrError::not_found(RecordKind::Employee, id))
    }
}

#[async_trait]
impl RecordStore<Employee> for DbEmployeeStore {
    #[instrument(name = "db.employees.get_all", skip_all)]
    async fn get_all(&self) -> HrResult<Vec<Employee>> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.pool)
            .await
            .map_err(store_error)?;
        rows.into_iter().map(to_record).collect()
    }

    #[instrument(name = "db.employees.get_by_id", skip(self))]
    async fn get_by_id(&self, id: RecordId) -> HrResult<Employee> {
        to_record(self.find(id).await?)
    }

    #[instrument(name = "db.employees.create", skip_all)]
    async fn create(&self, draft: NewEmployee) -> HrResult<Employee> {
        let record = Employee::from_draft(0, draft);
        let mut active = to_active(&record)?;
        active.id = NotSet;
        let model = active.insert(&self.pool).await.map_err(store_error)?;
        to_record(model)
    }

    #[instrument(name = "db.employees.update", skip(self, patch))]
    async fn update(&self, id: RecordId, patch: EmployeePatch) -> HrResult<Employee> {
        let mut record = to_record(self.find(id).await?)?;
        record.apply(patch);
        let model = to_active(&record)?
            .update(&self.pool)
            .await
            .map_err(|err| write_error(RecordKind::Employee, id, err))?;
        to_record(model)
    }

    #[instrument(name = "db.employees.delete", skip(self))]
    async fn delete(&self, id: RecordId) -> HrResult<()> {
        let result = employees::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Err(HrError::not_found(RecordKind::Employee, id));
        }
        Ok(())
    }
}

fn to_record(model: employees::Model) -> HrResult<Employee> {
    let onboarding_progress: Vec<OnboardingStep> =
        serde_json::from_value(model.onboarding_progress).map_err(|err| {
            HrError::transport(format!(
                "employee {} has an unreadable onboarding checklist: {err}",
                model.id
            ))
        })?;
    Ok(Employee {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        photo_url: model.photo_url,
        role: model.role,
        department: model.department,
        start_date: model.start_date,
        status: match model.status {
            Status::Active => EmployeeStatus::Active,
            Status::Inactive => EmployeeStatus::Inactive,
        },
        manager_id: model.manager_id,
        onboarding_progress,
    })
}

fn to_active(record: &Employee) -> HrResult<employees::ActiveModel> {
    let onboarding_progress = serde_json::to_value(&record.onboarding_progress)
        .map_err(|err| HrError::transport(format!("onboarding checklist: {err}")))?;
    Ok(employees::ActiveModel {
        id: Set(record.id),
        first_name: Set(record.first_name.clone()),
        last_name: Set(record.last_name.clone()),
        email: Set(record.email.clone()),
        phone: Set(record.phone.clone()),
        photo_url: Set(record.photo_url.clone()),
        role: Set(record.role.clone()),
        department: Set(record.department.clone()),
        start_date: Set(record.start_date),
        status: Set(match record.status {
            EmployeeStatus::Active => Status::Active,
            EmployeeStatus::Inactive => Status::Inactive,
        }),
        manager_id: Set(record.manager_id),
        onboarding_progress: Set(onboarding_progress),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use super::*;

    async fn store() -> DbEmployeeStore {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&pool, None).await.unwrap();
        DbEmployeeStore::new(pool)
    }

    fn draft(first_name: &str) -> NewEmployee {
        NewEmployee {
            first_name: first_name.into(),
            last_name: "Doe".into(),
            email: format!("{}@example.test", first_name.to_lowercase()),
            phone: "555".into(),
            photo_url: Some("   ".into()),
            role: "Engineer".into(),
            department: "Engineering".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            status: EmployeeStatus::Active,
            manager_id: None,
            onboarding_progress: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_defaults() {
        let store = store().await;
        let jane = store.create(draft("Jane")).await.unwrap();
        let john = store.create(draft("John")).await.unwrap();
        assert!(john.id > jane.id);
        assert_eq!(jane.photo_url, None);
        assert_eq!(jane.onboarding_progress.len(), 7);

        let all = store.get_all().await.unwrap();
        assert_eq!(all, vec![jane.clone(), john]);
        assert_eq!(store.get_by_id(jane.id).await.unwrap(), jane);
    }

    #[tokio::test]
    async fn update_merges_and_persists_the_checklist() {
        let store = store().await;
        let jane = store.create(draft("Jane")).await.unwrap();
        let mut steps = jane.onboarding_progress.clone();
        steps[1].completed = true;

        let updated = store
            .update(
                jane.id,
                EmployeePatch {
                    status: Some(EmployeeStatus::Inactive),
                    onboarding_progress: Some(steps.clone()),
                    ..EmployeePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.status, EmployeeStatus::Inactive);
        assert_eq!(store.get_by_id(jane.id).await.unwrap().onboarding_progress, steps);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = store().await;
        let expected = HrError::not_found(RecordKind::Employee, 99);
        assert_eq!(store.get_by_id(99).await.unwrap_err(), expected);
        assert_eq!(
            store.update(99, EmployeePatch::default()).await.unwrap_err(),
            expected
        );
        assert_eq!(store.delete(99).await.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = store().await;
        let jane = store.create(draft("Jane")).await.unwrap();
        store.delete(jane.id).await.unwrap();
        assert!(store.get_by_id(jane.id).await.unwrap_err().is_not_found());
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
