use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Record, RecordStore};
use crate::{
    error::{HrError, HrResult},
    model::RecordId,
};

/// Process-local store backed by an ordered map.
///
/// Ids are `max(existing, previously issued) + 1`, so an id is never handed
/// out twice even after its record (or the highest record) is deleted.
pub struct MemoryStore<R> {
    table: RwLock<Table<R>>,
    latency: Duration,
}

struct Table<R> {
    rows: BTreeMap<RecordId, R>,
    high_water: RecordId,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Preload `records` under their own ids.
    pub fn with_records(records: Vec<R>) -> Self {
        let rows: BTreeMap<RecordId, R> = records
            .into_iter()
            .map(|record| (record.id(), record))
            .collect();
        let high_water = rows.keys().next_back().copied().unwrap_or(0);
        Self {
            table: RwLock::new(Table { rows, high_water }),
            latency: Duration::ZERO,
        }
    }

    /// Delay every operation by `latency` to mimic a remote round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn get_all(&self) -> HrResult<Vec<R>> {
        self.simulate_latency().await;
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: RecordId) -> HrResult<R> {
        self.simulate_latency().await;
        let table = self.table.read().await;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| HrError::not_found(R::KIND, id))
    }

    async fn create(&self, draft: R::Draft) -> HrResult<R> {
        self.simulate_latency().await;
        let mut table = self.table.write().await;
        let max_existing = table.rows.keys().next_back().copied().unwrap_or(0);
        let id = max_existing.max(table.high_water) + 1;
        let record = R::from_draft(id, draft);
        table.rows.insert(id, record.clone());
        table.high_water = id;
        Ok(record)
    }

    async fn update(&self, id: RecordId, patch: R::Patch) -> HrResult<R> {
        self.simulate_latency().await;
        let mut table = self.table.write().await;
        let record = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| HrError::not_found(R::KIND, id))?;
        record.apply_patch(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: RecordId) -> HrResult<()> {
        self.simulate_latency().await;
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| HrError::not_found(R::KIND, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Department, DepartmentPatch, NewDepartment};

    #[tokio::test]
    async fn ids_follow_creation_order_and_skip_deleted() {
        let store = MemoryStore::<Department>::new();
        for (expected, name) in [(1, "Eng"), (2, "Sales"), (3, "Ops")] {
            let created = store.create(NewDepartment::named(name)).await.unwrap();
            assert_eq!(created.id, expected);
        }

        store.delete(2).await.unwrap();
        assert_eq!(store.create(NewDepartment::named("HR")).await.unwrap().id, 4);

        store.delete(4).await.unwrap();
        assert_eq!(store.create(NewDepartment::named("Legal")).await.unwrap().id, 5);
    }

    #[tokio::test]
    async fn preloaded_records_seed_the_id_sequence() {
        let store = MemoryStore::with_records(vec![
            Department::from_draft(3, NewDepartment::named("Eng")),
            Department::from_draft(10, NewDepartment::named("Sales")),
        ]);
        let created = store.create(NewDepartment::named("Ops")).await.unwrap();
        assert_eq!(created.id, 11);
        let ids: Vec<_> = store.get_all().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, [3, 10, 11]);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::<Department>::new();
        assert!(store.get_by_id(1).await.unwrap_err().is_not_found());
        assert!(
            store
                .update(1, DepartmentPatch::default())
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(store.delete(1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn get_all_returns_detached_copies() {
        let store = MemoryStore::<Department>::new();
        store.create(NewDepartment::named("Eng")).await.unwrap();
        let mut copies = store.get_all().await.unwrap();
        copies[0].name = "Changed".into();
        assert_eq!(store.get_by_id(1).await.unwrap().name, "Eng");
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_each_operation() {
        let store = MemoryStore::<Department>::new().with_latency(Duration::from_millis(300));
        let started = tokio::time::Instant::now();
        store.create(NewDepartment::named("Eng")).await.unwrap();
        store.get_all().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(600));
    }
}
