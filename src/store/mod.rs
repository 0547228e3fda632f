//! AppConfig store
//!
//! Caches one page of records, the record being viewed or edited, and the
//! pagination cursor, and keeps them in step with the remote service.
//!
//! Every action follows the same shape: hold a busy guard, call one remote
//! operation, fold the response into the cached state, and record the
//! outcome in the error slot. Failures are logged, stored, and also
//! returned, so callers can either `?` them or ignore the return value and
//! read [`ConfigStore::error`] afterwards. Nothing is applied locally until
//! the server has answered.

mod state;

pub use state::Pagination;

use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::busy::BusyCounter;
use crate::config::{DEFAULT_TAKE, TAKE_STORAGE_KEY};
use crate::models::{
    AppConfig, AppConfigCreateInput, AppConfigUpdateInput, FindManyParams, RelationFlattening,
    Selection, default_draft,
};
use crate::service::{AppConfigService, ServiceError, ServiceResult};
use crate::storage::KeyValueStore;
use state::StoreState;

/// Client-side store for AppConfig records. Clones share the same state.
#[derive(Clone)]
pub struct ConfigStore {
    service: Arc<dyn AppConfigService>,
    storage: Arc<dyn KeyValueStore>,
    busy: BusyCounter,
    relations: Arc<RelationFlattening>,
    state: Arc<RwLock<StoreState>>,
}

impl ConfigStore {
    /// Create a store; the page size is restored from `storage`
    pub fn new(
        service: Arc<dyn AppConfigService>,
        storage: Arc<dyn KeyValueStore>,
        busy: BusyCounter,
    ) -> Self {
        let take = stored_take(storage.as_ref());
        tracing::debug!("Creating AppConfig store with page size {}", take);

        Self {
            service,
            storage,
            busy,
            relations: Arc::new(RelationFlattening::default()),
            state: Arc::new(RwLock::new(StoreState::new(take))),
        }
    }

    /// Flatten these relational fields on every list result
    pub fn with_relations(mut self, relations: RelationFlattening) -> Self {
        self.relations = Arc::new(relations);
        self
    }

    // --- Actions -----------------------------------------------------------

    /// Fetch one page and replace the cached list with it.
    ///
    /// Absent `skip`/`take` are left to the server. The cursor becomes
    /// `skip or 0` / `take or total`, and the effective page size is
    /// persisted. On failure the cached list is emptied and the cursor is
    /// left alone.
    pub async fn list(&self, page: FindManyParams) -> ServiceResult<()> {
        let _busy = self.busy.begin();
        tracing::debug!("Listing AppConfigs: {:?}", page);

        let result = self.service.find_many(page).await.map(|mut data| {
            self.relations.apply_all(&mut data.paginated_result);
            data
        });

        let mut effective_take = None;
        self.settle(
            "list",
            result,
            |state, data| {
                let take = page.take.unwrap_or(data.total_count);
                state.pagination = Pagination {
                    total: data.total_count,
                    skip: page.skip.unwrap_or(0),
                    take,
                };
                state.records = data.paginated_result;
                effective_take = Some(take);
            },
            |state| state.records.clear(),
        )?;

        if let Some(take) = effective_take {
            self.persist_take(take);
        }
        Ok(())
    }

    /// Fetch the export artifact into the export buffer
    pub async fn list_for_export(&self) -> ServiceResult<()> {
        let _busy = self.busy.begin();

        let result = self.service.find_one_for_export().await;
        self.settle(
            "list_for_export",
            result,
            |state, export| state.export_file = Some(export.file),
            |_| {},
        )
    }

    /// Mark a record deleted, then reload the current page
    pub async fn soft_delete(&self, id: &str) -> ServiceResult<()> {
        let _busy = self.busy.begin();
        tracing::debug!("Soft deleting AppConfig {}", id);

        let result = self
            .service
            .update(id, AppConfigUpdateInput::soft_delete(Utc::now()))
            .await;
        self.settle("soft_delete", result, |_, _| {}, |_| {})?;

        let Pagination { skip, take, .. } = self.pagination();
        self.list(FindManyParams {
            skip: Some(skip),
            take: Some(take),
        })
        .await
    }

    /// Hard delete; drops the echoed id from the cache and the total
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let _busy = self.busy.begin();
        tracing::debug!("Deleting AppConfig {}", id);

        let result = self.service.delete(id).await;
        self.settle(
            "delete",
            result,
            |state, deleted| {
                state.records.retain(|record| record.id != deleted.id);
                state.pagination.total = state.pagination.total.saturating_sub(1);
            },
            |_| {},
        )
    }

    /// Update a record with `data`, or with the current selection when
    /// `data` is `None`. Cached entries with that id are shallow-merged
    /// with the response.
    pub async fn update(&self, id: &str, data: Option<AppConfigUpdateInput>) -> ServiceResult<()> {
        let _busy = self.busy.begin();
        let payload = data.unwrap_or_else(|| self.read().selection.to_update_input());
        tracing::debug!("Updating AppConfig {}", id);

        let result = self.service.update(id, payload).await;
        self.settle(
            "update",
            result,
            |state, updated| {
                for record in state.records.iter_mut().filter(|record| record.id == id) {
                    *record = record.merged_with(&updated);
                }
            },
            |_| {},
        )
    }

    /// Load one record into the selection.
    ///
    /// On failure the selection falls back to a fresh draft.
    pub async fn get_by_id(&self, id: &str) -> ServiceResult<()> {
        let _busy = self.busy.begin();
        tracing::debug!("Fetching AppConfig {}", id);

        let result = self.service.find_one(id).await;
        self.settle(
            "get_by_id",
            result,
            |state, record| state.selection = Selection::Record(record),
            |state| state.selection = Selection::Draft(default_draft()),
        )
    }

    /// Create a record from `data`, or from the current selection when
    /// `data` is `None`, and append it to the cached list
    pub async fn create(&self, data: Option<AppConfigCreateInput>) -> ServiceResult<()> {
        let _busy = self.busy.begin();
        let payload = data.unwrap_or_else(|| self.read().selection.to_create_input());
        tracing::debug!("Creating AppConfig with key {:?}", payload.key);

        let result = self.service.create(payload).await;
        self.settle(
            "create",
            result,
            |state, record| state.records.push(record),
            |_| {},
        )
    }

    /// Batch create. The cached list is not touched; re-list to see the
    /// new records.
    pub async fn create_many(&self, items: Vec<AppConfigCreateInput>) -> ServiceResult<()> {
        let _busy = self.busy.begin();
        tracing::debug!("Creating {} AppConfigs", items.len());

        let result = self.service.create_many(items).await;
        self.settle(
            "create_many",
            result,
            |_, ack| tracing::debug!("Server created {} AppConfigs", ack.count),
            |_| {},
        )
    }

    /// Replace the selection with a fresh draft
    pub fn reset(&self) {
        self.write().selection = Selection::Draft(default_draft());
    }

    // --- Accessors ---------------------------------------------------------

    /// The cached page, in server order
    pub fn records(&self) -> Vec<AppConfig> {
        self.read().records.clone()
    }

    pub fn record(&self, id: &str) -> Option<AppConfig> {
        self.read()
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub fn selection(&self) -> Selection {
        self.read().selection.clone()
    }

    /// Edit the selection in place (form input)
    pub fn edit_selection<R>(&self, edit: impl FnOnce(&mut Selection) -> R) -> R {
        edit(&mut self.write().selection)
    }

    pub fn pagination(&self) -> Pagination {
        self.read().pagination
    }

    /// Error from the most recent action, `None` if it succeeded
    pub fn error(&self) -> Option<ServiceError> {
        self.read().error.clone()
    }

    pub fn export_file(&self) -> Option<String> {
        self.read().export_file.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy(&self) -> &BusyCounter {
        &self.busy
    }

    // --- Internals ---------------------------------------------------------

    /// Fold an action's outcome into the state and the error slot
    fn settle<T>(
        &self,
        action: &'static str,
        result: ServiceResult<T>,
        apply: impl FnOnce(&mut StoreState, T),
        on_error: impl FnOnce(&mut StoreState),
    ) -> ServiceResult<()> {
        let mut state = self.write();
        match result {
            Ok(data) => {
                apply(&mut state, data);
                state.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!(action, payload = %err.error, "AppConfig action failed: {}", err);
                on_error(&mut state);
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn persist_take(&self, take: u64) {
        if let Err(e) = self.storage.set(TAKE_STORAGE_KEY, &take.to_string()) {
            tracing::warn!("Failed to persist page size {}: {:#}", take, e);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Page size persisted by a previous session; absent, non-numeric or zero
/// values fall back to the default
fn stored_take(storage: &dyn KeyValueStore) -> u64 {
    storage
        .get(TAKE_STORAGE_KEY)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|take| *take > 0)
        .unwrap_or(DEFAULT_TAKE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExportFile, PaginatedResult};
    use crate::service::MockAppConfigService;
    use crate::storage::MemoryKeyValueStore;
    use mockall::predicate::eq;
    use serde_json::json;

    fn store_with(mock: MockAppConfigService) -> (ConfigStore, MemoryKeyValueStore) {
        let storage = MemoryKeyValueStore::new();
        let store = ConfigStore::new(
            Arc::new(mock),
            Arc::new(storage.clone()),
            BusyCounter::new(),
        );
        (store, storage)
    }

    fn page(ids: &[&str], total: u64) -> PaginatedResult {
        PaginatedResult {
            paginated_result: ids.iter().map(|id| AppConfig::new(*id, "k", "v")).collect(),
            total_count: total,
        }
    }

    #[test]
    fn test_stored_take_fallbacks() {
        let storage = MemoryKeyValueStore::new();
        assert_eq!(stored_take(&storage), 5);

        storage.set(TAKE_STORAGE_KEY, "abc").unwrap();
        assert_eq!(stored_take(&storage), 5);

        storage.set(TAKE_STORAGE_KEY, "0").unwrap();
        assert_eq!(stored_take(&storage), 5);

        storage.set(TAKE_STORAGE_KEY, "20").unwrap();
        assert_eq!(stored_take(&storage), 20);
    }

    #[tokio::test]
    async fn test_list_without_params_takes_total() {
        let mut mock = MockAppConfigService::new();
        mock.expect_find_many()
            .with(eq(FindManyParams::default()))
            .times(1)
            .returning(|_| Ok(page(&["a", "b", "c"], 3)));

        let (store, storage) = store_with(mock);
        store.list(FindManyParams::default()).await.unwrap();

        assert_eq!(
            store.pagination(),
            Pagination {
                skip: 0,
                take: 3,
                total: 3
            }
        );
        assert_eq!(storage.get(TAKE_STORAGE_KEY).as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_soft_delete_marks_and_relists_current_page() {
        let mut mock = MockAppConfigService::new();
        mock.expect_update()
            .withf(|id, data| {
                id == "a" && data.deleted_at.is_some() && data.key.is_none() && data.value.is_none()
            })
            .times(1)
            .returning(|id, _| Ok(AppConfig::new(id, "k", "v").into()));
        mock.expect_find_many()
            .with(eq(FindManyParams {
                skip: Some(0),
                take: Some(5),
            }))
            .times(1)
            .returning(|_| Ok(page(&["b"], 1)));

        let (store, _) = store_with(mock);
        store.soft_delete("a").await.unwrap();

        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].id, "b");
        assert!(store.error().is_none());
        assert!(!store.is_busy());
    }

    #[tokio::test]
    async fn test_soft_delete_failure_skips_relist() {
        let mut mock = MockAppConfigService::new();
        mock.expect_update()
            .times(1)
            .returning(|_, _| Err(ServiceError::new("forbidden")));
        mock.expect_find_many().times(0);

        let (store, _) = store_with(mock);
        assert!(store.soft_delete("a").await.is_err());
        assert_eq!(store.error().unwrap().message, "forbidden");
        assert!(!store.is_busy());
    }

    #[tokio::test]
    async fn test_update_without_data_sends_selection() {
        let mut mock = MockAppConfigService::new();
        mock.expect_find_one()
            .times(1)
            .returning(|id| Ok(AppConfig::new(id, "theme", "light")));
        mock.expect_update()
            .withf(|id, data| id == "a" && data.value.as_deref() == Some("dark"))
            .times(1)
            .returning(|id, _| Ok(AppConfig::new(id, "theme", "dark").into()));

        let (store, _) = store_with(mock);
        store.get_by_id("a").await.unwrap();
        store.edit_selection(|selection| selection.set_value("dark"));
        store.update("a", None).await.unwrap();

        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_update_with_null_deleted_at_restores_cached_entry() {
        let mut mock = MockAppConfigService::new();
        mock.expect_find_many().times(1).returning(|_| {
            let mut record = AppConfig::new("a", "k", "v");
            record.created_at = Some(Utc::now());
            record.deleted_at = Some(Utc::now());
            Ok(PaginatedResult {
                paginated_result: vec![record],
                total_count: 1,
            })
        });
        mock.expect_update().times(1).returning(|_, _| {
            Ok(serde_json::from_value(json!({
                "id": "a",
                "key": "k",
                "value": "v",
                "deletedAt": null
            }))
            .unwrap())
        });

        let (store, _) = store_with(mock);
        store.list(FindManyParams::default()).await.unwrap();
        assert!(store.records()[0].is_deleted());

        store
            .update("a", Some(AppConfigUpdateInput::default()))
            .await
            .unwrap();

        let record = &store.records()[0];
        assert!(!record.is_deleted());
        assert!(record.created_at.is_some());
    }

    #[tokio::test]
    async fn test_create_without_data_sends_draft() {
        let mut mock = MockAppConfigService::new();
        mock.expect_create()
            .with(eq(AppConfigCreateInput::new("locale", "en")))
            .times(1)
            .returning(|data| Ok(AppConfig::new("n1", data.key, data.value)));

        let (store, _) = store_with(mock);
        store.edit_selection(|selection| {
            selection.set_key("locale");
            selection.set_value("en");
        });
        store.create(None).await.unwrap();

        assert_eq!(store.records()[0].id, "n1");
    }

    #[tokio::test]
    async fn test_export_failure_keeps_previous_file() {
        let mut mock = MockAppConfigService::new();
        let mut calls = 0;
        mock.expect_find_one_for_export().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(ExportFile {
                    file: "id,key,value\n".to_string(),
                })
            } else {
                Err(ServiceError::with_payload("HTTP 500", json!({"statusCode": 500})))
            }
        });

        let (store, _) = store_with(mock);
        store.list_for_export().await.unwrap();
        assert!(store.list_for_export().await.is_err());

        assert_eq!(store.export_file().as_deref(), Some("id,key,value\n"));
        assert_eq!(store.error().unwrap().error["statusCode"], 500);
        assert!(!store.is_busy());
    }

    #[tokio::test]
    async fn test_list_flattens_declared_relations() {
        let mut mock = MockAppConfigService::new();
        mock.expect_find_many().times(1).returning(|_| {
            let mut record = AppConfig::new("a", "k", "v");
            record
                .extra
                .insert("owner".into(), json!({"id": "u1", "name": "ann"}));
            record.extra.insert("meta".into(), json!({"x": 1}));
            Ok(PaginatedResult {
                paginated_result: vec![record],
                total_count: 1,
            })
        });

        let (store, _) = store_with(mock);
        let store = store.with_relations(RelationFlattening::new(["owner"]));
        store.list(FindManyParams::default()).await.unwrap();

        let record = &store.records()[0];
        assert_eq!(record.extra["owner"], json!(["u1", "ann"]));
        assert_eq!(record.extra["meta"], json!({"x": 1}));
    }
}
