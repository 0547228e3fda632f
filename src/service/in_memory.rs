//! In-memory implementation of the remote service
//!
//! Behaves like the REST resource closely enough for tests and offline use:
//! soft-deleted records are hidden from listings, ids are generated, and
//! exports are rendered as CSV text.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{AppConfigService, ServiceError, ServiceResult};
use crate::models::{
    AppConfig, AppConfigCreateInput, AppConfigPatch, AppConfigUpdateInput, BatchPayload, DeletedId,
    ExportFile, FindManyParams, PaginatedResult,
};

#[derive(Default)]
struct Inner {
    records: Vec<AppConfig>,
    next_id: u64,
    /// Error returned by the next call, then cleared
    fail_next: Option<ServiceError>,
    /// Error returned by every call until cleared
    fail_always: Option<ServiceError>,
    calls: Vec<String>,
}

/// Vec-backed service. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryAppConfigService {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryAppConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection with existing records
    pub fn with_records(records: Vec<AppConfig>) -> Self {
        let service = Self::new();
        service.lock().records = records;
        service
    }

    /// Fail the next call with `error`
    pub fn fail_next(&self, error: ServiceError) {
        self.lock().fail_next = Some(error);
    }

    /// Fail every call with `error` until `recover` is called
    pub fn fail_always(&self, error: ServiceError) {
        self.lock().fail_always = Some(error);
    }

    pub fn recover(&self) {
        let mut inner = self.lock();
        inner.fail_next = None;
        inner.fail_always = None;
    }

    /// All stored records, soft-deleted ones included
    pub fn records(&self) -> Vec<AppConfig> {
        self.lock().records.clone()
    }

    /// Names of the operations called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and return the injected failure, if any
    fn begin(&self, operation: &str) -> ServiceResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        inner.calls.push(operation.to_string());

        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        if let Some(error) = &inner.fail_always {
            return Err(error.clone());
        }
        Ok(inner)
    }

    fn generate_id(inner: &mut Inner) -> String {
        inner.next_id += 1;
        format!("mem-{}", inner.next_id)
    }

    fn insert(inner: &mut Inner, data: AppConfigCreateInput) -> AppConfig {
        let now = Utc::now();
        let record = AppConfig {
            id: Self::generate_id(inner),
            key: data.key,
            value: data.value,
            created_at: Some(now),
            updated_at: Some(now),
            deleted_at: None,
            extra: data.extra,
        };
        inner.records.push(record.clone());
        record
    }
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::with_payload(
        format!("AppConfig not found: {}", id),
        json!({ "statusCode": 404, "message": format!("AppConfig {} not found", id) }),
    )
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[async_trait]
impl AppConfigService for InMemoryAppConfigService {
    async fn find_many(&self, params: FindManyParams) -> ServiceResult<PaginatedResult> {
        let inner = self.begin("find_many")?;
        let live: Vec<&AppConfig> = inner.records.iter().filter(|r| !r.is_deleted()).collect();
        let total_count = live.len() as u64;

        let skip = params.skip.unwrap_or(0) as usize;
        let take = params.take.map(|t| t as usize).unwrap_or(usize::MAX);
        let paginated_result = live.into_iter().skip(skip).take(take).cloned().collect();

        Ok(PaginatedResult {
            paginated_result,
            total_count,
        })
    }

    async fn find_one_for_export(&self) -> ServiceResult<ExportFile> {
        let inner = self.begin("find_one_for_export")?;
        let mut file = String::from("id,key,value\n");
        for record in inner.records.iter().filter(|r| !r.is_deleted()) {
            file.push_str(&format!(
                "{},{},{}\n",
                csv_field(&record.id),
                csv_field(&record.key),
                csv_field(&record.value)
            ));
        }
        Ok(ExportFile { file })
    }

    async fn find_one(&self, id: &str) -> ServiceResult<AppConfig> {
        let inner = self.begin("find_one")?;
        inner
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, data: AppConfigCreateInput) -> ServiceResult<AppConfig> {
        let mut inner = self.begin("create")?;
        Ok(Self::insert(&mut inner, data))
    }

    async fn create_many(&self, data: Vec<AppConfigCreateInput>) -> ServiceResult<BatchPayload> {
        let mut inner = self.begin("create_many")?;
        let count = data.len() as u64;
        for item in data {
            Self::insert(&mut inner, item);
        }
        Ok(BatchPayload { count })
    }

    async fn update(&self, id: &str, data: AppConfigUpdateInput) -> ServiceResult<AppConfigPatch> {
        let mut inner = self.begin("update")?;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found(id))?;

        if let Some(key) = data.key {
            record.key = key;
        }
        if let Some(value) = data.value {
            record.value = value;
        }
        if data.deleted_at.is_some() {
            record.deleted_at = data.deleted_at;
        }
        for (name, value) in data.extra {
            record.extra.insert(name, value);
        }
        record.updated_at = Some(Utc::now());

        Ok(record.clone().into())
    }

    async fn delete(&self, id: &str) -> ServiceResult<DeletedId> {
        let mut inner = self.begin("delete")?;
        let position = inner
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = inner.records.remove(position);
        Ok(DeletedId { id: removed.id })
    }

    fn service_type(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_many_pages_and_hides_deleted() {
        let mut gone = AppConfig::new("b", "k2", "v2");
        gone.deleted_at = Some(Utc::now());
        let service = InMemoryAppConfigService::with_records(vec![
            AppConfig::new("a", "k1", "v1"),
            gone,
            AppConfig::new("c", "k3", "v3"),
        ]);

        let page = service
            .find_many(FindManyParams {
                skip: Some(1),
                take: Some(5),
            })
            .await
            .unwrap();

        assert_eq!(page.total_count, 2);
        assert_eq!(page.paginated_result.len(), 1);
        assert_eq!(page.paginated_result[0].id, "c");
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let service = InMemoryAppConfigService::new();
        service.fail_next(ServiceError::new("boom"));

        assert!(service.find_one_for_export().await.is_err());
        assert!(service.find_one_for_export().await.is_ok());
        assert_eq!(service.calls(), vec!["find_one_for_export", "find_one_for_export"]);
    }

    #[tokio::test]
    async fn test_export_quotes_csv_fields() {
        let record = AppConfig::new("a", "greeting", "hi, there");
        let service = InMemoryAppConfigService::with_records(vec![record]);

        let export = service.find_one_for_export().await.unwrap();
        assert_eq!(export.file, "id,key,value\na,greeting,\"hi, there\"\n");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let service = InMemoryAppConfigService::new();
        let err = service.delete("missing").await.unwrap_err();
        assert_eq!(err.error["statusCode"], 404);
    }
}
