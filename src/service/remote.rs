//! Remote AppConfig service trait

use async_trait::async_trait;

use super::ServiceResult;
use crate::models::{
    AppConfig, AppConfigCreateInput, AppConfigPatch, AppConfigUpdateInput, BatchPayload, DeletedId,
    ExportFile, FindManyParams, PaginatedResult,
};

/// Request/response boundary to the AppConfig collection.
///
/// One method per remote operation. Implementations decide the transport;
/// the store only sees typed payloads and [`ServiceError`](super::ServiceError).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppConfigService: Send + Sync {
    /// Fetch one page of records
    async fn find_many(&self, params: FindManyParams) -> ServiceResult<PaginatedResult>;

    /// Fetch the export artifact for the whole collection
    async fn find_one_for_export(&self) -> ServiceResult<ExportFile>;

    async fn find_one(&self, id: &str) -> ServiceResult<AppConfig>;

    async fn create(&self, data: AppConfigCreateInput) -> ServiceResult<AppConfig>;

    async fn create_many(&self, data: Vec<AppConfigCreateInput>) -> ServiceResult<BatchPayload>;

    async fn update(&self, id: &str, data: AppConfigUpdateInput) -> ServiceResult<AppConfigPatch>;

    async fn delete(&self, id: &str) -> ServiceResult<DeletedId>;

    /// Transport name, for logging
    fn service_type(&self) -> &'static str;
}
