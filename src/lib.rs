//! AppConfig store library
//!
//! Client-side store for paginated AppConfig key/value records. It caches a
//! page of records, tracks the selected record, and keeps both in step with
//! a remote REST service. The `appconfig` binary is a thin CLI over it.

pub mod busy;
pub mod config;
pub mod models;
pub mod service;
pub mod storage;
pub mod store;

// Re-export commonly used types for convenience
pub use busy::{BusyCounter, BusyGuard};
pub use models::{
    AppConfig, AppConfigCreateInput, AppConfigDraft, AppConfigPatch, AppConfigUpdateInput,
    FindManyParams, RelationFlattening, Selection, default_draft,
};
pub use service::{
    AppConfigService, HttpAppConfigService, InMemoryAppConfigService, ServiceError,
    ServiceResult,
};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use store::{ConfigStore, Pagination};
