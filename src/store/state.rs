//! Store state
//!
//! Everything the store caches between actions. Only the store mutates it;
//! the UI reads clones through the store's accessors.

use serde::Serialize;

use crate::models::{AppConfig, Selection};
use crate::service::ServiceError;

/// Which slice of the remote collection is cached locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Offset of the cached page
    pub skip: u64,
    /// Page size
    pub take: u64,
    /// Server-reported size of the whole collection
    pub total: u64,
}

impl Pagination {
    pub fn with_take(take: u64) -> Self {
        Self {
            skip: 0,
            take,
            total: 0,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StoreState {
    pub records: Vec<AppConfig>,
    pub selection: Selection,
    pub pagination: Pagination,
    pub error: Option<ServiceError>,
    pub export_file: Option<String>,
}

impl StoreState {
    pub fn new(take: u64) -> Self {
        Self {
            records: Vec::new(),
            selection: Selection::default(),
            pagination: Pagination::with_take(take),
            error: None,
            export_file: None,
        }
    }
}
