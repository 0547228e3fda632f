//! Service layer for the remote AppConfig collection
//!
//! This module provides the abstraction between the store and the remote
//! REST resource. The store depends only on [`AppConfigService`]; the HTTP
//! client and the in-memory collection are interchangeable behind it.

mod error;
mod http;
mod in_memory;
mod remote;

pub use error::{ServiceError, ServiceResult};
pub use http::HttpAppConfigService;
pub use in_memory::InMemoryAppConfigService;
pub use remote::AppConfigService;

#[cfg(test)]
pub use remote::MockAppConfigService;
