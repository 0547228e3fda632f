//! AppConfig model layer
//!
//! Wire types shared by the remote service implementations and the store.

mod app_config;
mod relations;

pub use app_config::*;
pub use relations::RelationFlattening;
