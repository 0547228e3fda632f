//! AppConfig record and request/response payloads
//!
//! Field names follow the remote service's camelCase JSON. Fields the store
//! does not know about are kept in `extra` and travel through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A key/value configuration record as returned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub id: String,
    pub key: String,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Set when the record has been soft deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Fields not modelled here (relations, audit columns, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfig {
    pub fn new(id: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            value: value.into(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
            extra: Map::new(),
        }
    }

    /// Shallow merge of an update response over `self`.
    ///
    /// Fields the response carries win, explicit nulls included; fields it
    /// omits keep their current values.
    pub fn merged_with(&self, patch: &AppConfigPatch) -> AppConfig {
        let mut extra = self.extra.clone();
        for (name, value) in &patch.extra {
            extra.insert(name.clone(), value.clone());
        }

        AppConfig {
            id: patch.id.clone(),
            key: patch.key.clone(),
            value: patch.value.clone(),
            created_at: patch.created_at.unwrap_or(self.created_at),
            updated_at: patch.updated_at.unwrap_or(self.updated_at),
            deleted_at: patch.deleted_at.unwrap_or(self.deleted_at),
            extra,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Record returned by an update.
///
/// Optional timestamps are `None` when the response omits them and
/// `Some(None)` when it sends an explicit null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigPatch {
    pub id: String,
    pub key: String,
    pub value: String,

    #[serde(default, deserialize_with = "present")]
    pub created_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "present")]
    pub updated_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "present")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<AppConfig> for AppConfigPatch {
    /// A full record: every timestamp counts as present
    fn from(record: AppConfig) -> Self {
        Self {
            id: record.id,
            key: record.key,
            value: record.value,
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
            deleted_at: Some(record.deleted_at),
            extra: record.extra,
        }
    }
}

/// Marks a field as present, so a null becomes `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// In-progress create/edit form state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigDraft {
    pub key: String,
    pub value: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fresh draft with empty key and value.
///
/// Every call builds a new value, so callers can never share or mutate a
/// template.
pub fn default_draft() -> AppConfigDraft {
    AppConfigDraft {
        key: String::new(),
        value: String::new(),
        extra: Map::new(),
    }
}

/// Payload for creating a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigCreateInput {
    pub key: String,
    pub value: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfigCreateInput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            extra: Map::new(),
        }
    }
}

/// Partial update payload; absent fields are left alone by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfigUpdateInput {
    /// Update that only marks the record as deleted at `when`
    pub fn soft_delete(when: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(when),
            ..Default::default()
        }
    }
}

/// Contents of the selection slot: either a draft or a loaded record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    Draft(AppConfigDraft),
    Record(AppConfig),
}

impl Selection {
    pub fn key(&self) -> &str {
        match self {
            Selection::Draft(draft) => &draft.key,
            Selection::Record(record) => &record.key,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Selection::Draft(draft) => &draft.value,
            Selection::Record(record) => &record.value,
        }
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        match self {
            Selection::Draft(draft) => draft.key = key.into(),
            Selection::Record(record) => record.key = key.into(),
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        match self {
            Selection::Draft(draft) => draft.value = value.into(),
            Selection::Record(record) => record.value = value.into(),
        }
    }

    /// The record id, if a persisted record is selected
    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::Draft(_) => None,
            Selection::Record(record) => Some(&record.id),
        }
    }

    pub fn to_create_input(&self) -> AppConfigCreateInput {
        match self {
            Selection::Draft(draft) => AppConfigCreateInput {
                key: draft.key.clone(),
                value: draft.value.clone(),
                extra: draft.extra.clone(),
            },
            Selection::Record(record) => AppConfigCreateInput {
                key: record.key.clone(),
                value: record.value.clone(),
                extra: record.extra.clone(),
            },
        }
    }

    pub fn to_update_input(&self) -> AppConfigUpdateInput {
        match self {
            Selection::Draft(draft) => AppConfigUpdateInput {
                key: Some(draft.key.clone()),
                value: Some(draft.value.clone()),
                deleted_at: None,
                extra: draft.extra.clone(),
            },
            Selection::Record(record) => AppConfigUpdateInput {
                key: Some(record.key.clone()),
                value: Some(record.value.clone()),
                deleted_at: record.deleted_at,
                extra: record.extra.clone(),
            },
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Draft(default_draft())
    }
}

/// Query for one page of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindManyParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
}

/// One page of records plus the total count of the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult {
    pub paginated_result: Vec<AppConfig>,
    pub total_count: u64,
}

/// Server-generated export artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub file: String,
}

/// Acknowledgement of a batch create
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    #[serde(default)]
    pub count: u64,
}

/// Id echoed back by a hard delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedId {
    pub id: String,
}
