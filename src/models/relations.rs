//! Relation flattening for list results
//!
//! The service returns relational sub-objects inline (e.g. `{"owner": {"id":
//! "u1", "name": "ann"}}`). List views expect such fields as an ordered array
//! of the object's values instead. Only declared fields are transformed.

use serde_json::Value;
use std::collections::BTreeSet;

use super::AppConfig;

/// Declared set of relational fields to flatten on list results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationFlattening {
    fields: BTreeSet<String>,
}

impl RelationFlattening {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Flatten every declared field of `record` that holds a JSON object.
    ///
    /// Null, scalar and array values are left as they are.
    pub fn apply(&self, record: &mut AppConfig) {
        for field in &self.fields {
            if let Some(slot) = record.extra.get_mut(field) {
                if let Value::Object(map) = slot {
                    let values = std::mem::take(map).into_iter().map(|(_, v)| v).collect();
                    *slot = Value::Array(values);
                }
            }
        }
    }

    pub fn apply_all(&self, records: &mut [AppConfig]) {
        if self.is_empty() {
            return;
        }
        for record in records.iter_mut() {
            self.apply(record);
        }
    }
}
