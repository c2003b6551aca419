//! Event: the JSON envelope posted to automation webhooks.
//!
//! DESIGN
//! ======
//! - `event_type` is `<entity_kind>.<past-tense action>`, e.g.
//!   `google_ad_variation.approved`. Receivers route on it and never need to
//!   inspect `data`.
//! - `data` is a flat key-value map with the entity snapshot fields the
//!   automation needs (statuses, ids, URLs).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::EntityKind;

/// Flat key-value payload.
pub type Data = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub event_type: String,
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub actor: String,
    pub data: Data,
}

impl Event {
    /// Create an event with an explicit verb (`deleted`, `uploaded`, ...).
    pub fn new(kind: EntityKind, verb: &str, entity_id: Uuid, actor: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: format!("{}.{verb}", kind.as_str()),
            entity_kind: kind,
            entity_id,
            timestamp: OffsetDateTime::now_utc(),
            actor: actor.into(),
            data: Data::new(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Insert `value` only when present; absent optionals are left out.
    #[must_use]
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<serde_json::Value>>) -> Self {
        match value {
            Some(value) => self.with_data(key, value),
            None => self,
        }
    }
}
