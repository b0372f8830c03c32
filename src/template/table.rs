//! Per-render placeholder table

use std::collections::HashMap;

use crate::event::{EventRecord, PropertyValue};

/// Fixed event fields injected after the event's own properties
pub const FIXED_FIELDS: [&str; 9] = [
    "Level",
    "EventType",
    "RenderedMessage",
    "Exception",
    "Id",
    "LocalTimestamp",
    "Timestamp",
    "EventId",
    "BaseUrl",
];

/// Case-insensitive mapping from placeholder key to value.
///
/// The first value written for a key wins, so event properties shadow the
/// fixed fields of the same name.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTable {
    entries: HashMap<String, PropertyValue>,
}

impl PlaceholderTable {
    /// Build the table for one render of `event`
    pub fn for_event(event: &EventRecord, base_url: &str) -> Self {
        let mut table = Self {
            entries: HashMap::with_capacity(event.properties.len() + FIXED_FIELDS.len()),
        };

        for (key, value) in event.properties.iter() {
            table.insert_if_absent(key, value.clone());
        }

        let fixed: [PropertyValue; 9] = [
            PropertyValue::Text(event.level.to_string()),
            PropertyValue::Integer(i64::from(event.event_type)),
            PropertyValue::Text(event.rendered_message.clone()),
            event.exception.clone().into(),
            PropertyValue::Text(event.id.clone()),
            PropertyValue::Timestamp(event.local_timestamp),
            event.timestamp.into(),
            PropertyValue::Text(event.event_id.clone()),
            PropertyValue::from(base_url),
        ];
        for (key, value) in FIXED_FIELDS.iter().zip(fixed) {
            table.insert_if_absent(key, value);
        }

        table
    }

    /// Insert unless the key is already present; returns whether it was inserted
    pub fn insert_if_absent(&mut self, key: &str, value: PropertyValue) -> bool {
        let key = key.to_lowercase();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(&key.to_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
