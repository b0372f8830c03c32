//! Event types and error definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event decoding error type
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event has no @t timestamp")]
    MissingTimestamp,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Invalid event type: {0}")]
    InvalidEventType(String),

    #[error("Field {field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Result type for event operations
pub type EventResult<T> = Result<T, EventError>;

/// Severity levels for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum Level {
    Verbose,
    Debug,
    /// Default when an event carries no level
    #[default]
    Information,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Verbose => "Verbose",
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = EventError;

    /// Accepts full level names as well as the common short and
    /// syslog-style aliases, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verbose" | "vrb" | "trace" | "trc" => Ok(Level::Verbose),
            "debug" | "dbg" => Ok(Level::Debug),
            "information" | "info" | "inf" => Ok(Level::Information),
            "warning" | "warn" | "wrn" => Ok(Level::Warning),
            "error" | "err" | "eror" => Ok(Level::Error),
            "fatal" | "ftl" | "critical" | "crit" => Ok(Level::Fatal),
            _ => Err(EventError::InvalidLevel(s.to_string())),
        }
    }
}

/// A single property value attached to an event
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<FixedOffset>),
    /// Arrays and objects, kept as JSON
    Structured(serde_json::Value),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Default text representation, or `None` for a null value
    pub fn to_display(&self) -> Option<String> {
        match self {
            PropertyValue::Null => None,
            PropertyValue::Bool(b) => Some(b.to_string()),
            PropertyValue::Integer(n) => Some(n.to_string()),
            PropertyValue::Float(n) => Some(n.to_string()),
            PropertyValue::Text(s) => Some(s.clone()),
            PropertyValue::Timestamp(t) => Some(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            PropertyValue::Structured(v) => Some(v.to_string()),
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Integer(i),
                // u64 above i64::MAX and all non-integral numbers
                None => n
                    .as_f64()
                    .map(PropertyValue::Float)
                    .unwrap_or(PropertyValue::Null),
            },
            serde_json::Value::String(s) => PropertyValue::Text(s),
            other => PropertyValue::Structured(other),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<DateTime<FixedOffset>> for PropertyValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        PropertyValue::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::Timestamp(value.into())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Null, Into::into)
    }
}

/// Ordered event properties with case-insensitive lookup.
///
/// Keys that differ only by case may coexist; lookups return the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.push((key.into(), value.into()));
    }

    /// Get the first property whose key matches, ignoring case
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        let key = key.to_lowercase();
        self.0
            .iter()
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A log event as seen by the message formatter
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Internal event identifier
    pub id: String,
    /// Identifier used to link back to the event in the log server
    pub event_id: String,
    /// Numeric event type (hash of the message template)
    pub event_type: u32,
    pub level: Level,
    pub rendered_message: String,
    pub exception: Option<String>,
    /// Timestamp with the offset the event was recorded in
    pub local_timestamp: DateTime<FixedOffset>,
    pub timestamp: DateTime<Utc>,
    pub properties: Properties,
}

impl EventRecord {
    /// Start building an event with the given rendered message
    pub fn builder(rendered_message: impl Into<String>) -> EventBuilder {
        EventBuilder::new(rendered_message)
    }
}

/// Builder for creating event records
#[derive(Debug, Clone)]
pub struct EventBuilder {
    id: String,
    event_id: Option<String>,
    event_type: u32,
    level: Level,
    rendered_message: String,
    exception: Option<String>,
    timestamp: DateTime<FixedOffset>,
    properties: Properties,
}

impl EventBuilder {
    /// Create a new builder timestamped now (UTC)
    pub fn new(rendered_message: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            event_id: None,
            event_type: 0,
            level: Level::default(),
            rendered_message: rendered_message.into(),
            exception: None,
            timestamp: Utc::now().into(),
            properties: Properties::new(),
        }
    }

    /// Set the internal id; also used as the event id unless one is set
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn event_type(mut self, event_type: u32) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    /// Set the local timestamp; the UTC timestamp is derived from it
    pub fn timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.push(key, value);
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn build(self) -> EventRecord {
        EventRecord {
            event_id: self.event_id.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            event_type: self.event_type,
            level: self.level,
            rendered_message: self.rendered_message,
            exception: self.exception,
            local_timestamp: self.timestamp,
            timestamp: self.timestamp.with_timezone(&Utc),
            properties: self.properties,
        }
    }
}
