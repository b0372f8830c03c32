//! Decoding of CLEF (compact log event format) lines
//!
//! Reserved fields are `@`-prefixed; a leading `@@` escapes a user property
//! whose own name starts with `@`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::types::{EventError, EventRecord, EventResult, Level, Properties, PropertyValue};

/// Decode a single CLEF JSON object into an event record
pub fn parse_clef_line(line: &str) -> EventResult<EventRecord> {
    let fields: Map<String, Value> = serde_json::from_str(line)?;

    let mut timestamp = None;
    let mut level = Level::default();
    let mut message = None;
    let mut message_template = None;
    let mut exception = None;
    let mut event_type = 0;
    let mut event_id = String::new();
    let mut properties = Properties::new();

    for (key, value) in fields {
        match key.as_str() {
            "@t" => {
                let raw = expect_str("@t", &value)?;
                let parsed = DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| EventError::InvalidTimestamp(format!("{}: {}", raw, e)))?;
                timestamp = Some(parsed);
            }
            "@l" => level = expect_str("@l", &value)?.parse()?,
            "@m" => message = Some(expect_str("@m", &value)?.to_string()),
            "@mt" => message_template = Some(expect_str("@mt", &value)?.to_string()),
            "@x" => exception = Some(expect_str("@x", &value)?.to_string()),
            "@i" => event_type = parse_event_type(&value)?,
            "@seqid" => {
                event_id = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    _ => {
                        return Err(EventError::InvalidField {
                            field: "@seqid",
                            expected: "a string or number",
                        })
                    }
                }
            }
            _ if key.starts_with("@@") => properties.push(&key[1..], PropertyValue::from(value)),
            _ if key.starts_with('@') => {
                tracing::trace!(field = %key, "Ignoring unsupported reserved field");
            }
            _ => properties.push(key, PropertyValue::from(value)),
        }
    }

    let timestamp = timestamp.ok_or(EventError::MissingTimestamp)?;
    let rendered_message = match (message, message_template) {
        (Some(m), _) => m,
        (None, Some(mt)) => render_message_template(&mt, &properties),
        (None, None) => String::new(),
    };

    Ok(EventRecord {
        id: event_id.clone(),
        event_id,
        event_type,
        level,
        rendered_message,
        exception,
        local_timestamp: timestamp,
        timestamp: timestamp.with_timezone(&Utc),
        properties,
    })
}

fn expect_str<'a>(field: &'static str, value: &'a Value) -> EventResult<&'a str> {
    value.as_str().ok_or(EventError::InvalidField {
        field,
        expected: "a string",
    })
}

/// `@i` is usually a hex string; some producers emit a plain number
fn parse_event_type(value: &Value) -> EventResult<u32> {
    match value {
        Value::String(s) => {
            let digits = s
                .strip_prefix("0x")
                .or_else(|| s.strip_prefix('$'))
                .unwrap_or(s);
            u32::from_str_radix(digits, 16).map_err(|_| EventError::InvalidEventType(s.clone()))
        }
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| EventError::InvalidEventType(n.to_string())),
        other => Err(EventError::InvalidEventType(other.to_string())),
    }
}

/// Fill `{Name}` holes of a message template from the event properties.
///
/// Destructuring hints (`@`, `$`), alignment and format suffixes are dropped;
/// holes without a matching property are left as written.
fn render_message_template(template: &str, properties: &Properties) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        match tail.find('}') {
            Some(end) => {
                let hole = &tail[1..end];
                let name = hole
                    .trim_start_matches(['@', '$'])
                    .split([',', ':'])
                    .next()
                    .unwrap_or_default();
                match properties.get(name) {
                    Some(value) => out.push_str(value.to_display().as_deref().unwrap_or("null")),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
