//! Log event records.
//!
//! This module provides:
//! - `EventRecord`, the immutable input to message rendering
//! - `PropertyValue` and `Properties` for the event's named properties
//! - CLEF (compact log event format) decoding of newline-delimited JSON events
//!
//! # Example
//!
//! ```ignore
//! let event = parse_clef_line(r#"{"@t":"2024-05-01T12:00:00Z","@m":"Disk full","Host":"db-1"}"#)?;
//!
//! assert_eq!(event.rendered_message, "Disk full");
//! assert_eq!(event.properties.get("host"), Some(&PropertyValue::from("db-1")));
//! ```

mod clef;
mod types;

pub use clef::parse_clef_line;
pub use types::{EventBuilder, EventError, EventRecord, EventResult, Level, Properties, PropertyValue};
