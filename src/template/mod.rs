//! Notification message templates.
//!
//! This module provides:
//! - Placeholder scanning for `[key]` and `[key:format]` tokens
//! - A per-render placeholder table built from an event and its fixed fields
//! - A positional format engine (`{0}`, `{0,-8}`, `{0:D5}`, `{0:yyyy-MM-dd}`)
//! - `MessageFormatter`, which renders an event into notification text
//!
//! # Example
//!
//! ```ignore
//! let formatter = MessageFormatter::new("https://logs.example.com", None);
//!
//! let event = EventRecord::builder("Disk full")
//!     .id("event-42")
//!     .property("Free", 0.05)
//!     .build();
//!
//! // "Disk full (5.00 % free)"
//! let text = formatter.render(&event, "[RenderedMessage] ([Free:{0:P2}] free)");
//!
//! // Default template: message plus a link back to the event
//! let text = formatter.generate_message_text(&event);
//! ```

mod composite;
mod renderer;
mod scanner;
mod sink;
mod specifier;
mod table;
mod types;

pub use composite::format_positional;
pub use renderer::{render, MessageFormatter, DEFAULT_TEMPLATE, NULL_TEXT};
pub use scanner::{scan, Tokens};
pub use sink::{FormatFailure, FormatFailureSink, TracingSink};
pub use specifier::apply_specifier;
pub use table::{PlaceholderTable, FIXED_FIELDS};
pub use types::{FormatError, FormatResult, Token};
