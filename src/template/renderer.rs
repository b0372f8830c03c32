//! Message rendering

use std::fmt;
use std::sync::Arc;

use crate::config::FormatterConfig;
use crate::event::{EventRecord, PropertyValue};

use super::composite::format_positional;
use super::scanner::scan;
use super::sink::{FormatFailure, FormatFailureSink, TracingSink};
use super::table::PlaceholderTable;

/// Template used when none is configured: the message plus a link to the event
pub const DEFAULT_TEMPLATE: &str =
    "[RenderedMessage] [link]([BaseUrl]/#/events?filter=@Id%3D%3D'[EventId]'&show=expanded)";

/// Text substituted for null values
pub const NULL_TEXT: &str = "(Null)";

/// Renders events into notification text
#[derive(Clone)]
pub struct MessageFormatter {
    base_url: String,
    message_template: String,
    sink: Arc<dyn FormatFailureSink>,
}

impl fmt::Debug for MessageFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFormatter")
            .field("base_url", &self.base_url)
            .field("message_template", &self.message_template)
            .finish_non_exhaustive()
    }
}

impl MessageFormatter {
    /// Create a formatter; `None` selects [`DEFAULT_TEMPLATE`]
    pub fn new(base_url: impl Into<String>, message_template: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            message_template: message_template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            sink: Arc::new(TracingSink),
        }
    }

    /// Create a formatter from settings; a blank template counts as unset
    pub fn from_config(config: &FormatterConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.message_template().map(str::to_string),
        )
    }

    /// Replace the sink that receives format failures
    pub fn with_sink(mut self, sink: Arc<dyn FormatFailureSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    /// Render the configured template for `event`
    pub fn generate_message_text(&self, event: &EventRecord) -> String {
        self.render(event, &self.message_template)
    }

    /// Render an arbitrary template for `event`
    pub fn render(&self, event: &EventRecord, template: &str) -> String {
        let table = PlaceholderTable::for_event(event, &self.base_url);
        substitute(template, &table, self.sink.as_ref())
    }
}

/// Render `template` for `event`, logging format failures through `tracing`
pub fn render(event: &EventRecord, template: &str, base_url: &str) -> String {
    let table = PlaceholderTable::for_event(event, base_url);
    substitute(template, &table, &TracingSink)
}

/// Single left-to-right pass; replacement text is never rescanned
fn substitute(template: &str, table: &PlaceholderTable, sink: &dyn FormatFailureSink) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for token in scan(template) {
        out.push_str(&template[last..token.start]);
        match table.get(token.key) {
            Some(value) => out.push_str(&format_value(token.key, value, token.format, sink)),
            None => out.push_str(token.text),
        }
        last = token.end;
    }

    out.push_str(&template[last..]);
    out
}

fn format_value(
    key: &str,
    value: &PropertyValue,
    format: Option<&str>,
    sink: &dyn FormatFailureSink,
) -> String {
    let raw = value.to_display().unwrap_or_else(|| NULL_TEXT.to_string());

    let Some(format) = format.filter(|f| !f.trim().is_empty()) else {
        return raw;
    };

    match format_positional(format, &[raw.as_str()]) {
        Ok(formatted) => formatted,
        Err(error) => {
            sink.format_failed(&FormatFailure {
                key,
                value,
                format,
                error: &error,
            });
            raw
        }
    }
}
