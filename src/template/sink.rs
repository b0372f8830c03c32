//! Reporting of format failures

use crate::event::PropertyValue;

use super::types::FormatError;

/// Details of a format string that could not be applied
#[derive(Debug, Clone, Copy)]
pub struct FormatFailure<'a> {
    /// Placeholder key as written in the template
    pub key: &'a str,
    pub value: &'a PropertyValue,
    pub format: &'a str,
    pub error: &'a FormatError,
}

/// Receives format failures; rendering falls back to the unformatted value
/// whatever the sink does
pub trait FormatFailureSink: Send + Sync {
    fn format_failed(&self, failure: &FormatFailure<'_>);
}

/// Sink that logs failures through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FormatFailureSink for TracingSink {
    fn format_failed(&self, failure: &FormatFailure<'_>) {
        tracing::error!(
            error = %failure.error,
            key = %failure.key,
            value = ?failure.value,
            format = %failure.format,
            "Could not format message"
        );
    }
}
