//! Event processing loop.
//!
//! Reads CLEF events line by line, renders each through a
//! `MessageFormatter` and writes one output record per event. Lines that
//! fail to decode are logged and skipped.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::OutputFormat;
use crate::error::Result;
use crate::event::{parse_clef_line, EventRecord};
use crate::template::MessageFormatter;

/// Counters reported when the input is exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub rendered: u64,
    pub skipped: u64,
}

#[derive(Serialize)]
struct OutputRecord<'a> {
    event_id: &'a str,
    text: &'a str,
}

pub struct Pipeline {
    formatter: Arc<MessageFormatter>,
    output: OutputFormat,
}

impl Pipeline {
    pub fn new(formatter: Arc<MessageFormatter>, output: OutputFormat) -> Self {
        Self { formatter, output }
    }

    /// Process every line of `reader` until end of input
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<PipelineStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut stats = PipelineStats::default();
        let mut line_number = 0u64;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_number += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    tracing::warn!(line = line_number, error = %e, "Skipping line that is not UTF-8");
                    stats.skipped += 1;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let event = match parse_clef_line(line) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(line = line_number, error = %e, "Skipping undecodable event");
                    stats.skipped += 1;
                    continue;
                }
            };

            let text = self.formatter.generate_message_text(&event);
            writer.write_all(self.encode(&event, &text)?.as_bytes()).await?;
            stats.rendered += 1;

            tracing::debug!(
                line = line_number,
                event_id = %event.event_id,
                level = %event.level,
                "Rendered event"
            );
        }

        writer.flush().await?;
        Ok(stats)
    }

    fn encode(&self, event: &EventRecord, text: &str) -> Result<String> {
        let mut record = match self.output {
            OutputFormat::Text => text.to_string(),
            OutputFormat::Json => serde_json::to_string(&OutputRecord {
                event_id: &event.event_id,
                text,
            })?,
        };
        record.push('\n');
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    fn pipeline(template: &str, output: OutputFormat) -> Pipeline {
        let formatter = MessageFormatter::new("http://seq", Some(template.to_string()));
        Pipeline::new(Arc::new(formatter), output)
    }

    #[tokio::test]
    async fn test_renders_each_event() {
        let input = concat!(
            r#"{"@t":"2024-05-01T12:00:00Z","@l":"Warning","@m":"first","@seqid":"event-1"}"#,
            "\n\n",
            r#"{"@t":"2024-05-01T12:00:01Z","@m":"second","@seqid":"event-2"}"#,
            "\n",
        );
        let mut output = Vec::new();

        let stats = pipeline("[Level]: [RenderedMessage]", OutputFormat::Text)
            .run(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        assert_eq!(stats, PipelineStats { rendered: 2, skipped: 0 });
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Warning: first\nInformation: second\n"
        );
    }

    #[tokio::test]
    async fn test_skips_bad_lines() {
        let input = concat!(
            "not json\n",
            r#"{"@m":"no timestamp"}"#,
            "\n",
            r#"{"@t":"2024-05-01T12:00:00Z","@m":"ok","@seqid":"event-3"}"#,
        );
        let mut output = Vec::new();

        let stats = pipeline("[EventId]", OutputFormat::Text)
            .run(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        assert_eq!(stats, PipelineStats { rendered: 1, skipped: 2 });
        assert_eq!(String::from_utf8(output).unwrap(), "event-3\n");
    }

    #[tokio::test]
    async fn test_skips_invalid_utf8_line() {
        let mut input = b"{\"@t\":\"2024-05-01T12:00:00Z\",\"@m\":\"caf\xe9\"}\n".to_vec();
        input.extend_from_slice(
            b"{\"@t\":\"2024-05-01T12:00:00Z\",\"@m\":\"after\",\"@seqid\":\"event-5\"}\r\n",
        );
        let mut output = Vec::new();

        let stats = pipeline("[RenderedMessage] [EventId]", OutputFormat::Text)
            .run(BufReader::new(input.as_slice()), &mut output)
            .await
            .unwrap();

        assert_eq!(stats, PipelineStats { rendered: 1, skipped: 1 });
        assert_eq!(String::from_utf8(output).unwrap(), "after event-5\n");
    }

    #[tokio::test]
    async fn test_json_output() {
        let input = r#"{"@t":"2024-05-01T12:00:00Z","@m":"line1\nline2","@seqid":"event-4"}"#;
        let mut output = Vec::new();

        pipeline("[RenderedMessage]", OutputFormat::Json)
            .run(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"event_id\":\"event-4\",\"text\":\"line1\\nline2\"}\n"
        );
    }

    #[tokio::test]
    async fn test_mock_io() {
        let reader = tokio_test::io::Builder::new()
            .read(br#"{"@t":"2024-05-01T12:00:00Z","@m":"hel"#)
            .read(b"lo\"}\n")
            .build();
        let writer = tokio_test::io::Builder::new().write(b"hello\n").build();

        let stats = pipeline("[RenderedMessage]", OutputFormat::Text)
            .run(BufReader::new(reader), writer)
            .await
            .unwrap();

        assert_eq!(stats.rendered, 1);
    }
}
