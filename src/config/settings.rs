use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub formatter: FormatterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatterConfig {
    /// Base URL of the log server, used for links back to events
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Message template; the built-in default is used when unset or blank
    #[serde(default)]
    pub message_template: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON log lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How rendered messages are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One rendered message per line
    #[default]
    Text,
    /// One `{"event_id": .., "text": ..}` object per line
    Json,
}

fn default_base_url() -> String {
    "http://localhost:5341".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl FormatterConfig {
    /// The configured template, if it is not blank
    pub fn message_template(&self) -> Option<&str> {
        self.message_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // EVENT_FORMATTER__FORMATTER__BASE_URL, EVENT_FORMATTER__LOGGING__JSON, etc.
            .add_source(
                Environment::with_prefix("EVENT_FORMATTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("formatter.base_url", default_base_url())?
        .set_default("logging.level", default_log_level())?
        .set_default("logging.json", false)?
        .set_default("output.format", "text")
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            message_template: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load(toml: &str) -> Settings {
        defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_values() {
        let settings = load("");
        assert_eq!(settings.formatter.base_url, "http://localhost:5341");
        assert!(settings.formatter.message_template().is_none());
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
        assert_eq!(settings.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_file_overrides() {
        let settings = load(
            r#"
            [formatter]
            base_url = "https://seq.example.com"
            message_template = "[Level]: [RenderedMessage]"

            [logging]
            json = true

            [output]
            format = "json"
            "#,
        );

        assert_eq!(settings.formatter.base_url, "https://seq.example.com");
        assert_eq!(
            settings.formatter.message_template(),
            Some("[Level]: [RenderedMessage]")
        );
        assert!(settings.logging.json);
        assert_eq!(settings.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_blank_template_is_unset() {
        let config = FormatterConfig {
            message_template: Some("  ".to_string()),
            ..FormatterConfig::default()
        };
        assert!(config.message_template().is_none());
    }
}
