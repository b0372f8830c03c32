mod settings;

pub use settings::{FormatterConfig, LoggingConfig, OutputConfig, OutputFormat, Settings};
