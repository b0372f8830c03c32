use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_errors_convert() {
        fn load() -> Result<()> {
            let loaded: std::result::Result<(), config::ConfigError> =
                Err(config::ConfigError::Message("missing field `base_url`".to_string()));
            loaded?;
            Ok(())
        }
        fn init() -> Result<()> {
            let installed: std::result::Result<(), TelemetryError> =
                Err(TelemetryError::SubscriberInit("already set".to_string()));
            installed?;
            Ok(())
        }

        let err = load().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: missing field `base_url`");

        let err = init().unwrap_err();
        assert!(matches!(err, AppError::Telemetry(_)));
        assert_eq!(
            err.to_string(),
            "Telemetry error: Failed to install tracing subscriber: already set"
        );
    }
}
