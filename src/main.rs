use std::sync::Arc;

use tokio::io::BufReader;
use tokio::signal;

use event_formatter::config::Settings;
use event_formatter::error::Result;
use event_formatter::pipeline::Pipeline;
use event_formatter::telemetry::init_telemetry;
use event_formatter::template::MessageFormatter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_telemetry(&settings.logging)?;
    tracing::info!(
        base_url = %settings.formatter.base_url,
        custom_template = settings.formatter.message_template().is_some(),
        output = ?settings.output.format,
        "Configuration loaded"
    );

    let formatter = Arc::new(MessageFormatter::from_config(&settings.formatter));
    let pipeline = Pipeline::new(formatter, settings.output.format);

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = pipeline.run(stdin, stdout) => {
            let stats = result?;
            tracing::info!(
                rendered = stats.rendered,
                skipped = stats.skipped,
                "Input exhausted, shutting down"
            );
        }
        _ = shutdown_signal_handler() => {}
    }

    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, stopping");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, stopping");
        }
    }
}
