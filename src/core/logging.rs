use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::core::config::LoggingConfig;

/// Install the global subscriber: console output plus an optional JSON log file.
///
/// `RUST_LOG` controls the filter (default `info`).
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let file_layer = if config.to_file {
        fs::create_dir_all(&config.dir).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create log directory '{}': {}",
                config.dir.display(),
                e
            )
        })?;

        let path = config.dir.join(&config.file_name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| anyhow::anyhow!("Failed to open log file '{}': {}", path.display(), e))?;

        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
