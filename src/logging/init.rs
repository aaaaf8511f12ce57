use color_eyre::eyre::{eyre, Result};
use tracing::Level;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use super::LogConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gitidentity={level}")))
}

/// Install the global subscriber: stderr always, plus the optional log file.
///
/// `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);
    layers.push(if config.json_format {
        stderr_layer
            .json()
            .with_filter(env_filter(config.level))
            .boxed()
    } else {
        stderr_layer.with_filter(env_filter(config.level)).boxed()
    });

    if let Some(path) = &config.log_file {
        let file_name = path
            .file_name()
            .ok_or_else(|| eyre!("log file path {} has no file name", path.display()))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        std::fs::create_dir_all(dir)?;
        let appender = tracing_appender::rolling::never(dir, file_name);
        let file_layer = fmt::layer()
            .with_writer(appender)
            .with_target(true)
            .with_ansi(false);
        layers.push(if config.json_format {
            file_layer
                .json()
                .with_filter(env_filter(config.level))
                .boxed()
        } else {
            file_layer.with_filter(env_filter(config.level)).boxed()
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(())
}

/// Parse a level name, case-insensitively; unknown names mean `debug`.
#[must_use]
pub fn parse_level(s: &str) -> Level {
    s.trim().parse().unwrap_or(Level::DEBUG)
}
