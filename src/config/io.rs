use super::codec::{decode_config, encode_config, Format};
use super::types::Config;
use super::ConfigError;
use crate::utils::atomic_write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A decoded config together with where and how it was stored.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub format: Format,
    pub path: PathBuf,
}

/// Candidate locations tried, in order, when no explicit path is given.
#[must_use]
pub fn default_config_paths() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    let dir = home.join(".config").join("gitidentity");
    vec![
        dir.join("config.json"),
        dir.join("config.yaml"),
        dir.join("config.yml"),
    ]
}

/// Read and decode the config from `path`, or from the first readable default location.
///
/// When every candidate fails, the error of the first one is reported.
pub async fn read_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let candidates = match path {
        Some(p) => vec![p.to_path_buf()],
        None => default_config_paths(),
    };

    let mut first_err = None;
    for candidate in candidates {
        match fs::read(&candidate).await {
            Ok(bytes) => {
                debug!("config {} read", candidate.display());
                let (config, format) = decode_config(&bytes).inspect_err(|e| {
                    debug!("config {} decoding failed: {e}", candidate.display());
                })?;
                debug!(
                    "config {} decoded, version {}, {} entries",
                    candidate.display(),
                    config.version,
                    config.list.len()
                );
                return Ok(LoadedConfig {
                    config,
                    format,
                    path: candidate,
                });
            }
            Err(source) => {
                debug!("config {} reading attempt failed: {source}", candidate.display());
                if first_err.is_none() {
                    first_err = Some(ConfigError::Read {
                        path: candidate,
                        source,
                    });
                }
            }
        }
    }
    Err(first_err.unwrap_or(ConfigError::NoDefaultLocation))
}

/// Encode and atomically replace the config file, creating its directory if needed.
pub async fn write_config(path: &Path, config: &Config, format: Format) -> Result<(), ConfigError> {
    debug!(
        "writing config to {}, version {}, {} entries",
        path.display(),
        config.version,
        config.list.len()
    );
    let content = encode_config(config, format)?;
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    atomic_write(path, &content).await.map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Identity;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_config_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "version: v1\nlist:\n  - name: A\n    email: a@x.io\n").unwrap();

        let loaded = read_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.format, Format::Yaml);
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.config.list[0].display(), "A <a@x.io>");
    }

    #[tokio::test]
    async fn test_read_config_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");

        let err = read_config(Some(&path)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("nope.json"));
    }

    #[tokio::test]
    async fn test_read_config_invalid_document_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"version":"v7"}"#).unwrap();

        let err = read_config(Some(&path)).await.unwrap_err();
        assert!(matches!(err, ConfigError::Version(_)));
    }

    #[tokio::test]
    async fn test_write_config_creates_directory_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::empty();
        config.list.push(Identity {
            identifier: "solo".to_string(),
            ..Identity::default()
        });

        write_config(&path, &config, Format::Json).await.unwrap();
        let loaded = read_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.format, Format::Json);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_config_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        write_config(&path, &Config::empty(), Format::Yaml)
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_default_config_paths_order() {
        let paths = default_config_paths();
        if paths.is_empty() {
            return;
        }
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config.json", "config.yaml", "config.yml"]);
        assert!(paths[0].ends_with(".config/gitidentity/config.json"));
    }
}
