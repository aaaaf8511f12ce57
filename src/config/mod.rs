//! Identity configuration file: schema generations, codec and file IO.

pub mod codec;
pub mod io;
pub mod legacy;
pub mod types;

pub use codec::{decode_config, decode_version_tag, encode, encode_config, Format, SchemaVersion};
pub use io::{default_config_paths, read_config, write_config, LoadedConfig};
pub use legacy::{LegacyConfig, LegacyIdentity, LEGACY_VERSION};
pub use types::{
    sort_identities, Condition, ConditionMode, Config, Identity, Match, MatchCommand, MatchEnv,
    MatchList, MatchRemote, MatchShellScript, CONFIG_VERSION, USER_EMAIL_KEY, USER_NAME_KEY,
};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing configuration file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to determine the location of the configuration file")]
    NoDefaultLocation,

    #[error("invalid configuration version: {0}")]
    Version(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// True when the config file simply does not exist yet.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_mentions_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/tmp/gitidentity/config.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let display = err.to_string();
        assert!(display.contains("/tmp/gitidentity/config.json"));
        assert!(display.contains("denied"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found() {
        let err = ConfigError::Read {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_not_found());
        assert!(!ConfigError::NoDefaultLocation.is_not_found());
    }

    #[test]
    fn test_version_error_display() {
        let err = ConfigError::Version("version v9 is unsupported".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration version: version v9 is unsupported"
        );
    }
}
